//! Snapshot file naming and the listing snapshot record
//!
//! | Purpose | Filename |
//! |---|---|
//! | single entity | `<Type>-<id>.xml` |
//! | full listing | `<Listing>.xml` |
//! | search results | `search_<hex>.xml` |
//! | update version | `<Type>-<id>.<nnn>.xml` |
//!
//! The names are the contract between recording and playback; file content
//! belongs to whichever codec wrote it.

use clarity_core::entity::{EntityRef, Link};
use clarity_core::registry::ListingType;
use serde::{Deserialize, Serialize};

/// Name of the snapshot of a single entity
pub fn entity_file_name(reference: &EntityRef) -> String {
    format!("{}-{}.xml", reference.type_name, reference.id)
}

/// Name of the snapshot of a full listing
pub fn listing_file_name(listing: &ListingType) -> String {
    format!("{}.xml", listing.name)
}

/// Name of one version of an updated entity; versions are at least three digits
pub fn update_file_name(reference: &EntityRef, version: u32) -> String {
    format!("{}-{}.{:03}.xml", reference.type_name, reference.id, version)
}

/// Every link a listing call returned, as stored in `<Listing>.xml`
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ListingSnapshot<E> {
    pub listing: String,

    #[serde(default)]
    pub links: Vec<Link<E>>,
}

impl<E> ListingSnapshot<E> {
    pub fn new(listing: &ListingType, links: Vec<Link<E>>) -> Self {
        Self {
            listing: listing.name.to_string(),
            links,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarity_core::model::SAMPLES;

    #[test]
    fn test_file_names() {
        let reference = EntityRef::new("Sample", "S1");
        assert_eq!(entity_file_name(&reference), "Sample-S1.xml");
        assert_eq!(listing_file_name(&SAMPLES), "Samples.xml");
        assert_eq!(update_file_name(&reference, 0), "Sample-S1.000.xml");
        assert_eq!(update_file_name(&reference, 12), "Sample-S1.012.xml");
        assert_eq!(update_file_name(&reference, 1234), "Sample-S1.1234.xml");
    }
}
