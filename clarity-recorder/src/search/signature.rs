//! Canonical, order-independent identity of a parametrized search

use clarity_core::api::SearchParams;
use clarity_core::entity::Entity;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::RecordingError;

/// Filename template for search recordings; `{}` is the storage key
pub const SEARCH_FILE_PATTERN: &str = "search_{}.xml";

/// The 32-bit polynomial string hash used for every component of a
/// signature: `h = 31 * h + unit` over UTF-16 code units, wrapping.
///
/// Recordings already on disk are named after this value, so it must not
/// change.
pub fn string_hash(s: &str) -> i32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Hash of one parameter: its name XOR each of its values
pub fn term_hash<'a>(param: &str, values: impl IntoIterator<Item = &'a str>) -> i32 {
    values
        .into_iter()
        .fold(string_hash(param), |h, v| h ^ string_hash(v))
}

/// The entity type searched for plus every parameter with its value set.
///
/// Parameter order and value order carry no meaning: two searches that differ
/// only in the order things were supplied compare equal and hash equal.
///
/// The hash combines components with XOR so that it is order-independent.
/// XOR also lets distinct signatures share a hash, e.g. swapping the values
/// of two single-valued parameters. Recording detects that case by comparing
/// the stored signature and overwrites the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSignature {
    /// Qualified name of the entity type searched for
    #[serde(rename = "entity")]
    entity_type: String,

    /// Parameter name to its deduplicated, non-empty values
    #[serde(rename = "term")]
    terms: BTreeMap<String, BTreeSet<String>>,
}

impl SearchSignature {
    /// Build the canonical form of a search for `entity_type`.
    ///
    /// Missing and empty values are dropped; duplicates collapse. A parameter
    /// whose values are all dropped is kept with an empty set.
    pub fn build(
        entity_type: impl Into<String>,
        params: &SearchParams,
    ) -> Result<Self, RecordingError> {
        let mut terms = BTreeMap::new();

        for (param, value) in params {
            if param.trim().is_empty() {
                return Err(RecordingError::InvalidSearchTerm(
                    "parameter name cannot be empty".to_string(),
                ));
            }

            let values: BTreeSet<String> = value
                .values()
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect();

            terms.insert(param.clone(), values);
        }

        Ok(Self {
            entity_type: entity_type.into(),
            terms,
        })
    }

    /// Build the signature of a search for entities of type `E`
    pub fn for_entity<E: Entity>(params: &SearchParams) -> Result<Self, RecordingError> {
        Self::build(E::entity_type().qualified_name, params)
    }

    /// Qualified name of the entity type searched for
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Short name of the entity type searched for
    pub fn short_entity_type(&self) -> &str {
        self.entity_type
            .rsplit('.')
            .next()
            .unwrap_or(&self.entity_type)
    }

    /// The values recorded for a parameter
    pub fn values(&self, param: &str) -> Option<&BTreeSet<String>> {
        self.terms.get(param)
    }

    /// Number of parameters in the search
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The order-independent hash of the whole signature
    pub fn signature_hash(&self) -> i32 {
        self.terms.iter().fold(string_hash(&self.entity_type), |h, (param, values)| {
            h ^ term_hash(param, values.iter().map(String::as_str))
        })
    }

    /// Lowercase hex of the hash, as embedded in the recording's filename
    pub fn storage_key(&self) -> String {
        format!("{:x}", self.signature_hash() as u32)
    }

    /// Name of the file a search with this signature is recorded in
    pub fn file_name(&self) -> String {
        SEARCH_FILE_PATTERN.replace("{}", &self.storage_key())
    }
}

impl Hash for SearchSignature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.signature_hash());
    }
}

impl fmt::Display for SearchSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SearchTerms[entity={}", self.short_entity_type())?;
        for (param, values) in &self.terms {
            let joined: Vec<&str> = values.iter().map(String::as_str).collect();
            write!(f, ",{}={}", param, joined.join(","))?;
        }
        f.write_str("]")
    }
}
