//! A search signature paired with the links it returned

use clarity_core::entity::{Entity, EntityRef, Link};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::SearchSignature;
use crate::error::RecordingError;

/// The results of one search, as stored in a `search_<key>.xml` file
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct RecordedSearch<E> {
    #[serde(rename = "terms")]
    signature: SearchSignature,

    #[serde(default)]
    results: Vec<Link<E>>,
}

impl<E: Entity> RecordedSearch<E> {
    pub fn new(signature: SearchSignature, results: Vec<Link<E>>) -> Self {
        Self { signature, results }
    }

    pub fn signature(&self) -> &SearchSignature {
        &self.signature
    }

    pub fn results(&self) -> &[Link<E>] {
        &self.results
    }

    pub fn into_results(self) -> Vec<Link<E>> {
        self.results
    }

    /// Name of the file this search is recorded in
    pub fn file_name(&self) -> String {
        self.signature.file_name()
    }

    /// Merge another recording of the same search into this one.
    ///
    /// Results are unioned by entity identity; for a link present in both,
    /// the one from `other` is kept. Existing results keep their position and
    /// new ones are appended.
    ///
    /// Returns `true` only when the set of entities changed, so an identical
    /// re-recording does not rewrite the file.
    ///
    /// # Errors
    ///
    /// Fails with [`RecordingError::MismatchedEntityType`] when the two
    /// recordings are for different entity types.
    pub fn merge(&mut self, other: &RecordedSearch<E>) -> Result<bool, RecordingError> {
        if self.signature.entity_type() != other.signature.entity_type() {
            return Err(RecordingError::MismatchedEntityType {
                this: self.signature.short_entity_type().to_string(),
                other: other.signature.short_entity_type().to_string(),
            });
        }

        if other.results.is_empty() {
            return Ok(false);
        }

        if self.results.is_empty() {
            self.results = other.results.clone();
            return Ok(true);
        }

        let before: HashSet<EntityRef> = self.results.iter().map(merge_key).collect();

        let mut index: HashMap<EntityRef, usize> = HashMap::new();
        let mut merged: Vec<Link<E>> = Vec::with_capacity(self.results.len() + other.results.len());

        for link in self.results.iter().chain(other.results.iter()) {
            let key = merge_key(link);
            match index.get(&key) {
                Some(&position) => merged[position] = link.clone(),
                None => {
                    index.insert(key, merged.len());
                    merged.push(link.clone());
                }
            }
        }

        let changed = index.len() != before.len();
        self.results = merged;
        Ok(changed)
    }
}

/// Identity of a result link; links with no usable id fall back to their path
fn merge_key<E: Entity>(link: &Link<E>) -> EntityRef {
    EntityRef::of_link(link)
        .unwrap_or_else(|_| EntityRef::new(E::entity_type().name, link.uri.path()))
}

impl<E> Clone for RecordedSearch<E> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            results: self.results.clone(),
        }
    }
}

impl<E> std::fmt::Debug for RecordedSearch<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordedSearch")
            .field("signature", &self.signature.to_string())
            .field("results", &self.results.len())
            .finish()
    }
}
