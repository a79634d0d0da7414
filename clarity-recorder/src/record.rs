//! Recording layer
//!
//! [`Recorder`] wraps the transport and lets every call through. Whatever a
//! successful call returns is saved in the message directory so that
//! [`Player`](crate::playback::Player) can answer the same call later:
//!
//! - fetched entities overwrite `<Type>-<id>.xml`
//! - search results are merged into `search_<hex>.xml`
//! - listings overwrite `<Listing>.xml`
//! - updated entities are added as `<Type>-<id>.<nnn>.xml` in the updates
//!   directory, when one is configured
//!
//! Saving never changes the outcome of the call: failures are logged and the
//! transport's answer is returned as is.

use async_trait::async_trait;
use clarity_core::api::{ClarityApi, SearchParams};
use clarity_core::codec::{Codec, JsonCodec};
use clarity_core::entity::{Entity, EntityRef, Link};
use clarity_core::error::Result;
use clarity_core::registry::EntityRegistry;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

use crate::config::HarnessConfig;
use crate::error::RecordingError;
use crate::search::{RecordedSearch, SearchSignature};
use crate::snapshot::{ListingSnapshot, entity_file_name, listing_file_name};
use crate::store::FileStore;
use crate::versions::UpdateJournal;

/// Saves what the wrapped transport returns
pub struct Recorder<A, C = JsonCodec> {
    inner: A,
    store: FileStore<C>,
    updates: Option<UpdateJournal<C>>,
    registry: Arc<EntityRegistry>,
    record_searches_without_results: bool,
}

impl<A: ClarityApi> Recorder<A, JsonCodec> {
    /// Record into `message_directory` with the default codec
    pub fn new(inner: A, message_directory: impl Into<PathBuf>) -> Self {
        Self::with_codec(inner, message_directory, Arc::new(JsonCodec))
    }

    /// Build from harness configuration
    pub fn from_config(inner: A, config: &HarnessConfig) -> Self {
        let mut recorder = Self::new(inner, &config.message_directory)
            .with_record_searches_without_results(config.record_searches_without_results);
        if let Some(updates) = &config.updates_directory {
            recorder = recorder.with_updates_directory(updates);
        }
        recorder
    }
}

impl<A: ClarityApi, C: Codec> Recorder<A, C> {
    pub fn with_codec(inner: A, message_directory: impl Into<PathBuf>, codec: Arc<C>) -> Self {
        Self {
            inner,
            store: FileStore::new(message_directory, codec),
            updates: None,
            registry: EntityRegistry::standard(),
            record_searches_without_results: true,
        }
    }

    /// Record versions of updated entities into `directory`
    pub fn with_updates_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.updates = Some(UpdateJournal::new(directory, Arc::clone(self.store.codec())));
        self
    }

    pub fn with_record_searches_without_results(mut self, record: bool) -> Self {
        self.record_searches_without_results = record;
        self
    }

    /// Use a registry other than the standard one
    pub fn with_registry(mut self, registry: Arc<EntityRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn message_directory(&self) -> &Path {
        self.store.directory()
    }

    pub fn updates_directory(&self) -> Option<&Path> {
        self.updates.as_ref().map(UpdateJournal::directory)
    }

    /// The wrapped transport
    pub fn inner(&self) -> &A {
        &self.inner
    }

    fn write_entity<E: Entity>(&self, entity: &E) {
        let result = EntityRef::of_entity(entity)
            .map_err(RecordingError::from)
            .and_then(|reference| self.store.write(&entity_file_name(&reference), entity));

        if let Err(e) = result {
            e.log(&format!("record {}", E::entity_type().name));
        }
    }

    fn write_search<E: Entity>(&self, signature: SearchSignature, results: &[Link<E>]) {
        if results.is_empty() && !self.record_searches_without_results {
            return;
        }

        let search = RecordedSearch::new(signature, results.to_vec());
        let file = search.file_name();

        let result = self
            .store
            .with_lock(&file, || self.merge_and_write_search(search, &file));

        if let Err(e) = result {
            e.log("record search");
        }
    }

    /// Merge `search` with any recording already in `file` and write the
    /// outcome back when it differs from what is stored.
    fn merge_and_write_search<E: Entity>(
        &self,
        search: RecordedSearch<E>,
        file: &str,
    ) -> std::result::Result<(), RecordingError> {
        let previous = match self.store.read::<RecordedSearch<E>>(file) {
            Ok(previous) => previous,
            Err(e @ RecordingError::CorruptRecording { .. }) => {
                tracing::warn!("Could not reload previous search: {}", e);
                None
            }
            Err(e) => return Err(e),
        };

        let to_write = match previous {
            None => search,
            Some(previous) if previous.signature() != search.signature() => {
                let collision = RecordingError::SignatureCollision {
                    file: file.to_string(),
                    new: search.signature().to_string(),
                    existing: previous.signature().to_string(),
                };
                tracing::error!("Have two incompatible searches that reduce to the same hash: {}", collision);
                search
            }
            Some(mut previous) => {
                if !previous.merge(&search)? {
                    tracing::debug!(file, "Recorded search unchanged");
                    return Ok(());
                }
                previous
            }
        };

        self.store.write(file, &to_write)
    }

    fn write_listing<E: Entity>(&self, links: &[Link<E>]) {
        let entity_type = E::entity_type();

        let Some(listing) = self.registry.listing_for(entity_type) else {
            tracing::warn!("{} is not returned by any known listing.", entity_type.qualified_name);
            return;
        };

        let snapshot = ListingSnapshot::new(listing, links.to_vec());
        if let Err(e) = self.store.write(&listing_file_name(listing), &snapshot) {
            e.log(&format!("record list of {}", entity_type.name));
        }
    }

    fn write_update<E: Entity>(&self, entity: &E) {
        match &self.updates {
            Some(journal) => {
                if let Err(e) = journal.record(entity) {
                    e.log(&format!("record update of {}", E::entity_type().name));
                }
            }
            None => tracing::warn!(
                "No updates directory set. Update of {} passed through without being recorded.",
                E::entity_type().name
            ),
        }
    }
}

#[async_trait]
impl<A: ClarityApi, C: Codec> ClarityApi for Recorder<A, C> {
    async fn retrieve<E: Entity>(&self, uri: &Url) -> Result<E> {
        let entity = self.inner.retrieve::<E>(uri).await?;
        self.write_entity(&entity);
        Ok(entity)
    }

    async fn load<E: Entity>(&self, link: &Link<E>) -> Result<E> {
        let entity = self.inner.load(link).await?;
        self.write_entity(&entity);
        Ok(entity)
    }

    async fn load_all<E: Entity>(&self, links: &[Link<E>]) -> Result<Vec<E>> {
        let entities = self.inner.load_all(links).await?;
        for entity in &entities {
            self.write_entity(entity);
        }
        Ok(entities)
    }

    async fn find<E: Entity>(&self, params: &SearchParams) -> Result<Vec<Link<E>>> {
        let results = self.inner.find::<E>(params).await?;

        match SearchSignature::for_entity::<E>(params) {
            Ok(signature) => self.write_search(signature, &results),
            Err(e) => e.log("record search"),
        }

        Ok(results)
    }

    async fn list_all<E: Entity>(&self) -> Result<Vec<Link<E>>> {
        let links = self.inner.list_all::<E>().await?;
        self.write_listing(&links);
        Ok(links)
    }

    async fn list_some<E: Entity>(&self, offset: usize, count: usize) -> Result<Vec<Link<E>>> {
        // Whatever range was asked for replaces the stored listing.
        let links = self.inner.list_some::<E>(offset, count).await?;
        self.write_listing(&links);
        Ok(links)
    }

    async fn update<E: Entity>(&self, entity: &mut E) -> Result<()> {
        self.inner.update(entity).await?;
        self.write_update(&*entity);
        Ok(())
    }

    async fn update_all<E: Entity>(&self, entities: &mut [E]) -> Result<()> {
        self.inner.update_all(entities).await?;
        for entity in entities.iter() {
            self.write_update(entity);
        }
        Ok(())
    }

    async fn create<E: Entity>(&self, entity: &mut E) -> Result<()> {
        self.inner.create(entity).await
    }

    async fn delete<E: Entity>(&self, entity: &E) -> Result<()> {
        self.inner.delete(entity).await
    }

    async fn upload_file(&self, attach_to: &Url, path: &Path) -> Result<()> {
        self.inner.upload_file(attach_to, path).await
    }
}
