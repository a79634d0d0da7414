//! Playback layer
//!
//! [`Player`] answers calls from the files a [`Recorder`](crate::record::Recorder)
//! wrote, without ever reaching the server. Calls that would change the
//! server are blocked, except that updates can be captured as version files
//! for tests to inspect.

use async_trait::async_trait;
use clarity_core::api::{ClarityApi, SearchParams};
use clarity_core::codec::{Codec, JsonCodec};
use clarity_core::entity::{Entity, EntityRef, Link};
use clarity_core::error::{ClarityError, Result};
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

/// Serves recorded exchanges in place of the server
pub struct Player<C = JsonCodec> {
    store: FileStore<C>,
    updates: Option<UpdateJournal<C>>,
    registry: Arc<EntityRegistry>,
    fail_on_missing_search: bool,
}

impl Player<JsonCodec> {
    /// Play back from `message_directory` with the default codec
    pub fn new(message_directory: impl Into<PathBuf>) -> Self {
        Self::with_codec(message_directory, Arc::new(JsonCodec))
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        let mut player = Self::new(&config.message_directory)
            .with_fail_on_missing_search(config.fail_on_missing_search);
        if let Some(updates) = &config.updates_directory {
            player = player.with_updates_directory(updates);
        }
        player
    }
}

impl<C: Codec> Player<C> {
    pub fn with_codec(message_directory: impl Into<PathBuf>, codec: Arc<C>) -> Self {
        Self {
            store: FileStore::new(message_directory, codec),
            updates: None,
            registry: EntityRegistry::standard(),
            fail_on_missing_search: false,
        }
    }

    /// Capture updates as version files in `directory`
    pub fn with_updates_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.updates = Some(UpdateJournal::new(directory, Arc::clone(self.store.codec())));
        self
    }

    /// Fail searches that were never recorded instead of returning nothing
    pub fn with_fail_on_missing_search(mut self, fail: bool) -> Self {
        self.fail_on_missing_search = fail;
        self
    }

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

    /// Read a recording, treating an unreadable file the same as a missing one.
    fn read_recording<T: serde::de::DeserializeOwned>(&self, file: &str) -> Result<Option<T>> {
        match self.store.read::<T>(file) {
            Ok(found) => Ok(found),
            Err(e @ RecordingError::CorruptRecording { .. }) => {
                tracing::warn!("Ignoring unreadable recording: {}", e);
                Err(ClarityError::NoRecording {
                    file: file.to_string(),
                    reason: e.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn no_recording(&self, file: &str) -> ClarityError {
        ClarityError::NoRecording {
            file: file.to_string(),
            reason: format!("not found in {}", self.store.directory().display()),
        }
    }

    fn blocked(&self, call: &str) {
        tracing::warn!("Call to {} blocked.", call);
    }

    fn capture_update<E: Entity>(&self, entity: &E) {
        match &self.updates {
            Some(journal) => {
                if let Err(e) = journal.record(entity) {
                    e.log(&format!("record update of {}", E::entity_type().name));
                }
            }
            None => tracing::warn!(
                "No updates directory set. Update of {} dropped.",
                E::entity_type().name
            ),
        }
    }
}

#[async_trait]
impl<C: Codec> ClarityApi for Player<C> {
    async fn retrieve<E: Entity>(&self, uri: &Url) -> Result<E> {
        let reference = EntityRef::from_uri(E::entity_type(), uri)?;
        let file = entity_file_name(&reference);

        tracing::debug!(%reference, "Playing back entity");

        self.read_recording::<E>(&file)?
            .ok_or_else(|| self.no_recording(&file))
    }

    async fn find<E: Entity>(&self, params: &SearchParams) -> Result<Vec<Link<E>>> {
        let signature = SearchSignature::for_entity::<E>(params)?;
        let file = signature.file_name();

        // An unreadable search recording counts as absent, so the
        // missing-search setting decides the outcome.
        let recorded = match self.store.read::<RecordedSearch<E>>(&file) {
            Ok(recorded) => recorded,
            Err(e @ RecordingError::CorruptRecording { .. }) => {
                tracing::warn!("Ignoring unreadable search recording: {}", e);
                None
            }
            Err(e) => return Err(e.into()),
        };

        // Only the key is compared: a recording that collided with another
        // search is returned as is.
        match recorded {
            Some(search) => Ok(search.into_results()),
            None if self.fail_on_missing_search => {
                Err(ClarityError::NoRecording {
                    file,
                    reason: format!("no search recorded for {}", signature),
                })
            }
            None => {
                tracing::debug!("No recording of {}; returning no results", signature);
                Ok(Vec::new())
            }
        }
    }

    async fn list_all<E: Entity>(&self) -> Result<Vec<Link<E>>> {
        let entity_type = E::entity_type();

        let Some(listing) = self.registry.listing_for(entity_type) else {
            tracing::warn!("{} is not returned by any known listing.", entity_type.qualified_name);
            return Ok(Vec::new());
        };

        let file = listing_file_name(listing);
        let snapshot = self
            .read_recording::<ListingSnapshot<E>>(&file)?
            .ok_or_else(|| self.no_recording(&file))?;

        Ok(snapshot.links)
    }

    async fn list_some<E: Entity>(&self, _offset: usize, _count: usize) -> Result<Vec<Link<E>>> {
        // The recorded listing is returned whole, whatever range is asked for.
        self.list_all().await
    }

    async fn update<E: Entity>(&self, entity: &mut E) -> Result<()> {
        self.capture_update(&*entity);
        Ok(())
    }

    async fn update_all<E: Entity>(&self, entities: &mut [E]) -> Result<()> {
        for entity in entities.iter() {
            self.capture_update(entity);
        }
        Ok(())
    }

    async fn create<E: Entity>(&self, _entity: &mut E) -> Result<()> {
        self.blocked(&format!("create {}", E::entity_type().name));
        Ok(())
    }

    async fn delete<E: Entity>(&self, _entity: &E) -> Result<()> {
        self.blocked(&format!("delete {}", E::entity_type().name));
        Ok(())
    }

    async fn upload_file(&self, attach_to: &Url, path: &Path) -> Result<()> {
        self.blocked(&format!("upload {} to {}", path.display(), attach_to));
        Ok(())
    }
}
