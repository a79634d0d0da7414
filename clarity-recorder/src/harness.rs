//! Mode selection
//!
//! The layer in front of the transport is picked once, when the client is
//! built. [`Harness`] holds whichever layer the configuration asks for and
//! forwards every call to it.

use async_trait::async_trait;
use clarity_core::api::{ClarityApi, SearchParams};
use clarity_core::codec::{Codec, JsonCodec};
use clarity_core::entity::{Entity, Link};
use clarity_core::error::Result;
use std::path::Path;
use url::Url;

use crate::config::{HarnessConfig, HarnessMode};
use crate::playback::Player;
use crate::record::Recorder;

/// The transport, optionally wrapped in recording or replaced by playback
pub enum Harness<A, C = JsonCodec> {
    Live(A),
    Recording(Recorder<A, C>),
    Playback(Player<C>),
}

impl<A: ClarityApi> Harness<A, JsonCodec> {
    /// Compose the layer named by `config.mode` around `api`.
    ///
    /// In playback mode `api` is dropped; nothing is ever sent to it.
    pub fn from_config(api: A, config: &HarnessConfig) -> Self {
        tracing::info!(
            mode = ?config.mode,
            directory = %config.message_directory.display(),
            "Composing Clarity client"
        );

        match config.mode {
            HarnessMode::Live => Harness::Live(api),
            HarnessMode::Record => Harness::Recording(Recorder::from_config(api, config)),
            HarnessMode::Playback => Harness::Playback(Player::from_config(config)),
        }
    }
}

impl<A, C> Harness<A, C> {
    pub fn mode(&self) -> HarnessMode {
        match self {
            Harness::Live(_) => HarnessMode::Live,
            Harness::Recording(_) => HarnessMode::Record,
            Harness::Playback(_) => HarnessMode::Playback,
        }
    }
}

#[async_trait]
impl<A: ClarityApi, C: Codec> ClarityApi for Harness<A, C> {
    async fn retrieve<E: Entity>(&self, uri: &Url) -> Result<E> {
        match self {
            Harness::Live(api) => api.retrieve(uri).await,
            Harness::Recording(api) => api.retrieve(uri).await,
            Harness::Playback(api) => api.retrieve(uri).await,
        }
    }

    async fn load<E: Entity>(&self, link: &Link<E>) -> Result<E> {
        match self {
            Harness::Live(api) => api.load(link).await,
            Harness::Recording(api) => api.load(link).await,
            Harness::Playback(api) => api.load(link).await,
        }
    }

    async fn load_all<E: Entity>(&self, links: &[Link<E>]) -> Result<Vec<E>> {
        match self {
            Harness::Live(api) => api.load_all(links).await,
            Harness::Recording(api) => api.load_all(links).await,
            Harness::Playback(api) => api.load_all(links).await,
        }
    }

    async fn find<E: Entity>(&self, params: &SearchParams) -> Result<Vec<Link<E>>> {
        match self {
            Harness::Live(api) => api.find(params).await,
            Harness::Recording(api) => api.find(params).await,
            Harness::Playback(api) => api.find(params).await,
        }
    }

    async fn list_all<E: Entity>(&self) -> Result<Vec<Link<E>>> {
        match self {
            Harness::Live(api) => api.list_all().await,
            Harness::Recording(api) => api.list_all().await,
            Harness::Playback(api) => api.list_all().await,
        }
    }

    async fn list_some<E: Entity>(&self, offset: usize, count: usize) -> Result<Vec<Link<E>>> {
        match self {
            Harness::Live(api) => api.list_some(offset, count).await,
            Harness::Recording(api) => api.list_some(offset, count).await,
            Harness::Playback(api) => api.list_some(offset, count).await,
        }
    }

    async fn update<E: Entity>(&self, entity: &mut E) -> Result<()> {
        match self {
            Harness::Live(api) => api.update(entity).await,
            Harness::Recording(api) => api.update(entity).await,
            Harness::Playback(api) => api.update(entity).await,
        }
    }

    async fn update_all<E: Entity>(&self, entities: &mut [E]) -> Result<()> {
        match self {
            Harness::Live(api) => api.update_all(entities).await,
            Harness::Recording(api) => api.update_all(entities).await,
            Harness::Playback(api) => api.update_all(entities).await,
        }
    }

    async fn create<E: Entity>(&self, entity: &mut E) -> Result<()> {
        match self {
            Harness::Live(api) => api.create(entity).await,
            Harness::Recording(api) => api.create(entity).await,
            Harness::Playback(api) => api.create(entity).await,
        }
    }

    async fn delete<E: Entity>(&self, entity: &E) -> Result<()> {
        match self {
            Harness::Live(api) => api.delete(entity).await,
            Harness::Recording(api) => api.delete(entity).await,
            Harness::Playback(api) => api.delete(entity).await,
        }
    }

    async fn upload_file(&self, attach_to: &Url, path: &Path) -> Result<()> {
        match self {
            Harness::Live(api) => api.upload_file(attach_to, path).await,
            Harness::Recording(api) => api.upload_file(attach_to, path).await,
            Harness::Playback(api) => api.upload_file(attach_to, path).await,
        }
    }
}
