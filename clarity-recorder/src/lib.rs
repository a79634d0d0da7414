//! Clarity Recorder - record and playback of Clarity LIMS exchanges
//!
//! Lets client code be tested against a fixed set of server responses without
//! a running server. Run once against a real server with a [`Recorder`] in
//! front of the transport to capture what comes back, then run the tests with
//! a [`Player`] answering from those captures.
//!
//! ## Example
//!
//! ```rust,ignore
//! use clarity_core::prelude::*;
//! use clarity_recorder::{Harness, HarnessConfig};
//!
//! let config = HarnessConfig::load()?;
//! let api = Harness::from_config(transport, &config);
//!
//! let links = api.find::<Sample>(&search_params([("name", "34_a")])).await?;
//! let samples = api.load_all(&links).await?;
//! ```
//!
//! Searches are filed by a hash of the entity type and parameters, so a
//! recorded search is found again whatever order the parameters are given in.
//! Writes are never sent during playback; updates can be captured as numbered
//! versions in a separate directory.

pub mod config;
pub mod error;
pub mod harness;
pub mod playback;
pub mod record;
pub mod search;
pub mod snapshot;
pub mod store;
pub mod versions;

pub use config::{HarnessConfig, HarnessMode};
pub use error::RecordingError;
pub use harness::Harness;
pub use playback::Player;
pub use record::Recorder;
pub use search::{RecordedSearch, SearchSignature};
pub use versions::{AllocatedVersion, UpdateJournal, VersionAllocator};
