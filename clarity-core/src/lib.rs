//! # Clarity Core
//!
//! Contracts shared by the Clarity LIMS client and the layers composed around
//! it:
//! - Entity metadata and identity derived from locators
//! - Typed links returned by searches and listings
//! - The [`ClarityApi`](api::ClarityApi) call surface that transports and
//!   interceptors implement
//! - A pluggable [`Codec`](codec::Codec) for persisting records
//! - A static registry mapping entity types to their listing containers
//!
//! ## Example
//!
//! ```rust,ignore
//! use clarity_core::prelude::*;
//!
//! async fn names<A: ClarityApi>(api: &A) -> Result<Vec<String>> {
//!     let params = search_params([("projectlimsid", ParamValue::from(["COH605", "SER1015"]))]);
//!     let links = api.find::<Sample>(&params).await?;
//!     let samples = api.load_all(&links).await?;
//!     Ok(samples.into_iter().map(|s| s.name).collect())
//! }
//! ```

pub mod api;
pub mod codec;
pub mod entity;
pub mod error;
pub mod model;
pub mod registry;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{ClarityApi, ParamValue, SearchParams, search_params};
    pub use crate::codec::{Codec, CodecError, JsonCodec};
    pub use crate::entity::{Entity, EntityRef, EntityType, Link};
    pub use crate::error::{ClarityError, Result};
    pub use crate::model::{Actions, Artifact, Container, Project, Researcher, Sample};
    pub use crate::registry::{EntityRegistry, ListingType};
}
