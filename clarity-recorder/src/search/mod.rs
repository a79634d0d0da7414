//! Search identity and recorded search results
//!
//! A search call is identified by a [`SearchSignature`]: the entity type plus
//! the parameter sets, compared and hashed without regard to order. The hash
//! names the file the [`RecordedSearch`] is kept in, and recordings of the
//! same search made at different times are merged.

mod recorded;
mod signature;

pub use recorded::RecordedSearch;
pub use signature::{SEARCH_FILE_PATTERN, SearchSignature, string_hash, term_hash};
