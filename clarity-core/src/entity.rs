//! Entity metadata, typed links and entity identity
//!
//! Every record the server hands out is addressed by a URI. The last path
//! segment of that URI (after dropping any declared sub-resource such as
//! `/actions`) is the entity's id, and together with the short type name it
//! forms an [`EntityRef`]: the key used for merging search results and for
//! naming snapshot files.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use url::Url;

use crate::error::{ClarityError, Result};

/// Declared metadata for one kind of remote entity
#[derive(Debug)]
pub struct EntityType {
    /// Short name, used as the snapshot filename prefix
    pub name: &'static str,

    /// Fully qualified name, hashed into search signatures
    pub qualified_name: &'static str,

    /// First path element under the API root (`samples`, `steps`, ...)
    pub uri_section: &'static str,

    /// Sub-resource appended after the id, if the entity lives below one
    pub uri_subsection: Option<&'static str>,
}

impl EntityType {
    /// Declare an entity type that is addressed directly by its id
    pub const fn new(
        name: &'static str,
        qualified_name: &'static str,
        uri_section: &'static str,
    ) -> Self {
        Self {
            name,
            qualified_name,
            uri_section,
            uri_subsection: None,
        }
    }

    /// Declare the sub-resource suffix following the id in this type's URIs
    pub const fn with_subsection(mut self, subsection: &'static str) -> Self {
        self.uri_subsection = Some(subsection);
        self
    }

    /// Extract the id from a URI path, skipping the declared subsection
    pub fn id_from_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        let mut path = path.trim_end_matches('/');

        if let Some(subsection) = self.uri_subsection {
            if let Some(stripped) = path
                .strip_suffix(subsection)
                .and_then(|p| p.strip_suffix('/'))
            {
                path = stripped;
            }
        }

        match path.rsplit('/').next() {
            Some(id) if !id.is_empty() => Some(id),
            _ => None,
        }
    }

    /// Extract the id from a full locator
    pub fn id_from_uri(&self, uri: &Url) -> Result<String> {
        self.id_from_path(uri.path())
            .map(str::to_string)
            .ok_or_else(|| {
                tracing::debug!(uri = %uri, entity = self.name, "No id in locator");
                ClarityError::InvalidUri(format!("{} has no {} id", uri, self.name))
            })
    }
}

impl PartialEq for EntityType {
    fn eq(&self, other: &Self) -> bool {
        self.qualified_name == other.qualified_name
    }
}

impl Eq for EntityType {}

impl Hash for EntityType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.qualified_name.hash(state);
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A record returned by the remote service
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Metadata for this kind of record
    fn entity_type() -> &'static EntityType;

    /// Where the record lives on the server, once it has been created there
    fn uri(&self) -> Option<&Url>;

    /// The server's own identifier, when the payload carries one
    fn limsid(&self) -> Option<&str> {
        None
    }
}

/// A typed locator for an entity of type `E`
#[derive(Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Link<E> {
    /// Full URI of the entity
    pub uri: Url,

    /// LIMS id as reported alongside the link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limsid: Option<String>,

    #[serde(skip)]
    entity: PhantomData<fn() -> E>,
}

impl<E> Link<E> {
    /// Create a link to the entity at `uri`
    pub fn new(uri: Url) -> Self {
        Self {
            uri,
            limsid: None,
            entity: PhantomData,
        }
    }

    /// Parse a link from a string locator
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = Url::parse(uri).map_err(|e| ClarityError::InvalidUri(format!("{uri}: {e}")))?;
        Ok(Self::new(uri))
    }

    /// Attach the LIMS id reported with the link
    pub fn with_limsid(mut self, limsid: impl Into<String>) -> Self {
        self.limsid = Some(limsid.into());
        self
    }
}

impl<E: Entity> Link<E> {
    /// Link to an entity that already has a URI
    pub fn to(entity: &E) -> Result<Self> {
        let uri = entity.uri().cloned().ok_or_else(|| {
            ClarityError::InvalidArgument(format!(
                "{} has no URI to link to",
                E::entity_type().name
            ))
        })?;

        let mut link = Self::new(uri);
        link.limsid = entity.limsid().map(str::to_string);
        Ok(link)
    }
}

impl<E> Clone for Link<E> {
    fn clone(&self) -> Self {
        Self {
            uri: self.uri.clone(),
            limsid: self.limsid.clone(),
            entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for Link<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Link")
            .field("uri", &self.uri.as_str())
            .field("limsid", &self.limsid)
            .finish()
    }
}

impl<E> PartialEq for Link<E> {
    fn eq(&self, other: &Self) -> bool {
        self.uri == other.uri && self.limsid == other.limsid
    }
}

impl<E> Eq for Link<E> {}

/// Identity of a remote entity: short type name plus the id from its locator
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef {
    /// Short entity type name, e.g. `Sample`
    pub type_name: String,

    /// Id taken from the entity's locator
    pub id: String,
}

impl EntityRef {
    /// Identity from a type name and an id that are already known
    pub fn new(type_name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id: id.into(),
        }
    }

    /// Identity of whatever `uri` points at, read as an entity of `entity_type`
    pub fn from_uri(entity_type: &EntityType, uri: &Url) -> Result<Self> {
        Ok(Self::new(entity_type.name, entity_type.id_from_uri(uri)?))
    }

    /// Identity of the entity a link points at
    pub fn of_link<E: Entity>(link: &Link<E>) -> Result<Self> {
        Self::from_uri(E::entity_type(), &link.uri)
    }

    /// Identity of a loaded entity.
    ///
    /// The URI is authoritative so that a record fetched by locator and the
    /// same record written back after an update land on the same id. The
    /// entity's own LIMS id is only used for records that have no URI yet.
    pub fn of_entity<E: Entity>(entity: &E) -> Result<Self> {
        let entity_type = E::entity_type();

        if let Some(uri) = entity.uri() {
            return Self::from_uri(entity_type, uri);
        }

        entity
            .limsid()
            .map(|id| Self::new(entity_type.name, id))
            .ok_or_else(|| {
                ClarityError::InvalidArgument(format!(
                    "{} has neither a URI nor a LIMS id",
                    entity_type.name
                ))
            })
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.type_name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Actions, Artifact, Sample};

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_id_is_last_path_segment() {
        let uri = url("https://lims.example.org/api/v2/samples/GAO9862A146");
        let reference = EntityRef::from_uri(Sample::entity_type(), &uri).unwrap();
        assert_eq!(reference, EntityRef::new("Sample", "GAO9862A146"));
        assert_eq!(reference.to_string(), "Sample-GAO9862A146");
    }

    #[test]
    fn test_query_and_trailing_slash_are_ignored() {
        let a = url("https://lims.example.org/api/v2/artifacts/2-5898189?state=1234");
        let b = url("http://other-host:8080/api/v2/artifacts/2-5898189/");
        assert_eq!(
            EntityRef::from_uri(Artifact::entity_type(), &a).unwrap(),
            EntityRef::from_uri(Artifact::entity_type(), &b).unwrap()
        );
    }

    #[test]
    fn test_subsection_is_stripped() {
        let uri = url("https://lims.example.org/api/v2/steps/24-1234/actions");
        let id = Actions::entity_type().id_from_uri(&uri).unwrap();
        assert_eq!(id, "24-1234");

        // Without the suffix the last segment is already the id.
        let bare = url("https://lims.example.org/api/v2/steps/24-1234");
        assert_eq!(Actions::entity_type().id_from_uri(&bare).unwrap(), "24-1234");
    }

    #[test]
    fn test_root_uri_has_no_id() {
        let uri = url("https://lims.example.org/");
        let result = Sample::entity_type().id_from_uri(&uri);
        assert!(matches!(result, Err(ClarityError::InvalidUri(_))));
    }

    #[test]
    fn test_entity_without_uri_falls_back_to_limsid() {
        let mut sample = Sample::new("34_a");
        sample.limsid = Some("GAO9862A146".to_string());
        let reference = EntityRef::of_entity(&sample).unwrap();
        assert_eq!(reference.id, "GAO9862A146");

        let anonymous = Sample::new("no identity");
        assert!(EntityRef::of_entity(&anonymous).is_err());
    }

    #[test]
    fn test_link_equality_ignores_type_parameter_bounds() {
        let a: Link<Sample> = Link::parse("https://lims.example.org/api/v2/samples/S1").unwrap();
        let b = a.clone().with_limsid("S1");
        assert_ne!(a, b);
        assert_eq!(EntityRef::of_link(&a).unwrap(), EntityRef::of_link(&b).unwrap());
    }
}
