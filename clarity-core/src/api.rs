//! The call surface of the Clarity client
//!
//! [`ClarityApi`] is implemented by the live transport and by every layer
//! composed in front of it (recording, playback, caching). Layers wrap the
//! next implementation and are chosen when the client is constructed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use url::Url;

use crate::entity::{Entity, Link};
use crate::error::Result;

/// Named search parameters as passed to [`ClarityApi::find`]
pub type SearchParams = HashMap<String, ParamValue>;

/// Build [`SearchParams`] from name/value pairs
pub fn search_params<K, V, I>(pairs: I) -> SearchParams
where
    K: Into<String>,
    V: Into<ParamValue>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// The value(s) given for one search parameter.
///
/// Values are kept in their string form; missing values are kept as `None`
/// so that consumers can decide how to treat them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamValue(Vec<Option<String>>);

impl ParamValue {
    /// A parameter given with no value at all
    pub fn none() -> Self {
        Self(Vec::new())
    }

    /// Build from optional values
    pub fn from_optional<T, I>(values: I) -> Self
    where
        T: ToString,
        I: IntoIterator<Item = Option<T>>,
    {
        Self(
            values
                .into_iter()
                .map(|v| v.map(|v| v.to_string()))
                .collect(),
        )
    }

    /// All values as given, including missing ones
    pub fn raw(&self) -> &[Option<String>] {
        &self.0
    }

    /// The values that are present
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|v| v.as_deref())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self(vec![Some(value.to_string())])
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self(vec![Some(value)])
    }
}

impl From<&String> for ParamValue {
    fn from(value: &String) -> Self {
        Self(vec![Some(value.clone())])
    }
}

macro_rules! scalar_param {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self(vec![Some(value.to_string())])
                }
            }
        )*
    };
}

scalar_param!(bool, i32, i64, u32, u64, usize, f64);

impl<T: ToString> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        Self(vec![value.map(|v| v.to_string())])
    }
}

impl<T: ToString> From<Vec<T>> for ParamValue {
    fn from(values: Vec<T>) -> Self {
        Self(values.iter().map(|v| Some(v.to_string())).collect())
    }
}

impl<T: ToString> From<&[T]> for ParamValue {
    fn from(values: &[T]) -> Self {
        Self(values.iter().map(|v| Some(v.to_string())).collect())
    }
}

impl<T: ToString, const N: usize> From<[T; N]> for ParamValue {
    fn from(values: [T; N]) -> Self {
        Self(values.iter().map(|v| Some(v.to_string())).collect())
    }
}

/// Operations offered by the Clarity client
#[async_trait]
pub trait ClarityApi: Send + Sync {
    /// Fetch the entity at `uri`
    async fn retrieve<E: Entity>(&self, uri: &Url) -> Result<E>;

    /// Fetch the entity a link points at
    async fn load<E: Entity>(&self, link: &Link<E>) -> Result<E> {
        self.retrieve(&link.uri).await
    }

    /// Fetch several entities of one type
    async fn load_all<E: Entity>(&self, links: &[Link<E>]) -> Result<Vec<E>> {
        let mut entities = Vec::with_capacity(links.len());
        for link in links {
            entities.push(self.load(link).await?);
        }
        Ok(entities)
    }

    /// Run a parametrized search for entities of type `E`
    async fn find<E: Entity>(&self, params: &SearchParams) -> Result<Vec<Link<E>>>;

    /// List every entity of type `E`, following pagination to the end
    async fn list_all<E: Entity>(&self) -> Result<Vec<Link<E>>>;

    /// List at most `count` entities of type `E` starting at `offset`
    async fn list_some<E: Entity>(&self, offset: usize, count: usize) -> Result<Vec<Link<E>>>;

    /// Write an entity back; `entity` is refreshed with the server's state
    async fn update<E: Entity>(&self, entity: &mut E) -> Result<()>;

    /// Write several entities back
    async fn update_all<E: Entity>(&self, entities: &mut [E]) -> Result<()> {
        for entity in entities.iter_mut() {
            self.update(entity).await?;
        }
        Ok(())
    }

    /// Create an entity; `entity` is refreshed with the created state
    async fn create<E: Entity>(&self, entity: &mut E) -> Result<()>;

    /// Delete an entity
    async fn delete<E: Entity>(&self, entity: &E) -> Result<()>;

    /// Upload a file and attach it to the entity at `attach_to`
    async fn upload_file(&self, attach_to: &Url, path: &Path) -> Result<()>;
}

#[async_trait]
impl<T: ClarityApi> ClarityApi for Arc<T> {
    async fn retrieve<E: Entity>(&self, uri: &Url) -> Result<E> {
        (**self).retrieve(uri).await
    }

    async fn load<E: Entity>(&self, link: &Link<E>) -> Result<E> {
        (**self).load(link).await
    }

    async fn load_all<E: Entity>(&self, links: &[Link<E>]) -> Result<Vec<E>> {
        (**self).load_all(links).await
    }

    async fn find<E: Entity>(&self, params: &SearchParams) -> Result<Vec<Link<E>>> {
        (**self).find(params).await
    }

    async fn list_all<E: Entity>(&self) -> Result<Vec<Link<E>>> {
        (**self).list_all().await
    }

    async fn list_some<E: Entity>(&self, offset: usize, count: usize) -> Result<Vec<Link<E>>> {
        (**self).list_some(offset, count).await
    }

    async fn update<E: Entity>(&self, entity: &mut E) -> Result<()> {
        (**self).update(entity).await
    }

    async fn update_all<E: Entity>(&self, entities: &mut [E]) -> Result<()> {
        (**self).update_all(entities).await
    }

    async fn create<E: Entity>(&self, entity: &mut E) -> Result<()> {
        (**self).create(entity).await
    }

    async fn delete<E: Entity>(&self, entity: &E) -> Result<()> {
        (**self).delete(entity).await
    }

    async fn upload_file(&self, attach_to: &Url, path: &Path) -> Result<()> {
        (**self).upload_file(attach_to, path).await
    }
}
