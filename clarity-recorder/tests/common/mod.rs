//! In-memory stand-in for a Clarity server

#![allow(dead_code)]

use async_trait::async_trait;
use clarity_core::prelude::*;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use url::Url;

pub const API_ROOT: &str = "https://lims.example.org/api/v2";

pub fn uri(path: &str) -> Url {
    Url::parse(&format!("{API_ROOT}/{path}")).unwrap()
}

pub fn link<E>(path: &str) -> Link<E> {
    Link::new(uri(path))
}

pub fn sample(id: &str, name: &str) -> Sample {
    let mut sample = Sample::new(name);
    sample.uri = Some(uri(&format!("samples/{id}")));
    sample.limsid = Some(id.to_string());
    sample
}

/// Answers calls from what it has been given and logs every call it receives
#[derive(Default)]
pub struct StubServer {
    entities: Mutex<HashMap<String, Value>>,
    searches: Mutex<HashMap<String, Vec<Url>>>,
    listings: Mutex<HashMap<String, Vec<Url>>>,
    calls: Mutex<Vec<String>>,
    created: Mutex<usize>,
}

impl StubServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `entity` at its URI
    pub fn put<E: Entity>(&self, entity: &E) {
        let uri = entity.uri().expect("stub entities need a URI").to_string();
        let value = serde_json::to_value(entity).unwrap();
        self.entities.lock().unwrap().insert(uri, value);
    }

    /// Answer every search for `E` with these links
    pub fn set_search_results<E: Entity>(&self, paths: &[&str]) {
        self.searches.lock().unwrap().insert(
            E::entity_type().name.to_string(),
            paths.iter().map(|p| uri(p)).collect(),
        );
    }

    /// Answer listings of `E` with these links
    pub fn set_listing<E: Entity>(&self, paths: &[&str]) {
        self.listings.lock().unwrap().insert(
            E::entity_type().name.to_string(),
            paths.iter().map(|p| uri(p)).collect(),
        );
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn links<E: Entity>(table: &Mutex<HashMap<String, Vec<Url>>>) -> Vec<Link<E>> {
        table
            .lock()
            .unwrap()
            .get(E::entity_type().name)
            .map(|uris| uris.iter().cloned().map(Link::new).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ClarityApi for StubServer {
    async fn retrieve<E: Entity>(&self, uri: &Url) -> Result<E> {
        self.log(format!("retrieve {uri}"));

        let value = self
            .entities
            .lock()
            .unwrap()
            .get(uri.as_str())
            .cloned()
            .ok_or_else(|| ClarityError::NotFound(uri.to_string()))?;

        serde_json::from_value(value).map_err(|e| ClarityError::Other(e.to_string()))
    }

    async fn find<E: Entity>(&self, _params: &SearchParams) -> Result<Vec<Link<E>>> {
        self.log(format!("find {}", E::entity_type().name));
        Ok(Self::links(&self.searches))
    }

    async fn list_all<E: Entity>(&self) -> Result<Vec<Link<E>>> {
        self.log(format!("list {}", E::entity_type().name));
        Ok(Self::links(&self.listings))
    }

    async fn list_some<E: Entity>(&self, offset: usize, count: usize) -> Result<Vec<Link<E>>> {
        self.log(format!("list {} {offset}+{count}", E::entity_type().name));
        Ok(Self::links(&self.listings)
            .into_iter()
            .skip(offset)
            .take(count)
            .collect())
    }

    async fn update<E: Entity>(&self, entity: &mut E) -> Result<()> {
        self.log(format!("update {}", E::entity_type().name));
        self.put(&*entity);
        Ok(())
    }

    async fn create<E: Entity>(&self, entity: &mut E) -> Result<()> {
        self.log(format!("create {}", E::entity_type().name));

        let number = {
            let mut created = self.created.lock().unwrap();
            *created += 1;
            *created
        };

        let mut value = serde_json::to_value(&*entity).unwrap();
        value["uri"] = Value::String(
            uri(&format!("{}/NEW-{number}", E::entity_type().uri_section)).to_string(),
        );
        *entity = serde_json::from_value(value).unwrap();
        self.put(&*entity);
        Ok(())
    }

    async fn delete<E: Entity>(&self, entity: &E) -> Result<()> {
        self.log(format!("delete {}", E::entity_type().name));
        if let Some(uri) = entity.uri() {
            self.entities.lock().unwrap().remove(uri.as_str());
        }
        Ok(())
    }

    async fn upload_file(&self, attach_to: &Url, path: &Path) -> Result<()> {
        self.log(format!("upload {} to {attach_to}", path.display()));
        Ok(())
    }
}
