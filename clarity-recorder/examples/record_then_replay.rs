//! Record a short session against an in-memory server, then replay it offline
//!
//! Run with: cargo run -p clarity-recorder --example record_then_replay
//! Set RUST_LOG=debug to see every file that is read and written.

use async_trait::async_trait;
use clarity_core::prelude::*;
use clarity_recorder::{Harness, HarnessConfig};
use std::collections::HashMap;
use std::path::Path;
use tracing_subscriber::EnvFilter;
use url::Url;

const API_ROOT: &str = "https://lims.example.org/api/v2";

/// A server that knows a handful of samples and answers every search with all of them
struct DemoServer {
    samples: HashMap<String, serde_json::Value>,
}

impl DemoServer {
    fn new() -> anyhow::Result<Self> {
        let mut samples = HashMap::new();
        for (id, name) in [("GAO9862A146", "34_a"), ("GAO9862A147", "34_b")] {
            let mut sample = Sample::new(name);
            sample.uri = Some(Url::parse(&format!("{API_ROOT}/samples/{id}"))?);
            sample.limsid = Some(id.to_string());
            sample.set_field("Volume (ul)", "12.5");
            samples.insert(format!("{API_ROOT}/samples/{id}"), serde_json::to_value(&sample)?);
        }
        Ok(Self { samples })
    }
}

#[async_trait]
impl ClarityApi for DemoServer {
    async fn retrieve<E: Entity>(&self, uri: &Url) -> Result<E> {
        let value = self
            .samples
            .get(uri.as_str())
            .cloned()
            .ok_or_else(|| ClarityError::NotFound(uri.to_string()))?;
        serde_json::from_value(value).map_err(|e| ClarityError::Transport(e.to_string()))
    }

    async fn find<E: Entity>(&self, _params: &SearchParams) -> Result<Vec<Link<E>>> {
        self.samples.keys().map(|uri| Link::parse(uri)).collect()
    }

    async fn list_all<E: Entity>(&self) -> Result<Vec<Link<E>>> {
        self.find(&SearchParams::new()).await
    }

    async fn list_some<E: Entity>(&self, offset: usize, count: usize) -> Result<Vec<Link<E>>> {
        let all = self.list_all().await?;
        Ok(all.into_iter().skip(offset).take(count).collect())
    }

    async fn update<E: Entity>(&self, _entity: &mut E) -> Result<()> {
        Ok(())
    }

    async fn create<E: Entity>(&self, _entity: &mut E) -> Result<()> {
        Err(ClarityError::Server {
            status: 403,
            message: "read-only demo server".to_string(),
        })
    }

    async fn delete<E: Entity>(&self, _entity: &E) -> Result<()> {
        Err(ClarityError::Server {
            status: 403,
            message: "read-only demo server".to_string(),
        })
    }

    async fn upload_file(&self, _attach_to: &Url, _path: &Path) -> Result<()> {
        Ok(())
    }
}

async fn session<A: ClarityApi>(api: &A) -> Result<Vec<Sample>> {
    let params = search_params([("projectlimsid", ["GAO9862"])]);
    let links = api.find::<Sample>(&params).await?;
    let mut samples = api.load_all(&links).await?;

    for sample in samples.iter_mut() {
        sample.set_field("Status", "Checked");
    }
    api.update_all(&mut samples).await?;

    Ok(samples)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let messages = tempfile::tempdir()?;
    let updates = tempfile::tempdir()?;

    let record = HarnessConfig::record(messages.path()).with_updates_directory(updates.path());
    let recorded = session(&Harness::from_config(DemoServer::new()?, &record)).await?;
    println!("Recorded {} samples", recorded.len());

    for entry in std::fs::read_dir(messages.path())? {
        println!("  {}", entry?.file_name().to_string_lossy());
    }

    // The server handed to playback is never called.
    let playback = HarnessConfig::playback(messages.path())
        .with_updates_directory(updates.path())
        .with_fail_on_missing_search(true);
    let replayed = session(&Harness::from_config(DemoServer::new()?, &playback)).await?;

    for sample in &replayed {
        println!(
            "Replayed {} ({})",
            sample.name,
            sample.field("Volume (ul)").unwrap_or("-")
        );
    }

    let versions = std::fs::read_dir(updates.path())?.count();
    println!("{} update versions captured", versions);

    Ok(())
}
