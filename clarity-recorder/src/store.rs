//! Directory of snapshot files read and written through a codec

use clarity_core::codec::Codec;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::RecordingError;

/// A flat directory of snapshot files
pub struct FileStore<C> {
    directory: PathBuf,
    codec: Arc<C>,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<C: Codec> FileStore<C> {
    pub fn new(directory: impl Into<PathBuf>, codec: Arc<C>) -> Self {
        Self {
            directory: directory.into(),
            codec,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn codec(&self) -> &Arc<C> {
        &self.codec
    }

    /// Full path of the named file
    pub fn path(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path(name).is_file()
    }

    /// Read and decode the named file.
    ///
    /// Returns `Ok(None)` when the file does not exist and
    /// [`RecordingError::CorruptRecording`] when it exists but cannot be decoded.
    pub fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, RecordingError> {
        let path = self.path(name);

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RecordingError::io(path, e)),
        };

        self.codec
            .decode(&bytes)
            .map(Some)
            .map_err(|source| RecordingError::CorruptRecording { path, source })
    }

    /// Encode a value into the named file, replacing any previous content
    pub fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<(), RecordingError> {
        write_encoded(self.codec.as_ref(), &self.directory, &self.path(name), value)
    }

    /// Run `f` while holding the lock for the named file.
    ///
    /// Only callers that go through this method exclude each other.
    pub fn with_lock<R>(&self, name: &str, f: impl FnOnce() -> R) -> R {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(locks.entry(name.to_string()).or_default())
        };
        let _guard = lock.lock().unwrap_or_else(|e| e.into_inner());
        f()
    }
}

/// Encode `value` into `path`, which must lie in the existing `directory`
pub(crate) fn write_encoded<C: Codec, T: Serialize>(
    codec: &C,
    directory: &Path,
    path: &Path,
    value: &T,
) -> Result<(), RecordingError> {
    if !directory.is_dir() {
        return Err(RecordingError::StorageUnavailable(directory.to_path_buf()));
    }

    let bytes = codec.encode(value)?;
    fs::write(path, bytes).map_err(|e| RecordingError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clarity_core::codec::JsonCodec;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path(), Arc::new(JsonCodec));
        let value: Option<Vec<String>> = store.read("absent.xml").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_undecodable_file_is_corrupt() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("bad.xml"), b"<samples/>").unwrap();
        let store = FileStore::new(dir.path(), Arc::new(JsonCodec));

        let result: Result<Option<Vec<String>>, _> = store.read("bad.xml");
        assert!(matches!(result, Err(RecordingError::CorruptRecording { .. })));
    }

    #[test]
    fn test_write_into_missing_directory_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("nowhere"), Arc::new(JsonCodec));

        let result = store.write("x.xml", &vec!["a"]);
        assert!(matches!(result, Err(RecordingError::StorageUnavailable(_))));
        assert!(!store.exists("x.xml"));
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path(), Arc::new(JsonCodec));
        store
            .with_lock("list.xml", || store.write("list.xml", &vec!["a", "b"]))
            .unwrap();

        let value: Vec<String> = store.read("list.xml").unwrap().unwrap();
        assert_eq!(value, vec!["a", "b"]);
    }
}
