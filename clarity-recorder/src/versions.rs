//! Versioned snapshots of updated entities
//!
//! Every update of an entity is kept as its own file,
//! `<Type>-<id>.<nnn>.xml`, numbered from zero without gaps. Version files are
//! created exclusively and never overwritten.

use clarity_core::codec::Codec;
use clarity_core::entity::{Entity, EntityRef};
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::RecordingError;
use crate::snapshot::update_file_name;
use crate::store::write_encoded;

/// Serializes every version allocation in the process, for all entity types.
static ALLOCATION_LOCK: Mutex<()> = Mutex::new(());

/// A version file that has been created and is ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedVersion {
    pub version: u32,
    pub path: PathBuf,
}

/// Finds and claims the next unused version file in a directory
#[derive(Debug, Clone)]
pub struct VersionAllocator {
    directory: PathBuf,
}

impl VersionAllocator {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Claim the lowest unused version for `reference`.
    ///
    /// The file is created (empty) before this returns, so a concurrent
    /// allocation for the same entity moves on to the next number.
    pub fn allocate(&self, reference: &EntityRef) -> Result<AllocatedVersion, RecordingError> {
        let _guard = ALLOCATION_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        if !self.directory.is_dir() {
            return Err(RecordingError::StorageUnavailable(self.directory.clone()));
        }

        let mut version: u32 = 0;
        loop {
            let path = self.directory.join(update_file_name(reference, version));

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(AllocatedVersion { version, path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => version += 1,
                Err(e) => return Err(RecordingError::io(path, e)),
            }
        }
    }
}

/// Writes the state of updated entities into version files
pub struct UpdateJournal<C> {
    allocator: VersionAllocator,
    codec: Arc<C>,
}

impl<C: Codec> UpdateJournal<C> {
    pub fn new(directory: impl Into<PathBuf>, codec: Arc<C>) -> Self {
        Self {
            allocator: VersionAllocator::new(directory),
            codec,
        }
    }

    pub fn directory(&self) -> &Path {
        self.allocator.directory()
    }

    /// Store `entity` as the next version of itself.
    ///
    /// If the write fails the claimed file is removed again, so the version
    /// number is reused by the next update.
    pub fn record<E: Entity>(&self, entity: &E) -> Result<AllocatedVersion, RecordingError> {
        let reference = EntityRef::of_entity(entity)?;
        let allocated = self.allocator.allocate(&reference)?;

        if let Err(e) = write_encoded(
            self.codec.as_ref(),
            self.allocator.directory(),
            &allocated.path,
            entity,
        ) {
            if let Err(remove) = std::fs::remove_file(&allocated.path) {
                tracing::warn!(
                    path = %allocated.path.display(),
                    "Could not release unwritten version file: {}",
                    remove
                );
            }
            return Err(e);
        }

        tracing::debug!(
            entity = %reference,
            version = allocated.version,
            "Recorded updated entity"
        );
        Ok(allocated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_versions_start_at_zero_and_count_up() {
        let dir = TempDir::new().unwrap();
        let allocator = VersionAllocator::new(dir.path());
        let reference = EntityRef::new("Sample", "S1");

        assert_eq!(allocator.allocate(&reference).unwrap().version, 0);
        assert_eq!(allocator.allocate(&reference).unwrap().version, 1);
        assert!(dir.path().join("Sample-S1.000.xml").is_file());
        assert!(dir.path().join("Sample-S1.001.xml").is_file());

        // Other ids are numbered independently.
        let other = EntityRef::new("Sample", "S2");
        assert_eq!(allocator.allocate(&other).unwrap().version, 0);
    }

    #[test]
    fn test_lowest_unused_version_is_taken() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("Sample-S1.000.xml"), b"").unwrap();
        std::fs::write(dir.path().join("Sample-S1.002.xml"), b"").unwrap();

        let allocator = VersionAllocator::new(dir.path());
        let allocated = allocator.allocate(&EntityRef::new("Sample", "S1")).unwrap();
        assert_eq!(allocated.version, 1);
        assert_eq!(allocated.path, dir.path().join("Sample-S1.001.xml"));
    }

    #[test]
    fn test_missing_directory_is_unavailable() {
        let dir = TempDir::new().unwrap();
        let allocator = VersionAllocator::new(dir.path().join("updates"));
        let result = allocator.allocate(&EntityRef::new("Sample", "S1"));
        assert!(matches!(result, Err(RecordingError::StorageUnavailable(_))));
    }

    static UNWRITABLE: clarity_core::entity::EntityType = clarity_core::entity::EntityType::new(
        "Unwritable",
        "test.Unwritable",
        "unwritables",
    );

    /// An entity whose encoding always fails
    #[derive(serde::Deserialize)]
    struct Unwritable {
        uri: Option<url::Url>,
    }

    impl serde::Serialize for Unwritable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to encode"))
        }
    }

    impl Entity for Unwritable {
        fn entity_type() -> &'static clarity_core::entity::EntityType {
            &UNWRITABLE
        }

        fn uri(&self) -> Option<&url::Url> {
            self.uri.as_ref()
        }
    }

    #[test]
    fn test_failed_write_releases_the_version() {
        let dir = TempDir::new().unwrap();
        let journal = UpdateJournal::new(dir.path(), Arc::new(clarity_core::codec::JsonCodec));
        let entity = Unwritable {
            uri: Some(url::Url::parse("https://lims.example.org/api/v2/unwritables/U1").unwrap()),
        };

        let result = journal.record(&entity);
        assert!(matches!(result, Err(RecordingError::Codec(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

        let allocator = VersionAllocator::new(dir.path());
        let next = allocator.allocate(&EntityRef::new("Unwritable", "U1")).unwrap();
        assert_eq!(next.version, 0);
    }

    #[test]
    fn test_concurrent_allocations_never_collide() {
        let dir = TempDir::new().unwrap();
        let allocator = Arc::new(VersionAllocator::new(dir.path()));
        let reference = EntityRef::new("Sample", "S1");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let allocator = Arc::clone(&allocator);
                let reference = reference.clone();
                thread::spawn(move || {
                    (0..5)
                        .map(|_| allocator.allocate(&reference).unwrap().version)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let versions: Vec<u32> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let unique: HashSet<u32> = versions.iter().copied().collect();

        assert_eq!(versions.len(), 40);
        assert_eq!(unique, (0..40).collect());
    }
}
