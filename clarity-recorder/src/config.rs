//! Configuration for the record and playback layers

use clarity_core::error::{ClarityError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Which layer sits in front of the transport for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HarnessMode {
    /// Calls go straight to the transport
    #[default]
    Live,

    /// Calls go to the transport and what comes back is saved
    Record,

    /// Calls are answered from saved files; the transport is never used
    Playback,
}

/// Harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Layer to compose in front of the transport
    pub mode: HarnessMode,

    /// Where exchanges are written when recording and read when playing back
    pub message_directory: PathBuf,

    /// Where versions of updated entities are written; updates are not
    /// recorded when unset
    pub updates_directory: Option<PathBuf>,

    /// Fail a played-back search that was never recorded instead of
    /// returning no results
    pub fail_on_missing_search: bool,

    /// Record searches that returned nothing
    pub record_searches_without_results: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            mode: HarnessMode::Live,
            message_directory: PathBuf::from("serverexchanges"),
            updates_directory: None,
            fail_on_missing_search: false,
            record_searches_without_results: true,
        }
    }
}

impl HarnessConfig {
    /// Configuration for recording into `message_directory`
    pub fn record(message_directory: impl Into<PathBuf>) -> Self {
        Self {
            mode: HarnessMode::Record,
            message_directory: message_directory.into(),
            ..Default::default()
        }
    }

    /// Configuration for playing back from `message_directory`
    pub fn playback(message_directory: impl Into<PathBuf>) -> Self {
        Self {
            mode: HarnessMode::Playback,
            message_directory: message_directory.into(),
            ..Default::default()
        }
    }

    /// Set the directory for update versions
    pub fn with_updates_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.updates_directory = Some(directory.into());
        self
    }

    /// Set whether missing search recordings fail
    pub fn with_fail_on_missing_search(mut self, fail: bool) -> Self {
        self.fail_on_missing_search = fail;
        self
    }

    /// Set whether empty search results are recorded
    pub fn with_record_searches_without_results(mut self, record: bool) -> Self {
        self.record_searches_without_results = record;
        self
    }

    /// Load configuration from `clarity-harness.toml` and the environment.
    ///
    /// Sources, later ones overriding earlier ones:
    /// 1. `clarity-harness.toml` in the working directory
    /// 2. the file named by `CLARITY_HARNESS_CONFIG_PATH`
    /// 3. `CLARITY_HARNESS_*` variables, e.g. `CLARITY_HARNESS_MODE=playback`
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source is invalid.
    pub fn load() -> Result<Self> {
        use figment::{
            Figment,
            providers::{Env, Format, Serialized, Toml},
        };

        let mut figment = Figment::from(Serialized::defaults(HarnessConfig::default()))
            .merge(Toml::file("clarity-harness.toml"));

        if let Ok(path) = std::env::var("CLARITY_HARNESS_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }

        let config: HarnessConfig = figment
            .merge(Env::prefixed("CLARITY_HARNESS_").ignore(&["config_path"]))
            .extract()
            .map_err(|e| {
                ClarityError::Configuration(format!("Failed to load harness configuration: {}", e))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        use figment::{
            Figment,
            providers::{Format, Serialized, Toml},
        };

        let config: HarnessConfig = Figment::from(Serialized::defaults(HarnessConfig::default()))
            .merge(Toml::file(path.as_ref()))
            .extract()
            .map_err(|e| {
                ClarityError::Configuration(format!(
                    "Failed to load harness configuration file {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory setting is empty.
    pub fn validate(&self) -> Result<()> {
        if self.message_directory.as_os_str().is_empty() {
            return Err(ClarityError::Configuration(
                "message_directory cannot be empty".to_string(),
            ));
        }
        if let Some(updates) = &self.updates_directory {
            if updates.as_os_str().is_empty() {
                return Err(ClarityError::Configuration(
                    "updates_directory cannot be empty when set".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = HarnessConfig::default();
        assert_eq!(config.mode, HarnessMode::Live);
        assert_eq!(config.message_directory, PathBuf::from("serverexchanges"));
        assert!(config.updates_directory.is_none());
        assert!(!config.fail_on_missing_search);
        assert!(config.record_searches_without_results);
    }

    #[test]
    fn test_from_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("harness.toml");
        std::fs::write(
            &path,
            r#"
mode = "playback"
message_directory = "src/test/messages"
updates_directory = "target/updates"
fail_on_missing_search = true
"#,
        )
        .unwrap();

        let config = HarnessConfig::from_file(&path).unwrap();
        assert_eq!(config.mode, HarnessMode::Playback);
        assert_eq!(config.message_directory, PathBuf::from("src/test/messages"));
        assert_eq!(config.updates_directory, Some(PathBuf::from("target/updates")));
        assert!(config.fail_on_missing_search);
        assert!(config.record_searches_without_results);
    }

    #[test]
    fn test_invalid_mode_is_a_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("harness.toml");
        std::fs::write(&path, "mode = \"rewind\"\n").unwrap();

        let result = HarnessConfig::from_file(&path);
        assert!(matches!(result, Err(ClarityError::Configuration(_))));
    }

    #[test]
    fn test_empty_message_directory_is_rejected() {
        let config = HarnessConfig::record("");
        assert!(config.validate().is_err());
    }
}
