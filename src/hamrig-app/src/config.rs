// SPDX-FileCopyrightText: 2025 Stanislaw Grams <stanislawgrams@gmail.com>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Configuration file support.
//!
//! Config is loaded from the `[hamrig]` section of `hamrig.toml`.
//! Default search order:
//! 1. `./hamrig.toml`
//! 2. `~/.config/hamrig/hamrig.toml`
//! 3. `/etc/hamrig/hamrig.toml`

use std::path::{Path, PathBuf};
use std::time::Duration;

use hamrig_backend::BackendOptions;
use hamrig_core::SessionConfig;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(PathBuf, String),

    #[error("Failed to parse config file {0}: {1}")]
    ParseError(PathBuf, String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Returns the default search paths for `hamrig.toml`
/// (current directory → XDG config → /etc).
fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from("hamrig.toml")];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("hamrig").join("hamrig.toml"));
    }
    paths.push(PathBuf::from("/etc/hamrig/hamrig.toml"));
    paths
}

/// Extract and deserialize a named section from a TOML file.
///
/// Returns `Ok(Some(cfg))` when the section is present and parses cleanly,
/// `Ok(None)` when the section is absent, or `Err` on I/O / parse failure.
fn load_section_from_file<T: DeserializeOwned>(
    path: &Path,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ReadError(path.to_path_buf(), e.to_string()))?;
    parse_section(&content, key).map_err(|e| ConfigError::ParseError(path.to_path_buf(), e))
}

fn parse_section<T: DeserializeOwned>(content: &str, key: &str) -> Result<Option<T>, String> {
    let table: toml::Table = toml::from_str(content).map_err(|e| e.to_string())?;

    let Some(section) = table.get(key) else {
        return Ok(None);
    };

    // Re-serialize the section then parse as T so all serde defaults apply.
    let section_toml = toml::to_string(section).map_err(|e| e.to_string())?;
    toml::from_str::<T>(&section_toml)
        .map(Some)
        .map_err(|e| e.to_string())
}

/// Trait for loading configuration from a `hamrig.toml` section.
pub trait ConfigFile: Sized + Default + DeserializeOwned {
    /// Section key in `hamrig.toml`.
    fn section_key() -> &'static str;

    /// Load the section from a specific file path.
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// does not contain the expected `[<section_key>]` header.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        load_section_from_file::<Self>(path, Self::section_key())?.ok_or_else(|| {
            ConfigError::ParseError(
                path.to_path_buf(),
                format!("missing [{}] section", Self::section_key()),
            )
        })
    }

    /// Search default paths and load the first file that contains the
    /// expected section.
    ///
    /// Returns `(config, path_where_found)` or `(Default::default(), None)`
    /// when no config file is found.
    fn load_from_default_paths() -> Result<(Self, Option<PathBuf>), ConfigError> {
        for path in config_search_paths() {
            if path.exists() {
                if let Some(cfg) = load_section_from_file::<Self>(&path, Self::section_key())? {
                    return Ok((cfg, Some(path)));
                }
            }
        }
        Ok((Self::default(), None))
    }
}

/// `[hamrig]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HamrigConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: Option<String>,
    /// Registered backend name ("hamlib" or "dummy")
    pub backend: String,
    /// Native library to load instead of the default search
    pub library_path: Option<PathBuf>,
    /// Scheduler tunables
    pub session: SessionSection,
}

impl Default for HamrigConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            backend: "hamlib".to_string(),
            library_path: None,
            session: SessionSection::default(),
        }
    }
}

/// `[hamrig.session]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Poll period in milliseconds, never below 250
    pub poll_interval_ms: u64,
    /// Consecutive failures that close a session
    pub failure_threshold: u32,
    /// Command queue slots
    pub queue_capacity: usize,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: 250,
            failure_threshold: 10,
            queue_capacity: 64,
        }
    }
}

impl HamrigConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.backend.chars().any(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Invalid("[hamrig].backend must name a backend".into()));
        }
        if self.session.failure_threshold == 0 {
            return Err(ConfigError::Invalid(
                "[hamrig.session].failure_threshold must be at least 1".into(),
            ));
        }
        if self.session.queue_capacity == 0 {
            return Err(ConfigError::Invalid(
                "[hamrig.session].queue_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Scheduler tunables with the poll period clamped to its floor.
    pub fn to_session_config(&self) -> SessionConfig {
        let floor = SessionConfig::default().poll_interval;
        SessionConfig {
            poll_interval: Duration::from_millis(self.session.poll_interval_ms).max(floor),
            failure_threshold: self.session.failure_threshold,
            queue_capacity: self.session.queue_capacity,
        }
    }

    pub fn backend_options(&self) -> BackendOptions {
        BackendOptions {
            library_path: self.library_path.clone(),
        }
    }
}

impl ConfigFile for HamrigConfig {
    fn section_key() -> &'static str {
        "hamrig"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HamrigConfig::default();
        assert_eq!(config.backend, "hamlib");
        assert!(config.library_path.is_none());
        assert_eq!(config.to_session_config(), SessionConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_section() {
        let toml_str = r#"
[other]
ignored = true

[hamrig]
log_level = "debug"
backend = "dummy"
library_path = "/usr/lib/libhamlib.so.2"

[hamrig.session]
poll_interval_ms = 1000
failure_threshold = 3
queue_capacity = 8
"#;
        let config: HamrigConfig = parse_section(toml_str, "hamrig").unwrap().unwrap();
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.backend, "dummy");
        assert_eq!(
            config.backend_options().library_path,
            Some(PathBuf::from("/usr/lib/libhamlib.so.2"))
        );

        let session = config.to_session_config();
        assert_eq!(session.poll_interval, Duration::from_secs(1));
        assert_eq!(session.failure_threshold, 3);
        assert_eq!(session.queue_capacity, 8);
    }

    #[test]
    fn test_poll_interval_is_clamped() {
        let config: HamrigConfig =
            parse_section("[hamrig.session]\npoll_interval_ms = 10\n", "hamrig")
                .unwrap()
                .unwrap();
        assert_eq!(config.backend, "hamlib");
        assert_eq!(
            config.to_session_config().poll_interval,
            Duration::from_millis(250)
        );
    }

    #[test]
    fn test_missing_section() {
        let parsed: Option<HamrigConfig> = parse_section("[other]\nx = 1\n", "hamrig").unwrap();
        assert!(parsed.is_none());
        assert!(parse_section::<HamrigConfig>("not toml =", "hamrig").is_err());
    }

    #[test]
    fn test_load_from_file_requires_section() {
        let path = std::env::temp_dir().join(format!("hamrig-test-{}.toml", std::process::id()));
        std::fs::write(&path, "[other]\nx = 1\n").unwrap();
        let err = HamrigConfig::load_from_file(&path).unwrap_err();
        assert!(err.to_string().contains("missing [hamrig] section"));

        std::fs::write(&path, "[hamrig]\nbackend = \"dummy\"\n").unwrap();
        let config = HamrigConfig::load_from_file(&path).unwrap();
        assert_eq!(config.backend, "dummy");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_validate_rejects_degenerate_values() {
        let mut config = HamrigConfig {
            backend: "--".into(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        config.backend = "dummy".into();
        config.session.failure_threshold = 0;
        assert!(config.validate().is_err());
    }
}
