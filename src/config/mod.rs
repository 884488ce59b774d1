//! Host configuration management for `toolhost.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   └── paths      # [paths]
//! ├── types/         # Utility types
//! │   ├── custom     # Dual-shape `custom` extension region
//! │   ├── error      # ConfigError
//! │   └── field      # FieldPath
//! ├── reconcile.rs   # Tool-section reconciliation
//! └── mod.rs         # HostConfig (this file)
//! ```
//!
//! # Sections
//!
//! | Section           | Purpose                                        |
//! |-------------------|------------------------------------------------|
//! | `[paths]`         | Host-resolved paths (logs directory)           |
//! | `[custom.<tool>]` | Per-tool settings, shaped by the tool's schema |

pub mod reconcile;
pub mod section;
pub mod types;

// Re-export from section/
pub use section::{DEFAULT_LOGS_DIR, PathsConfig};

// Re-export from types/
pub use types::{
    Attribute, AttributeRegion, ConfigDiagnostic, ConfigDiagnostics, ConfigError, CustomSection,
    FieldPath,
};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file name searched for when no explicit path is given.
pub const DEFAULT_CONFIG_NAME: &str = "toolhost.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing `toolhost.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Host-resolved path settings
    pub paths: PathsConfig,

    /// Extension region holding per-tool sections
    pub custom: CustomSection,
}

impl HostConfig {
    /// Load configuration from an explicit path or by discovery.
    ///
    /// With a path, any read or parse failure is fatal: nothing downstream
    /// can proceed without configuration. With no path, the file is searched
    /// upward from cwd; an absent file yields defaults, a present but
    /// malformed one is still fatal.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => match find_config_file(Path::new(DEFAULT_CONFIG_NAME)) {
                Some(found) => Self::from_path(&found),
                None => Ok(Self::default()),
            },
        }
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;

        // Unknown fields are reported, never fatal: a library has no user
        // to prompt and a typo in an unrelated section must not take the
        // hosting tool down.
        if !ignored.is_empty() {
            tracing::warn!(
                file = %path.display(),
                fields = ?ignored,
                "ignoring unknown config fields"
            );
        }

        config.config_path = path.to_path_buf();

        let mut diag = ConfigDiagnostics::new();
        config.validate(&mut diag);
        diag.report_warnings();
        diag.into_result().map_err(ConfigError::Diagnostics)?;

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    pub fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Validate configuration, collecting diagnostics.
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        self.paths.validate(diag);
    }
}

// ============================================================================
// config discovery
// ============================================================================

/// Find config file by searching upward from current directory
///
/// Starts from cwd and walks up parent directories until finding `config_name`
/// Returns the absolute path to the config file if found
fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;

    if config_name.is_absolute() && config_name.exists() {
        return Some(config_name.to_path_buf());
    }

    let mut current = cwd.as_path();
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None, // Reached filesystem root
        }
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_str_invalid_toml() {
        // Invalid TOML syntax - unclosed bracket
        let result: Result<HostConfig, _> = toml::from_str("[paths\nlogs_dir = \"./logs\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_host_config_default() {
        let config = HostConfig::default();

        assert_eq!(config.config_path, PathBuf::new());
        assert!(config.paths.logs_dir.is_none());
        assert!(config.custom.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let config = HostConfig::from_str(
            "[paths]\nlogs_dir = \"/var/log/toolhost\"\n\n[custom.mediatool]\nquality = 80",
        )
        .unwrap();

        assert_eq!(
            config.paths.logs_dir,
            Some(PathBuf::from("/var/log/toolhost"))
        );
        assert!(config.custom.contains("mediatool"));
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[paths]\nlogs_dir = \"./logs\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = HostConfig::parse_with_ignored(content).unwrap();

        // Config should parse successfully
        assert_eq!(config.paths.logs_dir, Some(PathBuf::from("./logs")));

        // Unknown fields should be collected
        assert!(!ignored.is_empty());
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_no_unknown_fields() {
        let content = "[paths]\nlogs_dir = \"./logs\"";
        let (_, ignored) = HostConfig::parse_with_ignored(content).unwrap();
        assert!(ignored.is_empty());
    }

    #[test]
    fn test_load_missing_explicit_path_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("toolhost.toml");
        assert!(HostConfig::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toolhost.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[custom.mediatool]\nquality = 42").unwrap();

        let config = HostConfig::load(Some(&path)).unwrap();
        assert_eq!(config.config_path, path);
        assert!(config.custom.contains("mediatool"));
    }

    #[test]
    fn test_load_malformed_explicit_path_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toolhost.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[paths\nlogs_dir = 3").unwrap();

        assert!(HostConfig::load(Some(&path)).is_err());
    }
}
