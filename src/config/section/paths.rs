//! `[paths]` section configuration.
//!
//! Host-resolved filesystem locations shared by every tool.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! logs_dir = "~/.local/state/toolhost/logs"   # Per-tool log files
//! ```

use crate::config::{ConfigDiagnostics, FieldPath};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default logs directory when `[paths] logs_dir` is not configured.
pub const DEFAULT_LOGS_DIR: &str = "./logs";

/// Host-resolved path settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory for per-tool log files. Supports `~` expansion.
    pub logs_dir: Option<PathBuf>,
}

impl PathsConfig {
    /// Logs directory with tilde expansion applied, falling back to
    /// [`DEFAULT_LOGS_DIR`].
    pub fn resolved_logs_dir(&self) -> PathBuf {
        self.logs_dir
            .as_deref()
            .map(expand_path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOGS_DIR))
    }

    /// Validate path settings.
    ///
    /// A `logs_dir` that names an existing regular file is a warning, not an
    /// error: the logging initializer degrades to console-only in that case
    /// and config loading must not fail over logging locations.
    pub(crate) fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.logs_dir.is_some() {
            let resolved = self.resolved_logs_dir();
            if resolved.is_file() {
                diag.warn(
                    FieldPath::new("paths.logs_dir"),
                    format!(
                        "'{}' is a regular file; file logging will be disabled",
                        resolved.display()
                    ),
                );
            }
        }
    }
}

/// Expand a leading tilde in a configured path.
fn expand_path(path: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(path.to_str().unwrap_or_default()).into_owned();
    PathBuf::from(expanded)
}
