//! Tool lifecycle: lazy configuration bootstrap and the config handle.
//!
//! A [`ToolContext`] is constructed once at startup and passed by reference
//! to every collaborator. Its first `get()` runs the full initialization
//! sequence (load host config, reconcile the tool's section, wire logging);
//! later calls return the cached handle. Re-initialization only ever
//! happens through an explicit [`ToolContext::reset`].
//!
//! Concurrency: the context is internally locked so `&ToolContext` can be
//! shared, but interleaved `get()`/`update_section()` calls from multiple
//! threads are the caller's to serialize; no ordering is promised beyond
//! each call being atomic.

use crate::config::{HostConfig, reconcile};
use crate::logger::{LogOptions, LoggingRuntime, resolve_level};
use crate::settings::ToolSpec;
use anyhow::Result;
use arc_swap::ArcSwap;
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use toml::{Table, Value};

// ============================================================================
// ConfigHandle
// ============================================================================

/// Clonable handle to the loaded host configuration.
///
/// Reads are lock-free; updates clone, mutate and atomically store the
/// config, so a handle loaded before an update keeps observing the old
/// snapshot.
#[derive(Clone)]
pub struct ConfigHandle(Arc<ArcSwap<HostConfig>>);

impl ConfigHandle {
    fn new(config: HostConfig) -> Self {
        Self(Arc::new(ArcSwap::from_pointee(config)))
    }

    /// Current config snapshot.
    pub fn load(&self) -> Arc<HostConfig> {
        self.0.load_full()
    }

    /// Clone-mutate-store update of the shared config.
    pub fn update(&self, mutate: impl FnOnce(&mut HostConfig)) {
        let mut config = (*self.load()).clone();
        mutate(&mut config);
        self.0.store(Arc::new(config));
    }

    /// Whether two handles refer to the same underlying storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// ============================================================================
// ToolContext
// ============================================================================

/// Options fixed at context construction.
#[derive(Debug, Clone, Default)]
pub struct ContextOptions {
    /// Explicit host config path; `None` means discovery then defaults.
    pub config_path: Option<PathBuf>,
    /// Skip file handlers in the logging initializer (first-class option
    /// instead of an ambient test-harness marker).
    pub disable_file_logging: bool,
}

/// Per-tool configuration and logging lifecycle.
pub struct ToolContext {
    spec: ToolSpec,
    options: ContextOptions,
    handle: RwLock<Option<ConfigHandle>>,
}

impl ToolContext {
    pub fn new(spec: ToolSpec, options: ContextOptions) -> Self {
        Self {
            spec,
            options,
            handle: RwLock::new(None),
        }
    }

    pub fn spec(&self) -> &ToolSpec {
        &self.spec
    }

    /// The host configuration, initializing on first call.
    ///
    /// Initialization loads the host config (loader failures are fatal and
    /// propagate: nothing downstream works without configuration), ensures
    /// the tool's section exists, and wires logging from the section's
    /// `log_level`. Logging I/O problems degrade inside the initializer and
    /// never surface here. Subsequent calls return the cached handle.
    pub fn get(&self) -> Result<ConfigHandle> {
        if let Some(handle) = &*self.handle.read() {
            return Ok(handle.clone());
        }

        let mut guard = self.handle.write();
        // Raced initialization: someone else finished while we waited
        if let Some(handle) = &*guard {
            return Ok(handle.clone());
        }
        // Drop any stale handle before loading fresh
        *guard = None;

        let mut config = HostConfig::load(self.options.config_path.as_deref())?;
        let section = reconcile::ensure_section(&mut config, &self.spec);
        let level = resolve_level(reconcile::section_str_field(&section, "log_level"));

        LoggingRuntime::global().initialize(&LogOptions {
            tool: self.spec.name().to_owned(),
            level,
            logs_dir: config.paths.resolved_logs_dir(),
            disable_file_logging: self.options.disable_file_logging,
        });

        let handle = ConfigHandle::new(config);
        *guard = Some(handle.clone());
        Ok(handle)
    }

    /// The tool's current section as a plain mapping.
    ///
    /// Structural problems (section missing or not a mapping) degrade to an
    /// empty mapping; loader failures still propagate through `get()`.
    pub fn get_section(&self) -> Result<Table> {
        let config = self.get()?.load();
        Ok(match config.custom.get(self.spec.name()) {
            Some(Value::Table(table)) => table.clone(),
            _ => Table::new(),
        })
    }

    /// Merge `partial` into the tool's section of the cached config.
    ///
    /// In-memory only; persistence, if any, is the config loader's concern.
    pub fn update_section(&self, partial: Table) -> Result<()> {
        let handle = self.get()?;
        let tool = self.spec.name().to_owned();
        handle.update(|config| reconcile::merge_update(config, &tool, partial));
        Ok(())
    }

    /// Logger handle bound to the tool's fixed name. Stateless.
    pub fn logger(&self) -> ToolLogger {
        ToolLogger {
            tool: Arc::from(self.spec.name()),
        }
    }

    /// Explicitly request re-initialization: the cached handle is dropped
    /// and the next `get()` runs the full sequence again.
    pub fn reset(&self) {
        *self.handle.write() = None;
    }
}

// ============================================================================
// ToolLogger
// ============================================================================

/// Fixed-name logger handle; events carry the tool name as a field.
#[derive(Debug, Clone)]
pub struct ToolLogger {
    tool: Arc<str>,
}

impl ToolLogger {
    pub fn name(&self) -> &str {
        &self.tool
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!(tool = %self.tool, "{message}");
    }

    pub fn info(&self, message: &str) {
        tracing::info!(tool = %self.tool, "{message}");
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!(tool = %self.tool, "{message}");
    }

    pub fn error(&self, message: &str) {
        tracing::error!(tool = %self.tool, "{message}");
    }
}

// ============================================================================
// tests
// ============================================================================
