//! Toolhost - per-tool configuration and logging bootstrap.
//!
//! Pluggable add-on tools hosted inside a larger framework all need the
//! same three things at startup: a validated settings section inside the
//! host configuration's `custom` extension region, a process-wide logger
//! wired to both console and a per-tool log file, and re-initialization
//! that never leaks file handles or stacks duplicate handlers. This crate
//! is that shared bootstrap, extracted so tools stop duplicating it.
//!
//! | Module      | Purpose                                            |
//! |-------------|----------------------------------------------------|
//! | `config`    | Host config, dual-shape `custom` region, reconcile |
//! | `settings`  | Validated per-tool settings schema                 |
//! | `logger`    | Logging lifecycle, file sinks, handler registry    |
//! | `lifecycle` | `ToolContext`: lazy bootstrap, get/update/logger   |
//!
//! # Example
//!
//! ```no_run
//! use toolhost::{ContextOptions, FieldSpec, SettingsModel, ToolContext, ToolSpec};
//!
//! let settings = SettingsModel::new(vec![
//!     FieldSpec::new("quality", "Default quality level", 80i64).with_range(0, 100),
//!     FieldSpec::new("log_level", "Logging level", "INFO"),
//! ])?;
//!
//! let ctx = ToolContext::new(
//!     ToolSpec::new("mediatool", settings),
//!     ContextOptions::default(),
//! );
//!
//! let config = ctx.get()?;
//! let section = ctx.get_section()?;
//! ctx.logger().info("bootstrap complete");
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod config;
pub mod lifecycle;
pub mod logger;
pub mod settings;

pub use config::{
    AttributeRegion, ConfigDiagnostics, ConfigError, CustomSection, FieldPath, HostConfig,
    PathsConfig,
};
pub use lifecycle::{ConfigHandle, ContextOptions, ToolContext, ToolLogger};
pub use logger::{LogOptions, LoggingRuntime, resolve_level};
pub use settings::{Constraint, FieldSpec, SettingsModel, ToolSpec};
