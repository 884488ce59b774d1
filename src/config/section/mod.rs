//! Configuration section definitions.
//!
//! Each module corresponds to a section in `toolhost.toml`:
//!
//! | Module     | TOML Section   | Purpose                           |
//! |------------|----------------|-----------------------------------|
//! | `paths`    | `[paths]`      | Host-resolved filesystem paths    |
//!
//! Tool sections live under `[custom.<tool>]` and are shaped by each tool's
//! settings schema rather than a fixed struct; see `crate::settings`.

mod paths;

pub use paths::{DEFAULT_LOGS_DIR, PathsConfig};
