//! Configuration utility types.
//!
//! | Module   | Purpose                                      |
//! |----------|----------------------------------------------|
//! | `custom` | Dual-shape `custom` extension region         |
//! | `error`  | Configuration error types                    |
//! | `field`  | Config field path                            |

mod custom;
mod error;
mod field;

pub use custom::{Attribute, AttributeRegion, CustomSection};
pub use error::{ConfigDiagnostic, ConfigDiagnostics, ConfigError};
pub use field::FieldPath;
