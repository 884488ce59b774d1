//! Tool-section reconciliation.
//!
//! Guarantees that the host config's `custom` region holds a section for a
//! tool, populated with the tool's schema defaults on first touch, and
//! merges partial updates back into it. Both shapes of the extension region
//! are handled uniformly through [`CustomSection`]'s operations.

use crate::config::HostConfig;
use crate::settings::ToolSpec;
use toml::{Table, Value};

/// Ensure the tool's section exists and return its current value.
///
/// Absent sections are created from the schema defaults, serialized to a
/// plain mapping, and stored in whichever representation the region has.
/// This never fails: a malformed region degrades to defaults rather than
/// erroring.
pub fn ensure_section(config: &mut HostConfig, spec: &ToolSpec) -> Value {
    if !config.custom.contains(spec.name()) {
        config
            .custom
            .set(spec.name(), Value::Table(spec.settings().to_table()));
    }
    config
        .custom
        .get(spec.name())
        .cloned()
        .unwrap_or_else(|| Value::Table(spec.settings().to_table()))
}

/// Merge a partial update into the tool's section and write it back.
///
/// A mapping-like section is shallow-copied and overlaid: new keys win,
/// untouched keys survive. A non-mapping section cannot be partially
/// merged, so the partial mapping replaces it wholesale.
pub fn merge_update(config: &mut HostConfig, tool: &str, partial: Table) {
    let updated = match config.custom.get(tool) {
        Some(Value::Table(current)) => {
            let mut merged = current.clone();
            for (key, value) in partial {
                merged.insert(key, value);
            }
            Value::Table(merged)
        }
        _ => Value::Table(partial),
    };
    config.custom.set(tool, updated);
}

/// Shape-tolerant scalar read of a string field from a tool section.
///
/// Sections normally arrive as mappings, but a host may have replaced one
/// with an arbitrary value; anything non-mapping reads as absent.
pub fn section_str_field<'a>(section: &'a Value, name: &str) -> Option<&'a str> {
    section.as_table()?.get(name)?.as_str()
}

// ============================================================================
// tests
// ============================================================================
