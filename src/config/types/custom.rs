//! The `custom` extension region of the host configuration.
//!
//! Hosts hand tools a `custom` area that comes in one of two shapes:
//! a plain key/value mapping (anything loaded from `toolhost.toml`), or an
//! attribute-bearing object built programmatically by the host. Tools must
//! never assume which shape is present, so both variants implement the same
//! `contains`/`get`/`set` operations and the reconciler dispatches through
//! the enum instead of probing capabilities.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use toml::{Table, Value};

// ============================================================================
// CustomSection
// ============================================================================

/// Extension region of the host config, in either of its two shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomSection {
    /// Key/value mapping, the shape produced by deserializing `toolhost.toml`.
    Mapping(Table),
    /// Attribute-bearing object, built programmatically by the host.
    Attribute(AttributeRegion),
}

impl Default for CustomSection {
    fn default() -> Self {
        Self::Mapping(Table::new())
    }
}

impl CustomSection {
    /// Whether a tool section with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        match self {
            Self::Mapping(table) => table.contains_key(name),
            Self::Attribute(region) => region.contains(name),
        }
    }

    /// Current value of the named tool section.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Self::Mapping(table) => table.get(name),
            Self::Attribute(region) => region.get(name),
        }
    }

    /// Store a tool section, replacing any previous value.
    ///
    /// The store uses whichever representation the region already has;
    /// the shape never changes as a side effect of a write.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        match self {
            Self::Mapping(table) => {
                table.insert(name.into(), value);
            }
            Self::Attribute(region) => region.set(name, value),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Mapping(table) => table.is_empty(),
            Self::Attribute(region) => region.is_empty(),
        }
    }
}

impl Serialize for CustomSection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Mapping(table) => table.serialize(serializer),
            Self::Attribute(region) => {
                serializer.collect_map(region.iter().map(|attr| (&attr.name, &attr.value)))
            }
        }
    }
}

// Config files always produce the mapping shape; the attribute shape only
// ever exists in memory, constructed by a host.
impl<'de> Deserialize<'de> for CustomSection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Table::deserialize(deserializer).map(Self::Mapping)
    }
}

// ============================================================================
// AttributeRegion
// ============================================================================

/// A named attribute slot on an attribute-backed extension region.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub name: String,
    pub value: Value,
}

/// Attribute-backed extension region.
///
/// Attributes keep declaration order and are looked up linearly by name,
/// mirroring a host object whose tool sections are declared fields rather
/// than map entries. Setting an unknown name declares a new attribute.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeRegion {
    attrs: Vec<Attribute>,
}

impl AttributeRegion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute declaration.
    pub fn with_attr(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.position(name).map(|i| &self.attrs[i].value)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.position(&name) {
            Some(i) => self.attrs[i].value = value,
            None => self.attrs.push(Attribute { name, value }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.attrs.iter()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.attrs.iter().position(|attr| attr.name == name)
    }
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_ops() {
        let mut custom = CustomSection::default();
        assert!(!custom.contains("mediatool"));
        assert!(custom.is_empty());

        custom.set("mediatool", Value::Integer(1));
        assert!(custom.contains("mediatool"));
        assert_eq!(custom.get("mediatool"), Some(&Value::Integer(1)));

        // Overwrite keeps a single entry
        custom.set("mediatool", Value::Integer(2));
        assert_eq!(custom.get("mediatool"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_attribute_ops() {
        let region = AttributeRegion::new().with_attr("other", Value::Boolean(true));
        let mut custom = CustomSection::Attribute(region);

        assert!(custom.contains("other"));
        assert!(!custom.contains("mediatool"));

        custom.set("mediatool", Value::Integer(1));
        assert_eq!(custom.get("mediatool"), Some(&Value::Integer(1)));

        // Write does not change the representation
        assert!(matches!(custom, CustomSection::Attribute(_)));
    }

    #[test]
    fn test_attribute_order_preserved() {
        let region = AttributeRegion::new()
            .with_attr("b", Value::Integer(2))
            .with_attr("a", Value::Integer(1));
        let names: Vec<_> = region.iter().map(|attr| attr.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn test_deserialize_always_mapping() {
        let custom: CustomSection = toml::from_str("[mediatool]\nquality = 80").unwrap();
        assert!(matches!(custom, CustomSection::Mapping(_)));
        let section = custom.get("mediatool").unwrap();
        assert_eq!(section.get("quality"), Some(&Value::Integer(80)));
    }

    #[test]
    fn test_both_shapes_serialize_as_table() {
        let mut mapping = CustomSection::default();
        mapping.set("tool", Value::Integer(1));

        let attribute =
            CustomSection::Attribute(AttributeRegion::new().with_attr("tool", Value::Integer(1)));

        let a = toml::to_string(&mapping).unwrap();
        let b = toml::to_string(&attribute).unwrap();
        assert_eq!(a, b);
    }
}
