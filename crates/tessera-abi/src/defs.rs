//! # Schema Document Model
//!
//! The serde-backed mirror of a schema document: aliases, structs, variants,
//! plus the action and table bindings that name struct types without shaping
//! the wire format. All collections default to empty so sparse documents
//! parse; `base: ""` and `base: null` both mean "no base".

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::BuildError;

fn null_as_empty<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(de)?.unwrap_or_default())
}

/// A named alias for another (possibly modified) type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasDef {
    /// The name the alias introduces.
    pub new_type_name: String,
    /// The aliased type reference, modifiers included.
    #[serde(rename = "type")]
    pub target: String,
}

/// One field of a struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name, unique within the struct's own fields.
    pub name: String,
    /// Type reference, modifiers included.
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A record type: ordered fields, optionally inheriting a base struct's
/// fields ahead of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDef {
    /// Struct name.
    pub name: String,
    /// Base struct name, or empty for none.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub base: String,
    /// The struct's own fields, in wire order.
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl StructDef {
    /// The base struct reference, treating the empty string as absent.
    pub fn base(&self) -> Option<&str> {
        if self.base.is_empty() {
            None
        } else {
            Some(&self.base)
        }
    }
}

/// A tagged union: the wire form is a tag (the arm's declared position)
/// followed by that arm's payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDef {
    /// Variant name.
    pub name: String,
    /// Arm type references in declaration order; position is the wire tag.
    pub types: Vec<String>,
}

/// Binding of an action name to the struct type encoding its payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDef {
    /// Action name.
    pub name: String,
    /// The struct type of the action's payload.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Optional human-readable contract text.
    #[serde(default)]
    pub ricardian_contract: String,
}

/// Binding of a table name to its row struct type and key layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDef {
    /// Table name.
    pub name: String,
    /// The struct type of one table row.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Index kind, e.g. `i64`.
    #[serde(default)]
    pub index_type: String,
    /// Names of key columns.
    #[serde(default)]
    pub key_names: Vec<String>,
    /// Types of key columns, parallel to `key_names`.
    #[serde(default)]
    pub key_types: Vec<String>,
}

/// A complete schema document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Abi {
    /// Document format version string.
    #[serde(default)]
    pub version: String,
    /// Alias declarations.
    #[serde(default)]
    pub types: Vec<AliasDef>,
    /// Struct declarations.
    #[serde(default)]
    pub structs: Vec<StructDef>,
    /// Variant declarations.
    #[serde(default)]
    pub variants: Vec<VariantDef>,
    /// Action bindings.
    #[serde(default)]
    pub actions: Vec<ActionDef>,
    /// Table bindings.
    #[serde(default)]
    pub tables: Vec<TableDef>,
}

impl Abi {
    /// Parse a schema document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, BuildError> {
        serde_json::from_str(text).map_err(|e| BuildError::Parse(e.to_string()))
    }

    /// Parse a schema document from an already-decoded JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, BuildError> {
        serde_json::from_value(value).map_err(|e| BuildError::Parse(e.to_string()))
    }

    /// Read and parse a schema document from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| BuildError::Parse(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_json(&text)
    }

    /// Look up a struct declaration by name.
    pub fn struct_named(&self, name: &str) -> Option<&StructDef> {
        self.structs.iter().find(|s| s.name == name)
    }

    /// Look up a variant declaration by name.
    pub fn variant_named(&self, name: &str) -> Option<&VariantDef> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// Look up an alias declaration by the name it introduces.
    pub fn alias_named(&self, name: &str) -> Option<&AliasDef> {
        self.types.iter().find(|a| a.new_type_name == name)
    }

    /// Alias map keyed by the introduced name.
    pub(crate) fn alias_map(&self) -> HashMap<&str, &AliasDef> {
        self.types
            .iter()
            .map(|a| (a.new_type_name.as_str(), a))
            .collect()
    }

    /// Struct map keyed by name.
    pub(crate) fn struct_map(&self) -> HashMap<&str, &StructDef> {
        self.structs.iter().map(|s| (s.name.as_str(), s)).collect()
    }

    /// Variant map keyed by name.
    pub(crate) fn variant_map(&self) -> HashMap<&str, &VariantDef> {
        self.variants.iter().map(|v| (v.name.as_str(), v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_document_parses() {
        let abi = Abi::from_json(r#"{"structs": [{"name": "empty", "fields": []}]}"#).unwrap();
        assert_eq!(abi.structs.len(), 1);
        assert!(abi.types.is_empty());
        assert!(abi.structs[0].base().is_none());
    }

    #[test]
    fn test_empty_and_null_base_mean_none() {
        let abi = Abi::from_json(
            r#"{"structs": [
                {"name": "a", "base": "", "fields": []},
                {"name": "b", "base": "a", "fields": []},
                {"name": "c", "base": null, "fields": []}
            ]}"#,
        )
        .unwrap();
        assert_eq!(abi.structs[0].base(), None);
        assert_eq!(abi.structs[1].base(), Some("a"));
        assert_eq!(abi.structs[2].base(), None);
    }

    #[test]
    fn test_type_field_renames() {
        let abi = Abi::from_json(
            r#"{
                "types": [{"new_type_name": "account", "type": "name"}],
                "structs": [{"name": "row", "fields": [{"name": "owner", "type": "account"}]}],
                "actions": [{"name": "touch", "type": "row"}],
                "tables": [{"name": "rows", "type": "row", "index_type": "i64"}]
            }"#,
        )
        .unwrap();
        assert_eq!(abi.types[0].target, "name");
        assert_eq!(abi.structs[0].fields[0].type_name, "account");
        assert_eq!(abi.actions[0].type_name, "row");
        assert_eq!(abi.tables[0].type_name, "row");
    }

    #[test]
    fn test_malformed_document_is_parse_error() {
        assert!(matches!(
            Abi::from_json("{ not json").unwrap_err(),
            BuildError::Parse(_)
        ));
    }
}
