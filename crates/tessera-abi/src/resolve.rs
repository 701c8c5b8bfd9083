//! # Type-Reference Resolution
//!
//! A type reference is a bare name plus zero or more trailing modifier
//! suffixes, read right to left: `[]` (array), `?` (optional), `$`
//! (extension). The rightmost suffix is the outermost modifier, so
//! `uint8[]?` is an optional array of `uint8`.
//!
//! Resolution strips the use site's modifiers, then follows alias hops until
//! the bare name lands on a builtin, struct, or variant. Each hop may add its
//! own modifiers; those sit inside the use site's, so an alias
//! `coins = asset?` used as `coins[]` yields array-of-optional-asset.

use tessera_scalars::ScalarRegistry;

use crate::defs::Abi;
use crate::error::ResolveError;

/// One wire-shaping modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    /// `?`: presence byte, then the inner encoding when present.
    Optional,
    /// `$`: trailing field whose presence is inferred from buffer length.
    Extension,
    /// `[]`: varuint element count, then the inner encodings.
    Array,
}

impl Modifier {
    /// The suffix spelling of this modifier.
    pub fn suffix(&self) -> &'static str {
        match self {
            Modifier::Optional => "?",
            Modifier::Extension => "$",
            Modifier::Array => "[]",
        }
    }
}

/// What kind of definition a bare name landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedKind {
    /// A primitive from the scalar registry.
    Builtin,
    /// A declared struct.
    Struct,
    /// A declared variant.
    Variant,
}

/// The outcome of resolving one type reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    /// The reference as written, modifiers included.
    pub original_name: String,
    /// The bare leaf name after all alias hops.
    pub resolved_name: String,
    /// The alias names crossed to reach the leaf, in hop order.
    pub alias_chain: Vec<String>,
    /// What the leaf is.
    pub kind: ResolvedKind,
    /// The full modifier stack, outermost first.
    pub modifiers: Vec<Modifier>,
}

impl ResolvedType {
    pub fn is_builtin(&self) -> bool {
        self.kind == ResolvedKind::Builtin
    }

    pub fn is_struct(&self) -> bool {
        self.kind == ResolvedKind::Struct
    }

    pub fn is_variant(&self) -> bool {
        self.kind == ResolvedKind::Variant
    }
}

/// Split a reference into its bare name and modifier stack, outermost first.
pub fn strip_modifiers(name: &str) -> (&str, Vec<Modifier>) {
    let mut bare = name;
    let mut modifiers = Vec::new();
    loop {
        if let Some(rest) = bare.strip_suffix('$') {
            modifiers.push(Modifier::Extension);
            bare = rest;
        } else if let Some(rest) = bare.strip_suffix('?') {
            modifiers.push(Modifier::Optional);
            bare = rest;
        } else if let Some(rest) = bare.strip_suffix("[]") {
            modifiers.push(Modifier::Array);
            bare = rest;
        } else {
            return (bare, modifiers);
        }
    }
}

/// The bare name of a reference, modifiers discarded.
pub fn bare_name(name: &str) -> &str {
    strip_modifiers(name).0
}

impl Abi {
    /// Resolve one type reference against this schema and a scalar registry.
    pub fn resolve_type(
        &self,
        name: &str,
        scalars: &ScalarRegistry,
    ) -> Result<ResolvedType, ResolveError> {
        let aliases = self.alias_map();
        let (mut bare, mut modifiers) = strip_modifiers(name);
        let mut alias_chain: Vec<String> = Vec::new();

        loop {
            let kind = if scalars.contains(bare) {
                Some(ResolvedKind::Builtin)
            } else if self.struct_named(bare).is_some() {
                Some(ResolvedKind::Struct)
            } else if self.variant_named(bare).is_some() {
                Some(ResolvedKind::Variant)
            } else {
                None
            };
            if let Some(kind) = kind {
                return Ok(ResolvedType {
                    original_name: name.to_owned(),
                    resolved_name: bare.to_owned(),
                    alias_chain,
                    kind,
                    modifiers,
                });
            }

            let alias = aliases
                .get(bare)
                .ok_or_else(|| ResolveError::UnknownType(bare.to_owned()))?;
            if alias_chain.iter().any(|seen| seen == bare) {
                alias_chain.push(bare.to_owned());
                return Err(ResolveError::CyclicAlias { path: alias_chain });
            }
            alias_chain.push(bare.to_owned());
            // hop modifiers sit inside everything already collected
            let (next, hop_modifiers) = strip_modifiers(&alias.target);
            modifiers.extend(hop_modifiers);
            bare = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Abi {
        Abi::from_json(
            r#"{
                "types": [
                    {"new_type_name": "account", "type": "name"},
                    {"new_type_name": "coins", "type": "asset?"},
                    {"new_type_name": "meters", "type": "distance"},
                    {"new_type_name": "distance", "type": "meters"}
                ],
                "structs": [{"name": "row", "fields": [{"name": "x", "type": "uint32"}]}],
                "variants": [{"name": "id", "types": ["uint64", "string"]}]
            }"#,
        )
        .unwrap()
    }

    fn resolve(name: &str) -> Result<ResolvedType, ResolveError> {
        schema().resolve_type(name, ScalarRegistry::standard())
    }

    #[test]
    fn test_suffixes_read_right_to_left() {
        let (bare, mods) = strip_modifiers("uint8[]?");
        assert_eq!(bare, "uint8");
        assert_eq!(mods, vec![Modifier::Optional, Modifier::Array]);

        let (bare, mods) = strip_modifiers("string$");
        assert_eq!(bare, "string");
        assert_eq!(mods, vec![Modifier::Extension]);
    }

    #[test]
    fn test_builtin_struct_variant_kinds() {
        assert_eq!(resolve("uint32").unwrap().kind, ResolvedKind::Builtin);
        assert_eq!(resolve("row").unwrap().kind, ResolvedKind::Struct);
        assert_eq!(resolve("id").unwrap().kind, ResolvedKind::Variant);
    }

    #[test]
    fn test_alias_hop_records_chain() {
        let r = resolve("account[]").unwrap();
        assert_eq!(r.resolved_name, "name");
        assert_eq!(r.alias_chain, vec!["account"]);
        assert_eq!(r.modifiers, vec![Modifier::Array]);
    }

    #[test]
    fn test_alias_modifiers_sit_inside_use_site_modifiers() {
        // coins = asset?; coins[] is array-of-optional-asset
        let r = resolve("coins[]").unwrap();
        assert_eq!(r.resolved_name, "asset");
        assert_eq!(r.modifiers, vec![Modifier::Array, Modifier::Optional]);
    }

    #[test]
    fn test_cyclic_alias_reports_path() {
        let err = resolve("meters").unwrap_err();
        assert_eq!(
            err,
            ResolveError::CyclicAlias {
                path: vec!["meters".into(), "distance".into(), "meters".into()]
            }
        );
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(
            resolve("mystery?").unwrap_err(),
            ResolveError::UnknownType("mystery".into())
        );
    }
}
