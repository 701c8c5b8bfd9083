//! # Schema Validation
//!
//! Fail-fast structural checks run once before any codec is generated, in a
//! fixed order so callers see deterministic errors:
//!
//! 1. duplicate names (builtins count as taken),
//! 2. alias targets exist,
//! 3. the alias graph is acyclic,
//! 4. per-struct checks: base resolves to a struct, field types exist,
//!    extension fields are trailing,
//! 5. structs used as bases declare no extension fields of their own,
//! 6. variant arms exist.
//!
//! A schema that passes here can still fail namespace construction in exactly
//! one way: cyclic struct inheritance, which the builder reports itself.

use std::collections::HashSet;

use tessera_scalars::ScalarRegistry;

use crate::defs::Abi;
use crate::error::ValidationError;
use crate::resolve::bare_name;

/// Validate a schema document against a scalar registry.
pub fn validate(abi: &Abi, scalars: &ScalarRegistry) -> Result<(), ValidationError> {
    check_duplicates(abi, scalars)?;
    check_alias_targets(abi, scalars)?;
    check_alias_cycles(abi)?;
    check_structs(abi, scalars)?;
    check_base_hygiene(abi)?;
    check_variant_arms(abi, scalars)?;
    tracing::debug!(
        structs = abi.structs.len(),
        variants = abi.variants.len(),
        aliases = abi.types.len(),
        "schema validated"
    );
    Ok(())
}

/// Every declared name must be known; builtins complete the picture.
fn defined_names<'a>(abi: &'a Abi, scalars: &'a ScalarRegistry) -> HashSet<&'a str> {
    let mut defined: HashSet<&'a str> = scalars.names().collect();
    defined.extend(abi.types.iter().map(|a| a.new_type_name.as_str()));
    defined.extend(abi.structs.iter().map(|s| s.name.as_str()));
    defined.extend(abi.variants.iter().map(|v| v.name.as_str()));
    defined
}

fn check_duplicates(abi: &Abi, scalars: &ScalarRegistry) -> Result<(), ValidationError> {
    let mut seen: HashSet<&str> = scalars.names().collect();
    let declared = abi
        .types
        .iter()
        .map(|a| ("alias", a.new_type_name.as_str()))
        .chain(abi.structs.iter().map(|s| ("struct", s.name.as_str())))
        .chain(abi.variants.iter().map(|v| ("variant", v.name.as_str())));
    for (kind, name) in declared {
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateName {
                kind,
                name: name.to_owned(),
            });
        }
    }
    Ok(())
}

fn check_alias_targets(abi: &Abi, scalars: &ScalarRegistry) -> Result<(), ValidationError> {
    let defined = defined_names(abi, scalars);
    for alias in &abi.types {
        let target = bare_name(&alias.target);
        if !defined.contains(target) {
            return Err(ValidationError::UndefinedType {
                site: format!("alias {}", alias.new_type_name),
                type_name: target.to_owned(),
            });
        }
    }
    Ok(())
}

fn check_alias_cycles(abi: &Abi) -> Result<(), ValidationError> {
    let aliases = abi.alias_map();
    for root in &abi.types {
        let mut path: Vec<String> = Vec::new();
        let mut cursor = root.new_type_name.as_str();
        while let Some(alias) = aliases.get(cursor) {
            if path.iter().any(|seen| seen == cursor) {
                path.push(cursor.to_owned());
                return Err(ValidationError::CyclicAlias { path });
            }
            path.push(cursor.to_owned());
            cursor = bare_name(&alias.target);
        }
    }
    Ok(())
}

fn check_structs(abi: &Abi, scalars: &ScalarRegistry) -> Result<(), ValidationError> {
    let defined = defined_names(abi, scalars);
    for sdef in &abi.structs {
        if let Some(base) = sdef.base() {
            let resolved = abi
                .resolve_type(base, scalars)
                .map_err(|_| ValidationError::UndefinedType {
                    site: format!("struct {}, base", sdef.name),
                    type_name: bare_name(base).to_owned(),
                })?;
            if !resolved.is_struct() {
                return Err(ValidationError::BaseNotStruct {
                    name: sdef.name.clone(),
                    base: base.to_owned(),
                });
            }
        }
        let mut seen_extension = false;
        for field in &sdef.fields {
            if !defined.contains(bare_name(&field.type_name)) {
                return Err(ValidationError::UndefinedType {
                    site: format!("struct {}, field {}", sdef.name, field.name),
                    type_name: bare_name(&field.type_name).to_owned(),
                });
            }
            if field.type_name.ends_with('$') {
                seen_extension = true;
            } else if seen_extension {
                return Err(ValidationError::ExtensionOrder {
                    name: sdef.name.clone(),
                    field: field.name.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Structs other structs inherit from must not declare extension fields,
/// otherwise the derived struct's own fields would follow them.
fn check_base_hygiene(abi: &Abi) -> Result<(), ValidationError> {
    let structs = abi.struct_map();
    let aliases = abi.alias_map();
    for sdef in &abi.structs {
        let Some(base) = sdef.base() else { continue };
        // follow alias hops by hand; cycles were ruled out above
        let mut cursor = bare_name(base);
        while let Some(alias) = aliases.get(cursor) {
            cursor = bare_name(&alias.target);
        }
        let Some(base_def) = structs.get(cursor) else {
            continue;
        };
        if let Some(field) = base_def.fields.iter().find(|f| f.type_name.ends_with('$')) {
            return Err(ValidationError::BaseExtensionField {
                base: base_def.name.clone(),
                field: field.name.clone(),
            });
        }
    }
    Ok(())
}

fn check_variant_arms(abi: &Abi, scalars: &ScalarRegistry) -> Result<(), ValidationError> {
    let defined = defined_names(abi, scalars);
    for vdef in &abi.variants {
        for arm in &vdef.types {
            if !defined.contains(bare_name(arm)) {
                return Err(ValidationError::UndefinedType {
                    site: format!("variant {}", vdef.name),
                    type_name: bare_name(arm).to_owned(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(json: &str) -> Result<(), ValidationError> {
        validate(&Abi::from_json(json).unwrap(), ScalarRegistry::standard())
    }

    #[test]
    fn test_valid_schema_passes() {
        check(
            r#"{
                "types": [{"new_type_name": "account", "type": "name"}],
                "structs": [
                    {"name": "header", "fields": [{"name": "seq", "type": "uint64"}]},
                    {"name": "row", "base": "header", "fields": [
                        {"name": "owner", "type": "account"},
                        {"name": "memo", "type": "string$"}
                    ]}
                ],
                "variants": [{"name": "id", "types": ["uint64", "account"]}]
            }"#,
        )
        .unwrap();
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = check(
            r#"{"structs": [
                {"name": "row", "fields": []},
                {"name": "row", "fields": []}
            ]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateName { kind: "struct", .. }));
    }

    #[test]
    fn test_builtin_collision_rejected() {
        let err = check(r#"{"structs": [{"name": "uint32", "fields": []}]}"#).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateName { .. }));
    }

    #[test]
    fn test_undefined_field_type() {
        let err = check(
            r#"{"structs": [{"name": "row", "fields": [{"name": "x", "type": "mystery"}]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::UndefinedType { .. }));
    }

    #[test]
    fn test_alias_cycle_reports_full_path() {
        let err = check(
            r#"{"types": [
                {"new_type_name": "meters", "type": "distance"},
                {"new_type_name": "distance", "type": "meters"}
            ]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::CyclicAlias {
                path: vec!["meters".into(), "distance".into(), "meters".into()]
            }
        );
    }

    #[test]
    fn test_extension_must_trail() {
        let err = check(
            r#"{"structs": [{"name": "row", "fields": [
                {"name": "a", "type": "string$"},
                {"name": "b", "type": "uint32"}
            ]}]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::ExtensionOrder {
                name: "row".into(),
                field: "b".into()
            }
        );
    }

    #[test]
    fn test_trailing_extensions_allowed() {
        check(
            r#"{"structs": [{"name": "row", "fields": [
                {"name": "a", "type": "uint32"},
                {"name": "b", "type": "string$"},
                {"name": "c", "type": "uint16$"}
            ]}]}"#,
        )
        .unwrap();
    }

    #[test]
    fn test_base_with_extension_field_rejected() {
        let err = check(
            r#"{"structs": [
                {"name": "header", "fields": [{"name": "memo", "type": "string$"}]},
                {"name": "row", "base": "header", "fields": []}
            ]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::BaseExtensionField {
                base: "header".into(),
                field: "memo".into()
            }
        );
    }

    #[test]
    fn test_base_must_be_struct() {
        let err = check(
            r#"{"structs": [{"name": "row", "base": "uint32", "fields": []}]}"#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ValidationError::BaseNotStruct {
                name: "row".into(),
                base: "uint32".into()
            }
        );
    }

    #[test]
    fn test_variant_arm_must_exist() {
        let err =
            check(r#"{"variants": [{"name": "id", "types": ["uint64", "mystery"]}]}"#).unwrap_err();
        assert!(matches!(err, ValidationError::UndefinedType { .. }));
    }
}
