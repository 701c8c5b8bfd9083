//! # Schema Fingerprint
//!
//! A SHA-256 digest over the substance of a schema: struct names and own
//! fields, variant names and arms, alias pairs, in that fixed order. Actions
//! and tables are deliberately outside the digest; they bind names to types
//! without shaping the wire format.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::defs::Abi;

/// A structural digest of a schema document.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct AbiFingerprint([u8; 32]);

impl AbiFingerprint {
    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex rendering of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for AbiFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for AbiFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AbiFingerprint({})", self.to_hex())
    }
}

impl Abi {
    /// Digest the declarations that shape the wire format.
    ///
    /// Struct bases are hashed through their own field lists at the structs
    /// that declare them; inherited fields are not re-hashed per derived
    /// struct, so a base edit changes exactly one section of the digest.
    pub fn fingerprint(&self) -> AbiFingerprint {
        let mut hasher = Sha256::new();

        hasher.update(b"structs");
        for sdef in &self.structs {
            hasher.update(sdef.name.as_bytes());
            for field in &sdef.fields {
                hasher.update(field.name.as_bytes());
                hasher.update(field.type_name.as_bytes());
            }
        }

        hasher.update(b"enums");
        for vdef in &self.variants {
            hasher.update(vdef.name.as_bytes());
            for arm in &vdef.types {
                hasher.update(arm.as_bytes());
            }
        }

        hasher.update(b"aliases");
        for alias in &self.types {
            hasher.update(alias.new_type_name.as_bytes());
            hasher.update(alias.target.as_bytes());
        }

        AbiFingerprint(hasher.finalize().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Abi {
        Abi::from_json(
            r#"{
                "types": [{"new_type_name": "account", "type": "name"}],
                "structs": [{"name": "transfer", "fields": [
                    {"name": "from", "type": "account"},
                    {"name": "memo", "type": "string"}
                ]}],
                "variants": [{"name": "id", "types": ["uint64", "string"]}]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_fingerprint_is_stable() {
        assert_eq!(sample().fingerprint(), sample().fingerprint());
    }

    #[test]
    fn test_field_rename_changes_digest() {
        let mut abi = sample();
        abi.structs[0].fields[1].name = "note".into();
        assert_ne!(abi.fingerprint(), sample().fingerprint());
    }

    #[test]
    fn test_alias_target_changes_digest() {
        let mut abi = sample();
        abi.types[0].target = "uint64".into();
        assert_ne!(abi.fingerprint(), sample().fingerprint());
    }

    #[test]
    fn test_actions_and_tables_excluded() {
        let mut abi = sample();
        abi.actions.push(crate::defs::ActionDef {
            name: "transfer".into(),
            type_name: "transfer".into(),
            ricardian_contract: String::new(),
        });
        assert_eq!(abi.fingerprint(), sample().fingerprint());
    }

    #[test]
    fn test_hex_rendering() {
        let hex = sample().fingerprint().to_hex();
        assert_eq!(hex.len(), 64);
        assert!(hex.bytes().all(|b| b.is_ascii_hexdigit()));
    }
}
