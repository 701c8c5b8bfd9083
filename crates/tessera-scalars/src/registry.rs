//! # Scalar Capability Registry
//!
//! Primitive codecs are consumed strictly through the [`Scalar`] trait: one
//! object per builtin type name, each knowing how to move its values between
//! wire bytes and the structural [`AbiValue`] form. The schema compiler never
//! special-cases a primitive; it looks the name up here and delegates.
//!
//! [`ScalarRegistry::standard()`] holds the full builtin set and is built
//! exactly once per process. Custom registries (e.g. a subset, or additional
//! chain-specific primitives) can be assembled with [`ScalarRegistry::empty`]
//! and [`ScalarRegistry::register`].

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use crate::cursor::ByteCursor;
use crate::error::ScalarError;
use crate::value::AbiValue;

/// One primitive wire codec.
///
/// Implementations are stateless and shareable; every method is pure with
/// respect to the codec itself.
pub trait Scalar: Send + Sync {
    /// The builtin type name this codec is registered under.
    fn name(&self) -> &'static str;

    /// Append the wire encoding of a *canonical* value to `out`.
    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError>;

    /// Consume the wire encoding from `cur`, yielding the canonical value.
    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError>;

    /// Validate an interchange value and normalize it to canonical form
    /// (e.g. parse an ISO timestamp to microseconds, hex text to bytes,
    /// range-check an integer).
    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError>;

    /// Map a canonical value to its interchange form. The default is the
    /// identity; blob and time scalars override it.
    fn to_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        Ok(value.clone())
    }
}

/// Name-keyed set of [`Scalar`] codecs.
#[derive(Clone, Default)]
pub struct ScalarRegistry {
    map: BTreeMap<&'static str, Arc<dyn Scalar>>,
}

impl ScalarRegistry {
    /// An empty registry, for callers assembling a custom capability set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a codec under its own name, replacing any previous entry.
    pub fn register(&mut self, scalar: Arc<dyn Scalar>) {
        self.map.insert(scalar.name(), scalar);
    }

    /// Look up a codec by type name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Scalar>> {
        self.map.get(name)
    }

    /// Look up a codec, erroring with the requested name on a miss.
    pub fn require(&self, name: &str) -> Result<&Arc<dyn Scalar>, ScalarError> {
        self.get(name)
            .ok_or_else(|| ScalarError::UnknownScalar(name.to_owned()))
    }

    /// True when `name` is a registered builtin.
    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Registered names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.map.keys().copied()
    }

    /// The standard builtin set, built once per process.
    pub fn standard() -> &'static ScalarRegistry {
        static STANDARD: OnceLock<ScalarRegistry> = OnceLock::new();
        STANDARD.get_or_init(|| {
            let mut reg = ScalarRegistry::empty();
            crate::ints::register(&mut reg);
            crate::floats::register(&mut reg);
            crate::varint::register(&mut reg);
            crate::strings::register(&mut reg);
            crate::blobs::register(&mut reg);
            crate::name::register(&mut reg);
            crate::symbol::register(&mut reg);
            crate::time::register(&mut reg);
            reg
        })
    }
}

impl std::fmt::Debug for ScalarRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScalarRegistry")
            .field("names", &self.map.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_covers_builtins() {
        let reg = ScalarRegistry::standard();
        for name in [
            "bool", "int8", "int16", "int32", "int64", "int128", "uint8", "uint16", "uint32",
            "uint64", "uint128", "varuint32", "varint32", "float32", "float64", "float128",
            "bytes", "string", "checksum160", "checksum256", "checksum512", "public_key",
            "signature", "name", "symbol", "symbol_code", "asset", "extended_asset",
            "time_point", "time_point_sec", "block_timestamp_type",
        ] {
            assert!(reg.contains(name), "missing builtin {name}");
        }
    }

    #[test]
    fn test_require_unknown_scalar() {
        let err = ScalarRegistry::standard()
            .require("quaternion")
            .err()
            .unwrap();
        assert!(err.to_string().contains("quaternion"));
    }
}
