//! # Error Taxonomy
//!
//! One enum per pipeline stage: schema validation, type resolution, namespace
//! construction, wire encode/decode, and structural conversion. Every variant
//! carries enough context to name the offending type (and field, where one
//! exists) without the caller re-walking the schema.

use thiserror::Error;

use tessera_scalars::ScalarError;

/// A structural defect found while validating a schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Two declarations share one name. Builtins count as already taken.
    #[error("duplicate type name {name:?} ({kind})")]
    DuplicateName {
        /// Which declaration space the collision happened in.
        kind: &'static str,
        /// The colliding name.
        name: String,
    },

    /// A declaration references a type nothing defines.
    #[error("{site} references undefined type {type_name:?}")]
    UndefinedType {
        /// Where the reference appears, e.g. `struct transfer, field from`.
        site: String,
        /// The referenced (bare) type name.
        type_name: String,
    },

    /// Alias chain that loops back on itself; `path` is the full walk.
    #[error("cyclic alias: {}", path.join(" -> "))]
    CyclicAlias {
        /// The alias names in walk order, ending with the repeated one.
        path: Vec<String>,
    },

    /// A struct's base must itself be a struct.
    #[error("struct {name:?} base {base:?} is not a struct")]
    BaseNotStruct {
        /// The declaring struct.
        name: String,
        /// The offending base reference.
        base: String,
    },

    /// A non-extension field appears after an extension field.
    #[error("struct {name:?} field {field:?} follows an extension field but is not one")]
    ExtensionOrder {
        /// The declaring struct.
        name: String,
        /// The misplaced field.
        field: String,
    },

    /// A struct that other structs inherit from carries an extension field.
    #[error("struct {base:?} is used as a base but declares extension field {field:?}")]
    BaseExtensionField {
        /// The base struct.
        base: String,
        /// Its extension field.
        field: String,
    },
}

/// Failure to resolve a type reference to a leaf definition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The bare name matches no builtin, struct, variant, or alias.
    #[error("unknown type {0:?}")]
    UnknownType(String),

    /// Alias hops revisited a name before reaching a leaf.
    #[error("cyclic alias: {}", path.join(" -> "))]
    CyclicAlias {
        /// The alias names in walk order, ending with the repeated one.
        path: Vec<String>,
    },
}

/// Failure to compile a schema into a namespace.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The schema failed validation; nothing was built.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A reference inside a validated schema failed to resolve.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Struct inheritance loops back on itself.
    #[error("cyclic struct inheritance: {}", path.join(" -> "))]
    BaseCycle {
        /// The struct names in walk order, ending with the repeated one.
        path: Vec<String>,
    },

    /// The schema document itself did not parse.
    #[error("malformed schema document: {0}")]
    Parse(String),
}

/// Failure to serialize a value against a compiled type.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Null reached a position with no optional or extension modifier.
    #[error("{site}: null is only valid under an optional or extension modifier")]
    UnexpectedNull {
        /// The type (and field) being encoded.
        site: String,
    },

    /// An array modifier needs a list value.
    #[error("{site}: expected a list, got {got}")]
    ExpectedList {
        /// The type (and field) being encoded.
        site: String,
        /// The kind of value actually supplied.
        got: &'static str,
    },

    /// A struct codec needs a map value.
    #[error("{site}: expected a map, got {got}")]
    ExpectedMap {
        /// The struct being encoded.
        site: String,
        /// The kind of value actually supplied.
        got: &'static str,
    },

    /// A tagged variant value names an arm the variant does not declare.
    #[error("variant {site}: unknown arm {arm:?}")]
    UnknownArm {
        /// The variant being encoded.
        site: String,
        /// The tag supplied by the value.
        arm: String,
    },

    /// An untagged value matched none of the variant's arms.
    #[error("variant {site}: value matches no declared arm")]
    NoMatchingArm {
        /// The variant being encoded.
        site: String,
    },

    /// A leaf scalar rejected the value.
    #[error("{site}: {source}")]
    Scalar {
        /// The type (and field) being encoded.
        site: String,
        /// The underlying scalar failure.
        source: ScalarError,
    },
}

/// Failure to deserialize bytes against a compiled type.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// An optional presence byte must be exactly 0 or 1.
    #[error("{site}: invalid presence byte 0x{byte:02x}")]
    BadPresenceByte {
        /// The type (and field) being decoded.
        site: String,
        /// The byte found on the wire.
        byte: u8,
    },

    /// A variant tag selected an arm index past the declared arms.
    #[error("variant {site}: tag {tag} out of range for {arms} arm(s)")]
    TagOutOfRange {
        /// The variant being decoded.
        site: String,
        /// The decoded tag.
        tag: u32,
        /// How many arms the variant declares.
        arms: usize,
    },

    /// The value ended before the buffer did.
    #[error("{site}: {trailing} byte(s) left over after decoding")]
    TrailingBytes {
        /// The type being decoded.
        site: String,
        /// How many bytes remained unread.
        trailing: usize,
    },

    /// A leaf scalar rejected the wire bytes.
    #[error("{site}: {source}")]
    Scalar {
        /// The type (and field) being decoded.
        site: String,
        /// The underlying scalar failure.
        source: ScalarError,
    },
}

/// Failure to convert between canonical and structural value forms.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Null reached a position with no optional or extension modifier.
    #[error("{site}: null is only valid under an optional or extension modifier")]
    UnexpectedNull {
        /// The type (and field) being converted.
        site: String,
    },

    /// An array modifier needs a list value.
    #[error("{site}: expected a list, got {got}")]
    ExpectedList {
        /// The type (and field) being converted.
        site: String,
        /// The kind of value actually supplied.
        got: &'static str,
    },

    /// A struct codec needs a map value.
    #[error("{site}: expected a map, got {got}")]
    ExpectedMap {
        /// The struct being converted.
        site: String,
        /// The kind of value actually supplied.
        got: &'static str,
    },

    /// A tagged variant value names an arm the variant does not declare.
    #[error("variant {site}: unknown arm {arm:?}")]
    UnknownArm {
        /// The variant being converted.
        site: String,
        /// The tag supplied by the value.
        arm: String,
    },

    /// An untagged value matched none of the variant's arms.
    #[error("variant {site}: value matches no declared arm")]
    NoMatchingArm {
        /// The variant being converted.
        site: String,
    },

    /// A leaf scalar rejected the value.
    #[error("{site}: {source}")]
    Scalar {
        /// The type (and field) being converted.
        site: String,
        /// The underlying scalar failure.
        source: ScalarError,
    },
}
