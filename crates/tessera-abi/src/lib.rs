//! # tessera-abi — Schema Compiler and Binary Codec
//!
//! Compiles a declarative schema document (aliases, structs, tagged
//! variants, plus action/table bindings) into an immutable namespace of
//! concrete wire codecs, then serves encode/decode and structural
//! conversion against it for the rest of the process lifetime.
//!
//! ## Pipeline
//!
//! ```text
//! JSON document ──> Abi ──> validate ──> AbiNamespace ──> TypeHandle
//!                    │                        │
//!                    └── fingerprint          └── encode / decode /
//!                                                 to_structural / from_structural
//! ```
//!
//! Schemas fail as a whole at build time ([`BuildError`]); codec errors are
//! local to the failing call and never corrupt the shared namespace.
//! Primitive codecs come from [`tessera_scalars`] and are consumed strictly
//! through its registry, so a caller can compile against a custom scalar set
//! with [`AbiNamespace::build_with`].
//!
//! ## Example
//!
//! ```
//! use tessera_abi::{Abi, AbiNamespace};
//! use tessera_scalars::AbiValue;
//!
//! let abi = Abi::from_json(r#"{
//!     "structs": [{"name": "transfer", "fields": [
//!         {"name": "from", "type": "name"},
//!         {"name": "to", "type": "name"},
//!         {"name": "memo", "type": "string?"}
//!     ]}]
//! }"#)?;
//! let ns = AbiNamespace::build(abi)?;
//! let transfer = ns.require("transfer")?;
//!
//! let value = AbiValue::map(vec![
//!     ("from", AbiValue::from("alice")),
//!     ("to", AbiValue::from("bob")),
//!     ("memo", AbiValue::Null),
//! ]);
//! let bytes = transfer.encode(&value)?;
//! assert_eq!(transfer.decode(&bytes)?, value);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod codec;
pub mod defs;
pub mod error;
pub mod fingerprint;
pub mod namespace;
pub mod resolve;
pub mod store;
pub mod validate;

pub use codec::VARIANT_TAG;
pub use defs::{Abi, ActionDef, AliasDef, FieldDef, StructDef, TableDef, VariantDef};
pub use error::{
    BuildError, ConvertError, DecodeError, EncodeError, ResolveError, ValidationError,
};
pub use fingerprint::AbiFingerprint;
pub use namespace::{AbiNamespace, TypeHandle};
pub use resolve::{bare_name, strip_modifiers, Modifier, ResolvedKind, ResolvedType};
pub use validate::validate;

// The value and cursor types cross the crate boundary constantly; re-export
// them so downstream users need only one import root.
pub use tessera_scalars::{AbiValue, ByteCursor, ScalarRegistry};
