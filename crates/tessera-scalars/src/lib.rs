//! # tessera-scalars — Primitive Wire Codecs
//!
//! The leaf crate of the Tessera stack: it owns the structural value type
//! ([`AbiValue`]), the buffer cursor, and one [`Scalar`] codec per builtin
//! wire type. The schema compiler in `tessera-abi` consumes these strictly
//! through the [`Scalar`] trait and [`ScalarRegistry`]; nothing here knows
//! that schemas exist.
//!
//! ## Wire Conventions
//!
//! - Fixed-width integers and floats are little-endian.
//! - `varuint32` is unsigned LEB128; `varint32` adds zigzag.
//! - `bytes`/`string` are varuint-length-prefixed.
//! - Checksums, key material, and `float128` are raw fixed-width runs.
//! - Names, symbols, and assets pack into 64-bit words with canonical
//!   string forms (`"eosio"`, `"4,EOS"`, `"1.0000 EOS"`).
//!
//! ## Crate Policy
//!
//! - No dependencies on other `tessera-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code, no `panic!()`/`.unwrap()` outside tests.
//! - Every codec is stateless and shareable across threads.

pub mod blobs;
pub mod cursor;
pub mod error;
pub mod floats;
pub mod ints;
pub mod name;
pub mod registry;
pub mod strings;
pub mod symbol;
pub mod time;
pub mod value;
pub mod varint;

// Re-export primary types for ergonomic imports.
pub use cursor::{put_varint32, put_varuint32, ByteCursor};
pub use error::ScalarError;
pub use registry::{Scalar, ScalarRegistry};
pub use value::AbiValue;

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_every_int_scalar_round_trips(v in any::<u32>()) {
            let reg = ScalarRegistry::standard();
            for name in ["uint32", "uint64", "uint128", "varuint32"] {
                let c = reg.get(name).unwrap();
                let value = AbiValue::UInt(u128::from(v));
                let mut buf = Vec::new();
                c.encode(&value, &mut buf).unwrap();
                let mut cur = ByteCursor::new(&buf);
                prop_assert_eq!(c.decode(&mut cur).unwrap(), value);
                prop_assert!(cur.is_empty());
            }
        }

        #[test]
        fn prop_string_round_trips(s in ".*") {
            let c = ScalarRegistry::standard().get("string").unwrap();
            let value = AbiValue::String(s);
            let mut buf = Vec::new();
            c.encode(&value, &mut buf).unwrap();
            let mut cur = ByteCursor::new(&buf);
            prop_assert_eq!(c.decode(&mut cur).unwrap(), value);
        }

        #[test]
        fn prop_bytes_structural_round_trips(raw in proptest::collection::vec(any::<u8>(), 0..64)) {
            let c = ScalarRegistry::standard().get("bytes").unwrap();
            let canon = AbiValue::Bytes(raw);
            let structural = c.to_structural(&canon).unwrap();
            prop_assert_eq!(c.from_structural(&structural).unwrap(), canon);
        }
    }
}
