//! # Variable-Length Integers
//!
//! `varuint32` (unsigned LEB128) and `varint32` (zigzag LEB128). The same
//! LEB128 primitives also frame array counts, string lengths, and variant
//! tags throughout the wire format; those call sites use
//! [`crate::cursor::put_varuint32`] directly.

use std::sync::Arc;

use crate::cursor::{put_varint32, put_varuint32, ByteCursor};
use crate::error::ScalarError;
use crate::registry::{Scalar, ScalarRegistry};
use crate::value::AbiValue;

/// Unsigned LEB128, at most 32 bits.
pub struct VarUint32Scalar;

impl Scalar for VarUint32Scalar {
    fn name(&self) -> &'static str {
        "varuint32"
    }

    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError> {
        match self.from_structural(value)? {
            AbiValue::UInt(n) => put_varuint32(out, n as u32),
            other => return Err(ScalarError::mismatch("varuint32", "uint", other.kind())),
        }
        Ok(())
    }

    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError> {
        Ok(AbiValue::UInt(u128::from(cur.read_varuint32()?)))
    }

    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        let n = value
            .as_u128()
            .ok_or_else(|| ScalarError::mismatch("varuint32", "uint", value.kind()))?;
        if n > u128::from(u32::MAX) {
            return Err(ScalarError::OutOfRange {
                scalar: "varuint32",
                value: n.to_string(),
            });
        }
        Ok(AbiValue::UInt(n))
    }
}

/// Zigzag-encoded signed LEB128, at most 32 bits.
pub struct VarInt32Scalar;

impl Scalar for VarInt32Scalar {
    fn name(&self) -> &'static str {
        "varint32"
    }

    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError> {
        match self.from_structural(value)? {
            AbiValue::Int(n) => put_varint32(out, n as i32),
            other => return Err(ScalarError::mismatch("varint32", "int", other.kind())),
        }
        Ok(())
    }

    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError> {
        Ok(AbiValue::Int(i128::from(cur.read_varint32()?)))
    }

    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        let n = value
            .as_i128()
            .ok_or_else(|| ScalarError::mismatch("varint32", "int", value.kind()))?;
        if i32::try_from(n).is_err() {
            return Err(ScalarError::OutOfRange {
                scalar: "varint32",
                value: n.to_string(),
            });
        }
        Ok(AbiValue::Int(n))
    }
}

/// Register `varuint32` and `varint32`.
pub fn register(reg: &mut ScalarRegistry) {
    reg.register(Arc::new(VarUint32Scalar));
    reg.register(Arc::new(VarInt32Scalar));
}
