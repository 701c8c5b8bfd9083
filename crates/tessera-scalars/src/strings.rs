//! # Length-Prefixed Byte Strings and Text
//!
//! `bytes` and `string` share one wire shape: a `varuint32` byte count
//! followed by the raw payload. `string` additionally requires valid UTF-8.
//! The structural form of `bytes` is lowercase hex text.

use std::sync::Arc;

use crate::cursor::{put_varuint32, ByteCursor};
use crate::error::ScalarError;
use crate::registry::{Scalar, ScalarRegistry};
use crate::value::AbiValue;

/// `bytes`: varuint length + raw payload. Canonical form is `Bytes`,
/// interchange form is hex text.
pub struct BytesScalar;

impl Scalar for BytesScalar {
    fn name(&self) -> &'static str {
        "bytes"
    }

    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError> {
        match self.from_structural(value)? {
            AbiValue::Bytes(raw) => {
                put_varuint32(out, raw.len() as u32);
                out.extend_from_slice(&raw);
            }
            other => return Err(ScalarError::mismatch("bytes", "bytes", other.kind())),
        }
        Ok(())
    }

    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError> {
        let len = cur.read_varuint32()? as usize;
        Ok(AbiValue::Bytes(cur.take(len)?.to_vec()))
    }

    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        match value {
            AbiValue::Bytes(raw) => Ok(AbiValue::Bytes(raw.clone())),
            AbiValue::String(s) => hex::decode(s)
                .map(AbiValue::Bytes)
                .map_err(|e| ScalarError::malformed("bytes", format!("invalid hex: {e}"))),
            other => Err(ScalarError::mismatch("bytes", "bytes or hex", other.kind())),
        }
    }

    fn to_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        match value {
            AbiValue::Bytes(raw) => Ok(AbiValue::String(hex::encode(raw))),
            other => Err(ScalarError::mismatch("bytes", "bytes", other.kind())),
        }
    }
}

/// `string`: varuint length + UTF-8 payload.
pub struct StringScalar;

impl Scalar for StringScalar {
    fn name(&self) -> &'static str {
        "string"
    }

    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError> {
        let s = value
            .as_str()
            .ok_or_else(|| ScalarError::mismatch("string", "string", value.kind()))?;
        put_varuint32(out, s.len() as u32);
        out.extend_from_slice(s.as_bytes());
        Ok(())
    }

    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError> {
        let len = cur.read_varuint32()? as usize;
        let raw = cur.take(len)?;
        String::from_utf8(raw.to_vec())
            .map(AbiValue::String)
            .map_err(|e| ScalarError::malformed("string", format!("invalid utf-8: {e}")))
    }

    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        match value {
            AbiValue::String(s) => Ok(AbiValue::String(s.clone())),
            other => Err(ScalarError::mismatch("string", "string", other.kind())),
        }
    }
}

/// Register `bytes` and `string`.
pub fn register(reg: &mut ScalarRegistry) {
    reg.register(Arc::new(BytesScalar));
    reg.register(Arc::new(StringScalar));
}
