//! # Fixed-Size Blobs
//!
//! Checksums, key material, and `float128` share one shape: a fixed run of
//! raw bytes with no length prefix. Canonical form is `Bytes` of the exact
//! width; interchange form is lowercase hex.
//!
//! `public_key` (34 bytes) and `signature` (66 bytes) carry their key-type
//! tag byte inline; parsing display strings (base58 and friends) belongs to
//! the external key capability, not this crate.

use std::sync::Arc;

use crate::cursor::ByteCursor;
use crate::error::ScalarError;
use crate::registry::{Scalar, ScalarRegistry};
use crate::value::AbiValue;

/// A fixed-width raw byte run.
pub struct FixedBytesScalar {
    name: &'static str,
    width: usize,
}

impl FixedBytesScalar {
    pub(crate) const fn new(name: &'static str, width: usize) -> Self {
        Self { name, width }
    }

    fn check(&self, raw: Vec<u8>) -> Result<AbiValue, ScalarError> {
        if raw.len() != self.width {
            return Err(ScalarError::malformed(
                self.name,
                format!("expected {} bytes, got {}", self.width, raw.len()),
            ));
        }
        Ok(AbiValue::Bytes(raw))
    }
}

impl Scalar for FixedBytesScalar {
    fn name(&self) -> &'static str {
        self.name
    }

    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError> {
        match self.from_structural(value)? {
            AbiValue::Bytes(raw) => out.extend_from_slice(&raw),
            other => return Err(ScalarError::mismatch(self.name, "bytes", other.kind())),
        }
        Ok(())
    }

    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError> {
        Ok(AbiValue::Bytes(cur.take(self.width)?.to_vec()))
    }

    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        match value {
            AbiValue::Bytes(raw) => self.check(raw.clone()),
            AbiValue::String(s) => {
                let raw = hex::decode(s)
                    .map_err(|e| ScalarError::malformed(self.name, format!("invalid hex: {e}")))?;
                self.check(raw)
            }
            other => Err(ScalarError::mismatch(self.name, "bytes or hex", other.kind())),
        }
    }

    fn to_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        match value {
            AbiValue::Bytes(raw) => Ok(AbiValue::String(hex::encode(raw))),
            other => Err(ScalarError::mismatch(self.name, "bytes", other.kind())),
        }
    }
}

/// Register the checksum, key-material, and `float128` blob scalars.
pub fn register(reg: &mut ScalarRegistry) {
    for (name, width) in [
        ("checksum160", 20),
        ("checksum256", 32),
        ("checksum512", 64),
        ("public_key", 34),
        ("signature", 66),
        ("float128", 16),
    ] {
        reg.register(Arc::new(FixedBytesScalar::new(name, width)));
    }
}
