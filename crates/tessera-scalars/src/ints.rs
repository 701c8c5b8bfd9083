//! # Fixed-Width Integers and Bool
//!
//! Little-endian two's-complement encodings for `int8..int128` and
//! `uint8..uint128`, plus the single-byte `bool`. Range checks happen on
//! conversion and on encode; decode cannot fail except by buffer exhaustion.

use std::sync::Arc;

use crate::cursor::ByteCursor;
use crate::error::ScalarError;
use crate::registry::{Scalar, ScalarRegistry};
use crate::value::AbiValue;

/// A fixed-width little-endian integer codec.
pub struct IntScalar {
    name: &'static str,
    width: usize,
    signed: bool,
}

impl IntScalar {
    const fn new(name: &'static str, width: usize, signed: bool) -> Self {
        Self {
            name,
            width,
            signed,
        }
    }

    fn bits(&self) -> u32 {
        (self.width * 8) as u32
    }

    fn check_signed(&self, n: i128) -> Result<i128, ScalarError> {
        let in_range = if self.bits() == 128 {
            true
        } else {
            let min = -(1i128 << (self.bits() - 1));
            let max = (1i128 << (self.bits() - 1)) - 1;
            (min..=max).contains(&n)
        };
        if in_range {
            Ok(n)
        } else {
            Err(ScalarError::OutOfRange {
                scalar: self.name,
                value: n.to_string(),
            })
        }
    }

    fn check_unsigned(&self, n: u128) -> Result<u128, ScalarError> {
        let in_range = if self.bits() == 128 {
            true
        } else {
            n < (1u128 << self.bits())
        };
        if in_range {
            Ok(n)
        } else {
            Err(ScalarError::OutOfRange {
                scalar: self.name,
                value: n.to_string(),
            })
        }
    }

    fn canonical(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        if self.signed {
            let n = match value {
                AbiValue::Int(_) | AbiValue::UInt(_) => value
                    .as_i128()
                    .ok_or_else(|| ScalarError::OutOfRange {
                        scalar: self.name,
                        value: format!("{value}"),
                    })?,
                AbiValue::String(s) => s.parse::<i128>().map_err(|_| {
                    ScalarError::malformed(self.name, format!("not a decimal integer: {s:?}"))
                })?,
                other => return Err(ScalarError::mismatch(self.name, "int", other.kind())),
            };
            Ok(AbiValue::Int(self.check_signed(n)?))
        } else {
            let n = match value {
                AbiValue::Int(_) | AbiValue::UInt(_) => value
                    .as_u128()
                    .ok_or_else(|| ScalarError::OutOfRange {
                        scalar: self.name,
                        value: format!("{value}"),
                    })?,
                AbiValue::String(s) => s.parse::<u128>().map_err(|_| {
                    ScalarError::malformed(self.name, format!("not a decimal integer: {s:?}"))
                })?,
                other => return Err(ScalarError::mismatch(self.name, "uint", other.kind())),
            };
            Ok(AbiValue::UInt(self.check_unsigned(n)?))
        }
    }
}

impl Scalar for IntScalar {
    fn name(&self) -> &'static str {
        self.name
    }

    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError> {
        let wide = match self.canonical(value)? {
            AbiValue::Int(n) => n.to_le_bytes(),
            AbiValue::UInt(n) => n.to_le_bytes(),
            other => return Err(ScalarError::mismatch(self.name, "int", other.kind())),
        };
        out.extend_from_slice(&wide[..self.width]);
        Ok(())
    }

    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError> {
        let raw = cur.take(self.width)?;
        if self.signed {
            // sign-extend into the full 128-bit register
            let fill = if raw[self.width - 1] & 0x80 != 0 {
                0xff
            } else {
                0x00
            };
            let mut wide = [fill; 16];
            wide[..self.width].copy_from_slice(raw);
            Ok(AbiValue::Int(i128::from_le_bytes(wide)))
        } else {
            let mut wide = [0u8; 16];
            wide[..self.width].copy_from_slice(raw);
            Ok(AbiValue::UInt(u128::from_le_bytes(wide)))
        }
    }

    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        self.canonical(value)
    }
}

/// One-byte boolean: `0x00` false, `0x01` true.
pub struct BoolScalar;

impl Scalar for BoolScalar {
    fn name(&self) -> &'static str {
        "bool"
    }

    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError> {
        match self.from_structural(value)? {
            AbiValue::Bool(b) => out.push(u8::from(b)),
            other => return Err(ScalarError::mismatch("bool", "bool", other.kind())),
        }
        Ok(())
    }

    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError> {
        match cur.read_u8()? {
            0 => Ok(AbiValue::Bool(false)),
            1 => Ok(AbiValue::Bool(true)),
            other => Err(ScalarError::malformed(
                "bool",
                format!("invalid bool byte 0x{other:02x}"),
            )),
        }
    }

    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        match value {
            AbiValue::Bool(b) => Ok(AbiValue::Bool(*b)),
            AbiValue::Int(0) | AbiValue::UInt(0) => Ok(AbiValue::Bool(false)),
            AbiValue::Int(1) | AbiValue::UInt(1) => Ok(AbiValue::Bool(true)),
            other => Err(ScalarError::mismatch("bool", "bool or 0/1", other.kind())),
        }
    }
}

/// Register `bool` and the ten fixed-width integer types.
pub fn register(reg: &mut ScalarRegistry) {
    reg.register(Arc::new(BoolScalar));
    for (name, width) in [
        ("int8", 1),
        ("int16", 2),
        ("int32", 4),
        ("int64", 8),
        ("int128", 16),
    ] {
        reg.register(Arc::new(IntScalar::new(name, width, true)));
    }
    for (name, width) in [
        ("uint8", 1),
        ("uint16", 2),
        ("uint32", 4),
        ("uint64", 8),
        ("uint128", 16),
    ] {
        reg.register(Arc::new(IntScalar::new(name, width, false)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(name: &str) -> Arc<dyn Scalar> {
        ScalarRegistry::standard().get(name).unwrap().clone()
    }

    fn round_trip(name: &str, value: AbiValue) -> AbiValue {
        let c = codec(name);
        let mut buf = Vec::new();
        c.encode(&value, &mut buf).unwrap();
        let mut cur = ByteCursor::new(&buf);
        let back = c.decode(&mut cur).unwrap();
        assert!(cur.is_empty(), "{name} left bytes behind");
        back
    }

    #[test]
    fn test_uint32_little_endian() {
        let mut buf = Vec::new();
        codec("uint32").encode(&AbiValue::UInt(1), &mut buf).unwrap();
        assert_eq!(buf, vec![1, 0, 0, 0]);
    }

    #[test]
    fn test_signed_round_trips() {
        for v in [-1i128, 0, 1, i128::from(i8::MIN), i128::from(i8::MAX)] {
            assert_eq!(round_trip("int8", AbiValue::Int(v)), AbiValue::Int(v));
        }
        assert_eq!(
            round_trip("int64", AbiValue::Int(-42)),
            AbiValue::Int(-42)
        );
        assert_eq!(
            round_trip("int128", AbiValue::Int(i128::MIN)),
            AbiValue::Int(i128::MIN)
        );
    }

    #[test]
    fn test_unsigned_round_trips() {
        assert_eq!(
            round_trip("uint128", AbiValue::UInt(u128::MAX)),
            AbiValue::UInt(u128::MAX)
        );
        assert_eq!(round_trip("uint8", AbiValue::UInt(255)), AbiValue::UInt(255));
    }

    #[test]
    fn test_range_rejection() {
        assert!(codec("uint8")
            .from_structural(&AbiValue::UInt(256))
            .is_err());
        assert!(codec("int8").from_structural(&AbiValue::Int(128)).is_err());
        assert!(codec("uint32")
            .from_structural(&AbiValue::Int(-1))
            .is_err());
    }

    #[test]
    fn test_string_input_canonicalized() {
        assert_eq!(
            codec("uint64")
                .from_structural(&AbiValue::from("18446744073709551615"))
                .unwrap(),
            AbiValue::UInt(u64::MAX as u128)
        );
    }

    #[test]
    fn test_bool_wire_bytes() {
        let mut buf = Vec::new();
        codec("bool").encode(&AbiValue::Bool(true), &mut buf).unwrap();
        codec("bool").encode(&AbiValue::Bool(false), &mut buf).unwrap();
        assert_eq!(buf, vec![1, 0]);
        let mut cur = ByteCursor::new(&[2]);
        assert!(codec("bool").decode(&mut cur).is_err());
    }
}
