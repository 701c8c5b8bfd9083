//! # Floating-Point Scalars
//!
//! `float32`/`float64` as little-endian IEEE-754. `float128` is an opaque
//! 16-byte blob (no host representation); it lives in [`crate::blobs`] and is
//! registered there.

use std::sync::Arc;

use crate::cursor::ByteCursor;
use crate::error::ScalarError;
use crate::registry::{Scalar, ScalarRegistry};
use crate::value::AbiValue;

/// IEEE-754 binary32 or binary64, little-endian on the wire.
pub struct FloatScalar {
    name: &'static str,
    single: bool,
}

impl FloatScalar {
    fn to_f64(&self, value: &AbiValue) -> Result<f64, ScalarError> {
        let x = match value {
            AbiValue::Float(x) => *x,
            AbiValue::Int(n) => *n as f64,
            AbiValue::UInt(n) => *n as f64,
            other => return Err(ScalarError::mismatch(self.name, "float", other.kind())),
        };
        // canonical float32 values carry only binary32 precision
        Ok(if self.single { f64::from(x as f32) } else { x })
    }
}

impl Scalar for FloatScalar {
    fn name(&self) -> &'static str {
        self.name
    }

    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError> {
        let x = self.to_f64(value)?;
        if self.single {
            out.extend_from_slice(&(x as f32).to_le_bytes());
        } else {
            out.extend_from_slice(&x.to_le_bytes());
        }
        Ok(())
    }

    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError> {
        if self.single {
            let raw = cur.take_array::<4>()?;
            Ok(AbiValue::Float(f64::from(f32::from_le_bytes(raw))))
        } else {
            let raw = cur.take_array::<8>()?;
            Ok(AbiValue::Float(f64::from_le_bytes(raw)))
        }
    }

    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        Ok(AbiValue::Float(self.to_f64(value)?))
    }
}

/// Register `float32` and `float64`.
pub fn register(reg: &mut ScalarRegistry) {
    reg.register(Arc::new(FloatScalar {
        name: "float32",
        single: true,
    }));
    reg.register(Arc::new(FloatScalar {
        name: "float64",
        single: false,
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float64_round_trip() {
        let c = ScalarRegistry::standard().get("float64").unwrap().clone();
        for x in [0.0f64, -1.5, std::f64::consts::PI, f64::MAX] {
            let mut buf = Vec::new();
            c.encode(&AbiValue::Float(x), &mut buf).unwrap();
            assert_eq!(buf.len(), 8);
            let mut cur = ByteCursor::new(&buf);
            assert_eq!(c.decode(&mut cur).unwrap(), AbiValue::Float(x));
        }
    }

    #[test]
    fn test_float32_canonicalizes_precision() {
        let c = ScalarRegistry::standard().get("float32").unwrap().clone();
        let canon = c.from_structural(&AbiValue::Float(0.1)).unwrap();
        // 0.1 is not representable in binary32; the canonical value is the
        // nearest f32, so encode/decode round-trips it exactly.
        assert_eq!(canon, AbiValue::Float(f64::from(0.1f32)));
        let mut buf = Vec::new();
        c.encode(&canon, &mut buf).unwrap();
        let mut cur = ByteCursor::new(&buf);
        assert_eq!(c.decode(&mut cur).unwrap(), canon);
    }

    #[test]
    fn test_integer_input_accepted() {
        let c = ScalarRegistry::standard().get("float64").unwrap().clone();
        assert_eq!(
            c.from_structural(&AbiValue::Int(-3)).unwrap(),
            AbiValue::Float(-3.0)
        );
    }
}
