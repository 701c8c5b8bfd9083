//! # Account Names
//!
//! The `name` scalar packs a short identifier into a single `u64`: up to 13
//! characters from the base-32 alphabet `.12345a-z`, five bits per character
//! for the first twelve and four bits for the thirteenth (which is therefore
//! restricted to `.1-5a-j`). Canonical form is the string; trailing dots are
//! not part of a canonical name.

use std::sync::Arc;

use crate::cursor::ByteCursor;
use crate::error::ScalarError;
use crate::registry::{Scalar, ScalarRegistry};
use crate::value::AbiValue;

const NAME_CHARS: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

fn char_value(c: u8) -> Option<u64> {
    match c {
        b'.' => Some(0),
        b'1'..=b'5' => Some(u64::from(c - b'1') + 1),
        b'a'..=b'z' => Some(u64::from(c - b'a') + 6),
        _ => None,
    }
}

/// Pack a name string into its `u64` wire value.
pub fn string_to_name(s: &str) -> Result<u64, ScalarError> {
    let bytes = s.as_bytes();
    if bytes.len() > 13 {
        return Err(ScalarError::malformed(
            "name",
            format!("{s:?} is longer than 13 characters"),
        ));
    }
    let mut value: u64 = 0;
    for (i, &c) in bytes.iter().enumerate() {
        let sym = char_value(c).ok_or_else(|| {
            ScalarError::malformed("name", format!("invalid character {:?} in {s:?}", c as char))
        })?;
        if i < 12 {
            value |= (sym & 0x1f) << (64 - 5 * (i + 1));
        } else {
            if sym > 0x0f {
                return Err(ScalarError::malformed(
                    "name",
                    format!("13th character of {s:?} must be one of .1-5a-j"),
                ));
            }
            value |= sym & 0x0f;
        }
    }
    Ok(value)
}

/// Unpack a `u64` wire value into its name string, trimming trailing dots.
pub fn name_to_string(mut value: u64) -> String {
    let mut chars = [b'.'; 13];
    // 12 five-bit symbols from the top, one four-bit symbol at the bottom;
    // after 12 shifts the low nibble has moved up to bits 60..63
    for (i, slot) in chars.iter_mut().enumerate() {
        let sym = if i == 12 {
            ((value >> 60) & 0x0f) as usize
        } else {
            ((value >> 59) & 0x1f) as usize
        };
        *slot = NAME_CHARS[sym];
        if i < 12 {
            value <<= 5;
        }
    }
    let s: String = chars.iter().map(|&c| c as char).collect();
    s.trim_end_matches('.').to_owned()
}

/// `name`: base-32 packed account identifier, `u64` on the wire.
pub struct NameScalar;

impl Scalar for NameScalar {
    fn name(&self) -> &'static str {
        "name"
    }

    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError> {
        let packed = match value {
            AbiValue::String(s) => string_to_name(s)?,
            AbiValue::UInt(n) => u64::try_from(*n).map_err(|_| ScalarError::OutOfRange {
                scalar: "name",
                value: n.to_string(),
            })?,
            other => return Err(ScalarError::mismatch("name", "string", other.kind())),
        };
        out.extend_from_slice(&packed.to_le_bytes());
        Ok(())
    }

    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError> {
        let raw = cur.take_array::<8>()?;
        Ok(AbiValue::String(name_to_string(u64::from_le_bytes(raw))))
    }

    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        match value {
            AbiValue::String(s) => {
                // round through the packed form so trailing dots normalize away
                Ok(AbiValue::String(name_to_string(string_to_name(s)?)))
            }
            AbiValue::UInt(n) => {
                let packed = u64::try_from(*n).map_err(|_| ScalarError::OutOfRange {
                    scalar: "name",
                    value: n.to_string(),
                })?;
                Ok(AbiValue::String(name_to_string(packed)))
            }
            other => Err(ScalarError::mismatch("name", "string", other.kind())),
        }
    }
}

/// Register the `name` scalar.
pub fn register(reg: &mut ScalarRegistry) {
    reg.register(Arc::new(NameScalar));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_packings() {
        // reference values produced by the standard base-32 name algorithm
        assert_eq!(string_to_name("").unwrap(), 0);
        assert_eq!(string_to_name("a").unwrap(), 0x3000_0000_0000_0000);
        assert_eq!(string_to_name("eosio").unwrap(), 6138663577826885632);
    }

    #[test]
    fn test_string_round_trips() {
        for s in ["", "a", "eosio", "eosio.token", "alice", "zzzzzzzzzzzzj"] {
            assert_eq!(name_to_string(string_to_name(s).unwrap()), s);
        }
    }

    #[test]
    fn test_trailing_dots_normalize() {
        let canon = NameScalar
            .from_structural(&AbiValue::from("alice....."))
            .unwrap();
        assert_eq!(canon, AbiValue::from("alice"));
    }

    #[test]
    fn test_invalid_names_rejected() {
        assert!(string_to_name("Alice").is_err()); // uppercase
        assert!(string_to_name("alice6").is_err()); // digit out of range
        assert!(string_to_name("aaaaaaaaaaaaaa").is_err()); // 14 chars
        assert!(string_to_name("zzzzzzzzzzzzz").is_err()); // 13th char not in .1-5a-j
    }

    #[test]
    fn test_wire_round_trip() {
        let mut buf = Vec::new();
        NameScalar.encode(&AbiValue::from("eosio"), &mut buf).unwrap();
        assert_eq!(buf.len(), 8);
        let mut cur = ByteCursor::new(&buf);
        assert_eq!(NameScalar.decode(&mut cur).unwrap(), AbiValue::from("eosio"));
    }
}
