//! # Symbols and Assets
//!
//! - `symbol_code`: up to seven `A-Z` characters packed into a `u64`, one
//!   byte per character from the low end.
//! - `symbol`: precision byte in the low 8 bits, symbol code above it.
//!   Canonical string form `"4,EOS"`.
//! - `asset`: signed 64-bit amount followed by its symbol. Canonical string
//!   form `"1.0000 EOS"` with exactly `precision` decimals.
//! - `extended_asset`: an asset plus the issuing contract's account name.
//!   Canonical form is the map `{quantity, contract}`.

use std::sync::Arc;

use crate::cursor::ByteCursor;
use crate::error::ScalarError;
use crate::name::{name_to_string, string_to_name};
use crate::registry::{Scalar, ScalarRegistry};
use crate::value::AbiValue;

// ---------------------------------------------------------------------------
// Packing helpers
// ---------------------------------------------------------------------------

/// Pack a symbol code string (`1..=7` chars, `A-Z`) into a `u64`.
pub fn string_to_symbol_code(s: &str) -> Result<u64, ScalarError> {
    let bytes = s.as_bytes();
    if bytes.is_empty() || bytes.len() > 7 {
        return Err(ScalarError::malformed(
            "symbol_code",
            format!("{s:?} must be 1..=7 characters"),
        ));
    }
    let mut value: u64 = 0;
    for (i, &c) in bytes.iter().enumerate() {
        if !c.is_ascii_uppercase() {
            return Err(ScalarError::malformed(
                "symbol_code",
                format!("invalid character {:?} in {s:?}", c as char),
            ));
        }
        value |= u64::from(c) << (8 * i);
    }
    Ok(value)
}

/// Unpack a `u64` symbol code into its string form.
pub fn symbol_code_to_string(mut value: u64) -> String {
    let mut s = String::new();
    while value > 0 {
        let c = (value & 0xff) as u8;
        if c == 0 {
            break;
        }
        s.push(c as char);
        value >>= 8;
    }
    s
}

fn parse_symbol(s: &str) -> Result<u64, ScalarError> {
    let (precision, code) = s
        .split_once(',')
        .ok_or_else(|| ScalarError::malformed("symbol", format!("expected \"P,CODE\", got {s:?}")))?;
    let precision: u8 = precision
        .parse()
        .map_err(|_| ScalarError::malformed("symbol", format!("invalid precision in {s:?}")))?;
    Ok(u64::from(precision) | (string_to_symbol_code(code)? << 8))
}

fn symbol_to_string(value: u64) -> String {
    format!("{},{}", value & 0xff, symbol_code_to_string(value >> 8))
}

fn parse_asset(s: &str) -> Result<(i64, u64), ScalarError> {
    let (amount_str, code) = s
        .trim()
        .split_once(' ')
        .ok_or_else(|| ScalarError::malformed("asset", format!("expected \"AMOUNT CODE\", got {s:?}")))?;
    let (digits, precision) = match amount_str.split_once('.') {
        Some((whole, frac)) => {
            if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ScalarError::malformed(
                    "asset",
                    format!("invalid fractional part in {s:?}"),
                ));
            }
            (format!("{whole}{frac}"), frac.len())
        }
        None => (amount_str.to_owned(), 0),
    };
    if precision > 18 {
        return Err(ScalarError::malformed(
            "asset",
            format!("precision {precision} exceeds 18 in {s:?}"),
        ));
    }
    let amount: i64 = digits
        .parse()
        .map_err(|_| ScalarError::malformed("asset", format!("invalid amount in {s:?}")))?;
    let symbol = u64::from(precision as u8) | (string_to_symbol_code(code)? << 8);
    Ok((amount, symbol))
}

fn asset_to_string(amount: i64, symbol: u64) -> Result<String, ScalarError> {
    let precision = (symbol & 0xff) as usize;
    // the wire carries a full precision byte; anything past 18 is not a
    // valid asset and would overflow the decimal scale below
    if precision > 18 {
        return Err(ScalarError::malformed(
            "asset",
            format!("precision {precision} exceeds 18"),
        ));
    }
    let code = symbol_code_to_string(symbol >> 8);
    let magnitude = i128::from(amount).unsigned_abs();
    let sign = if amount < 0 { "-" } else { "" };
    if precision == 0 {
        return Ok(format!("{sign}{magnitude} {code}"));
    }
    let scale = 10u128.pow(precision as u32);
    Ok(format!(
        "{sign}{}.{:0width$} {code}",
        magnitude / scale,
        magnitude % scale,
        width = precision
    ))
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// `symbol_code`: packed `u64`, canonical string form `"EOS"`.
pub struct SymbolCodeScalar;

impl Scalar for SymbolCodeScalar {
    fn name(&self) -> &'static str {
        "symbol_code"
    }

    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError> {
        let s = value
            .as_str()
            .ok_or_else(|| ScalarError::mismatch("symbol_code", "string", value.kind()))?;
        out.extend_from_slice(&string_to_symbol_code(s)?.to_le_bytes());
        Ok(())
    }

    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError> {
        let raw = cur.take_array::<8>()?;
        Ok(AbiValue::String(symbol_code_to_string(u64::from_le_bytes(
            raw,
        ))))
    }

    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        let s = value
            .as_str()
            .ok_or_else(|| ScalarError::mismatch("symbol_code", "string", value.kind()))?;
        string_to_symbol_code(s)?;
        Ok(AbiValue::String(s.to_owned()))
    }
}

/// `symbol`: precision + code, canonical string form `"4,EOS"`.
pub struct SymbolScalar;

impl Scalar for SymbolScalar {
    fn name(&self) -> &'static str {
        "symbol"
    }

    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError> {
        let s = value
            .as_str()
            .ok_or_else(|| ScalarError::mismatch("symbol", "string", value.kind()))?;
        out.extend_from_slice(&parse_symbol(s)?.to_le_bytes());
        Ok(())
    }

    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError> {
        let raw = cur.take_array::<8>()?;
        Ok(AbiValue::String(symbol_to_string(u64::from_le_bytes(raw))))
    }

    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        let s = value
            .as_str()
            .ok_or_else(|| ScalarError::mismatch("symbol", "string", value.kind()))?;
        Ok(AbiValue::String(symbol_to_string(parse_symbol(s)?)))
    }
}

/// `asset`: amount + symbol, canonical string form `"1.0000 EOS"`.
pub struct AssetScalar;

impl Scalar for AssetScalar {
    fn name(&self) -> &'static str {
        "asset"
    }

    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError> {
        let s = value
            .as_str()
            .ok_or_else(|| ScalarError::mismatch("asset", "string", value.kind()))?;
        let (amount, symbol) = parse_asset(s)?;
        out.extend_from_slice(&amount.to_le_bytes());
        out.extend_from_slice(&symbol.to_le_bytes());
        Ok(())
    }

    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError> {
        let amount = i64::from_le_bytes(cur.take_array::<8>()?);
        let symbol = u64::from_le_bytes(cur.take_array::<8>()?);
        Ok(AbiValue::String(asset_to_string(amount, symbol)?))
    }

    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        let s = value
            .as_str()
            .ok_or_else(|| ScalarError::mismatch("asset", "string", value.kind()))?;
        let (amount, symbol) = parse_asset(s)?;
        Ok(AbiValue::String(asset_to_string(amount, symbol)?))
    }
}

/// `extended_asset`: `{quantity, contract}` map, asset + name on the wire.
pub struct ExtendedAssetScalar;

impl ExtendedAssetScalar {
    fn parts(&self, value: &AbiValue) -> Result<(String, String), ScalarError> {
        let quantity = value.get("quantity").and_then(AbiValue::as_str).ok_or_else(|| {
            ScalarError::malformed("extended_asset", "missing \"quantity\" entry")
        })?;
        let contract = value.get("contract").and_then(AbiValue::as_str).ok_or_else(|| {
            ScalarError::malformed("extended_asset", "missing \"contract\" entry")
        })?;
        Ok((quantity.to_owned(), contract.to_owned()))
    }
}

impl Scalar for ExtendedAssetScalar {
    fn name(&self) -> &'static str {
        "extended_asset"
    }

    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError> {
        let (quantity, contract) = self.parts(value)?;
        let (amount, symbol) = parse_asset(&quantity)?;
        out.extend_from_slice(&amount.to_le_bytes());
        out.extend_from_slice(&symbol.to_le_bytes());
        out.extend_from_slice(&string_to_name(&contract)?.to_le_bytes());
        Ok(())
    }

    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError> {
        let amount = i64::from_le_bytes(cur.take_array::<8>()?);
        let symbol = u64::from_le_bytes(cur.take_array::<8>()?);
        let contract = u64::from_le_bytes(cur.take_array::<8>()?);
        Ok(AbiValue::map(vec![
            ("quantity", AbiValue::String(asset_to_string(amount, symbol)?)),
            ("contract", AbiValue::String(name_to_string(contract))),
        ]))
    }

    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        let (quantity, contract) = self.parts(value)?;
        let (amount, symbol) = parse_asset(&quantity)?;
        Ok(AbiValue::map(vec![
            ("quantity", AbiValue::String(asset_to_string(amount, symbol)?)),
            (
                "contract",
                AbiValue::String(name_to_string(string_to_name(&contract)?)),
            ),
        ]))
    }
}

/// Register `symbol_code`, `symbol`, `asset`, and `extended_asset`.
pub fn register(reg: &mut ScalarRegistry) {
    reg.register(Arc::new(SymbolCodeScalar));
    reg.register(Arc::new(SymbolScalar));
    reg.register(Arc::new(AssetScalar));
    reg.register(Arc::new(ExtendedAssetScalar));
}
