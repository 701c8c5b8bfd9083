//! # Time Scalars
//!
//! Three wire clocks, all little-endian integers:
//!
//! - `time_point`: microseconds since the Unix epoch, `i64`.
//! - `time_point_sec`: seconds since the Unix epoch, `u32`.
//! - `block_timestamp_type`: half-second slots since 2000-01-01T00:00:00Z, `u32`.
//!
//! Canonical in-memory form is the raw integer; the interchange form is an
//! ISO-8601 string at the clock's own precision. Conversion accepts either.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::cursor::ByteCursor;
use crate::error::ScalarError;
use crate::registry::{Scalar, ScalarRegistry};
use crate::value::AbiValue;

/// Milliseconds between the Unix epoch and 2000-01-01T00:00:00Z.
const BLOCK_EPOCH_MS: i64 = 946_684_800_000;
/// Milliseconds per block timestamp slot.
const SLOT_MS: i64 = 500;

fn parse_iso(scalar: &'static str, s: &str) -> Result<NaiveDateTime, ScalarError> {
    NaiveDateTime::parse_from_str(s.trim_end_matches('Z'), "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| ScalarError::malformed(scalar, format!("unparseable timestamp {s:?}: {e}")))
}

fn render(micros: i64, fmt: &str) -> String {
    DateTime::<Utc>::from_timestamp_micros(micros)
        .map(|dt| dt.naive_utc().format(fmt).to_string())
        .unwrap_or_else(|| micros.to_string())
}

/// Which of the three wire clocks a [`TimeScalar`] speaks.
#[derive(Clone, Copy)]
enum Clock {
    /// `i64` microseconds.
    Micros,
    /// `u32` seconds.
    Seconds,
    /// `u32` half-second slots from the year-2000 epoch.
    Slots,
}

/// A time scalar: one of the three wire clocks.
pub struct TimeScalar {
    name: &'static str,
    clock: Clock,
}

impl TimeScalar {
    /// Canonical integer for this clock from either an integer or ISO text.
    fn canonical_int(&self, value: &AbiValue) -> Result<i128, ScalarError> {
        let ticks = match value {
            AbiValue::Int(_) | AbiValue::UInt(_) => value.as_i128().ok_or_else(|| {
                ScalarError::OutOfRange {
                    scalar: self.name,
                    value: format!("{value}"),
                }
            })?,
            AbiValue::String(s) => {
                let micros = parse_iso(self.name, s)?.and_utc().timestamp_micros();
                match self.clock {
                    Clock::Micros => i128::from(micros),
                    Clock::Seconds => i128::from(micros / 1_000_000),
                    Clock::Slots => i128::from((micros / 1_000 - BLOCK_EPOCH_MS) / SLOT_MS),
                }
            }
            other => return Err(ScalarError::mismatch(self.name, "int or timestamp", other.kind())),
        };
        let fits = match self.clock {
            Clock::Micros => i64::try_from(ticks).is_ok(),
            Clock::Seconds | Clock::Slots => u32::try_from(ticks).is_ok(),
        };
        if !fits {
            return Err(ScalarError::OutOfRange {
                scalar: self.name,
                value: ticks.to_string(),
            });
        }
        Ok(ticks)
    }
}

impl Scalar for TimeScalar {
    fn name(&self) -> &'static str {
        self.name
    }

    fn encode(&self, value: &AbiValue, out: &mut Vec<u8>) -> Result<(), ScalarError> {
        let ticks = self.canonical_int(value)?;
        match self.clock {
            Clock::Micros => out.extend_from_slice(&(ticks as i64).to_le_bytes()),
            Clock::Seconds | Clock::Slots => out.extend_from_slice(&(ticks as u32).to_le_bytes()),
        }
        Ok(())
    }

    fn decode(&self, cur: &mut ByteCursor<'_>) -> Result<AbiValue, ScalarError> {
        Ok(match self.clock {
            Clock::Micros => AbiValue::Int(i128::from(i64::from_le_bytes(cur.take_array::<8>()?))),
            Clock::Seconds | Clock::Slots => {
                AbiValue::Int(i128::from(u32::from_le_bytes(cur.take_array::<4>()?)))
            }
        })
    }

    fn from_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        Ok(AbiValue::Int(self.canonical_int(value)?))
    }

    fn to_structural(&self, value: &AbiValue) -> Result<AbiValue, ScalarError> {
        let ticks = value.as_i128().ok_or_else(|| {
            ScalarError::mismatch(self.name, "int", value.kind())
        })?;
        let out_of_range = || ScalarError::OutOfRange {
            scalar: self.name,
            value: ticks.to_string(),
        };
        let rendered = match self.clock {
            Clock::Micros => {
                let micros = i64::try_from(ticks).map_err(|_| out_of_range())?;
                render(micros, "%Y-%m-%dT%H:%M:%S%.6f")
            }
            Clock::Seconds => {
                let secs = u32::try_from(ticks).map_err(|_| out_of_range())?;
                render(i64::from(secs) * 1_000_000, "%Y-%m-%dT%H:%M:%S")
            }
            Clock::Slots => {
                let slots = u32::try_from(ticks).map_err(|_| out_of_range())?;
                render(
                    (i64::from(slots) * SLOT_MS + BLOCK_EPOCH_MS) * 1_000,
                    "%Y-%m-%dT%H:%M:%S%.3f",
                )
            }
        };
        Ok(AbiValue::String(rendered))
    }
}

/// Register the three time scalars.
pub fn register(reg: &mut ScalarRegistry) {
    reg.register(Arc::new(TimeScalar {
        name: "time_point",
        clock: Clock::Micros,
    }));
    reg.register(Arc::new(TimeScalar {
        name: "time_point_sec",
        clock: Clock::Seconds,
    }));
    reg.register(Arc::new(TimeScalar {
        name: "block_timestamp_type",
        clock: Clock::Slots,
    }));
}
