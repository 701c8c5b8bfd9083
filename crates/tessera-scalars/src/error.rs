//! # Scalar Error Types
//!
//! Errors raised by the primitive codecs. Wire-level failures carry the
//! buffer offset where decoding stopped; conversion failures name the scalar
//! and the offending value so callers can report them without extra context.

use thiserror::Error;

/// Error from a scalar encode/decode/conversion operation.
#[derive(Error, Debug)]
pub enum ScalarError {
    /// The buffer ended before the scalar was fully read.
    #[error("buffer exhausted at offset {offset}: needed {needed} more byte(s)")]
    ShortBuffer {
        /// Offset at which the read was attempted.
        offset: usize,
        /// Bytes still required by the read.
        needed: usize,
    },

    /// A variable-length integer ran past its maximum width.
    #[error("varint at offset {offset} exceeds 32 bits")]
    VarintOverflow {
        /// Offset of the first varint byte.
        offset: usize,
    },

    /// The value's structural kind does not fit the scalar.
    #[error("{scalar}: expected {expected}, got {got}")]
    TypeMismatch {
        /// Scalar type name.
        scalar: &'static str,
        /// Kinds the scalar accepts.
        expected: &'static str,
        /// Kind actually supplied.
        got: &'static str,
    },

    /// A numeric value falls outside the scalar's representable range.
    #[error("{scalar}: value {value} out of range")]
    OutOfRange {
        /// Scalar type name.
        scalar: &'static str,
        /// Display form of the rejected value.
        value: String,
    },

    /// The value violates the scalar's format constraint (bad hex, invalid
    /// name character, malformed asset string, unparseable timestamp, ...).
    #[error("{scalar}: {reason}")]
    Malformed {
        /// Scalar type name.
        scalar: &'static str,
        /// What was wrong with the input.
        reason: String,
    },

    /// The requested scalar name is not registered.
    #[error("unknown scalar type {0:?}")]
    UnknownScalar(String),
}

impl ScalarError {
    /// Shorthand for a [`ScalarError::Malformed`] with a formatted reason.
    pub fn malformed(scalar: &'static str, reason: impl Into<String>) -> Self {
        ScalarError::Malformed {
            scalar,
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`ScalarError::TypeMismatch`].
    pub fn mismatch(scalar: &'static str, expected: &'static str, got: &'static str) -> Self {
        ScalarError::TypeMismatch {
            scalar,
            expected,
            got,
        }
    }
}
