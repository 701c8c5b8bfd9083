//! # ByteCursor — Advancing Buffer Reader
//!
//! All decoding walks a single `ByteCursor` over the caller's buffer; there
//! is no copying and no look-behind. Reads either return the requested bytes
//! or a [`ScalarError::ShortBuffer`] carrying the absolute offset.

use crate::error::ScalarError;

/// A forward-only reader over a borrowed byte buffer.
#[derive(Debug)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    /// Start a cursor at offset zero.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Current absolute offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// True when every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Consume exactly `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], ScalarError> {
        if self.remaining() < n {
            return Err(ScalarError::ShortBuffer {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let chunk = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(chunk)
    }

    /// Consume a fixed-size array.
    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N], ScalarError> {
        let chunk = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(chunk);
        Ok(out)
    }

    /// Consume a single byte.
    pub fn read_u8(&mut self) -> Result<u8, ScalarError> {
        Ok(self.take(1)?[0])
    }

    /// Consume an unsigned LEB128 varint, at most 5 bytes / 32 bits.
    pub fn read_varuint32(&mut self) -> Result<u32, ScalarError> {
        let start = self.pos;
        let mut value: u32 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = self.read_u8()?;
            if shift == 28 && byte > 0x0f {
                return Err(ScalarError::VarintOverflow { offset: start });
            }
            value |= u32::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 28 {
                return Err(ScalarError::VarintOverflow { offset: start });
            }
        }
    }

    /// Consume a zigzag-encoded signed LEB128 varint.
    pub fn read_varint32(&mut self) -> Result<i32, ScalarError> {
        let raw = self.read_varuint32()?;
        Ok(((raw >> 1) as i32) ^ -((raw & 1) as i32))
    }
}

/// Append an unsigned LEB128 varint to `out`.
pub fn put_varuint32(out: &mut Vec<u8>, mut value: u32) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Append a zigzag-encoded signed LEB128 varint to `out`.
pub fn put_varint32(out: &mut Vec<u8>, value: i32) {
    put_varuint32(out, ((value as u32) << 1) ^ ((value >> 31) as u32));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_past_end_reports_offset() {
        let mut cur = ByteCursor::new(&[1, 2]);
        cur.take(2).unwrap();
        let err = cur.take(3).unwrap_err();
        match err {
            ScalarError::ShortBuffer { offset, needed } => {
                assert_eq!(offset, 2);
                assert_eq!(needed, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_varuint32_round_trip() {
        for value in [0u32, 1, 127, 128, 300, 16384, u32::MAX] {
            let mut buf = Vec::new();
            put_varuint32(&mut buf, value);
            let mut cur = ByteCursor::new(&buf);
            assert_eq!(cur.read_varuint32().unwrap(), value);
            assert!(cur.is_empty());
        }
    }

    #[test]
    fn test_varuint32_known_encodings() {
        let mut buf = Vec::new();
        put_varuint32(&mut buf, 300);
        assert_eq!(buf, vec![0xac, 0x02]);
    }

    #[test]
    fn test_varint32_zigzag() {
        for value in [0i32, -1, 1, -2, 2, i32::MIN, i32::MAX] {
            let mut buf = Vec::new();
            put_varint32(&mut buf, value);
            let mut cur = ByteCursor::new(&buf);
            assert_eq!(cur.read_varint32().unwrap(), value);
        }
        // zigzag maps -1 to 1, which fits a single byte
        let mut buf = Vec::new();
        put_varint32(&mut buf, -1);
        assert_eq!(buf, vec![0x01]);
    }

    #[test]
    fn test_varuint32_overflow_rejected() {
        let mut cur = ByteCursor::new(&[0xff, 0xff, 0xff, 0xff, 0x7f]);
        assert!(matches!(
            cur.read_varuint32(),
            Err(ScalarError::VarintOverflow { offset: 0 })
        ));
    }
}
