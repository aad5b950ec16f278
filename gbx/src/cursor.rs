//! Byte cursor over an immutable buffer
//!
//! All reads are little-endian. Every read past the end of the buffer fails with
//! [`Error::OutOfData`]; nothing silently returns zero.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{Error, Result};

/// Read cursor over a byte slice.
///
/// A cursor may be a window into a larger buffer (see [`Cursor::sub_cursor`]); `origin`
/// is the absolute offset of `data[0]` so that error offsets always refer to the
/// outermost buffer.
#[derive(Clone)]
pub struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
    origin: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            origin: 0,
        }
    }

    /// Absolute byte position (including the window origin).
    pub fn position(&self) -> usize {
        self.origin + self.pos
    }

    /// Position relative to the start of this cursor's window.
    pub fn local_position(&self) -> usize {
        self.pos
    }

    /// Total length of the window.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Remaining bytes from the current position.
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Seek to a position relative to the start of the window.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(self.out_of_data(pos - self.pos));
        }
        self.pos = pos;
        Ok(())
    }

    /// Move `n` bytes relative to the current position. Negative values move back.
    pub fn skip(&mut self, n: i64) -> Result<()> {
        if n >= 0 {
            self.ensure(n as usize)?;
            self.pos += n as usize;
        } else {
            let back = n.unsigned_abs() as usize;
            if back > self.pos {
                return Err(Error::OutOfData {
                    offset: self.position(),
                    need: back,
                    have: self.pos,
                });
            }
            self.pos -= back;
        }
        Ok(())
    }

    /// Skip `n` bytes forward.
    pub fn advance(&mut self, n: usize) -> Result<()> {
        self.ensure(n)?;
        self.pos += n;
        Ok(())
    }

    /// Read a slice of `n` bytes without copying.
    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Read an `i32` length followed by that many bytes.
    pub fn read_prefixed_bytes(&mut self) -> Result<&'a [u8]> {
        let offset = self.position();
        let len = self.read_i32()?;
        let len = usize::try_from(len).map_err(|_| Error::OutOfData {
            offset,
            need: len.unsigned_abs() as usize,
            have: self.remaining(),
        })?;
        self.read_bytes(len)
    }

    /// Split off the next `n` bytes as an independent cursor and advance past them.
    pub fn sub_cursor(&mut self, n: usize) -> Result<Cursor<'a>> {
        let origin = self.position();
        let data = self.read_bytes(n)?;
        Ok(Cursor {
            data,
            pos: 0,
            origin,
        })
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        self.ensure(1)?;
        let v = self.data[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.read_bytes(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.read_bytes(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.read_bytes(4)?))
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.read_bytes(4)?))
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.read_bytes(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.read_bytes(4)?))
    }

    /// Peek the next `u32` without consuming it.
    pub fn peek_u32(&self) -> Result<u32> {
        self.ensure(4)?;
        Ok(LittleEndian::read_u32(&self.data[self.pos..self.pos + 4]))
    }

    /// Boolean stored as a `u32`. Anything other than 0 or 1 is an error.
    pub fn read_bool(&mut self) -> Result<bool> {
        let offset = self.position();
        let value = self.read_u32()?;
        bool_from(value, offset)
    }

    /// Boolean stored as a single byte.
    pub fn read_bool_u8(&mut self) -> Result<bool> {
        let offset = self.position();
        let value = self.read_u8()?;
        bool_from(value as u32, offset)
    }

    /// Read an `i32` length-prefixed string.
    pub fn read_string(&mut self) -> Result<String> {
        let bytes = self.read_prefixed_bytes()?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Read a string of exactly `len` bytes.
    pub fn read_fixed_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn ensure(&self, n: usize) -> Result<()> {
        if self.pos.checked_add(n).is_none_or(|end| end > self.data.len()) {
            return Err(self.out_of_data(n));
        }
        Ok(())
    }

    fn out_of_data(&self, need: usize) -> Error {
        Error::OutOfData {
            offset: self.position(),
            need,
            have: self.remaining(),
        }
    }
}

fn bool_from(value: u32, offset: usize) -> Result<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(Error::InvalidBoolean { value, offset }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_reads() {
        let data = [
            0x01, // u8
            0x34, 0x12, // u16
            0xFE, 0xFF, // i16 -2
            0x78, 0x56, 0x34, 0x12, // u32
            0x00, 0x00, 0x80, 0x3F, // f32 1.0
        ];
        let mut c = Cursor::new(&data);
        assert_eq!(c.read_u8().unwrap(), 1);
        assert_eq!(c.read_u16().unwrap(), 0x1234);
        assert_eq!(c.read_i16().unwrap(), -2);
        assert_eq!(c.read_u32().unwrap(), 0x1234_5678);
        assert_eq!(c.read_f32().unwrap(), 1.0);
        assert!(c.is_empty());
    }

    #[test]
    fn test_read_past_end_fails() {
        let data = [0x01, 0x02, 0x03];
        let mut c = Cursor::new(&data);
        let err = c.read_u32().unwrap_err();
        assert!(matches!(
            err,
            Error::OutOfData {
                offset: 0,
                need: 4,
                have: 3
            }
        ));
        // A failed read does not move the cursor
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let data = 0xFACADE01u32.to_le_bytes();
        let c = Cursor::new(&data);
        assert_eq!(c.peek_u32().unwrap(), 0xFACADE01);
        assert_eq!(c.position(), 0);
    }

    #[test]
    fn test_skip_and_seek() {
        let data = [0u8; 8];
        let mut c = Cursor::new(&data);
        c.skip(6).unwrap();
        c.skip(-4).unwrap();
        assert_eq!(c.position(), 2);
        assert!(c.skip(-3).is_err());
        c.seek(8).unwrap();
        assert!(c.is_empty());
        assert!(c.seek(9).is_err());
    }

    #[test]
    fn test_string() {
        let mut data = 5i32.to_le_bytes().to_vec();
        data.extend_from_slice(b"Hello");
        let mut c = Cursor::new(&data);
        assert_eq!(c.read_string().unwrap(), "Hello");
    }

    #[test]
    fn test_negative_string_length_fails() {
        let data = (-1i32).to_le_bytes();
        let mut c = Cursor::new(&data);
        assert!(matches!(c.read_string(), Err(Error::OutOfData { .. })));
    }

    #[test]
    fn test_invalid_boolean() {
        let data = 2u32.to_le_bytes();
        let mut c = Cursor::new(&data);
        assert!(matches!(
            c.read_bool(),
            Err(Error::InvalidBoolean { value: 2, offset: 0 })
        ));
    }

    #[test]
    fn test_sub_cursor_reports_absolute_offsets() {
        let data = [0u8; 10];
        let mut c = Cursor::new(&data);
        c.advance(4).unwrap();
        let mut sub = c.sub_cursor(2).unwrap();
        assert_eq!(c.position(), 6);
        sub.read_u16().unwrap();
        match sub.read_u8() {
            Err(Error::OutOfData { offset, .. }) => assert_eq!(offset, 6),
            other => panic!("unexpected: {:?}", other.map(|_| ())),
        }
    }
}
