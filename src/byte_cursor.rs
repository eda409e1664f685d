use std::io::Cursor;

use binread::{BinRead, BinReaderExt};
use byteorder::{ByteOrder, LittleEndian};

use crate::encoded_strings::decode_name;
use crate::DecodeError;

type Result<T> = std::result::Result<T, DecodeError>;

/// Sequential little-endian reader over an immutable buffer.
///
/// Formats here address their sub-blocks with offsets relative to the start
/// of a block, so the cursor exposes its absolute position and lets callers
/// remember a block start and seek relative to it.
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        ByteCursor { data, position: 0 }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    pub fn seek(&mut self, position: usize) {
        self.position = position;
    }

    pub fn seek_relative(&mut self, base: usize, offset: usize) {
        self.position = base + offset;
    }

    pub fn skip(&mut self, amount: usize) -> Result<()> {
        self.take(amount)?;
        Ok(())
    }

    pub fn tell(&self) -> usize {
        self.position
    }

    /// Fails unless `count` more bytes are available. Call before sizing
    /// buffers from untrusted header fields.
    pub fn require(&self, count: usize) -> Result<()> {
        if self.remaining() < count {
            return Err(DecodeError::TruncatedInput(self.position, count, self.data.len()));
        }
        Ok(())
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8]> {
        let start = self.position;
        let end = start
            .checked_add(count)
            .filter(|end| *end <= self.data.len())
            .ok_or(DecodeError::TruncatedInput(start, count, self.data.len()))?;
        self.position = end;
        Ok(&self.data[start..end])
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        let value = self.read_u8()?;
        Ok(value as i8)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.take(2)?))
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.take(2)?))
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        self.take(count)
    }

    /// Reads `length` bytes and keeps everything before the first NUL.
    pub fn read_fixed_string(&mut self, length: usize) -> Result<Option<String>> {
        if length == 0 {
            return Ok(None);
        }
        let raw = self.take(length)?;
        Ok(Some(decode_name(raw)))
    }

    pub fn read_null_terminated_string(&mut self) -> Result<String> {
        let start = self.position;
        let rest = self.data.get(start..).unwrap_or(&[]);
        let length = rest
            .iter()
            .position(|b| *b == 0)
            .ok_or(DecodeError::UnexpectedTerminator("a null-terminated string", start))?;
        let raw = self.take(length + 1)?;
        Ok(decode_name(&raw[..length]))
    }

    /// Tests the next byte without consuming it. Running out of input here
    /// means a sentinel-terminated table never hit its terminator.
    pub fn peek_non_zero(&self, what: &'static str) -> Result<bool> {
        match self.data.get(self.position) {
            Some(value) => Ok(*value != 0),
            None => Err(DecodeError::UnexpectedTerminator(what, self.position)),
        }
    }

    /// Parses a fixed little-endian record and advances past it.
    pub fn read_record<T>(&mut self) -> Result<T>
    where
        T: BinRead<Args = ()>,
    {
        let start = self.position;
        let size = self.data.len();
        let rest = self.data.get(start..).unwrap_or(&[]);
        let mut cursor = Cursor::new(rest);
        // An IO error can only mean the record ran off the end of the buffer.
        let record: T = cursor.read_le().map_err(|err| match err {
            binread::Error::Io(_) => DecodeError::TruncatedInput(start, rest.len() + 1, size),
            other => DecodeError::InvalidRecord(format!("{:?}", other)),
        })?;
        self.position = start + cursor.position() as usize;
        Ok(record)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_little_endian() {
        let data = vec![0x01, 0x34, 0x12, 0xFE, 0xFF, 0x78, 0x56, 0x34, 0x12, 0x80];
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(1, cursor.read_u8().unwrap());
        assert_eq!(0x1234, cursor.read_u16().unwrap());
        assert_eq!(-2, cursor.read_i16().unwrap());
        assert_eq!(0x12345678, cursor.read_u32().unwrap());
        assert_eq!(-128, cursor.read_i8().unwrap());
        assert_eq!(10, cursor.tell());
        assert_eq!(0, cursor.remaining());
    }

    #[test]
    fn read_past_end_fails() {
        let data = vec![0x01, 0x02, 0x03];
        let mut cursor = ByteCursor::new(&data);
        cursor.seek(2);
        let result = cursor.read_u16();
        assert!(matches!(result, Err(DecodeError::TruncatedInput(2, 2, 3))));
        assert_eq!(2, cursor.tell());
        assert!(cursor.read_u32().is_err());
        assert_eq!(3, cursor.read_u8().unwrap());
    }

    #[test]
    fn fixed_string() {
        let data = b"SKY\0\0\0\0\0GRASSTOP".to_vec();
        let mut cursor = ByteCursor::new(&data);
        assert_eq!(None, cursor.read_fixed_string(0).unwrap());
        assert_eq!(Some("SKY".to_string()), cursor.read_fixed_string(8).unwrap());
        assert_eq!(Some("GRASSTOP".to_string()), cursor.read_fixed_string(8).unwrap());
        assert!(cursor.read_fixed_string(1).is_err());
    }

    #[test]
    fn null_terminated_string() {
        let data = b"TRACK.WMF\0REST".to_vec();
        let mut cursor = ByteCursor::new(&data);
        assert_eq!("TRACK.WMF", cursor.read_null_terminated_string().unwrap());
        assert_eq!(10, cursor.tell());
        let result = cursor.read_null_terminated_string();
        assert!(matches!(result, Err(DecodeError::UnexpectedTerminator(_, 10))));
    }

    #[test]
    fn peek_does_not_consume() {
        let data = vec![0x05, 0x00];
        let mut cursor = ByteCursor::new(&data);
        assert!(cursor.peek_non_zero("test").unwrap());
        assert_eq!(0, cursor.tell());
        cursor.skip(1).unwrap();
        assert!(!cursor.peek_non_zero("test").unwrap());
        cursor.skip(1).unwrap();
        assert!(cursor.peek_non_zero("test").is_err());
    }

    #[test]
    fn require_checks_remaining_bytes() {
        let data = vec![1, 2, 3, 4];
        let mut cursor = ByteCursor::new(&data);
        cursor.skip(1).unwrap();
        assert!(cursor.require(3).is_ok());
        assert!(matches!(cursor.require(4), Err(DecodeError::TruncatedInput(1, 4, 4))));
        assert_eq!(1, cursor.tell());
    }

    #[test]
    fn seek_relative_to_block() {
        let data = vec![0, 0, 0, 0, 0xAA, 0xBB];
        let mut cursor = ByteCursor::new(&data);
        cursor.seek_relative(2, 3);
        assert_eq!(0xBB, cursor.read_u8().unwrap());
    }
}
