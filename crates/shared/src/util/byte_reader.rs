// ByteReader - Bounded little-endian reads over a borrowed byte slice
// Every read is checked against the end of the slice and reports UnexpectedEof
// instead of panicking.

use byteorder::{ByteOrder, LittleEndian};
use std::io::{Error, ErrorKind};

/// A read-only cursor over binary data.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    read_pos: usize,
}

fn past_end() -> Error {
    Error::new(ErrorKind::UnexpectedEof, "ByteReader read past end")
}

impl<'a> ByteReader<'a> {
    /// Create a reader positioned at `pos`
    pub fn at(data: &'a [u8], pos: usize) -> Result<Self, Error> {
        if pos > data.len() {
            return Err(past_end());
        }
        Ok(ByteReader { data, read_pos: pos })
    }

    fn take(&mut self, count: usize) -> Result<&'a [u8], Error> {
        let end = self.read_pos.checked_add(count).ok_or_else(past_end)?;
        if end > self.data.len() {
            return Err(past_end());
        }
        let bytes = &self.data[self.read_pos..end];
        self.read_pos = end;
        Ok(bytes)
    }

    /// Read a u8
    pub fn read_u8(&mut self) -> Result<u8, Error> {
        Ok(self.take(1)?[0])
    }

    /// Read a u32 (little-endian)
    pub fn read_u32(&mut self) -> Result<u32, Error> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    /// Borrow the next `count` bytes without copying
    pub fn read_slice(&mut self, count: usize) -> Result<&'a [u8], Error> {
        self.take(count)
    }

    /// Skip `count` bytes; fails if that would move past the end
    pub fn skip(&mut self, count: usize) -> Result<(), Error> {
        self.take(count).map(|_| ())
    }
}
