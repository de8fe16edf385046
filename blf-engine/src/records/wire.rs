//! Little-endian wire primitives used by every record layout
//!
//! Fields are never read through native struct layout. Each field type
//! implements [`Wire`], which knows its exact byte width and how to move
//! itself through a bounded [`ByteReader`] or any `io::Write` sink.

use crate::records::header::ObjectHeader;
use crate::types::{BlfError, Result};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::io::{self, Write};

/// A fixed-width little-endian field
pub trait Wire: Sized {
    /// Encoded width in bytes
    const SIZE: usize;

    /// All-zero value, used for freshly created records
    fn zeroed() -> Self;

    fn read_from(reader: &mut ByteReader<'_>) -> Result<Self>;

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()>;
}

macro_rules! wire_primitive {
    ($($ty:ty => $read:ident, $write:ident;)*) => {
        $(
            impl Wire for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                fn zeroed() -> Self {
                    0 as $ty
                }

                fn read_from(reader: &mut ByteReader<'_>) -> Result<Self> {
                    Ok(LittleEndian::$read(reader.take(Self::SIZE)?))
                }

                fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
                    writer.$write::<LittleEndian>(*self)
                }
            }
        )*
    };
}

wire_primitive! {
    u16 => read_u16, write_u16;
    u32 => read_u32, write_u32;
    u64 => read_u64, write_u64;
    i16 => read_i16, write_i16;
    i32 => read_i32, write_i32;
    i64 => read_i64, write_i64;
    f32 => read_f32, write_f32;
    f64 => read_f64, write_f64;
}

impl Wire for u8 {
    const SIZE: usize = 1;

    fn zeroed() -> Self {
        0
    }

    fn read_from(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(reader.take(1)?[0])
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_u8(*self)
    }
}

impl Wire for i8 {
    const SIZE: usize = 1;

    fn zeroed() -> Self {
        0
    }

    fn read_from(reader: &mut ByteReader<'_>) -> Result<Self> {
        Ok(reader.take(1)?[0] as i8)
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_i8(*self)
    }
}

impl<T: Wire + Copy, const N: usize> Wire for [T; N] {
    const SIZE: usize = T::SIZE * N;

    fn zeroed() -> Self {
        [T::zeroed(); N]
    }

    fn read_from(reader: &mut ByteReader<'_>) -> Result<Self> {
        let mut out = [T::zeroed(); N];
        for slot in out.iter_mut() {
            *slot = T::read_from(reader)?;
        }
        Ok(out)
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for value in self {
            value.write_to(writer)?;
        }
        Ok(())
    }
}

/// Bounded cursor over the bytes of one record.
///
/// Reads never go past the end of the slice; running out yields
/// [`BlfError::TruncatedRecord`] tagged with the record's object type.
pub struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
    object_type: u32,
}

impl<'a> ByteReader<'a> {
    pub fn new(buf: &'a [u8], object_type: u32) -> Self {
        Self {
            buf,
            pos: 0,
            object_type,
        }
    }

    /// Total length of the underlying slice
    pub fn total(&self) -> usize {
        self.buf.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(BlfError::TruncatedRecord {
                object_type: self.object_type,
                needed: n,
                available: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn take_vec(&mut self, n: usize) -> Result<Vec<u8>> {
        Ok(self.take(n)?.to_vec())
    }

    /// Read `count` UTF-16 code units
    pub fn take_wide(&mut self, count: usize) -> Result<Vec<u16>> {
        let bytes = count.checked_mul(2).ok_or(BlfError::TruncatedRecord {
            object_type: self.object_type,
            needed: usize::MAX,
            available: self.remaining(),
        })?;
        let raw = self.take(bytes)?;
        Ok(raw
            .chunks_exact(2)
            .map(|unit| LittleEndian::read_u16(unit))
            .collect())
    }

    /// Everything left, possibly empty
    pub fn take_rest(&mut self) -> Vec<u8> {
        let rest = self.buf[self.pos..].to_vec();
        self.pos = self.buf.len();
        rest
    }
}

/// Write a sequence of UTF-16 code units
pub fn write_wide<W: Write>(writer: &mut W, units: &[u16]) -> io::Result<()> {
    for unit in units {
        writer.write_u16::<LittleEndian>(*unit)?;
    }
    Ok(())
}

/// Convert a payload length into the integer type of its length field
pub fn length_field<T: TryFrom<usize>>(len: usize, field: &str) -> Result<T> {
    T::try_from(len).map_err(|_| {
        BlfError::RecordTooLarge(format!("{} bytes do not fit length field '{}'", len, field))
    })
}

/// Body of a known record kind (everything after the object header)
pub trait RecordBody: Sized {
    fn decode_body(header: ObjectHeader, reader: &mut ByteReader<'_>) -> Result<Self>;

    fn encode_body<W: Write>(&self, writer: &mut W) -> Result<()>;

    /// Encoded body length, recomputed from live field contents
    fn body_size(&self) -> usize;

    fn header(&self) -> &ObjectHeader;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_round_trip() {
        let mut out = Vec::new();
        0x1234u16.write_to(&mut out).unwrap();
        (-2i32).write_to(&mut out).unwrap();
        1.5f64.write_to(&mut out).unwrap();
        assert_eq!(out.len(), u16::SIZE + i32::SIZE + f64::SIZE);
        assert_eq!(&out[..2], &[0x34, 0x12]);

        let mut reader = ByteReader::new(&out, 0);
        assert_eq!(u16::read_from(&mut reader).unwrap(), 0x1234);
        assert_eq!(i32::read_from(&mut reader).unwrap(), -2);
        assert_eq!(f64::read_from(&mut reader).unwrap(), 1.5);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_large_array() {
        assert_eq!(<[u8; 254]>::SIZE, 254);
        assert_eq!(<[u16; 18]>::SIZE, 36);
        let zero = <[u32; 40]>::zeroed();
        assert!(zero.iter().all(|v| *v == 0));
    }

    #[test]
    fn test_reader_truncation() {
        let bytes = [1u8, 2, 3];
        let mut reader = ByteReader::new(&bytes, 42);
        assert!(reader.take(2).is_ok());
        match u32::read_from(&mut reader) {
            Err(BlfError::TruncatedRecord {
                object_type,
                needed,
                available,
            }) => {
                assert_eq!(object_type, 42);
                assert_eq!(needed, 4);
                assert_eq!(available, 1);
            }
            other => panic!("expected truncation, got {:?}", other),
        }
        assert_eq!(reader.take_rest(), vec![3]);
        assert!(reader.take_rest().is_empty());
    }

    #[test]
    fn test_wide_strings() {
        let mut out = Vec::new();
        write_wide(&mut out, &[0x41, 0x20AC]).unwrap();
        let mut reader = ByteReader::new(&out, 0);
        assert_eq!(reader.take_wide(2).unwrap(), vec![0x41, 0x20AC]);
    }

    #[test]
    fn test_length_field_overflow() {
        assert_eq!(length_field::<u8>(255, "size").unwrap(), 255);
        assert!(matches!(
            length_field::<u8>(256, "size"),
            Err(BlfError::RecordTooLarge(_))
        ));
    }
}
