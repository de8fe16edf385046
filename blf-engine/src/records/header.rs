//! Common object header
//!
//! Every record starts with a 16-byte base header:
//!
//! ```text
//! signature: u32 ("LOBJ")  header_size: u16  header_version: u16
//! object_size: u32         object_type: u32
//! ```
//!
//! followed by one of two extensions selected by `header_version`:
//! - version 1 (32 bytes total): flags, client index, object version, timestamp
//! - version 2 (40 bytes total): flags, timestamp status, object version,
//!   timestamp, original timestamp

use crate::records::wire::{ByteReader, Wire};
use crate::types::{BlfError, Result};
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::io::Write;

/// "LOBJ" in little-endian byte order
pub const OBJECT_SIGNATURE: u32 = 0x4A42_4F4C;

/// Size of the base header shared by both layouts
pub const BASE_HEADER_SIZE: usize = 16;

pub const HEADER_V1_SIZE: u16 = 32;
pub const HEADER_V2_SIZE: u16 = 40;

/// Timestamp unit flag: 10 microsecond ticks
pub const TIME_TEN_MICS: u32 = 0x0000_0001;
/// Timestamp unit flag: 1 nanosecond ticks
pub const TIME_ONE_NANS: u32 = 0x0000_0002;

/// The fixed 16-byte prefix of every record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseHeader {
    pub header_size: u16,
    pub header_version: u16,
    pub object_size: u32,
    pub object_type: u32,
}

impl BaseHeader {
    /// Parse and validate the base header at the start of `bytes`.
    ///
    /// Fails with [`BlfError::CorruptHeader`] on a bad signature, an unknown
    /// header layout, or an object size smaller than its own header.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < BASE_HEADER_SIZE {
            return Err(BlfError::CorruptHeader(format!(
                "{} bytes are too short for an object header",
                bytes.len()
            )));
        }
        let signature = LittleEndian::read_u32(&bytes[0..4]);
        if signature != OBJECT_SIGNATURE {
            return Err(BlfError::CorruptHeader(format!(
                "bad signature 0x{:08X}",
                signature
            )));
        }
        let header = Self {
            header_size: LittleEndian::read_u16(&bytes[4..6]),
            header_version: LittleEndian::read_u16(&bytes[6..8]),
            object_size: LittleEndian::read_u32(&bytes[8..12]),
            object_type: LittleEndian::read_u32(&bytes[12..16]),
        };
        let expected = match header.header_version {
            1 => HEADER_V1_SIZE,
            2 => HEADER_V2_SIZE,
            other => {
                return Err(BlfError::CorruptHeader(format!(
                    "unknown header version {}",
                    other
                )))
            }
        };
        if header.header_size != expected {
            return Err(BlfError::CorruptHeader(format!(
                "header version {} with size {} (expected {})",
                header.header_version, header.header_size, expected
            )));
        }
        if (header.object_size as usize) < header.header_size as usize {
            return Err(BlfError::CorruptHeader(format!(
                "object size {} smaller than header size {}",
                header.object_size, header.header_size
            )));
        }
        Ok(header)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(OBJECT_SIGNATURE)?;
        writer.write_u16::<LittleEndian>(self.header_size)?;
        writer.write_u16::<LittleEndian>(self.header_version)?;
        writer.write_u32::<LittleEndian>(self.object_size)?;
        writer.write_u32::<LittleEndian>(self.object_type)?;
        Ok(())
    }
}

/// Header extension carried by every known record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectHeader {
    V1 {
        object_flags: u32,
        client_index: u16,
        object_version: u16,
        object_time_stamp: u64,
    },
    V2 {
        object_flags: u32,
        time_stamp_status: u8,
        reserved: u8,
        object_version: u16,
        object_time_stamp: u64,
        original_time_stamp: u64,
    },
}

impl Default for ObjectHeader {
    fn default() -> Self {
        ObjectHeader::V1 {
            object_flags: TIME_ONE_NANS,
            client_index: 0,
            object_version: 0,
            object_time_stamp: 0,
        }
    }
}

impl ObjectHeader {
    /// A version 1 header with a nanosecond timestamp
    pub fn with_time_ns(time_stamp: u64) -> Self {
        ObjectHeader::V1 {
            object_flags: TIME_ONE_NANS,
            client_index: 0,
            object_version: 0,
            object_time_stamp: time_stamp,
        }
    }

    pub fn version(&self) -> u16 {
        match self {
            ObjectHeader::V1 { .. } => 1,
            ObjectHeader::V2 { .. } => 2,
        }
    }

    /// Total header size including the base header
    pub fn header_size(&self) -> u16 {
        match self {
            ObjectHeader::V1 { .. } => HEADER_V1_SIZE,
            ObjectHeader::V2 { .. } => HEADER_V2_SIZE,
        }
    }

    pub fn object_flags(&self) -> u32 {
        match self {
            ObjectHeader::V1 { object_flags, .. } | ObjectHeader::V2 { object_flags, .. } => {
                *object_flags
            }
        }
    }

    /// Raw timestamp in the unit selected by the object flags
    pub fn time_stamp(&self) -> u64 {
        match self {
            ObjectHeader::V1 {
                object_time_stamp, ..
            }
            | ObjectHeader::V2 {
                object_time_stamp, ..
            } => *object_time_stamp,
        }
    }

    /// Timestamp converted to nanoseconds
    pub fn timestamp_ns(&self) -> u64 {
        if self.object_flags() & TIME_TEN_MICS != 0 {
            self.time_stamp().saturating_mul(10_000)
        } else {
            self.time_stamp()
        }
    }

    /// Parse the extension that follows the base header
    pub fn read(version: u16, reader: &mut ByteReader<'_>) -> Result<Self> {
        match version {
            1 => Ok(ObjectHeader::V1 {
                object_flags: u32::read_from(reader)?,
                client_index: u16::read_from(reader)?,
                object_version: u16::read_from(reader)?,
                object_time_stamp: u64::read_from(reader)?,
            }),
            2 => Ok(ObjectHeader::V2 {
                object_flags: u32::read_from(reader)?,
                time_stamp_status: u8::read_from(reader)?,
                reserved: u8::read_from(reader)?,
                object_version: u16::read_from(reader)?,
                object_time_stamp: u64::read_from(reader)?,
                original_time_stamp: u64::read_from(reader)?,
            }),
            other => Err(BlfError::CorruptHeader(format!(
                "unknown header version {}",
                other
            ))),
        }
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        match self {
            ObjectHeader::V1 {
                object_flags,
                client_index,
                object_version,
                object_time_stamp,
            } => {
                object_flags.write_to(writer)?;
                client_index.write_to(writer)?;
                object_version.write_to(writer)?;
                object_time_stamp.write_to(writer)?;
            }
            ObjectHeader::V2 {
                object_flags,
                time_stamp_status,
                reserved,
                object_version,
                object_time_stamp,
                original_time_stamp,
            } => {
                object_flags.write_to(writer)?;
                time_stamp_status.write_to(writer)?;
                reserved.write_to(writer)?;
                object_version.write_to(writer)?;
                object_time_stamp.write_to(writer)?;
                original_time_stamp.write_to(writer)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_bytes(size: u16, version: u16, object_size: u32) -> Vec<u8> {
        let mut out = Vec::new();
        BaseHeader {
            header_size: size,
            header_version: version,
            object_size,
            object_type: 1,
        }
        .write_to(&mut out)
        .unwrap();
        out
    }

    #[test]
    fn test_signature_is_lobj() {
        let bytes = base_bytes(32, 1, 48);
        assert_eq!(&bytes[0..4], b"LOBJ");
        let parsed = BaseHeader::parse(&bytes).unwrap();
        assert_eq!(parsed.object_size, 48);
        assert_eq!(parsed.object_type, 1);
    }

    #[test]
    fn test_rejects_bad_layouts() {
        let mut bytes = base_bytes(32, 1, 48);
        bytes[0] = b'X';
        assert!(matches!(
            BaseHeader::parse(&bytes),
            Err(BlfError::CorruptHeader(_))
        ));

        assert!(BaseHeader::parse(&base_bytes(40, 1, 48)).is_err());
        assert!(BaseHeader::parse(&base_bytes(32, 3, 48)).is_err());
        assert!(BaseHeader::parse(&base_bytes(40, 2, 39)).is_err());
        assert!(BaseHeader::parse(&bytes[..10]).is_err());
    }

    #[test]
    fn test_header_extension_sizes() {
        let v2 = ObjectHeader::V2 {
            object_flags: TIME_TEN_MICS,
            time_stamp_status: 1,
            reserved: 0,
            object_version: 0,
            object_time_stamp: 7,
            original_time_stamp: 9,
        };
        let mut out = Vec::new();
        v2.write_to(&mut out).unwrap();
        assert_eq!(out.len() + BASE_HEADER_SIZE, v2.header_size() as usize);

        let mut reader = ByteReader::new(&out, 0);
        assert_eq!(ObjectHeader::read(2, &mut reader).unwrap(), v2);
        assert_eq!(v2.timestamp_ns(), 70_000);

        let v1 = ObjectHeader::with_time_ns(1234);
        assert_eq!(v1.header_size(), 32);
        assert_eq!(v1.timestamp_ns(), 1234);
    }
}
