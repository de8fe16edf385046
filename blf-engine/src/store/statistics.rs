//! Global file header
//!
//! Every log file starts with a fixed 144-byte statistics block. It is written
//! as a placeholder when the file is created and rewritten with the final
//! sizes, object count and index location when the file is closed.

use crate::types::{BlfError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::io::{Read, Write};

/// `"LOGG"` read as a little-endian u32
pub const FILE_SIGNATURE: u32 = 0x4747_4F4C;

/// Size of the statistics block on disk
pub const FILE_STATISTICS_SIZE: u32 = 144;

/// Format number 4.7.1.0
pub const DEFAULT_API_NUMBER: u32 = 4_070_100;

/// Calendar time as stored in the header (Windows `SYSTEMTIME` layout)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SystemTime {
    pub year: u16,
    pub month: u16,
    pub day_of_week: u16,
    pub day: u16,
    pub hour: u16,
    pub minute: u16,
    pub second: u16,
    pub milliseconds: u16,
}

impl SystemTime {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    pub fn from_naive(time: &NaiveDateTime) -> Self {
        Self {
            year: time.year().clamp(0, u16::MAX as i32) as u16,
            month: time.month() as u16,
            day_of_week: time.weekday().num_days_from_sunday() as u16,
            day: time.day() as u16,
            hour: time.hour() as u16,
            minute: time.minute() as u16,
            second: time.second() as u16,
            milliseconds: (time.nanosecond() / 1_000_000).min(999) as u16,
        }
    }

    /// `None` for an all-zero or out-of-range time
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)?
            .and_hms_milli_opt(
                self.hour as u32,
                self.minute as u32,
                self.second as u32,
                self.milliseconds as u32,
            )
    }

    fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let mut fields = [0u16; 8];
        reader.read_u16_into::<LittleEndian>(&mut fields)?;
        let [year, month, day_of_week, day, hour, minute, second, milliseconds] = fields;
        Ok(Self {
            year,
            month,
            day_of_week,
            day,
            hour,
            minute,
            second,
            milliseconds,
        })
    }

    fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        for field in [
            self.year,
            self.month,
            self.day_of_week,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.milliseconds,
        ] {
            writer.write_u16::<LittleEndian>(field)?;
        }
        Ok(())
    }
}

/// Aggregate counts and metadata for one log file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileStatistics {
    pub statistics_size: u32,
    pub api_number: u32,
    pub application_id: u8,
    pub compression_level: u8,
    pub application_major: u8,
    pub application_minor: u8,
    /// Total bytes on disk
    pub file_size: u64,
    /// Total bytes of the logical record stream
    pub uncompressed_file_size: u64,
    pub object_count: u32,
    pub application_build: u32,
    pub measurement_start_time: SystemTime,
    pub last_object_time: SystemTime,
    /// File offset of the restore-point index, 0 when absent
    pub restore_points_offset: u64,
    #[serde(skip)]
    pub reserved: [u32; 16],
}

impl Default for FileStatistics {
    fn default() -> Self {
        Self {
            statistics_size: FILE_STATISTICS_SIZE,
            api_number: DEFAULT_API_NUMBER,
            application_id: 0,
            compression_level: 0,
            application_major: 0,
            application_minor: 0,
            file_size: 0,
            uncompressed_file_size: 0,
            object_count: 0,
            application_build: 0,
            measurement_start_time: SystemTime::default(),
            last_object_time: SystemTime::default(),
            restore_points_offset: 0,
            reserved: [0; 16],
        }
    }
}

impl FileStatistics {
    /// Statistics for a new file, stamped with the current local time
    pub fn new(compression_level: u32) -> Self {
        Self {
            compression_level: compression_level.min(u8::MAX as u32) as u8,
            application_major: env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap_or(0),
            application_minor: env!("CARGO_PKG_VERSION_MINOR").parse().unwrap_or(0),
            measurement_start_time: SystemTime::from_naive(&chrono::Local::now().naive_local()),
            ..Self::default()
        }
    }

    pub fn measurement_start(&self) -> Option<NaiveDateTime> {
        self.measurement_start_time.to_naive()
    }

    pub fn last_object(&self) -> Option<NaiveDateTime> {
        self.last_object_time.to_naive()
    }

    /// Ratio of stored to logical bytes, `None` for an empty stream
    pub fn compression_ratio(&self) -> Option<f64> {
        if self.uncompressed_file_size == 0 {
            return None;
        }
        Some(self.file_size as f64 / self.uncompressed_file_size as f64)
    }

    /// Read and validate the header at the current position.
    ///
    /// Any bytes beyond the 144 known ones (`statistics_size` larger than
    /// expected) are skipped.
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self> {
        let signature = reader.read_u32::<LittleEndian>()?;
        if signature != FILE_SIGNATURE {
            return Err(BlfError::InvalidFileHeader(format!(
                "bad signature 0x{:08X}",
                signature
            )));
        }
        let statistics_size = reader.read_u32::<LittleEndian>()?;
        if statistics_size < FILE_STATISTICS_SIZE {
            return Err(BlfError::InvalidFileHeader(format!(
                "statistics size {} is below {}",
                statistics_size, FILE_STATISTICS_SIZE
            )));
        }

        let api_number = reader.read_u32::<LittleEndian>()?;
        let application_id = reader.read_u8()?;
        let compression_level = reader.read_u8()?;
        let application_major = reader.read_u8()?;
        let application_minor = reader.read_u8()?;
        let file_size = reader.read_u64::<LittleEndian>()?;
        let uncompressed_file_size = reader.read_u64::<LittleEndian>()?;
        let object_count = reader.read_u32::<LittleEndian>()?;
        let application_build = reader.read_u32::<LittleEndian>()?;
        let measurement_start_time = SystemTime::read_from(reader)?;
        let last_object_time = SystemTime::read_from(reader)?;
        let restore_points_offset = reader.read_u64::<LittleEndian>()?;
        let mut reserved = [0u32; 16];
        reader.read_u32_into::<LittleEndian>(&mut reserved)?;

        let extra = (statistics_size - FILE_STATISTICS_SIZE) as u64;
        if extra > 0 {
            std::io::copy(&mut reader.by_ref().take(extra), &mut std::io::sink())?;
        }

        Ok(Self {
            statistics_size,
            api_number,
            application_id,
            compression_level,
            application_major,
            application_minor,
            file_size,
            uncompressed_file_size,
            object_count,
            application_build,
            measurement_start_time,
            last_object_time,
            restore_points_offset,
            reserved,
        })
    }

    /// Write the 144-byte block
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_u32::<LittleEndian>(FILE_SIGNATURE)?;
        writer.write_u32::<LittleEndian>(FILE_STATISTICS_SIZE)?;
        writer.write_u32::<LittleEndian>(self.api_number)?;
        writer.write_u8(self.application_id)?;
        writer.write_u8(self.compression_level)?;
        writer.write_u8(self.application_major)?;
        writer.write_u8(self.application_minor)?;
        writer.write_u64::<LittleEndian>(self.file_size)?;
        writer.write_u64::<LittleEndian>(self.uncompressed_file_size)?;
        writer.write_u32::<LittleEndian>(self.object_count)?;
        writer.write_u32::<LittleEndian>(self.application_build)?;
        self.measurement_start_time.write_to(writer)?;
        self.last_object_time.write_to(writer)?;
        writer.write_u64::<LittleEndian>(self.restore_points_offset)?;
        for value in self.reserved {
            writer.write_u32::<LittleEndian>(value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_is_144_bytes() {
        let mut stats = FileStatistics::new(6);
        stats.object_count = 42;
        stats.file_size = 1234;
        stats.uncompressed_file_size = 5678;
        stats.restore_points_offset = 999;

        let mut out = Vec::new();
        stats.write_to(&mut out).unwrap();
        assert_eq!(out.len(), FILE_STATISTICS_SIZE as usize);
        assert_eq!(&out[0..4], b"LOGG");
        assert_eq!(out[13], 6);

        let read = FileStatistics::read_from(&mut Cursor::new(&out)).unwrap();
        assert_eq!(read, stats);
    }

    #[test]
    fn test_bad_signature() {
        let mut out = Vec::new();
        FileStatistics::default().write_to(&mut out).unwrap();
        out[0] = b'X';
        assert!(matches!(
            FileStatistics::read_from(&mut Cursor::new(&out)),
            Err(BlfError::InvalidFileHeader(_))
        ));
    }

    #[test]
    fn test_larger_statistics_block_is_skipped() {
        let mut out = Vec::new();
        FileStatistics::default().write_to(&mut out).unwrap();
        out[4..8].copy_from_slice(&160u32.to_le_bytes());
        out.extend_from_slice(&[0xAA; 16]);
        out.push(0x55);

        let mut cursor = Cursor::new(&out);
        let stats = FileStatistics::read_from(&mut cursor).unwrap();
        assert_eq!(stats.statistics_size, 160);
        assert_eq!(cursor.position(), 160);
    }

    #[test]
    fn test_system_time_conversion() {
        let time = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_milli_opt(13, 45, 7, 250)
            .unwrap();
        let system = SystemTime::from_naive(&time);
        assert_eq!(system.day_of_week, 4);
        assert_eq!(system.milliseconds, 250);
        assert_eq!(system.to_naive(), Some(time));
        assert_eq!(SystemTime::default().to_naive(), None);
    }
}
