//! Restore-point index
//!
//! While writing, the store records where every Nth container starts in both
//! the logical stream and the file. The list is appended after the last
//! container as `count: u32` followed by `count` pairs of
//! `(logical_offset: u64, file_offset: u64)`.

use crate::types::{BlfError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use std::io::{Read, Write};

const ENTRY_SIZE: u64 = 16;

/// Maps a logical stream offset to the file offset of the container starting there
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct RestorePoint {
    pub logical_offset: u64,
    pub file_offset: u64,
}

impl RestorePoint {
    pub fn new(logical_offset: u64, file_offset: u64) -> Self {
        Self {
            logical_offset,
            file_offset,
        }
    }
}

/// Bytes the index occupies on disk
pub fn index_size(points: &[RestorePoint]) -> u64 {
    4 + points.len() as u64 * ENTRY_SIZE
}

pub fn write_index<W: Write>(writer: &mut W, points: &[RestorePoint]) -> Result<()> {
    let count = u32::try_from(points.len())
        .map_err(|_| BlfError::RecordTooLarge(format!("{} restore points", points.len())))?;
    writer.write_u32::<LittleEndian>(count)?;
    for point in points {
        writer.write_u64::<LittleEndian>(point.logical_offset)?;
        writer.write_u64::<LittleEndian>(point.file_offset)?;
    }
    Ok(())
}

/// Read an index, rejecting entries that are not strictly increasing
pub fn read_index<R: Read>(reader: &mut R) -> Result<Vec<RestorePoint>> {
    let count = reader.read_u32::<LittleEndian>()?;
    let mut points: Vec<RestorePoint> = Vec::with_capacity(count.min(1 << 16) as usize);
    for _ in 0..count {
        let point = RestorePoint {
            logical_offset: reader.read_u64::<LittleEndian>()?,
            file_offset: reader.read_u64::<LittleEndian>()?,
        };
        if let Some(last) = points.last() {
            if point.logical_offset <= last.logical_offset || point.file_offset <= last.file_offset {
                return Err(BlfError::InvalidFileHeader(format!(
                    "restore point {} is out of order",
                    points.len()
                )));
            }
        }
        points.push(point);
    }
    Ok(points)
}

/// The last restore point at or before `logical_offset`
pub fn find(points: &[RestorePoint], logical_offset: u64) -> Option<&RestorePoint> {
    let idx = points.partition_point(|p| p.logical_offset <= logical_offset);
    idx.checked_sub(1).map(|i| &points[i])
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn points() -> Vec<RestorePoint> {
        vec![
            RestorePoint::new(0, 144),
            RestorePoint::new(131_072, 20_000),
            RestorePoint::new(262_144, 41_000),
        ]
    }

    #[test]
    fn test_index_layout() {
        let mut out = Vec::new();
        write_index(&mut out, &points()).unwrap();
        assert_eq!(out.len() as u64, index_size(&points()));
        assert_eq!(&out[0..4], &3u32.to_le_bytes());

        let read = read_index(&mut Cursor::new(out)).unwrap();
        assert_eq!(read, points());
    }

    #[test]
    fn test_out_of_order_index_is_rejected() {
        let mut bad = points();
        bad.swap(1, 2);
        let mut out = Vec::new();
        write_index(&mut out, &bad).unwrap();
        assert!(read_index(&mut Cursor::new(out)).is_err());
    }

    #[test]
    fn test_find_nearest_preceding_point() {
        let points = points();
        assert_eq!(find(&points, 0), Some(&points[0]));
        assert_eq!(find(&points, 131_071), Some(&points[0]));
        assert_eq!(find(&points, 131_072), Some(&points[1]));
        assert_eq!(find(&points, u64::MAX), Some(&points[2]));
        assert_eq!(find(&points[1..], 10), None);
        assert_eq!(find(&[], 10), None);
    }
}
