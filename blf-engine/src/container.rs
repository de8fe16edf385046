//! Containers: the unit of compression and disk storage
//!
//! A container is a contiguous byte range of the logical uncompressed stream.
//! While writing, encoded records are appended until the container reaches its
//! target size, at which point it is sealed and handed to the compressor. A
//! record is never split between two containers, so every container starts on
//! a record boundary.
//!
//! On disk each container is stored as a [`CompressedBlock`]:
//!
//! ```text
//! compressed_size: u32  uncompressed_size: u32  algorithm: u8  bytes[compressed_size]
//! ```

use crate::types::{BlfError, Result};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use std::io::{self, Read, Write};

/// Size of the on-disk block header
pub const BLOCK_HEADER_SIZE: u64 = 9;

/// Result of [`Container::append`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Append {
    Accepted,
    /// The container is sealed; start a new one
    Full,
}

/// Compression method identifiers as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Stored,
    Zlib,
}

impl Compression {
    pub fn id(self) -> u8 {
        match self {
            Compression::Stored => 0,
            Compression::Zlib => 2,
        }
    }

    pub fn from_id(id: u8) -> Result<Self> {
        match id {
            0 => Ok(Compression::Stored),
            2 => Ok(Compression::Zlib),
            other => Err(BlfError::UnsupportedCompression(other)),
        }
    }
}

/// A chunk of the uncompressed stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    file_position: u64,
    target_size: usize,
    data: Vec<u8>,
    sealed: bool,
}

impl Container {
    /// An empty container starting at logical offset `file_position`
    pub fn new(file_position: u64, target_size: usize) -> Self {
        Self {
            file_position,
            target_size,
            data: Vec::with_capacity(target_size),
            sealed: false,
        }
    }

    /// A sealed container holding already inflated bytes
    pub fn from_bytes(file_position: u64, data: Vec<u8>) -> Self {
        Self {
            file_position,
            target_size: data.len(),
            data,
            sealed: true,
        }
    }

    /// Append `bytes` whole.
    ///
    /// Accepted while the container is below its target size; the append that
    /// reaches the target seals the container, so it may end up larger than
    /// the target by at most one record.
    pub fn append(&mut self, bytes: &[u8]) -> Append {
        if self.sealed || self.data.len() >= self.target_size {
            self.sealed = true;
            return Append::Full;
        }
        self.data.extend_from_slice(bytes);
        if self.data.len() >= self.target_size {
            self.sealed = true;
        }
        Append::Accepted
    }

    /// Freeze the size at the current length
    pub fn finalize(&mut self) {
        self.sealed = true;
        self.data.shrink_to_fit();
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn file_position(&self) -> u64 {
        self.file_position
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Logical offset one past the last byte
    pub fn end(&self) -> u64 {
        self.file_position + self.data.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Compress the contents; level 0 stores them unchanged
    pub fn compress(&self, level: u32) -> Result<CompressedBlock> {
        let uncompressed_size = u32::try_from(self.data.len()).map_err(|_| {
            BlfError::RecordTooLarge(format!("container of {} bytes", self.data.len()))
        })?;
        if level == 0 {
            return Ok(CompressedBlock {
                algorithm: Compression::Stored,
                uncompressed_size,
                data: self.data.clone(),
            });
        }
        let mut encoder = ZlibEncoder::new(
            Vec::with_capacity(self.data.len() / 2),
            flate2::Compression::new(level),
        );
        encoder.write_all(&self.data)?;
        Ok(CompressedBlock {
            algorithm: Compression::Zlib,
            uncompressed_size,
            data: encoder.finish()?,
        })
    }
}

/// One container as stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedBlock {
    pub algorithm: Compression,
    pub uncompressed_size: u32,
    pub data: Vec<u8>,
}

impl CompressedBlock {
    /// Bytes occupied on disk including the block header
    pub fn disk_size(&self) -> u64 {
        BLOCK_HEADER_SIZE + self.data.len() as u64
    }

    /// Inflate and check the result against the declared size
    pub fn decompress(&self) -> Result<Vec<u8>> {
        let declared = self.uncompressed_size as u64;
        let data = match self.algorithm {
            Compression::Stored => self.data.clone(),
            Compression::Zlib => {
                let mut out = Vec::with_capacity(self.uncompressed_size as usize);
                // One byte past the declared size is enough to detect overlong output
                ZlibDecoder::new(self.data.as_slice())
                    .take(declared + 1)
                    .read_to_end(&mut out)?;
                out
            }
        };
        if data.len() as u64 != declared {
            return Err(BlfError::DecompressionSizeMismatch {
                declared,
                actual: data.len() as u64,
            });
        }
        Ok(data)
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        let compressed_size = u32::try_from(self.data.len()).map_err(|_| {
            BlfError::RecordTooLarge(format!("compressed block of {} bytes", self.data.len()))
        })?;
        writer.write_u32::<LittleEndian>(compressed_size)?;
        writer.write_u32::<LittleEndian>(self.uncompressed_size)?;
        writer.write_u8(self.algorithm.id())?;
        writer.write_all(&self.data)?;
        Ok(())
    }

    /// Read the next block, or `None` at a clean end of input
    pub fn read_from<R: Read>(reader: &mut R) -> Result<Option<Self>> {
        let compressed_size = match reader.read_u32::<LittleEndian>() {
            Ok(size) => size,
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let uncompressed_size = reader.read_u32::<LittleEndian>()?;
        let algorithm = Compression::from_id(reader.read_u8()?)?;
        let mut data = vec![0u8; compressed_size as usize];
        reader.read_exact(&mut data)?;
        Ok(Some(Self {
            algorithm,
            uncompressed_size,
            data,
        }))
    }
}
