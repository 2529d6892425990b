//! Fixed-layout headers of the firmware image
//!
//! All multi-byte fields are little-endian.

use std::io::Cursor;

use binrw::{BinRead, BinWrite};

use super::error::{ImageError, ImageResult};
use super::{
    CHUNK_HEADER_SIZE, CONTROL_SUB_HEADER_SIZE, DATA_SUB_HEADER_SIZE, FILE_HEADER_SIZE,
    IMAGE_MAGIC, IMAGE_VERSION,
};

/// File header: magic, version and checksum (12 bytes)
#[derive(Debug, Clone, PartialEq, Eq, BinRead, BinWrite)]
#[br(little)]
#[bw(little)]
pub struct FileHeader {
    /// Magic bytes, always "ADISIGM"
    pub magic: [u8; 7],
    /// Format version
    pub version: u8,
    /// CRC32 over everything after the header
    pub checksum: u32,
}

impl FileHeader {
    /// Create a header carrying the given checksum
    pub fn new(checksum: u32) -> Self {
        Self {
            magic: IMAGE_MAGIC,
            version: IMAGE_VERSION,
            checksum,
        }
    }

    /// Header with a zero checksum, written before the real value is known
    pub fn placeholder() -> Self {
        Self::new(0)
    }

    /// Check magic and version
    pub fn validate(&self) -> ImageResult<()> {
        if self.magic != IMAGE_MAGIC {
            return Err(ImageError::InvalidMagic {
                expected: IMAGE_MAGIC,
                actual: self.magic,
            });
        }
        if self.version != IMAGE_VERSION {
            return Err(ImageError::UnsupportedVersion(self.version));
        }
        Ok(())
    }

    /// Serialize to the on-disk representation
    pub fn to_bytes(&self) -> ImageResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(FILE_HEADER_SIZE));
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Parse from the start of an image
    pub fn from_bytes(data: &[u8]) -> ImageResult<Self> {
        if data.len() < FILE_HEADER_SIZE {
            return Err(ImageError::Truncated {
                offset: 0,
                need: FILE_HEADER_SIZE,
                have: data.len(),
            });
        }
        Ok(Self::read(&mut Cursor::new(&data[..FILE_HEADER_SIZE]))?)
    }
}

/// Common chunk header (12 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[br(little)]
#[bw(little)]
pub struct ChunkHeader {
    /// Chunk size including this header and the sub-header, padding excluded
    pub size: u32,
    /// Raw chunk type
    pub kind: u32,
    /// Sample rate mask the chunk applies to
    pub sample_rate_mask: u32,
}

impl ChunkHeader {
    /// Serialize to the on-disk representation
    pub fn to_bytes(&self) -> ImageResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(CHUNK_HEADER_SIZE));
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Parse from the first 12 bytes of `data`
    pub fn from_bytes(data: &[u8]) -> ImageResult<Self> {
        Ok(Self::read(&mut Cursor::new(data))?)
    }
}

/// Data chunk sub-header
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[br(little)]
#[bw(little)]
pub struct DataChunkHeader {
    /// Start address of the memory block
    pub address: u16,
}

impl DataChunkHeader {
    /// Serialize to the on-disk representation
    pub fn to_bytes(&self) -> ImageResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(DATA_SUB_HEADER_SIZE));
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Parse from the first 2 bytes of `data`
    pub fn from_bytes(data: &[u8]) -> ImageResult<Self> {
        Ok(Self::read(&mut Cursor::new(data))?)
    }
}

/// Control chunk sub-header
#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[br(little)]
#[bw(little)]
pub struct ControlChunkHeader {
    /// Reserved, always zero
    pub reserved: u16,
    /// Parameter address
    pub address: u16,
    /// Parameter length
    pub length: u16,
}

impl ControlChunkHeader {
    /// Create a sub-header with the reserved field cleared
    pub fn new(address: u16, length: u16) -> Self {
        Self {
            reserved: 0,
            address,
            length,
        }
    }

    /// Serialize to the on-disk representation
    pub fn to_bytes(&self) -> ImageResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::with_capacity(CONTROL_SUB_HEADER_SIZE));
        self.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Parse from the first 6 bytes of `data`
    pub fn from_bytes(data: &[u8]) -> ImageResult<Self> {
        Ok(Self::read(&mut Cursor::new(data))?)
    }
}
