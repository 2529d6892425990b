//! SigmaDSP firmware image format implementation
//!
//! A firmware image is a 12-byte file header followed by a sequence of
//! self-describing chunks. Every chunk starts on a 4-byte boundary; the gap
//! in front of a chunk is filled with `0xAA`.
//!
//! # Format Structure
//!
//! ```text
//! Firmware Image:
//! ├── File Header (12 bytes)
//! │   ├── Magic: "ADISIGM" (7 bytes)
//! │   ├── Version: 2 (1 byte)
//! │   └── Checksum (4 bytes, little-endian, CRC32 over bytes 12..end)
//! └── Chunks (4-byte aligned, 0xAA padding in between)
//!     ├── Chunk Header (12 bytes, little-endian)
//!     │   ├── Size (header + sub-header + payload, padding excluded)
//!     │   ├── Type (0 = data, 1 = control, 2 = sample rate table)
//!     │   └── Sample Rate Mask (one bit per input source)
//!     ├── Data:             address (u16) + raw bytes
//!     ├── Control:          reserved (u16) + address (u16) + length (u16) + "<module> <parameter>"
//!     └── SampleRateTable:  one u32 per input source (always the final chunk, mask 0)
//! ```
//!
//! # Checksum
//!
//! The checksum covers every byte after the file header, padding included.
//! It is the reflected CRC32 (polynomial 0xEDB88320) run from a zero
//! register without a final inversion, which is what the kernel loader
//! computes with `crc32(0, data, len)`. The field is written as zero first
//! and patched once all chunks are out.
//!
//! # Usage Examples
//!
//! ## Building an image in memory
//!
//! ```rust
//! use sigmafw_formats::image::{FirmwareImage, ImageBuilder};
//! use sigmafw_formats::source::{Record, RecordList};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = RecordList::new("eq", 48_000)
//!     .with_record(Record::data(0x10, vec![0x01, 0x02, 0x03, 0x04]))
//!     .with_record(Record::control("EQ", "Gain", 0x20, 2));
//!
//! let bytes = ImageBuilder::new().add_source(source).build()?;
//!
//! let image = FirmwareImage::parse(&bytes)?;
//! assert_eq!(image.chunks.len(), 3);
//! assert_eq!(image.sample_rates(), &[48_000]);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod builder;
mod chunk;
mod error;
mod header;
mod reader;
mod sink;

pub use builder::{ImageBuilder, ImageSummary};
pub use chunk::{Chunk, ChunkPlacement, ChunkType, ChunkWriter, padding_for};
pub use error::{ImageError, ImageResult};
pub use header::{ChunkHeader, ControlChunkHeader, DataChunkHeader, FileHeader};
pub use reader::{FirmwareImage, ImageChunk};
pub use sink::{ByteSink, FileSink, ImageSink, MemorySink, image_checksum};

/// Image magic bytes
pub const IMAGE_MAGIC: [u8; 7] = *b"ADISIGM";

/// Image format version
pub const IMAGE_VERSION: u8 = 2;

/// Size of the file header (magic + version + checksum)
pub const FILE_HEADER_SIZE: usize = 12;

/// Offset of the checksum field within the file header
pub const CHECKSUM_OFFSET: u64 = 8;

/// Size of the common chunk header (size + type + sample rate mask)
pub const CHUNK_HEADER_SIZE: usize = 12;

/// Size of the data chunk sub-header (address)
pub const DATA_SUB_HEADER_SIZE: usize = 2;

/// Size of the control chunk sub-header (reserved + address + length)
pub const CONTROL_SUB_HEADER_SIZE: usize = 6;

/// Filler byte written in front of a chunk to reach alignment
pub const PADDING_BYTE: u8 = 0xAA;

/// Every chunk starts at a multiple of this many bytes
pub const CHUNK_ALIGNMENT: u64 = 4;

/// Maximum number of input sources (one sample rate mask bit each)
pub const MAX_SOURCES: usize = u32::BITS as usize;
