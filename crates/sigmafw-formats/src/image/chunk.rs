//! Chunk types and aligned chunk framing

use std::fmt;

use tracing::debug;

use super::error::{ImageError, ImageResult};
use super::header::{ChunkHeader, ControlChunkHeader, DataChunkHeader};
use super::sink::{ByteSink, ImageSink};
use super::{
    CHUNK_ALIGNMENT, CHUNK_HEADER_SIZE, CONTROL_SUB_HEADER_SIZE, DATA_SUB_HEADER_SIZE,
    PADDING_BYTE,
};

/// Chunk type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum ChunkType {
    /// Block of program or parameter memory
    Data = 0,
    /// Named, addressable control parameter
    Control = 1,
    /// Table of supported sample rates
    SampleRateTable = 2,
}

impl ChunkType {
    /// Parse from the raw header value
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Data),
            1 => Some(Self::Control),
            2 => Some(Self::SampleRateTable),
            _ => None,
        }
    }

    /// Raw header value
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Size of the type-specific sub-header that follows the chunk header
    pub const fn sub_header_len(self) -> usize {
        match self {
            Self::Data => DATA_SUB_HEADER_SIZE,
            Self::Control => CONTROL_SUB_HEADER_SIZE,
            Self::SampleRateTable => 0,
        }
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data => f.pad("data"),
            Self::Control => f.pad("control"),
            Self::SampleRateTable => f.pad("samplerates"),
        }
    }
}

/// Chunk payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Memory block starting at `address`
    Data {
        /// Start address
        address: u16,
        /// Raw memory contents
        bytes: Vec<u8>,
    },
    /// Control parameter
    Control {
        /// Parameter address
        address: u16,
        /// Parameter length
        length: u16,
        /// "<module> <parameter>", ASCII, not null-terminated
        name: String,
    },
    /// Sample rates, one per input source in input order
    SampleRateTable {
        /// Declared sample rates
        rates: Vec<u32>,
    },
}

impl Chunk {
    /// Data chunk
    pub fn data(address: u16, bytes: Vec<u8>) -> Self {
        Self::Data { address, bytes }
    }

    /// Control chunk named after its module instance and parameter
    pub fn control(module: &str, parameter: &str, address: u16, length: u16) -> Self {
        Self::Control {
            address,
            length,
            name: format!("{module} {parameter}"),
        }
    }

    /// Chunk type tag
    pub fn kind(&self) -> ChunkType {
        match self {
            Self::Data { .. } => ChunkType::Data,
            Self::Control { .. } => ChunkType::Control,
            Self::SampleRateTable { .. } => ChunkType::SampleRateTable,
        }
    }

    /// Payload length after the sub-header
    pub fn payload_len(&self) -> usize {
        match self {
            Self::Data { bytes, .. } => bytes.len(),
            Self::Control { name, .. } => name.len(),
            Self::SampleRateTable { rates } => rates.len() * 4,
        }
    }

    /// Value of the size field: chunk header + sub-header + payload
    pub fn size(&self) -> ImageResult<u32> {
        let size = (CHUNK_HEADER_SIZE + self.kind().sub_header_len()) as u64
            + self.payload_len() as u64;
        u32::try_from(size).map_err(|_| ImageError::ChunkTooLarge { size })
    }

    /// Write the sub-header and payload
    fn write_body<S: ImageSink>(&self, sink: &mut ByteSink<S>) -> ImageResult<()> {
        match self {
            Self::Data { address, bytes } => {
                sink.write(&DataChunkHeader { address: *address }.to_bytes()?)?;
                sink.write(bytes)
            }
            Self::Control {
                address,
                length,
                name,
            } => {
                sink.write(&ControlChunkHeader::new(*address, *length).to_bytes()?)?;
                sink.write(name.as_bytes())
            }
            Self::SampleRateTable { rates } => {
                let table = rates
                    .iter()
                    .flat_map(|rate| rate.to_le_bytes())
                    .collect::<Vec<_>>();
                sink.write(&table)
            }
        }
    }

    /// Decode the sub-header and payload of a chunk
    ///
    /// `body` is everything after the 12-byte chunk header, `offset` the
    /// chunk's position in the image (for error reporting).
    pub(crate) fn parse_body(kind: ChunkType, body: &[u8], offset: usize) -> ImageResult<Self> {
        let invalid = |reason: String| ImageError::InvalidChunk { offset, reason };
        if body.len() < kind.sub_header_len() {
            return Err(invalid(format!(
                "{kind} chunk body of {} bytes is shorter than its {}-byte sub-header",
                body.len(),
                kind.sub_header_len()
            )));
        }
        let payload = &body[kind.sub_header_len()..];

        match kind {
            ChunkType::Data => {
                let header = DataChunkHeader::from_bytes(body)?;
                Ok(Self::data(header.address, payload.to_vec()))
            }
            ChunkType::Control => {
                let header = ControlChunkHeader::from_bytes(body)?;
                if header.reserved != 0 {
                    return Err(invalid(format!(
                        "reserved control field is 0x{:04X}",
                        header.reserved
                    )));
                }
                if !payload.is_ascii() {
                    return Err(invalid("control name is not ASCII".to_string()));
                }
                let name = String::from_utf8_lossy(payload).into_owned();
                Ok(Self::Control {
                    address: header.address,
                    length: header.length,
                    name,
                })
            }
            ChunkType::SampleRateTable => {
                if payload.len() % 4 != 0 {
                    return Err(invalid(format!(
                        "sample rate table of {} bytes is not a multiple of 4",
                        payload.len()
                    )));
                }
                let rates = payload
                    .chunks_exact(4)
                    .map(|rate| u32::from_le_bytes([rate[0], rate[1], rate[2], rate[3]]))
                    .collect();
                Ok(Self::SampleRateTable { rates })
            }
        }
    }
}

/// Number of padding bytes needed at `position` to reach chunk alignment
pub const fn padding_for(position: u64) -> usize {
    ((CHUNK_ALIGNMENT - position % CHUNK_ALIGNMENT) % CHUNK_ALIGNMENT) as usize
}

/// Where a chunk landed in the output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlacement {
    /// Offset of the chunk header (always aligned)
    pub offset: u64,
    /// Padding bytes written in front of the header
    pub padding: usize,
    /// Value of the size field
    pub size: u32,
}

/// Frames records as aligned chunks on top of a [`ByteSink`]
#[derive(Debug)]
pub struct ChunkWriter<S: ImageSink> {
    sink: ByteSink<S>,
    chunks: usize,
}

impl<S: ImageSink> ChunkWriter<S> {
    /// Start writing chunks at the sink's current position
    pub fn new(sink: ByteSink<S>) -> Self {
        Self { sink, chunks: 0 }
    }

    /// Pad to alignment, then write the chunk header, sub-header and payload
    ///
    /// On return the sink sits at the end of the chunk, so the next chunk's
    /// padding is computed from the right position whatever this chunk's size.
    pub fn write_chunk(&mut self, sample_rate_mask: u32, chunk: &Chunk) -> ImageResult<ChunkPlacement> {
        let size = chunk.size()?;

        let padding = padding_for(self.sink.position());
        if padding > 0 {
            self.sink.write(&[PADDING_BYTE; CHUNK_ALIGNMENT as usize][..padding])?;
        }
        let offset = self.sink.position();

        let header = ChunkHeader {
            size,
            kind: chunk.kind().as_u32(),
            sample_rate_mask,
        };
        self.sink.write(&header.to_bytes()?)?;
        chunk.write_body(&mut self.sink)?;
        self.chunks += 1;

        debug!(
            "Wrote {} chunk at offset {} (size {}, mask {:#010x}, padding {})",
            chunk.kind(),
            offset,
            size,
            sample_rate_mask,
            padding
        );

        Ok(ChunkPlacement {
            offset,
            padding,
            size,
        })
    }

    /// Number of chunks written so far
    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Current output position
    pub fn position(&self) -> u64 {
        self.sink.position()
    }

    /// Hand back the byte sink for finalization
    pub fn into_sink(self) -> ByteSink<S> {
        self.sink
    }
}
