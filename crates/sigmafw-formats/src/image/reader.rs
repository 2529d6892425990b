//! Firmware image parsing and validation

use tracing::debug;

use super::chunk::{Chunk, ChunkType, padding_for};
use super::error::{ImageError, ImageResult};
use super::header::{ChunkHeader, FileHeader};
use super::sink::image_checksum;
use super::{CHUNK_HEADER_SIZE, FILE_HEADER_SIZE, PADDING_BYTE};

/// Chunk as found in an image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageChunk {
    /// Offset of the chunk header
    pub offset: usize,
    /// Padding bytes in front of the header
    pub padding: usize,
    /// Size field from the chunk header
    pub size: u32,
    /// Sample rate mask from the chunk header
    pub sample_rate_mask: u32,
    /// Decoded chunk
    pub chunk: Chunk,
}

/// Parsed firmware image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareImage {
    /// File header
    pub header: FileHeader,
    /// Chunks in file order, sample rate table last
    pub chunks: Vec<ImageChunk>,
}

impl FirmwareImage {
    /// Parse and validate a complete image
    ///
    /// Checks magic, version and checksum, that every gap in front of a chunk
    /// is `0xAA` padding, that every chunk is complete and of a known type,
    /// and that exactly one sample rate table (mask 0) closes the image.
    /// Data and control chunks must select exactly one listed sample rate.
    pub fn parse(data: &[u8]) -> ImageResult<Self> {
        let header = FileHeader::from_bytes(data)?;
        header.validate()?;

        let actual = image_checksum(&data[FILE_HEADER_SIZE..]);
        if actual != header.checksum {
            return Err(ImageError::ChecksumMismatch {
                expected: header.checksum,
                actual,
            });
        }

        let mut chunks = Vec::new();
        let mut offset = FILE_HEADER_SIZE;
        while offset < data.len() {
            let chunk = read_chunk(data, offset)?;
            offset = chunk.offset + chunk.size as usize;
            chunks.push(chunk);
        }

        let image = Self { header, chunks };
        image.validate_layout()?;

        debug!(
            "Parsed image: {} chunks, {} sample rates",
            image.chunks.len(),
            image.sample_rates().len()
        );
        Ok(image)
    }

    /// Sample rates listed in the table, in source order
    pub fn sample_rates(&self) -> &[u32] {
        match self.chunks.last().map(|entry| &entry.chunk) {
            Some(Chunk::SampleRateTable { rates }) => rates,
            _ => &[],
        }
    }

    /// Chunks that apply to the source at `index`
    pub fn chunks_for(&self, index: usize) -> impl Iterator<Item = &ImageChunk> {
        let mask = u32::try_from(index)
            .ok()
            .and_then(|bit| 1u32.checked_shl(bit))
            .unwrap_or(0);
        self.chunks
            .iter()
            .filter(move |entry| mask != 0 && entry.sample_rate_mask & mask != 0)
    }

    /// Total size of the image in bytes
    pub fn size(&self) -> usize {
        self.chunks
            .last()
            .map_or(FILE_HEADER_SIZE, |entry| entry.offset + entry.size as usize)
    }

    fn validate_layout(&self) -> ImageResult<()> {
        let Some((table, rest)) = self.chunks.split_last() else {
            return Err(ImageError::MissingSampleRateTable);
        };
        let Chunk::SampleRateTable { rates } = &table.chunk else {
            return Err(ImageError::MissingSampleRateTable);
        };
        if table.sample_rate_mask != 0 {
            return Err(ImageError::InvalidChunk {
                offset: table.offset,
                reason: format!(
                    "sample rate table has mask {:#010x}, expected 0",
                    table.sample_rate_mask
                ),
            });
        }

        for entry in rest {
            if entry.chunk.kind() == ChunkType::SampleRateTable {
                return Err(ImageError::InvalidChunk {
                    offset: entry.offset,
                    reason: "sample rate table is not the final chunk".to_string(),
                });
            }
            let mask = entry.sample_rate_mask;
            let bit = mask.trailing_zeros() as usize;
            if mask.count_ones() != 1 || bit >= rates.len() {
                return Err(ImageError::InvalidChunk {
                    offset: entry.offset,
                    reason: format!(
                        "mask {mask:#010x} does not select one of {} sample rates",
                        rates.len()
                    ),
                });
            }
        }
        Ok(())
    }
}

fn read_chunk(data: &[u8], position: usize) -> ImageResult<ImageChunk> {
    let padding = padding_for(position as u64);
    let offset = position + padding;
    if offset > data.len() {
        return Err(ImageError::Truncated {
            offset: position,
            need: padding,
            have: data.len() - position,
        });
    }
    if let Some(index) = data[position..offset]
        .iter()
        .position(|&byte| byte != PADDING_BYTE)
    {
        return Err(ImageError::InvalidPadding {
            offset: position + index,
            value: data[position + index],
        });
    }

    let remaining = data.len() - offset;
    if remaining < CHUNK_HEADER_SIZE {
        return Err(ImageError::Truncated {
            offset,
            need: CHUNK_HEADER_SIZE,
            have: remaining,
        });
    }
    let header = ChunkHeader::from_bytes(&data[offset..offset + CHUNK_HEADER_SIZE])?;

    let kind = ChunkType::from_u32(header.kind).ok_or(ImageError::UnknownChunkType {
        offset,
        kind: header.kind,
    })?;

    let size = header.size as usize;
    if size < CHUNK_HEADER_SIZE {
        return Err(ImageError::InvalidChunk {
            offset,
            reason: format!("size {size} is smaller than the chunk header"),
        });
    }
    if size > remaining {
        return Err(ImageError::Truncated {
            offset,
            need: size,
            have: remaining,
        });
    }

    let chunk = Chunk::parse_body(kind, &data[offset + CHUNK_HEADER_SIZE..offset + size], offset)?;

    Ok(ImageChunk {
        offset,
        padding,
        size: header.size,
        sample_rate_mask: header.sample_rate_mask,
        chunk,
    })
}
