//! Firmware image error types

use thiserror::Error;

use crate::source::SourceError;

/// Image-specific error type
#[derive(Debug, Error)]
pub enum ImageError {
    /// More input sources than sample rate mask bits
    #[error("too many input sources: {count} (maximum {max})")]
    TooManySources {
        /// Number of sources supplied
        count: usize,
        /// Maximum number of sources
        max: usize,
    },

    /// Chunk does not fit the 32-bit size field
    #[error("chunk too large: {size} bytes does not fit the 32-bit size field")]
    ChunkTooLarge {
        /// Total chunk size that was requested
        size: u64,
    },

    /// Input source could not be read or parsed
    #[error("source {index} ({name}): {source}")]
    Source {
        /// Position of the source in the build (also its mask bit)
        index: usize,
        /// Human readable source name
        name: String,
        /// Underlying extraction error
        source: SourceError,
    },

    /// Patch of already-written bytes falls outside the output
    #[error("patch of {len} bytes at offset {offset} is outside the {size}-byte output")]
    PatchOutOfBounds {
        /// Offset of the patch
        offset: u64,
        /// Number of bytes to patch
        len: usize,
        /// Bytes written so far
        size: u64,
    },

    /// Invalid image magic bytes
    #[error("invalid image magic: expected {expected:02X?}, got {actual:02X?}")]
    InvalidMagic {
        /// Expected magic
        expected: [u8; 7],
        /// Magic found in the image
        actual: [u8; 7],
    },

    /// Unsupported format version
    #[error("unsupported image version: {0}")]
    UnsupportedVersion(u8),

    /// Checksum mismatch
    #[error("checksum mismatch: header says {expected:#010x}, computed {actual:#010x}")]
    ChecksumMismatch {
        /// Checksum stored in the header
        expected: u32,
        /// Checksum computed over the image body
        actual: u32,
    },

    /// Alignment gap contains something other than the padding byte
    #[error("invalid padding byte 0x{value:02X} at offset {offset}")]
    InvalidPadding {
        /// Offset of the offending byte
        offset: usize,
        /// Value found
        value: u8,
    },

    /// Unknown chunk type
    #[error("unknown chunk type {kind} at offset {offset}")]
    UnknownChunkType {
        /// Offset of the chunk header
        offset: usize,
        /// Raw type value
        kind: u32,
    },

    /// Structurally invalid chunk
    #[error("invalid chunk at offset {offset}: {reason}")]
    InvalidChunk {
        /// Offset of the chunk header
        offset: usize,
        /// What is wrong with it
        reason: String,
    },

    /// Image ends in the middle of a structure
    #[error("truncated image: need {need} bytes at offset {offset}, {have} available")]
    Truncated {
        /// Offset where reading stopped
        offset: usize,
        /// Bytes required
        need: usize,
        /// Bytes remaining
        have: usize,
    },

    /// Image has no sample rate table
    #[error("image has no sample rate table")]
    MissingSampleRateTable,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for image operations
pub type ImageResult<T> = Result<T, ImageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ImageError::TooManySources { count: 33, max: 32 };
        assert_eq!(err.to_string(), "too many input sources: 33 (maximum 32)");

        let err = ImageError::ChecksumMismatch {
            expected: 0x8B8F_E029,
            actual: 0,
        };
        assert_eq!(
            err.to_string(),
            "checksum mismatch: header says 0x8b8fe029, computed 0x00000000"
        );
    }

    #[test]
    fn test_source_error_keeps_source_chain() {
        use std::error::Error;

        let err = ImageError::Source {
            index: 1,
            name: "dsp_96k.xml".to_string(),
            source: SourceError::MissingElement {
                element: "Program",
                child: "Address",
            },
        };
        assert!(err.to_string().starts_with("source 1 (dsp_96k.xml): "));
        assert!(err.source().is_some());
    }
}
