//! Firmware image builder and parser for SigmaDSP audio processors
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format fields
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Many SigmaDSP terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! This crate turns SigmaStudio exports (XML documents describing program
//! memory, parameter memory and named module controls) into the single
//! binary image that the SigmaDSP firmware loader consumes.
//!
//! # Modules
//!
//! - **image**: the binary format itself. Byte sink with running checksum,
//!   aligned chunk framing, the image builder and a verifying parser.
//! - **source**: extraction of data and control records from input documents.
//!
//! # Example
//!
//! ```no_run
//! use sigmafw_formats::image::{FirmwareImage, ImageBuilder};
//! use sigmafw_formats::source::XmlSource;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let summary = ImageBuilder::new()
//!     .add_source(XmlSource::new("dsp_48k.xml", 48_000))
//!     .add_source(XmlSource::new("dsp_96k.xml", 96_000))
//!     .write_to_path("dsp.bin")?;
//! println!("wrote {} bytes, checksum {:#010x}", summary.size, summary.checksum);
//!
//! let image = FirmwareImage::parse(&std::fs::read("dsp.bin")?)?;
//! assert_eq!(image.sample_rates(), &[48_000, 96_000]);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

/// SigmaDSP firmware image format
///
/// Writing goes through [`image::ByteSink`] (size and checksum tracking),
/// [`image::ChunkWriter`] (alignment and chunk framing) and
/// [`image::ImageBuilder`] (source ordering and checksum backpatch).
/// [`image::FirmwareImage`] parses and verifies finished images.
pub mod image;
/// Record extraction from SigmaStudio XML exports
pub mod source;

pub use image::{
    Chunk, ChunkType, FirmwareImage, ImageBuilder, ImageError, ImageResult, ImageSummary,
};
pub use source::{Record, RecordList, RecordSource, SourceError, SourceResult, XmlSource};
