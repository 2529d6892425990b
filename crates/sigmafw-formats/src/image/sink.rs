//! Output sinks and the checksumming byte sink
//!
//! The image is written in two phases: chunks are streamed out while the
//! checksum accumulates, then the checksum field in the header is patched.
//! [`ImageSink`] hides whether that patch is a seek on a file or a write into
//! an in-memory buffer.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

use crc32fast::Hasher;
use tracing::debug;

use super::error::{ImageError, ImageResult};
use super::header::FileHeader;
use super::CHECKSUM_OFFSET;

/// Accumulator seed and final XOR.
///
/// `crc32fast` keeps its state in finalized (inverted) form, so seeding it
/// with all ones starts the raw register at zero and the final XOR strips the
/// inversion again.
const CRC_SEED: u32 = 0xFFFF_FFFF;

/// Compute the image checksum over a complete image body
pub fn image_checksum(body: &[u8]) -> u32 {
    let mut hasher = Hasher::new_with_initial(CRC_SEED);
    hasher.update(body);
    hasher.finalize() ^ CRC_SEED
}

/// Destination of a firmware image
pub trait ImageSink {
    /// Append bytes at the end of the output
    fn append(&mut self, bytes: &[u8]) -> ImageResult<()>;

    /// Overwrite bytes that were already appended
    fn patch(&mut self, offset: u64, bytes: &[u8]) -> ImageResult<()>;

    /// Flush buffered output; called once after the final patch
    fn finish(&mut self) -> ImageResult<()> {
        Ok(())
    }
}

/// Sink that keeps the whole image in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Vec<u8>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes written so far
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Take the written image
    pub fn into_inner(self) -> Vec<u8> {
        self.buffer
    }
}

impl ImageSink for MemorySink {
    fn append(&mut self, bytes: &[u8]) -> ImageResult<()> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    fn patch(&mut self, offset: u64, bytes: &[u8]) -> ImageResult<()> {
        let size = self.buffer.len();
        let out_of_bounds = || ImageError::PatchOutOfBounds {
            offset,
            len: bytes.len(),
            size: size as u64,
        };
        let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
        let end = start
            .checked_add(bytes.len())
            .filter(|&end| end <= size)
            .ok_or_else(out_of_bounds)?;
        self.buffer[start..end].copy_from_slice(bytes);
        Ok(())
    }
}

/// Sink over a seekable writer, patching by seeking back
#[derive(Debug)]
pub struct FileSink<W: Write + Seek> {
    inner: W,
}

impl FileSink<BufWriter<File>> {
    /// Create (or truncate) the file at `path`
    pub fn create(path: impl AsRef<Path>) -> ImageResult<Self> {
        let path = path.as_ref();
        debug!("Creating image file {}", path.display());
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write + Seek> FileSink<W> {
    /// Wrap a seekable writer positioned at the start of the image
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Take back the writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write + Seek> ImageSink for FileSink<W> {
    fn append(&mut self, bytes: &[u8]) -> ImageResult<()> {
        self.inner.write_all(bytes)?;
        Ok(())
    }

    fn patch(&mut self, offset: u64, bytes: &[u8]) -> ImageResult<()> {
        let end = self.inner.stream_position()?;
        let fits = offset
            .checked_add(bytes.len() as u64)
            .is_some_and(|patch_end| patch_end <= end);
        if !fits {
            return Err(ImageError::PatchOutOfBounds {
                offset,
                len: bytes.len(),
                size: end,
            });
        }
        self.inner.seek(SeekFrom::Start(offset))?;
        self.inner.write_all(bytes)?;
        self.inner.seek(SeekFrom::Start(end))?;
        Ok(())
    }

    fn finish(&mut self) -> ImageResult<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Byte sink tracking total size and the running checksum
///
/// Only bytes passed to [`ByteSink::write`] enter the checksum; the file
/// header written by [`ByteSink::write_header`] does not.
/// [`ByteSink::finalize`] consumes the sink, so nothing can be written after
/// the checksum is patched.
pub struct ByteSink<S: ImageSink> {
    sink: S,
    size: u64,
    crc: Hasher,
}

impl<S: ImageSink> fmt::Debug for ByteSink<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ByteSink")
            .field("size", &self.size)
            .field("checksum", &format_args!("{:#010x}", self.checksum()))
            .finish_non_exhaustive()
    }
}

impl<S: ImageSink> ByteSink<S> {
    /// Wrap an empty output
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            size: 0,
            crc: Hasher::new_with_initial(CRC_SEED),
        }
    }

    /// Write magic, version and a zero checksum placeholder, unchecksummed
    pub fn write_header(&mut self) -> ImageResult<()> {
        let header = FileHeader::placeholder().to_bytes()?;
        self.sink.append(&header)?;
        self.size += header.len() as u64;
        Ok(())
    }

    /// Append bytes and fold them into the checksum
    pub fn write(&mut self, bytes: &[u8]) -> ImageResult<()> {
        self.sink.append(bytes)?;
        self.crc.update(bytes);
        self.size += bytes.len() as u64;
        Ok(())
    }

    /// Total number of bytes written, file header included
    pub fn position(&self) -> u64 {
        self.size
    }

    /// Checksum of everything written through [`ByteSink::write`] so far
    pub fn checksum(&self) -> u32 {
        self.crc.clone().finalize() ^ CRC_SEED
    }

    /// Patch the checksum into the header and hand back the sink
    pub fn finalize(mut self) -> ImageResult<(S, u32)> {
        let checksum = self.checksum();
        self.sink.patch(CHECKSUM_OFFSET, &checksum.to_le_bytes())?;
        self.sink.finish()?;
        Ok((self.sink, checksum))
    }
}
