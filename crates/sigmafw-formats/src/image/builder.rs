//! Firmware image builder
//!
//! Sources are added in order; source `i` owns bit `i` of the sample rate
//! mask. Every record of every source becomes one chunk, and a single sample
//! rate table closes the image.

use std::fmt;
use std::path::Path;

use tracing::{debug, info};

use super::chunk::{Chunk, ChunkWriter};
use super::error::{ImageError, ImageResult};
use super::sink::{ByteSink, FileSink, ImageSink, MemorySink};
use super::MAX_SOURCES;
use crate::source::{Record, RecordSource};

/// What a finished build produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSummary {
    /// Number of data chunks written
    pub data_chunks: usize,
    /// Number of control chunks written
    pub control_chunks: usize,
    /// Sample rate table contents, in source order
    pub sample_rates: Vec<u32>,
    /// Total image size in bytes
    pub size: u64,
    /// Checksum stored in the file header
    pub checksum: u32,
}

/// Records of one source, ready to be written
struct SourceBatch {
    mask: u32,
    sample_rate: u32,
    records: Vec<Record>,
}

/// Builder for firmware images
#[derive(Default)]
pub struct ImageBuilder {
    sources: Vec<Box<dyn RecordSource>>,
}

impl fmt::Debug for ImageBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.sources
                    .iter()
                    .map(|source| format!("{} @ {} Hz", source.name(), source.sample_rate())),
            )
            .finish()
    }
}

impl ImageBuilder {
    /// Create a builder with no sources
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the next source
    #[must_use]
    pub fn add_source(mut self, source: impl RecordSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Number of sources added so far
    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Fail if there are more sources than mask bits
    pub fn check_source_count(&self) -> ImageResult<()> {
        if self.sources.len() > MAX_SOURCES {
            return Err(ImageError::TooManySources {
                count: self.sources.len(),
                max: MAX_SOURCES,
            });
        }
        Ok(())
    }

    /// Build the image into memory
    pub fn build(&self) -> ImageResult<Vec<u8>> {
        let (sink, _) = self.build_to(MemorySink::new())?;
        Ok(sink.into_inner())
    }

    /// Build the image into `path`
    ///
    /// All sources are read before the file is created, so a bad input
    /// leaves no output behind.
    pub fn write_to_path(&self, path: impl AsRef<Path>) -> ImageResult<ImageSummary> {
        let batches = self.read_sources()?;
        let (_, summary) = write_image(batches, FileSink::create(path)?)?;
        Ok(summary)
    }

    /// Build the image into an arbitrary sink
    pub fn build_to<S: ImageSink>(&self, sink: S) -> ImageResult<(S, ImageSummary)> {
        let batches = self.read_sources()?;
        write_image(batches, sink)
    }

    fn read_sources(&self) -> ImageResult<Vec<SourceBatch>> {
        self.check_source_count()?;

        self.sources
            .iter()
            .enumerate()
            .map(|(index, source)| -> ImageResult<SourceBatch> {
                let mask = u32::try_from(index)
                    .ok()
                    .and_then(|bit| 1u32.checked_shl(bit))
                    .ok_or(ImageError::TooManySources {
                        count: self.sources.len(),
                        max: MAX_SOURCES,
                    })?;

                let records = source.records().map_err(|err| ImageError::Source {
                    index,
                    name: source.name(),
                    source: err,
                })?;

                info!(
                    "Source {} ({}, {} Hz): {} records",
                    index,
                    source.name(),
                    source.sample_rate(),
                    records.len()
                );

                Ok(SourceBatch {
                    mask,
                    sample_rate: source.sample_rate(),
                    records,
                })
            })
            .collect()
    }
}

fn write_image<S: ImageSink>(
    batches: Vec<SourceBatch>,
    sink: S,
) -> ImageResult<(S, ImageSummary)> {
    let mut sink = ByteSink::new(sink);
    sink.write_header()?;
    let mut writer = ChunkWriter::new(sink);

    let mut data_chunks = 0;
    let mut control_chunks = 0;
    let mut sample_rates = Vec::with_capacity(batches.len());

    for batch in batches {
        for record in batch.records {
            match record {
                Record::Data { .. } => data_chunks += 1,
                Record::Control { .. } => control_chunks += 1,
            }
            writer.write_chunk(batch.mask, &record.into_chunk())?;
        }
        sample_rates.push(batch.sample_rate);
    }

    let table = Chunk::SampleRateTable {
        rates: sample_rates.clone(),
    };
    writer.write_chunk(0, &table)?;

    let size = writer.position();
    let chunks = writer.chunk_count();
    let (sink, checksum) = writer.into_sink().finalize()?;

    debug!("Patched checksum {:#010x}", checksum);
    info!(
        "Built image: {} bytes, {} chunks, checksum {:#010x}",
        size, chunks, checksum
    );

    Ok((
        sink,
        ImageSummary {
            data_chunks,
            control_chunks,
            sample_rates,
            size,
            checksum,
        },
    ))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::source::{RecordList, SourceError, SourceResult};

    /// Source whose extraction always fails
    struct Broken;

    impl RecordSource for Broken {
        fn sample_rate(&self) -> u32 {
            96_000
        }

        fn name(&self) -> String {
            "broken.xml".to_string()
        }

        fn records(&self) -> SourceResult<Vec<Record>> {
            Err(SourceError::EmptyField {
                element: "Module",
                field: "CellName",
            })
        }
    }

    fn eq_source(rate: u32) -> RecordList {
        RecordList::new("eq", rate)
            .with_record(Record::data(16, vec![0x01, 0x02, 0x03, 0x04]))
            .with_record(Record::control("EQ", "Gain", 32, 2))
    }

    #[test]
    fn test_single_source_bytes() {
        let bytes = ImageBuilder::new()
            .add_source(eq_source(48_000))
            .build()
            .expect("Operation should succeed");

        let expected: &[u8] = &[
            0x41, 0x44, 0x49, 0x53, 0x49, 0x47, 0x4D, 0x02, 0x29, 0xE0, 0x8F, 0x8B, // header
            0x12, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, // data
            0x10, 0x00, 0x01, 0x02, 0x03, 0x04, 0xAA, 0xAA, //
            0x19, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, // control
            0x00, 0x00, 0x20, 0x00, 0x02, 0x00, 0x45, 0x51, 0x20, 0x47, 0x61, 0x69, 0x6E, //
            0xAA, 0xAA, 0xAA, //
            0x10, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // table
            0x80, 0xBB, 0x00, 0x00,
        ];
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_summary() {
        let (sink, summary) = ImageBuilder::new()
            .add_source(eq_source(48_000))
            .add_source(RecordList::new("empty", 96_000))
            .build_to(MemorySink::new())
            .expect("Operation should succeed");

        assert_eq!(
            summary,
            ImageSummary {
                data_chunks: 1,
                control_chunks: 1,
                sample_rates: vec![48_000, 96_000],
                size: sink.as_slice().len() as u64,
                checksum: u32::from_le_bytes(sink.as_slice()[8..12].try_into().unwrap()),
            }
        );
    }

    #[test]
    fn test_masks_follow_source_index() {
        let mut builder = ImageBuilder::new();
        for rate in [32_000, 44_100, 48_000] {
            builder = builder.add_source(
                RecordList::new(rate.to_string(), rate).with_record(Record::data(0, vec![0])),
            );
        }
        let bytes = builder.build().expect("Operation should succeed");

        // Each 15-byte data chunk is followed by one padding byte
        for (index, offset) in [12usize, 28, 44].into_iter().enumerate() {
            assert_eq!(
                bytes[offset + 8..offset + 12],
                (1u32 << index).to_le_bytes()
            );
        }
        assert_eq!(bytes[60..64], 24u32.to_le_bytes());
        assert_eq!(bytes[68..72], 0u32.to_le_bytes());
    }

    #[test]
    fn test_no_sources() {
        let bytes = ImageBuilder::new()
            .build()
            .expect("Operation should succeed");
        assert_eq!(bytes.len(), 24);
        assert_eq!(bytes[12..16], 12u32.to_le_bytes());
        assert_eq!(bytes[16..20], 2u32.to_le_bytes());
    }

    #[test]
    fn test_build_is_deterministic() {
        let builder = ImageBuilder::new()
            .add_source(eq_source(48_000))
            .add_source(eq_source(96_000));
        assert_eq!(
            builder.build().expect("Operation should succeed"),
            builder.build().expect("Operation should succeed")
        );
    }

    #[test]
    fn test_thirty_two_sources_allowed() {
        let mut builder = ImageBuilder::new();
        for index in 0..MAX_SOURCES {
            builder = builder.add_source(RecordList::new(index.to_string(), 48_000));
        }
        let bytes = builder.build().expect("Operation should succeed");
        assert_eq!(bytes.len(), 12 + 12 + 4 * MAX_SOURCES);
    }

    #[test]
    fn test_too_many_sources() {
        let mut builder = ImageBuilder::new();
        for index in 0..=MAX_SOURCES {
            builder = builder.add_source(RecordList::new(index.to_string(), 48_000));
        }
        assert_eq!(builder.source_count(), 33);
        assert!(matches!(
            builder.build(),
            Err(ImageError::TooManySources { count: 33, max: 32 })
        ));

        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let path = dir.path().join("out.bin");
        assert!(builder.write_to_path(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_source_error_names_source() {
        let builder = ImageBuilder::new()
            .add_source(eq_source(48_000))
            .add_source(Broken);

        let err = builder.build().expect_err("Build should fail");
        assert!(matches!(
            err,
            ImageError::Source { index: 1, ref name, .. } if name == "broken.xml"
        ));

        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let path = dir.path().join("out.bin");
        assert!(builder.write_to_path(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_write_to_path_matches_build() {
        let builder = ImageBuilder::new()
            .add_source(eq_source(48_000))
            .add_source(eq_source(96_000));
        let dir = tempfile::tempdir().expect("Failed to create temporary directory");
        let path = dir.path().join("dsp.bin");

        let summary = builder
            .write_to_path(&path)
            .expect("Operation should succeed");
        let written = std::fs::read(&path).expect("Failed to read image");

        assert_eq!(written, builder.build().expect("Operation should succeed"));
        assert_eq!(summary.size, written.len() as u64);
    }
}
