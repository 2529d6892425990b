#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Property tests for image layout invariants

use proptest::prelude::*;
use sigmafw_formats::image::{
    Chunk, FILE_HEADER_SIZE, FirmwareImage, ImageBuilder, MemorySink, PADDING_BYTE,
    image_checksum,
};
use sigmafw_formats::source::{Record, RecordList};

/// Generate a data or control record
fn record() -> impl Strategy<Value = Record> {
    prop_oneof![
        (any::<u16>(), prop::collection::vec(any::<u8>(), 0..64))
            .prop_map(|(address, bytes)| Record::data(address, bytes)),
        ("[A-Za-z][A-Za-z0-9_]{0,15}", "[a-z][a-z0-9]{0,11}", any::<u16>(), any::<u16>())
            .prop_map(|(module, parameter, address, length)| {
                Record::control(module, parameter, address, length)
            }),
    ]
}

/// Generate one source: sample rate and its records
fn source() -> impl Strategy<Value = (u32, Vec<Record>)> {
    (
        prop_oneof![Just(32_000u32), Just(44_100), Just(48_000), Just(96_000), any::<u32>()],
        prop::collection::vec(record(), 0..8),
    )
}

fn build(sources: &[(u32, Vec<Record>)]) -> Vec<u8> {
    sources
        .iter()
        .enumerate()
        .fold(ImageBuilder::new(), |builder, (index, (rate, records))| {
            builder.add_source(
                RecordList::new(index.to_string(), *rate).with_records(records.iter().cloned()),
            )
        })
        .build()
        .expect("Operation should succeed")
}

proptest! {
    /// Every chunk starts aligned, padding is 0xAA, and sizes chain to the end
    #[test]
    fn chunks_are_aligned_and_contiguous(sources in prop::collection::vec(source(), 1..5)) {
        let bytes = build(&sources);
        let image = FirmwareImage::parse(&bytes).map_err(|e| TestCaseError::fail(e.to_string()))?;

        let mut end = FILE_HEADER_SIZE;
        for entry in &image.chunks {
            prop_assert_eq!(entry.offset % 4, 0);
            prop_assert_eq!(entry.offset, end + entry.padding);
            prop_assert!(bytes[end..entry.offset].iter().all(|&b| b == PADDING_BYTE));
            end = entry.offset + entry.size as usize;
        }
        prop_assert_eq!(end, bytes.len());
    }

    /// Header checksum covers everything after the header
    #[test]
    fn checksum_covers_body(sources in prop::collection::vec(source(), 1..5)) {
        let bytes = build(&sources);
        let stored = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        prop_assert_eq!(stored, image_checksum(&bytes[FILE_HEADER_SIZE..]));
    }

    /// Records come back in order under their source's mask bit
    #[test]
    fn records_keep_order_and_mask(sources in prop::collection::vec(source(), 1..5)) {
        let bytes = build(&sources);
        let image = FirmwareImage::parse(&bytes).map_err(|e| TestCaseError::fail(e.to_string()))?;

        let expected = sources
            .iter()
            .enumerate()
            .flat_map(|(index, (_, records))| {
                records
                    .iter()
                    .map(move |record| (1u32 << index, record.clone().into_chunk()))
            })
            .chain(std::iter::once((
                0,
                Chunk::SampleRateTable {
                    rates: sources.iter().map(|(rate, _)| *rate).collect(),
                },
            )))
            .collect::<Vec<_>>();
        let actual = image
            .chunks
            .into_iter()
            .map(|entry| (entry.sample_rate_mask, entry.chunk))
            .collect::<Vec<_>>();

        prop_assert_eq!(actual, expected);
    }

    /// Memory and file sinks produce the same bytes
    #[test]
    fn file_output_matches_memory(sources in prop::collection::vec(source(), 1..3)) {
        let builder = sources
            .iter()
            .enumerate()
            .fold(ImageBuilder::new(), |builder, (index, (rate, records))| {
                builder.add_source(
                    RecordList::new(index.to_string(), *rate).with_records(records.iter().cloned()),
                )
            });

        let (memory, summary) = builder
            .build_to(MemorySink::new())
            .map_err(|e| TestCaseError::fail(e.to_string()))?;

        let dir = tempfile::tempdir().map_err(|e| TestCaseError::fail(e.to_string()))?;
        let path = dir.path().join("image.bin");
        let file_summary = builder
            .write_to_path(&path)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        let written = std::fs::read(&path).map_err(|e| TestCaseError::fail(e.to_string()))?;

        prop_assert_eq!(summary, file_summary);
        prop_assert_eq!(memory.into_inner(), written);
    }

    /// Any single flipped body bit is caught by the checksum
    #[test]
    fn corrupted_body_rejected(
        sources in prop::collection::vec(source(), 1..3),
        position in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut bytes = build(&sources);
        let target = FILE_HEADER_SIZE + position.index(bytes.len() - FILE_HEADER_SIZE);
        bytes[target] ^= 1 << bit;
        prop_assert!(FirmwareImage::parse(&bytes).is_err());
    }
}
