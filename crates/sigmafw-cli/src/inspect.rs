//! Human-readable image listing.

use sigmafw_formats::image::{Chunk, FirmwareImage, ImageChunk};
use std::fmt::Write;

/// Render the header, sample rate table and one line per chunk.
///
/// With `hex`, each data chunk is followed by its payload in hex, 32 bytes
/// per line.
#[must_use]
pub fn render(image: &FirmwareImage, hex: bool) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} version {}, checksum {:#010x}, {} bytes, {} chunks",
        String::from_utf8_lossy(&image.header.magic),
        image.header.version,
        image.header.checksum,
        image.size(),
        image.chunks.len()
    );

    for (bit, rate) in image.sample_rates().iter().enumerate() {
        let _ = writeln!(
            out,
            "  source {bit}: {rate} Hz, {} chunks",
            image.chunks_for(bit).count()
        );
    }

    for entry in &image.chunks {
        render_chunk(&mut out, entry, hex);
    }

    out
}

fn render_chunk(out: &mut String, entry: &ImageChunk, hex: bool) {
    let _ = write!(
        out,
        "{:#06x}  {:<11}  mask {:#010x}  size {:>5}",
        entry.offset,
        entry.chunk.kind(),
        entry.sample_rate_mask,
        entry.size
    );

    match &entry.chunk {
        Chunk::Data { address, bytes } => {
            let _ = writeln!(out, "  address {address:#06x}  {} bytes", bytes.len());
            if hex {
                for line in bytes.chunks(32) {
                    let _ = writeln!(out, "        {}", hex::encode(line));
                }
            }
        }
        Chunk::Control {
            address,
            length,
            name,
        } => {
            let _ = writeln!(out, "  address {address:#06x}  length {length}  {name:?}");
        }
        Chunk::SampleRateTable { rates } => {
            let rates = rates
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "  [{rates}]");
        }
    }
}
