//! Build command.

use crate::config::BuildPlan;
use anyhow::{Context, Result, ensure};
use sigmafw_formats::image::{FirmwareImage, ImageSummary, MemorySink};
use std::path::Path;
use tracing::info;

/// Build the image described by `plan`, then verify it if requested.
///
/// # Errors
///
/// Fails if an input cannot be read or parsed, the output cannot be written,
/// or verification finds the written image inconsistent.
pub fn run(plan: &BuildPlan) -> Result<ImageSummary> {
    let builder = plan.builder();
    let output = &plan.output;

    let summary = if plan.buffered {
        let (sink, summary) = builder
            .build_to(MemorySink::new())
            .context("failed to build firmware image")?;
        std::fs::write(output, sink.into_inner())
            .with_context(|| format!("failed to write {}", output.display()))?;
        summary
    } else {
        builder
            .write_to_path(output)
            .with_context(|| format!("failed to build {}", output.display()))?
    };

    info!(
        "Wrote {} ({} bytes, {} data, {} control, checksum {:#010x})",
        output.display(),
        summary.size,
        summary.data_chunks,
        summary.control_chunks,
        summary.checksum
    );

    if plan.verify {
        verify(output, &summary)?;
    }

    Ok(summary)
}

/// Re-read an image and check it against what the build reported.
pub fn verify(path: &Path, summary: &ImageSummary) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let image = FirmwareImage::parse(&bytes)
        .with_context(|| format!("verification of {} failed", path.display()))?;

    ensure!(
        bytes.len() as u64 == summary.size,
        "{} is {} bytes, expected {}",
        path.display(),
        bytes.len(),
        summary.size
    );
    ensure!(
        image.header.checksum == summary.checksum,
        "{} has checksum {:#010x}, expected {:#010x}",
        path.display(),
        image.header.checksum,
        summary.checksum
    );
    ensure!(
        image.sample_rates() == summary.sample_rates.as_slice(),
        "{} lists sample rates {:?}, expected {:?}",
        path.display(),
        image.sample_rates(),
        summary.sample_rates
    );

    info!("Verified {} ({} chunks)", path.display(), image.chunks.len());
    Ok(())
}
