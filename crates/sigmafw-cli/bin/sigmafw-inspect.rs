//! sigmafw-inspect binary entry point.
//!
//! Verifies a firmware image and prints its chunk listing to stdout.

use anyhow::{Context, Result};
use sigmafw_cli::{InspectConfig, init_tracing, inspect, parse_or_exit};
use sigmafw_formats::image::FirmwareImage;

fn main() -> Result<()> {
    let config: InspectConfig = parse_or_exit();
    init_tracing(&config.log_level);

    let bytes = std::fs::read(&config.image)
        .with_context(|| format!("failed to read {}", config.image.display()))?;
    let image = FirmwareImage::parse(&bytes)
        .with_context(|| format!("{} is not a valid firmware image", config.image.display()))?;

    print!("{}", inspect::render(&image, config.hex));
    Ok(())
}
