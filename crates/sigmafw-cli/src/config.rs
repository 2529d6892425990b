//! Command-line configuration.
//!
//! Both tools read their settings from CLI arguments, with environment
//! variables as fallbacks:
//!
//! - `SIGMAFW_LOG`: default log filter when `RUST_LOG` is unset
//! - `SIGMAFW_BUFFERED`: build in memory and write the file once
//! - `SIGMAFW_VERIFY`: re-read and verify the written image
//!
//! # Example
//!
//! ```no_run
//! use sigmafw_cli::BuildConfig;
//!
//! let config = BuildConfig::from_args();
//! let plan = config.validate().expect("Invalid arguments");
//!
//! for (input, rate) in &plan.inputs {
//!     println!("{} at {rate} Hz", input.display());
//! }
//! println!("Output: {}", plan.output.display());
//! ```

use crate::error::ConfigError;
use clap::Parser;
use sigmafw_formats::image::{ImageBuilder, MAX_SOURCES};
use sigmafw_formats::source::XmlSource;
use std::path::PathBuf;

/// Configuration for `sigmafw`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sigmafw",
    about = "Build a SigmaDSP firmware image from SigmaStudio XML exports",
    version
)]
pub struct BuildConfig {
    /// Input XML and sample rate pairs, followed by the output image path
    #[arg(value_name = "INPUT RATE [INPUT RATE ...] OUTPUT", required = true)]
    pub args: Vec<String>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "SIGMAFW_LOG", default_value = "info")]
    pub log_level: String,

    /// Build the image in memory and write the file in one go
    #[arg(long, env = "SIGMAFW_BUFFERED")]
    pub buffered: bool,

    /// Re-read the written image and verify it
    #[arg(long, env = "SIGMAFW_VERIFY")]
    pub verify: bool,
}

/// Validated build request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlan {
    /// Input documents with their sample rates, in mask bit order
    pub inputs: Vec<(PathBuf, u32)>,
    /// Image path
    pub output: PathBuf,
    /// Build in memory before writing
    pub buffered: bool,
    /// Verify after writing
    pub verify: bool,
}

impl BuildConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Turn the positional list into a build plan.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - the positional count is not `2n + 1` with `n >= 1`
    /// - a sample rate is not an unsigned 32-bit integer
    /// - there are more than 32 inputs
    pub fn validate(&self) -> Result<BuildPlan, ConfigError> {
        let count = self.args.len();
        let Some((output, pairs)) = self.args.split_last() else {
            return Err(ConfigError::ArgumentCount { count });
        };
        if pairs.is_empty() || pairs.len() % 2 != 0 {
            return Err(ConfigError::ArgumentCount { count });
        }
        if pairs.len() / 2 > MAX_SOURCES {
            return Err(ConfigError::TooManyInputs {
                count: pairs.len() / 2,
                max: MAX_SOURCES,
            });
        }

        let inputs = pairs
            .chunks_exact(2)
            .map(|pair| {
                let rate = pair[1].trim().parse::<u32>().map_err(|_| {
                    ConfigError::InvalidSampleRate {
                        input: pair[0].clone(),
                        value: pair[1].clone(),
                    }
                })?;
                Ok((PathBuf::from(&pair[0]), rate))
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(BuildPlan {
            inputs,
            output: PathBuf::from(output),
            buffered: self.buffered,
            verify: self.verify,
        })
    }
}

impl BuildPlan {
    /// Image builder reading each input as SigmaStudio XML.
    #[must_use]
    pub fn builder(&self) -> ImageBuilder {
        self.inputs
            .iter()
            .fold(ImageBuilder::new(), |builder, (path, rate)| {
                builder.add_source(XmlSource::new(path, *rate))
            })
    }
}

/// Configuration for `sigmafw-inspect`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sigmafw-inspect",
    about = "Verify a SigmaDSP firmware image and list its chunks",
    version
)]
pub struct InspectConfig {
    /// Firmware image to inspect
    pub image: PathBuf,

    /// Dump data payloads as hex
    #[arg(long)]
    pub hex: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "SIGMAFW_LOG", default_value = "warn")]
    pub log_level: String,
}

impl InspectConfig {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }
}
