//! Command-line tools for SigmaDSP firmware images.
//!
//! Two binaries are built on this library:
//! - `sigmafw`: builds an image from `<input> <rate>` pairs and an output path
//! - `sigmafw-inspect`: verifies an image and lists its chunks
//!
//! # Architecture
//!
//! - `config`: argument and environment configuration
//! - `error`: configuration errors
//! - `build`: build, write and optional verification
//! - `inspect`: human-readable image listing
//!
//! # Example
//!
//! ```no_run
//! use sigmafw_cli::{BuildConfig, build, init_tracing};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = BuildConfig::from_args();
//!     init_tracing(&config.log_level);
//!
//!     let plan = config.validate()?;
//!     let summary = build::run(&plan)?;
//!     println!("checksum {:#010x}", summary.checksum);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod build;
pub mod config;
pub mod error;
pub mod inspect;

pub use config::{BuildConfig, BuildPlan, InspectConfig};
pub use error::ConfigError;

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Exit status for argument errors
pub const USAGE_EXIT_CODE: i32 = 1;

/// Parse arguments, mapping usage errors to [`USAGE_EXIT_CODE`].
///
/// `--help` and `--version` print to stdout and exit 0.
pub fn parse_or_exit<P: clap::Parser>() -> P {
    match P::try_parse() {
        Ok(config) => config,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            std::process::exit(USAGE_EXIT_CODE);
        }
        Err(err) => err.exit(),
    }
}
