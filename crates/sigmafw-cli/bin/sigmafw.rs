//! sigmafw binary entry point.
//!
//! Thin wrapper around the sigmafw-cli library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Validates the `<input> <rate> ... <output>` list
//! 4. Builds the image

use anyhow::Result;
use sigmafw_cli::{BuildConfig, USAGE_EXIT_CODE, build, init_tracing, parse_or_exit};

fn main() -> Result<()> {
    let config: BuildConfig = parse_or_exit();
    init_tracing(&config.log_level);

    let plan = match config.validate() {
        Ok(plan) => plan,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(USAGE_EXIT_CODE);
        }
    };

    tracing::debug!(
        "Building {} from {} input(s)",
        plan.output.display(),
        plan.inputs.len()
    );

    build::run(&plan)?;
    Ok(())
}
