//! Campus sustainability metrics service.
//!
//! This binary reads the campus workbook, enriches the consumption facts
//! with building and block context, flags anomalous readings and prints the
//! dashboard response envelopes as JSON on stdout. Logs go to stderr.

use anyhow::Context;
use campus_metrics::output::{to_json, write_json};
use campus_metrics::{Cli, run};
use campus_metrics_core::init_logging;
use campus_metrics_core::response::ErrorResponse;
use clap::Parser;
use tracing::error;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.global.verbose, cli.global.quiet, cli.global.log_format.into())
        .context("Failed to initialize logging")?;

    if let Err(e) = run(&cli) {
        error!("Command failed: {}", e);
        // Internals stay in the log; the envelope carries a generic message
        let envelope = to_json(&ErrorResponse::generic()).context("Failed to render error")?;
        write_json(&envelope, None).context("Failed to write error envelope")?;
        std::process::exit(1);
    }

    Ok(())
}
