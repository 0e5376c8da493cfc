//! OTel Metrics Simulator CLI
//!
//! Synthetic OpenTelemetry metrics generator.

use clap::Parser;

use otel_metrics_simulator::cli::{execute, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    execute(cli).await
}
