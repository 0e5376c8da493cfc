//! CLI module for the metrics simulator
//!
//! Subcommands for:
//! - Running the simulation (the default)
//! - Managing configuration
//! - Previewing the metric catalog of a resource

mod commands;

pub use commands::*;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::VERSION;

/// Synthetic OpenTelemetry metrics generator
#[derive(Parser, Debug)]
#[command(name = "otel-metrics-simulator")]
#[command(author = "LLM DevOps Team")]
#[command(version = VERSION)]
#[command(about = "Synthetic OpenTelemetry metrics generator for exercising telemetry pipelines")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Global configuration file path (YAML, TOML, or JSON)
    #[arg(short, long, global = true, env = "OTEL_METRICS_SIMULATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Global log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "OTEL_METRICS_SIMULATOR_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Enable JSON log output
    #[arg(long, global = true, env = "OTEL_METRICS_SIMULATOR_JSON_LOGS")]
    pub json_logs: bool,

    /// Subcommand; `run` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate metrics until interrupted
    #[command(alias = "r")]
    Run(RunCommand),

    /// Configuration management
    #[command(alias = "cfg")]
    Config(ConfigCommand),

    /// Preview the metrics a resource would emit
    Catalog(CatalogCommand),

    /// Show version and build information
    Version,
}

/// Generate metrics until interrupted
#[derive(Parser, Debug, Default)]
pub struct RunCommand {
    /// OTLP collector endpoint (host:port or URL)
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub exporter_endpoint: Option<String>,

    /// Use TLS for endpoints given without a scheme
    #[arg(long)]
    pub secure: bool,

    /// Resource to simulate; repeat for several (replaces the configured set)
    #[arg(short, long = "resource")]
    pub resources: Vec<String>,

    /// Set a fixed seed for reproducible values
    #[arg(long, env = "OTEL_METRICS_SIMULATOR_SEED")]
    pub seed: Option<u64>,

    /// Log readings instead of exporting them
    #[arg(long)]
    pub dry_run: bool,

    /// Pause between cycles in milliseconds
    #[arg(long)]
    pub cooldown_ms: Option<u64>,

    /// Seconds to wait for workers on shutdown
    #[arg(long)]
    pub grace_period_secs: Option<u64>,
}

/// Configuration management
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show {
        /// Output format (yaml, toml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file to validate
        file: PathBuf,
    },

    /// Write a configuration file with every default filled in
    Init {
        /// Output file path
        #[arg(short, long, default_value = "otel-metrics-simulator.yaml")]
        output: PathBuf,

        /// Force overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show environment variable mappings
    Env,
}

/// Preview the metrics a resource would emit
#[derive(Parser, Debug)]
pub struct CatalogCommand {
    /// Resource name
    pub resource: String,

    /// Number of cycles to roll
    #[arg(short = 'n', long, default_value = "1")]
    pub cycles: usize,

    /// Seed for the preview
    #[arg(long)]
    pub seed: Option<u64>,
}
