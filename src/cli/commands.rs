//! CLI command implementations

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{ExporterKind, SimulatorConfig, ENV_PREFIX};
use crate::generator::{BucketTally, CatalogBuilder, MetricKind, ValueGenerator};
use crate::resource::Resource;
use crate::supervisor::Supervisor;
use crate::telemetry::{init_telemetry, log_report};
use crate::VERSION;

use super::{CatalogCommand, Cli, Commands, ConfigAction, ConfigCommand, RunCommand};

/// Execute the CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let mut config = load_config(cli.config.as_ref())?;

    if let Some(level) = cli.log_level {
        config.telemetry.log_level = level;
    }
    if cli.json_logs {
        config.telemetry.json_logs = true;
    }

    match cli.command.unwrap_or_else(|| Commands::Run(RunCommand::default())) {
        Commands::Run(cmd) => execute_run(cmd, config).await,
        Commands::Config(cmd) => execute_config(cmd, config),
        Commands::Catalog(cmd) => execute_catalog(cmd, config),
        Commands::Version => execute_version(),
    }
}

/// Config file (if any) with environment overrides applied
fn load_config(path: Option<&PathBuf>) -> Result<SimulatorConfig> {
    match path {
        Some(path) => {
            let mut config = SimulatorConfig::from_file(path)
                .with_context(|| format!("Failed to load configuration from {:?}", path))?;
            config.apply_env().context("Invalid environment override")?;
            Ok(config)
        }
        None => SimulatorConfig::from_env().context("Invalid environment configuration"),
    }
}

/// Apply `run` flags on top of the loaded configuration
pub fn apply_run_overrides(cmd: RunCommand, config: &mut SimulatorConfig) {
    if let Some(endpoint) = cmd.exporter_endpoint {
        config.exporter.endpoint = endpoint;
    }
    if cmd.secure {
        config.exporter.insecure = false;
    }
    if !cmd.resources.is_empty() {
        config.resources = cmd.resources;
    }
    if let Some(seed) = cmd.seed {
        config.seed = Some(seed);
    }
    if cmd.dry_run {
        config.exporter.kind = ExporterKind::Log;
    }
    if let Some(ms) = cmd.cooldown_ms {
        config.schedule.cooldown = Duration::from_millis(ms);
    }
    if let Some(secs) = cmd.grace_period_secs {
        config.schedule.grace_period = Duration::from_secs(secs);
    }
}

/// Execute the run command
async fn execute_run(cmd: RunCommand, mut config: SimulatorConfig) -> Result<()> {
    apply_run_overrides(cmd, &mut config);
    config.validate().context("Configuration validation failed")?;

    init_telemetry(&config.telemetry).context("Failed to initialize logging")?;

    tracing::info!(
        endpoint = %config.exporter.endpoint_url(),
        exporter = ?config.exporter.kind,
        resources = config.resources.len(),
        seed = ?config.seed,
        "Starting metrics simulation"
    );

    let supervisor = Supervisor::new(config).context("Failed to start supervisor")?;
    let report = supervisor.run().await.context("Simulation aborted")?;

    log_report(&report);
    tracing::info!(reason = %report.reason, "Shutdown complete");
    Ok(())
}

/// Execute the config command
fn execute_config(cmd: ConfigCommand, config: SimulatorConfig) -> Result<()> {
    match cmd.action {
        ConfigAction::Show { format } => {
            let output = match format.as_str() {
                "toml" => toml::to_string_pretty(&config)?,
                "json" => serde_json::to_string_pretty(&config)?,
                "yaml" | "yml" => serde_yaml::to_string(&config)?,
                other => bail!("Unknown format '{}'. Use yaml, toml, or json.", other),
            };
            println!("{}", output);
            Ok(())
        }

        ConfigAction::Validate { file } => {
            let config = SimulatorConfig::from_file(&file)
                .with_context(|| format!("Configuration at {:?} is invalid", file))?;
            println!("Configuration at {:?} is valid", file);
            println!("  Exporter:   {:?} -> {}", config.exporter.kind, config.exporter.endpoint_url());
            println!("  Resources:  {}", config.resources.join(", "));
            println!("  Cooldown:   {:?}", config.schedule.cooldown);
            Ok(())
        }

        ConfigAction::Init { output, force } => {
            if output.exists() && !force {
                bail!("File {:?} already exists. Use --force to overwrite.", output);
            }

            let yaml = serde_yaml::to_string(&SimulatorConfig::default())?;
            std::fs::write(&output, &yaml)
                .with_context(|| format!("Failed to write {:?}", output))?;
            println!("Created configuration file: {:?}", output);
            Ok(())
        }

        ConfigAction::Env => {
            println!("Environment Variable Mappings:");
            println!();
            for (suffix, description) in [
                ("CONFIG", "Configuration file path"),
                ("ENDPOINT", "Collector endpoint (default: 0.0.0.0:4317)"),
                ("INSECURE", "Plaintext transport for scheme-less endpoints"),
                ("EXPORTER", "Exporter kind (otlp, log)"),
                ("RESOURCES", "Comma-separated resource names"),
                ("SEED", "Random seed for reproducible runs"),
                ("LOG_LEVEL", "Log level (trace/debug/info/warn/error)"),
                ("JSON_LOGS", "Enable JSON log format"),
            ] {
                println!("  {:<40} {}", format!("{}_{}", ENV_PREFIX, suffix), description);
            }
            println!("  {:<40} {}", "OTEL_EXPORTER_OTLP_ENDPOINT", "Collector endpoint for `run`");
            println!("  {:<40} {}", "RUST_LOG", "Log filter, overrides the log level");
            Ok(())
        }
    }
}

/// Execute the catalog command
fn execute_catalog(cmd: CatalogCommand, config: SimulatorConfig) -> Result<()> {
    let resource = Resource::new(cmd.resource.as_str());
    let builder = CatalogBuilder::from_config(&config.generation);
    let values = ValueGenerator::new(&config.generation.values);
    let boundaries = config.generation.boundaries()?;
    let mut rng = match cmd.seed.or(config.seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for cycle in 1..=cmd.cycles {
        let catalog = builder.build(&resource, &mut rng);
        println!("Cycle {} ({} metrics)", cycle, catalog.len());

        for descriptor in &catalog {
            let points = config.generation.data_points.sample(&mut rng);
            let kinds: Vec<String> = descriptor.kinds.iter().map(MetricKind::to_string).collect();
            println!("  {:<50} {:<26} {:>3} samples", descriptor.name, kinds.join(","), points);

            if descriptor.emits(MetricKind::Histogram) {
                let mut tally = BucketTally::new();
                for _ in 0..points {
                    let value = values.next(&mut rng);
                    tally.observe(value, &boundaries, &config.generation.bucket_weight, &mut rng);
                }
                let buckets: Vec<String> =
                    tally.iter().map(|(key, count)| format!("{}={}", key, count)).collect();
                println!("    buckets: {}", buckets.join(" "));
            }
        }
    }

    Ok(())
}

/// Execute the version command
fn execute_version() -> Result<()> {
    println!("otel-metrics-simulator {}", VERSION);
    println!();
    println!("Build Information:");
    println!("  Version:       {}", VERSION);
    println!("  Rust Version:  {}", env!("CARGO_PKG_RUST_VERSION"));
    println!();
    println!("Features:");
    println!("  OTLP/gRPC metrics export (gauge, counter, histogram)");
    println!("  Per-resource concurrent workers");
    println!("  Deterministic execution with seeds");
    println!("  Graceful shutdown on SIGINT, SIGTERM, SIGHUP, SIGQUIT");
    Ok(())
}
