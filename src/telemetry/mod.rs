//! Logging for the simulator itself
//!
//! - Structured logging with tracing (compact or JSON)
//! - Panic reporting through the log stream
//! - Run summaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::TelemetryConfig;
use crate::error::{SimulationError, SimulatorResult};
use crate::supervisor::SupervisorReport;

/// Initialize the log subscriber
pub fn init_telemetry(config: &TelemetryConfig) -> SimulatorResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| SimulationError::Config(format!("Invalid log level: {}", e)))?;

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let installed = if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_current_span(true)
            .with_target(true);

        subscriber.with(json_layer).try_init()
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_file(false)
            .with_line_number(false)
            .with_target(true)
            .compact();

        subscriber.with(fmt_layer).try_init()
    };
    installed.map_err(|e| SimulationError::Internal(format!("log subscriber: {}", e)))?;

    install_panic_hook();

    tracing::info!(version = %env!("CARGO_PKG_VERSION"), "Telemetry initialized");
    Ok(())
}

/// Route panics through the log stream before the default hook runs
pub fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let backtrace = std::backtrace::Backtrace::force_capture();
        tracing::error!(
            panic = %info,
            backtrace = %backtrace,
            "Panic in simulator task"
        );
        default_hook(info);
    }));
}

/// Log the outcome of a run
pub fn log_report(report: &SupervisorReport) {
    for worker in &report.workers {
        tracing::info!(
            resource = %worker.resource,
            cycles = worker.cycles_completed,
            failed = worker.cycles_failed,
            interrupted = worker.cycles_interrupted,
            samples = worker.samples_emitted,
            skipped = worker.metrics_skipped,
            "Worker summary"
        );
    }

    for resource in &report.panicked {
        tracing::error!(resource = %resource, "Worker terminated by panic");
    }

    if report.abandoned > 0 {
        tracing::warn!(abandoned = report.abandoned, "Workers did not stop within the grace period");
    }
}
