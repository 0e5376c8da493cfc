//! # OTel Metrics Simulator
//!
//! Synthetic OpenTelemetry metrics generator for exercising and load-testing
//! telemetry pipelines.
//!
//! The simulator runs one worker per configured resource. Every cycle a worker
//! rolls a fresh catalog of metrics for its resource, emits a burst of bounded
//! random readings through gauge, counter and histogram instruments, logs the
//! simulated histogram bucket counts, then cools down. A termination signal
//! cancels every worker; the supervisor waits a short grace period and exits.
//!
//! ## Features
//!
//! - **OTLP/gRPC export**: one meter provider per resource and cycle
//! - **Recognizable metric names**: service archetypes map to well-known suffixes
//! - **Deterministic Execution**: reproducible runs with seed-based RNG
//! - **Graceful Shutdown**: cancellation checked before every sample
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use otel_metrics_simulator::{SimulatorConfig, Supervisor};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = SimulatorConfig::default();
//!     let report = Supervisor::new(config)?.run().await?;
//!     println!("emitted {} samples", report.samples_emitted());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod exporter;
pub mod generator;
pub mod resource;
pub mod supervisor;
pub mod telemetry;
pub mod worker;

pub use config::SimulatorConfig;
pub use error::{SimulationError, SimulatorResult};
pub use resource::{Resource, ResourceIdentity};
pub use supervisor::{ShutdownReason, Supervisor, SupervisorReport};
pub use worker::{ResourceWorker, WorkerReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default OTLP collector endpoint
pub const DEFAULT_ENDPOINT: &str = "0.0.0.0:4317";
