//! Common test utilities for integration tests
//!
//! Provides fast-paced configurations and helpers for running the supervisor
//! against the recording in-memory exporter.

use std::sync::Arc;
use std::time::Duration;

use otel_metrics_simulator::{
    config::{CountRange, SimulatorConfig},
    exporter::{MemoryExporterFactory, RecordedReading},
    supervisor::{ShutdownReason, Supervisor, SupervisorReport},
};

/// Configuration with short pacing so paused-clock runs cover many cycles
pub fn fast_config(resources: &[&str]) -> SimulatorConfig {
    let mut config = SimulatorConfig::default();
    config.resources = resources.iter().map(|r| r.to_string()).collect();
    config.generation.data_points = CountRange::new(2, 6);
    config.schedule.sample_interval = Duration::from_millis(10);
    config.schedule.cooldown = Duration::from_millis(50);
    config.schedule.grace_period = Duration::from_secs(2);
    config.seed = Some(42);
    config
}

/// Run a supervisor for `duration` of (virtual) time
pub async fn run_for(
    config: SimulatorConfig,
    factory: &MemoryExporterFactory,
    duration: Duration,
) -> SupervisorReport {
    let supervisor = Supervisor::with_factory(config, Arc::new(factory.clone()))
        .expect("valid test configuration");

    supervisor
        .run_until(async move {
            tokio::time::sleep(duration).await;
            ShutdownReason::Requested
        })
        .await
        .expect("run completes")
}

/// Distinct metric names recorded for a resource
pub fn metric_names(readings: &[RecordedReading]) -> Vec<String> {
    let mut names: Vec<String> = readings.iter().map(|r| r.metric.clone()).collect();
    names.sort();
    names.dedup();
    names
}

/// Assert every reading lies inside the default value range
pub fn assert_values_in_range(readings: &[RecordedReading]) {
    for reading in readings {
        assert!(
            (0.0..=15_000.0).contains(&reading.value),
            "{} recorded out-of-range value {}",
            reading.metric,
            reading.value
        );
    }
}
