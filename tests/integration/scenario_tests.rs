//! End-to-end scenarios: configuration files, instrument selection, buckets

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use otel_metrics_simulator::{
    config::{CountRange, ExporterKind, NamingRule, SimulatorConfig},
    exporter::{LogExporterFactory, MemoryExporterFactory},
    generator::{classify, BucketBoundaries, BucketKey, MetricKind},
    supervisor::{ShutdownReason, Supervisor},
    SimulationError,
};

use super::common::*;

fn customized() -> SimulatorConfig {
    let mut config = SimulatorConfig::default();
    config.resources = vec!["checkout".to_string(), "search-api".to_string()];
    config.exporter.endpoint = "collector.internal:4317".to_string();
    config.exporter.insecure = false;
    config.generation.metric_count = CountRange::new(2, 4);
    config.generation.naming.insert(0, NamingRule::new("search-*", "search_latency_seconds"));
    config.schedule.cooldown = Duration::from_millis(1500);
    config.seed = Some(99);
    config
}

#[test]
fn test_yaml_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simulator.yaml");
    std::fs::write(&path, serde_yaml::to_string(&customized()).unwrap()).unwrap();

    let loaded = SimulatorConfig::from_file(&path).unwrap();
    assert_eq!(loaded.resources, vec!["checkout", "search-api"]);
    assert_eq!(loaded.exporter.endpoint_url(), "https://collector.internal:4317");
    assert_eq!(loaded.generation.metric_count, CountRange::new(2, 4));
    assert_eq!(loaded.generation.naming[0].suffix, "search_latency_seconds");
    assert_eq!(loaded.schedule.cooldown, Duration::from_millis(1500));
    assert_eq!(loaded.seed, Some(99));
}

#[test]
fn test_toml_config_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simulator.toml");
    std::fs::write(&path, toml::to_string_pretty(&customized()).unwrap()).unwrap();

    let loaded = SimulatorConfig::from_file(&path).unwrap();
    assert_eq!(loaded.resources.len(), 2);
    assert_eq!(loaded.schedule.cooldown, Duration::from_millis(1500));
}

#[test]
fn test_partial_config_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.yaml");
    std::fs::write(
        &path,
        "resources: [alpha]\nschedule:\n  cooldown: 2s\nexporter:\n  kind: log\n",
    )
    .unwrap();

    let loaded = SimulatorConfig::from_file(&path).unwrap();
    assert_eq!(loaded.resources, vec!["alpha"]);
    assert_eq!(loaded.exporter.kind, ExporterKind::Log);
    assert_eq!(loaded.schedule.cooldown, Duration::from_secs(2));
    assert_eq!(loaded.schedule.sample_interval, Duration::from_millis(50));
    assert_eq!(loaded.generation.data_points, CountRange::new(5, 25));
}

#[test]
fn test_invalid_config_file_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.yaml");
    std::fs::write(&path, "generation:\n  bucket_boundaries: [5.0, 1.0]\n").unwrap();

    assert_matches!(
        SimulatorConfig::from_file(&path),
        Err(SimulationError::Validation { .. })
    );

    let unknown = dir.path().join("config.ini");
    std::fs::write(&unknown, "x=1").unwrap();
    assert_matches!(SimulatorConfig::from_file(&unknown), Err(SimulationError::Config(_)));
}

#[test]
fn test_bucket_classification_scenario() {
    let bounds = BucketBoundaries::new(vec![0.5, 1.0, 2.5, 5.0]).unwrap();

    assert_eq!(classify(0.3, &bounds).to_string(), "le1");
    assert_eq!(classify(1.0, &bounds).to_string(), "le2");
    assert_eq!(classify(7.0, &bounds), BucketKey::Overflow);
}

#[tokio::test(start_paused = true)]
async fn test_gauge_only_run() {
    let mut config = fast_config(&["search-api"]);
    config.generation.instruments = vec![MetricKind::Gauge];

    let factory = MemoryExporterFactory::new();
    let report = run_for(config, &factory, Duration::from_millis(500)).await;

    let readings = factory.readings();
    assert!(!readings.is_empty());
    assert!(readings.iter().all(|r| r.kind == MetricKind::Gauge));
    assert_eq!(report.samples_emitted() as usize, readings.len());
}

#[tokio::test(start_paused = true)]
async fn test_custom_naming_rule_applies() {
    let mut config = fast_config(&["search-api", "checkout"]);
    config.generation.naming = vec![NamingRule::new("search-*", "search_latency_seconds")];

    let factory = MemoryExporterFactory::new();
    run_for(config, &factory, Duration::from_millis(500)).await;

    assert_eq!(
        metric_names(&factory.readings_for("search-api")),
        vec!["search-api-search_latency_seconds".to_string()]
    );
    assert!(metric_names(&factory.readings_for("checkout"))
        .iter()
        .all(|name| name.starts_with("checkout-metric-")));
}

#[tokio::test(start_paused = true)]
async fn test_dry_run_exporter_runs_cleanly() {
    let mut config = fast_config(&["web-service-b"]);
    config.exporter.kind = ExporterKind::Log;

    let supervisor = Supervisor::with_factory(config, Arc::new(LogExporterFactory)).unwrap();
    let report = supervisor
        .run_until(async {
            tokio::time::sleep(Duration::from_millis(300)).await;
            ShutdownReason::Requested
        })
        .await
        .unwrap();

    assert!(report.is_clean());
    assert!(report.samples_emitted() > 0);
}
