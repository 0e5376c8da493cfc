//! Supervisor integration tests

use std::time::Duration;

use otel_metrics_simulator::{
    config::DEFAULT_RESOURCES, exporter::MemoryExporterFactory, supervisor::ShutdownReason,
};

use super::common::*;

#[tokio::test(start_paused = true)]
async fn test_failing_exporter_does_not_affect_other_workers() {
    let factory = MemoryExporterFactory::new();
    factory.fail_for("order-service");

    let report = run_for(fast_config(&DEFAULT_RESOURCES), &factory, Duration::from_secs(3)).await;

    assert_eq!(report.reason, ShutdownReason::Requested);
    assert!(report.is_clean());
    assert_eq!(report.workers.len(), DEFAULT_RESOURCES.len());

    let failing = report.worker("order-service").unwrap();
    assert_eq!(failing.cycles_completed, 0);
    assert!(failing.cycles_failed >= 2);
    assert!(factory.readings_for("order-service").is_empty());

    for resource in DEFAULT_RESOURCES.iter().filter(|r| **r != "order-service") {
        let worker = report.worker(resource).unwrap();
        assert!(worker.cycles_completed >= 1, "{} never completed a cycle", resource);
        assert_eq!(worker.cycles_failed, 0);
        assert!(!factory.readings_for(resource).is_empty());
    }
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_drains_within_grace_period() {
    let factory = MemoryExporterFactory::new();
    let start = tokio::time::Instant::now();

    let report = run_for(
        fast_config(&["user-service", "payment-service"]),
        &factory,
        Duration::from_millis(777),
    )
    .await;

    assert_eq!(report.abandoned, 0);
    assert!(start.elapsed() < Duration::from_millis(777) + Duration::from_secs(2));
    for resource in ["user-service", "payment-service"] {
        assert_eq!(factory.connects(resource), factory.shutdowns(resource));
    }
}

#[tokio::test(start_paused = true)]
async fn test_nothing_emitted_after_run_returns() {
    let factory = MemoryExporterFactory::new();
    run_for(fast_config(&["inventory-service"]), &factory, Duration::from_millis(400)).await;

    let emitted = factory.readings().len();
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(factory.readings().len(), emitted);
}

#[tokio::test(start_paused = true)]
async fn test_seeded_runs_repeat_values() {
    let resources = ["web-service-a", "notification-service"];

    let first = MemoryExporterFactory::new();
    run_for(fast_config(&resources), &first, Duration::from_millis(600)).await;
    let second = MemoryExporterFactory::new();
    run_for(fast_config(&resources), &second, Duration::from_millis(600)).await;

    for resource in resources {
        let a: Vec<f64> = first.readings_for(resource).iter().map(|r| r.value).collect();
        let b: Vec<f64> = second.readings_for(resource).iter().map(|r| r.value).collect();
        let shared = a.len().min(b.len());

        assert!(shared > 0);
        assert_eq!(a[..shared], b[..shared], "{} diverged between seeded runs", resource);
    }
}

#[tokio::test(start_paused = true)]
async fn test_workers_seeded_independently() {
    let factory = MemoryExporterFactory::new();
    run_for(
        fast_config(&["unknown-a", "unknown-b"]),
        &factory,
        Duration::from_millis(600),
    )
    .await;

    let a: Vec<f64> = factory.readings_for("unknown-a").iter().map(|r| r.value).collect();
    let b: Vec<f64> = factory.readings_for("unknown-b").iter().map(|r| r.value).collect();
    assert_ne!(a, b);
}
