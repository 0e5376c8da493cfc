//! Resource worker integration tests

use std::sync::Arc;
use std::time::Duration;

use otel_metrics_simulator::{
    config::CountRange,
    exporter::MemoryExporterFactory,
    generator::MetricKind,
    supervisor::ShutdownController,
    worker::ResourceWorker,
    Resource, SimulatorConfig,
};

use super::common::*;

fn spawn_worker(
    name: &str,
    config: SimulatorConfig,
    factory: &MemoryExporterFactory,
    controller: &ShutdownController,
) -> tokio::task::JoinHandle<otel_metrics_simulator::WorkerReport> {
    let worker = ResourceWorker::new(
        Resource::new(name),
        Arc::new(config),
        Arc::new(factory.clone()),
        controller.listener(),
        Some(1),
    )
    .unwrap();
    tokio::spawn(worker.run())
}

#[tokio::test(start_paused = true)]
async fn test_no_reading_after_cancellation() {
    let factory = MemoryExporterFactory::new();
    let controller = ShutdownController::new();
    let handle = spawn_worker("user-service", fast_config(&["user-service"]), &factory, &controller);

    // Mid-cycle: samples are 10ms apart, cycles take well over 33ms
    tokio::time::sleep(Duration::from_millis(333)).await;
    let cancelled_at = tokio::time::Instant::now();
    controller.cancel();
    // The worker cannot run between cancel and this snapshot
    let before_join = factory.readings().len();

    let report = handle.await.unwrap();
    let readings = factory.readings();

    assert!(!readings.is_empty());
    assert_eq!(readings.len(), before_join, "a reading was recorded after cancellation");
    assert!(readings.iter().all(|r| r.at <= cancelled_at));
    assert_eq!(report.samples_emitted as usize * 3, readings.len());
    assert_eq!(factory.connects("user-service"), factory.shutdowns("user-service"));
}

#[tokio::test(start_paused = true)]
async fn test_cancel_between_samples_stops_metric() {
    let factory = MemoryExporterFactory::new();
    let controller = ShutdownController::new();
    let handle = spawn_worker("user-service", fast_config(&["user-service"]), &factory, &controller);

    // First sample is recorded at t=0, the second is due at t=10ms
    tokio::time::sleep(Duration::from_millis(5)).await;
    controller.cancel();

    let report = handle.await.unwrap();
    let readings = factory.readings();

    assert_eq!(report.samples_emitted, 1);
    assert_eq!(report.cycles_interrupted, 1);
    assert_eq!(readings.len(), 3);
    assert!(readings.iter().all(|r| r.value == readings[0].value));
    assert_eq!(factory.connects("user-service"), factory.shutdowns("user-service"));
}

#[tokio::test(start_paused = true)]
async fn test_stop_is_prompt_during_cooldown() {
    let mut config = fast_config(&["queue"]);
    config.schedule.cooldown = Duration::from_secs(3600);

    let factory = MemoryExporterFactory::new();
    let controller = ShutdownController::new();
    let handle = spawn_worker("queue", config, &factory, &controller);

    tokio::time::sleep(Duration::from_secs(5)).await;
    let cancelled_at = tokio::time::Instant::now();
    controller.cancel();

    let report = handle.await.unwrap();
    assert_eq!(report.cycles_completed, 1);
    assert!(cancelled_at.elapsed() < Duration::from_millis(1));
}

#[tokio::test(start_paused = true)]
async fn test_archetype_resource_uses_well_known_name() {
    let mut config = fast_config(&["web-service-a"]);
    config.generation.metric_count = CountRange::new(3, 7);

    let factory = MemoryExporterFactory::new();
    let controller = ShutdownController::new();
    let handle = spawn_worker("web-service-a", config, &factory, &controller);

    tokio::time::sleep(Duration::from_millis(200)).await;
    controller.cancel();
    handle.await.unwrap();

    let readings = factory.readings_for("web-service-a");
    assert_eq!(
        metric_names(&readings),
        vec!["web-service-a-http_request_duration_seconds".to_string()]
    );
    assert_values_in_range(&readings);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_resource_uses_generic_names() {
    let factory = MemoryExporterFactory::new();
    let controller = ShutdownController::new();
    let handle = spawn_worker("unknown-svc", fast_config(&["unknown-svc"]), &factory, &controller);

    tokio::time::sleep(Duration::from_secs(2)).await;
    controller.cancel();
    handle.await.unwrap();

    let names = metric_names(&factory.readings());
    assert!(names.len() >= 3 && names.len() <= 7, "names: {:?}", names);
    for name in &names {
        let index: usize = name
            .strip_prefix("unknown-svc-metric-")
            .and_then(|i| i.parse().ok())
            .unwrap_or_else(|| panic!("unexpected metric name {}", name));
        assert!((1..=7).contains(&index));
    }
}

#[tokio::test(start_paused = true)]
async fn test_every_sample_reaches_every_instrument() {
    let factory = MemoryExporterFactory::new();
    let controller = ShutdownController::new();
    let handle = spawn_worker("order-service", fast_config(&["order-service"]), &factory, &controller);

    tokio::time::sleep(Duration::from_millis(500)).await;
    controller.cancel();
    handle.await.unwrap();

    let readings = factory.readings();
    let count = |kind| readings.iter().filter(|r| r.kind == kind).count();
    assert!(count(MetricKind::Gauge) > 0);
    assert_eq!(count(MetricKind::Gauge), count(MetricKind::Counter));
    assert_eq!(count(MetricKind::Gauge), count(MetricKind::Histogram));
}
