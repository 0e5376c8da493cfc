//! Resource worker
//!
//! One worker owns one resource's simulation loop:
//!
//! ```text
//! Idle -> Generating -> Emitting -> CoolingDown -> Generating -> ...
//!                                        any state -> Stopped
//! ```
//!
//! Cancellation is checked before every cycle, before every sample, and
//! during every sleep. Once observed the worker emits nothing more, shuts down
//! the cycle's exporter and returns its report.

mod cycle;

pub use cycle::*;

use std::fmt;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, info_span, trace, warn, Instrument as _};
use uuid::Uuid;

use crate::config::SimulatorConfig;
use crate::error::SimulatorResult;
use crate::exporter::{ExporterFactory, MetricsExporter};
use crate::generator::{
    BucketBoundaries, BucketTally, CatalogBuilder, MetricDescriptor, MetricKind, ValueGenerator,
};
use crate::resource::{Resource, ResourceIdentity};
use crate::supervisor::ShutdownListener;

/// Lifecycle state of a worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Idle,
    Generating,
    Emitting,
    CoolingDown,
    Stopped,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Generating => "generating",
            Self::Emitting => "emitting",
            Self::CoolingDown => "cooling_down",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// What a worker did before it stopped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    pub resource: String,
    pub cycles_completed: u64,
    pub cycles_failed: u64,
    /// Cycles cut short by cancellation
    pub cycles_interrupted: u64,
    pub samples_emitted: u64,
    pub metrics_skipped: u64,
}

/// How a cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleOutcome {
    Completed,
    Interrupted,
}

/// Simulates one resource until cancelled
pub struct ResourceWorker {
    identity: ResourceIdentity,
    config: Arc<SimulatorConfig>,
    factory: Arc<dyn ExporterFactory>,
    shutdown: ShutdownListener,
    catalog: CatalogBuilder,
    values: ValueGenerator,
    boundaries: BucketBoundaries,
    rng: StdRng,
    state: WorkerState,
    report: WorkerReport,
}

impl ResourceWorker {
    pub fn new(
        resource: Resource,
        config: Arc<SimulatorConfig>,
        factory: Arc<dyn ExporterFactory>,
        shutdown: ShutdownListener,
        seed: Option<u64>,
    ) -> SimulatorResult<Self> {
        let boundaries = config.generation.boundaries()?;
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            identity: ResourceIdentity::new(resource.clone(), &config.identity),
            catalog: CatalogBuilder::from_config(&config.generation),
            values: ValueGenerator::new(&config.generation.values),
            boundaries,
            rng,
            state: WorkerState::Idle,
            report: WorkerReport {
                resource: resource.name().to_string(),
                ..Default::default()
            },
            config,
            factory,
            shutdown,
        })
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Run cycles until cancellation is observed
    pub async fn run(mut self) -> WorkerReport {
        let resource = self.identity.resource.clone();
        info!(resource = %resource, "Starting metric generation");

        while !self.shutdown.is_cancelled() {
            let cycle_id = Uuid::new_v4();
            let span = info_span!("cycle", resource = %resource, cycle = %cycle_id);

            match self.run_cycle().instrument(span).await {
                Ok(CycleOutcome::Completed) => self.report.cycles_completed += 1,
                Ok(CycleOutcome::Interrupted) => {
                    self.report.cycles_interrupted += 1;
                    break;
                }
                Err(e) => {
                    warn!(
                        resource = %resource,
                        error = %e,
                        error_type = e.error_type(),
                        "Cycle abandoned"
                    );
                    self.report.cycles_failed += 1;
                }
            }

            self.transition(WorkerState::CoolingDown);
            if !self.shutdown.sleep(self.config.schedule.cooldown).await {
                break;
            }
        }

        self.transition(WorkerState::Stopped);
        info!(
            resource = %resource,
            cycles = self.report.cycles_completed,
            failed = self.report.cycles_failed,
            samples = self.report.samples_emitted,
            "Stopping metric generation"
        );
        self.report
    }

    /// Build a catalog, emit it, release the exporter
    async fn run_cycle(&mut self) -> SimulatorResult<CycleOutcome> {
        self.transition(WorkerState::Generating);
        let catalog = self.catalog.build(&self.identity.resource, &mut self.rng);
        debug!(metrics = catalog.len(), "Catalog built");

        let exporter = self.factory.connect(&self.identity)?;

        self.transition(WorkerState::Emitting);
        let outcome = self.emit_catalog(exporter.as_ref(), &catalog).await;

        if let Err(e) = exporter.shutdown().await {
            warn!(error = %e, "Exporter shutdown failed");
        }

        Ok(outcome)
    }

    async fn emit_catalog(
        &mut self,
        exporter: &dyn MetricsExporter,
        catalog: &[MetricDescriptor],
    ) -> CycleOutcome {
        let mut clock = CycleClock::start();

        for descriptor in catalog {
            if self.shutdown.is_cancelled() {
                return CycleOutcome::Interrupted;
            }

            let instruments = match InstrumentSet::create(exporter, descriptor, &self.boundaries) {
                Ok(instruments) => instruments,
                Err(e) => {
                    warn!(metric = %descriptor.name, error = %e, "Skipping metric");
                    self.report.metrics_skipped += 1;
                    continue;
                }
            };

            let outcome = self.emit_metric(descriptor, &instruments, &mut clock).await;
            if outcome == CycleOutcome::Interrupted {
                return outcome;
            }
        }

        CycleOutcome::Completed
    }

    async fn emit_metric(
        &mut self,
        descriptor: &MetricDescriptor,
        instruments: &InstrumentSet,
        clock: &mut CycleClock,
    ) -> CycleOutcome {
        let generation = &self.config.generation;
        let data_points = generation.data_points.sample(&mut self.rng);
        let track_buckets = descriptor.emits(MetricKind::Histogram);
        let mut tally = BucketTally::new();
        let mut outcome = CycleOutcome::Completed;

        for _ in 0..data_points {
            // No sample may start once cancellation is visible
            if self.shutdown.is_cancelled() {
                outcome = CycleOutcome::Interrupted;
                break;
            }

            let sample = clock.sample(self.values.next(&mut self.rng));
            instruments.record(&sample);
            self.report.samples_emitted += 1;

            debug!(
                metric = %descriptor.name,
                value = sample.value,
                timestamp = %sample.timestamp,
                "Recorded sample"
            );

            if track_buckets {
                tally.observe(sample.value, &self.boundaries, &generation.bucket_weight, &mut self.rng);
            }

            self.shutdown.sleep(self.config.schedule.sample_interval).await;
        }

        for (bucket, count) in tally.iter() {
            info!(
                metric = %descriptor.name,
                bucket = %bucket,
                upper_bound = ?self.boundaries.upper_bound(bucket),
                count,
                "Histogram bucket"
            );
        }

        outcome
    }

    fn transition(&mut self, next: WorkerState) {
        trace!(resource = %self.identity.resource, from = %self.state, to = %next, "Worker state change");
        self.state = next;
    }
}
