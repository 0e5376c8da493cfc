//! Worker supervision and graceful shutdown
//!
//! The supervisor starts one [`ResourceWorker`] per configured resource, each
//! on its own task, then waits for a shutdown trigger. On shutdown it
//! broadcasts cancellation, gives workers the grace period to finish, and
//! abandons whatever is still running after that.

mod shutdown;
mod signals;

pub use shutdown::*;
pub use signals::*;

use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

use crate::config::SimulatorConfig;
use crate::error::SimulatorResult;
use crate::exporter::{exporter_factory, ExporterFactory};
use crate::worker::{ResourceWorker, WorkerReport};

/// Result of one worker task
type WorkerExit = (String, Result<WorkerReport, String>);

/// Summary of a simulation run
#[derive(Debug, Clone)]
pub struct SupervisorReport {
    pub reason: ShutdownReason,
    /// Reports of workers that stopped cleanly
    pub workers: Vec<WorkerReport>,
    /// Resources whose worker panicked
    pub panicked: Vec<String>,
    /// Workers still running when the grace period ran out
    pub abandoned: usize,
}

impl SupervisorReport {
    fn new(reason: ShutdownReason) -> Self {
        Self {
            reason,
            workers: Vec::new(),
            panicked: Vec::new(),
            abandoned: 0,
        }
    }

    pub fn worker(&self, resource: &str) -> Option<&WorkerReport> {
        self.workers.iter().find(|w| w.resource == resource)
    }

    pub fn samples_emitted(&self) -> u64 {
        self.workers.iter().map(|w| w.samples_emitted).sum()
    }

    /// Every worker stopped on its own within the grace period
    pub fn is_clean(&self) -> bool {
        self.panicked.is_empty() && self.abandoned == 0
    }

    fn record(&mut self, joined: Result<WorkerExit, JoinError>) {
        match joined {
            Ok((_, Ok(report))) => self.workers.push(report),
            Ok((resource, Err(panic))) => {
                error!(resource = %resource, panic = %panic, "Worker panicked");
                self.panicked.push(resource);
            }
            Err(e) => warn!(error = %e, "Worker task failed"),
        }
    }
}

/// Owns the workers and the cancellation signal
pub struct Supervisor {
    config: Arc<SimulatorConfig>,
    factory: Arc<dyn ExporterFactory>,
    controller: ShutdownController,
}

impl Supervisor {
    /// Supervisor using the exporter selected by the configuration
    pub fn new(config: SimulatorConfig) -> SimulatorResult<Self> {
        let factory = exporter_factory(&config.exporter);
        Self::with_factory(config, factory)
    }

    pub fn with_factory(
        config: SimulatorConfig,
        factory: Arc<dyn ExporterFactory>,
    ) -> SimulatorResult<Self> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(config),
            factory,
            controller: ShutdownController::new(),
        })
    }

    /// Run until SIGINT, SIGTERM, SIGHUP or SIGQUIT
    pub async fn run(self) -> SimulatorResult<SupervisorReport> {
        let mut signals = TerminationSignals::install()?;
        self.run_until(async move { signals.recv().await }).await
    }

    /// Run until `shutdown` resolves
    pub async fn run_until<F>(self, shutdown: F) -> SimulatorResult<SupervisorReport>
    where
        F: Future<Output = ShutdownReason>,
    {
        let mut tasks = self.spawn_workers()?;
        let mut outcomes = Vec::new();

        tokio::pin!(shutdown);
        let reason = loop {
            tokio::select! {
                reason = &mut shutdown => break reason,
                joined = tasks.join_next() => match joined {
                    Some(joined) => outcomes.push(joined),
                    None => break ShutdownReason::WorkersExited,
                },
            }
        };

        let mut report = SupervisorReport::new(reason);
        for joined in outcomes {
            report.record(joined);
        }

        self.controller.cancel();
        let grace = self.config.schedule.grace_period;
        info!(reason = %reason, grace_ms = grace.as_millis() as u64, "Waiting for workers to stop");

        let drained = tokio::time::timeout(grace, async {
            while let Some(joined) = tasks.join_next().await {
                report.record(joined);
            }
        })
        .await;

        if drained.is_err() {
            report.abandoned = tasks.len();
            warn!(abandoned = report.abandoned, "Grace period elapsed, abandoning workers");
            tasks.abort_all();
        }

        info!(
            reason = %report.reason,
            workers = report.workers.len(),
            panicked = report.panicked.len(),
            abandoned = report.abandoned,
            samples = report.samples_emitted(),
            "Simulation stopped"
        );
        Ok(report)
    }

    fn spawn_workers(&self) -> SimulatorResult<JoinSet<WorkerExit>> {
        let mut tasks = JoinSet::new();

        for (index, resource) in self.config.resources().into_iter().enumerate() {
            let seed = self.config.seed.map(|s| s.wrapping_add(index as u64));
            let worker = ResourceWorker::new(
                resource.clone(),
                self.config.clone(),
                self.factory.clone(),
                self.controller.listener(),
                seed,
            )?;

            let name = resource.name().to_string();
            tasks.spawn(async move {
                let outcome = AssertUnwindSafe(worker.run())
                    .catch_unwind()
                    .await
                    .map_err(|payload| panic_message(payload.as_ref()));
                (name, outcome)
            });
        }

        info!(workers = tasks.len(), "Workers started");
        Ok(tasks)
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
