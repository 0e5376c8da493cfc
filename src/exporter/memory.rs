//! In-memory exporter for embedding the simulator in tests
//!
//! Records every reading with the (tokio) instant it was recorded at, and can
//! be told to refuse connections for selected resources.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time::Instant;

use super::{validate_instrument_name, ExporterFactory, Instrument, MetricsExporter};
use crate::error::{SimulationError, SimulatorResult};
use crate::generator::{BucketBoundaries, MetricKind};
use crate::resource::ResourceIdentity;

/// A reading captured by the in-memory exporter
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedReading {
    pub resource: String,
    pub metric: String,
    pub kind: MetricKind,
    pub value: f64,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct MemoryState {
    readings: Vec<RecordedReading>,
    failing: HashSet<String>,
    connects: HashMap<String, usize>,
    shutdowns: HashMap<String, usize>,
}

/// Factory whose exporters all write into one shared buffer
#[derive(Debug, Clone, Default)]
pub struct MemoryExporterFactory {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryExporterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `connect` for this resource fail
    pub fn fail_for(&self, resource: &str) {
        self.state.lock().failing.insert(resource.to_string());
    }

    pub fn readings(&self) -> Vec<RecordedReading> {
        self.state.lock().readings.clone()
    }

    pub fn readings_for(&self, resource: &str) -> Vec<RecordedReading> {
        self.state
            .lock()
            .readings
            .iter()
            .filter(|r| r.resource == resource)
            .cloned()
            .collect()
    }

    /// Successful connects per resource
    pub fn connects(&self, resource: &str) -> usize {
        self.state.lock().connects.get(resource).copied().unwrap_or(0)
    }

    pub fn shutdowns(&self, resource: &str) -> usize {
        self.state.lock().shutdowns.get(resource).copied().unwrap_or(0)
    }
}

impl ExporterFactory for MemoryExporterFactory {
    fn connect(&self, identity: &ResourceIdentity) -> SimulatorResult<Box<dyn MetricsExporter>> {
        let resource = identity.resource.name();
        let mut state = self.state.lock();

        if state.failing.contains(resource) {
            return Err(SimulationError::exporter(resource, "connection refused"));
        }
        *state.connects.entry(resource.to_string()).or_insert(0) += 1;

        Ok(Box::new(MemoryExporter {
            resource: resource.to_string(),
            state: self.state.clone(),
        }))
    }
}

/// Exporter handed out by [`MemoryExporterFactory`]
pub struct MemoryExporter {
    resource: String,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryExporter {
    fn instrument(&self, name: &str, kind: MetricKind) -> SimulatorResult<Arc<dyn Instrument>> {
        validate_instrument_name(name, kind)?;
        Ok(Arc::new(MemoryInstrument {
            resource: self.resource.clone(),
            metric: name.to_string(),
            kind,
            state: self.state.clone(),
        }))
    }
}

#[async_trait]
impl MetricsExporter for MemoryExporter {
    fn create_gauge(&self, name: &str) -> SimulatorResult<Arc<dyn Instrument>> {
        self.instrument(name, MetricKind::Gauge)
    }

    fn create_counter(&self, name: &str) -> SimulatorResult<Arc<dyn Instrument>> {
        self.instrument(name, MetricKind::Counter)
    }

    fn create_histogram(
        &self,
        name: &str,
        _boundaries: &BucketBoundaries,
    ) -> SimulatorResult<Arc<dyn Instrument>> {
        self.instrument(name, MetricKind::Histogram)
    }

    async fn shutdown(&self) -> SimulatorResult<()> {
        *self
            .state
            .lock()
            .shutdowns
            .entry(self.resource.clone())
            .or_insert(0) += 1;
        Ok(())
    }
}

struct MemoryInstrument {
    resource: String,
    metric: String,
    kind: MetricKind,
    state: Arc<Mutex<MemoryState>>,
}

impl Instrument for MemoryInstrument {
    fn record(&self, value: f64) {
        self.state.lock().readings.push(RecordedReading {
            resource: self.resource.clone(),
            metric: self.metric.clone(),
            kind: self.kind,
            value,
            at: Instant::now(),
        });
    }
}
