//! Metrics exporter abstraction
//!
//! Workers never talk to a transport directly. They ask an
//! [`ExporterFactory`] for a [`MetricsExporter`] bound to their resource's
//! identity, create instruments on it, and shut it down when the cycle ends.
//! An exporter is never shared between resources.

mod dry_run;
mod memory;
mod otlp;

pub use dry_run::*;
pub use memory::*;
pub use otlp::*;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{ExporterConfig, ExporterKind};
use crate::error::{SimulationError, SimulatorResult};
use crate::generator::{BucketBoundaries, MetricKind};
use crate::resource::ResourceIdentity;

/// Longest instrument name accepted by OpenTelemetry
pub const MAX_INSTRUMENT_NAME_LEN: usize = 255;

/// Handle for recording readings on one instrument
pub trait Instrument: Send + Sync {
    /// Record a reading; counters add it, gauges and histograms record it
    fn record(&self, value: f64);
}

/// Exporter bound to a single resource
#[async_trait]
pub trait MetricsExporter: Send + Sync {
    fn create_gauge(&self, name: &str) -> SimulatorResult<Arc<dyn Instrument>>;

    fn create_counter(&self, name: &str) -> SimulatorResult<Arc<dyn Instrument>>;

    fn create_histogram(
        &self,
        name: &str,
        boundaries: &BucketBoundaries,
    ) -> SimulatorResult<Arc<dyn Instrument>>;

    /// Flush pending data and release the exporter
    async fn shutdown(&self) -> SimulatorResult<()>;
}

/// Creates exporters for resources
pub trait ExporterFactory: Send + Sync {
    fn connect(&self, identity: &ResourceIdentity) -> SimulatorResult<Box<dyn MetricsExporter>>;
}

/// Build the factory selected by the configuration
pub fn exporter_factory(config: &ExporterConfig) -> Arc<dyn ExporterFactory> {
    match config.kind {
        ExporterKind::Otlp => Arc::new(OtlpExporterFactory::new(config)),
        ExporterKind::Log => Arc::new(LogExporterFactory),
    }
}

/// Create the instrument of the given kind
pub fn create_instrument(
    exporter: &dyn MetricsExporter,
    kind: MetricKind,
    name: &str,
    boundaries: &BucketBoundaries,
) -> SimulatorResult<Arc<dyn Instrument>> {
    match kind {
        MetricKind::Gauge => exporter.create_gauge(name),
        MetricKind::Counter => exporter.create_counter(name),
        MetricKind::Histogram => exporter.create_histogram(name, boundaries),
    }
}

/// Check an instrument name against OpenTelemetry naming rules
pub fn validate_instrument_name(name: &str, kind: MetricKind) -> SimulatorResult<()> {
    let invalid = |message: &str| SimulationError::Instrument {
        metric: name.to_string(),
        kind,
        message: message.to_string(),
    };

    let mut chars = name.chars();
    match chars.next() {
        None => return Err(invalid("name is empty")),
        Some(first) if !first.is_ascii_alphabetic() => {
            return Err(invalid("name must start with an ASCII letter"))
        }
        Some(_) => {}
    }

    if name.len() > MAX_INSTRUMENT_NAME_LEN {
        return Err(invalid("name exceeds 255 characters"));
    }

    if chars.any(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-' | '/'))) {
        return Err(invalid("name may only contain letters, digits, '_', '.', '-' and '/'"));
    }

    Ok(())
}
