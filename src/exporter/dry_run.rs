//! Dry-run exporter that writes readings to the log

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::{validate_instrument_name, ExporterFactory, Instrument, MetricsExporter};
use crate::error::SimulatorResult;
use crate::generator::{BucketBoundaries, MetricKind};
use crate::resource::ResourceIdentity;

/// Factory for [`LogExporter`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct LogExporterFactory;

impl ExporterFactory for LogExporterFactory {
    fn connect(&self, identity: &ResourceIdentity) -> SimulatorResult<Box<dyn MetricsExporter>> {
        Ok(Box::new(LogExporter {
            resource: identity.resource.name().into(),
        }))
    }
}

/// Logs every reading instead of sending it anywhere
#[derive(Debug, Clone)]
pub struct LogExporter {
    resource: Arc<str>,
}

impl LogExporter {
    fn instrument(&self, name: &str, kind: MetricKind) -> SimulatorResult<Arc<dyn Instrument>> {
        validate_instrument_name(name, kind)?;
        Ok(Arc::new(LogInstrument {
            resource: self.resource.clone(),
            name: name.into(),
            kind,
        }))
    }
}

#[async_trait]
impl MetricsExporter for LogExporter {
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
        Ok(())
    }
}

struct LogInstrument {
    resource: Arc<str>,
    name: Arc<str>,
    kind: MetricKind,
}

impl Instrument for LogInstrument {
    fn record(&self, value: f64) {
        info!(
            target: "otel_metrics_simulator::dry_run",
            resource = %self.resource,
            metric = %self.name,
            kind = %self.kind,
            value,
            "Recorded reading"
        );
    }
}
