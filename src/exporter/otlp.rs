//! OTLP/gRPC exporter on the OpenTelemetry SDK

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use opentelemetry::metrics::{Counter, Gauge, Histogram, Meter, MeterProvider as _};
use opentelemetry::{InstrumentationScope, KeyValue};
use opentelemetry_otlp::{MetricExporter, WithExportConfig};
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::Resource as SdkResource;
use tracing::debug;

use super::{validate_instrument_name, ExporterFactory, Instrument, MetricsExporter};
use crate::config::ExporterConfig;
use crate::error::{SimulationError, SimulatorResult};
use crate::generator::{BucketBoundaries, MetricKind};
use crate::resource::{ResourceIdentity, SERVICE_NAME};

/// Builds one OTLP meter provider per resource per cycle
#[derive(Debug, Clone)]
pub struct OtlpExporterFactory {
    endpoint: String,
    timeout: Duration,
    export_interval: Duration,
}

impl OtlpExporterFactory {
    pub fn new(config: &ExporterConfig) -> Self {
        Self {
            endpoint: config.endpoint_url(),
            timeout: config.timeout,
            export_interval: config.export_interval,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl ExporterFactory for OtlpExporterFactory {
    fn connect(&self, identity: &ResourceIdentity) -> SimulatorResult<Box<dyn MetricsExporter>> {
        let resource_name = identity.resource.name();

        let exporter = MetricExporter::builder()
            .with_tonic()
            .with_endpoint(self.endpoint.clone())
            .with_timeout(self.timeout)
            .build()
            .map_err(|e| SimulationError::exporter(resource_name, e))?;

        let reader = PeriodicReader::builder(exporter)
            .with_interval(self.export_interval)
            .build();

        let attributes = identity
            .attributes()
            .into_iter()
            .filter(|(key, _)| *key != SERVICE_NAME)
            .map(|(key, value)| KeyValue::new(key, value));

        let resource = SdkResource::builder()
            .with_service_name(identity.service_name.clone())
            .with_attributes(attributes)
            .build();

        let provider = SdkMeterProvider::builder()
            .with_resource(resource)
            .with_reader(reader)
            .build();

        let scope = InstrumentationScope::builder(identity.meter_name())
            .with_version(env!("CARGO_PKG_VERSION"))
            .build();
        let meter = provider.meter_with_scope(scope);

        debug!(resource = %resource_name, endpoint = %self.endpoint, "OTLP exporter created");

        Ok(Box::new(OtlpExporter {
            resource: resource_name.to_string(),
            provider,
            meter,
        }))
    }
}

/// Exporter for a single resource
pub struct OtlpExporter {
    resource: String,
    provider: SdkMeterProvider,
    meter: Meter,
}

#[async_trait]
impl MetricsExporter for OtlpExporter {
    fn create_gauge(&self, name: &str) -> SimulatorResult<Arc<dyn Instrument>> {
        validate_instrument_name(name, MetricKind::Gauge)?;
        let gauge = self.meter.f64_gauge(name.to_string()).build();
        Ok(Arc::new(OtlpInstrument::Gauge(gauge)))
    }

    fn create_counter(&self, name: &str) -> SimulatorResult<Arc<dyn Instrument>> {
        validate_instrument_name(name, MetricKind::Counter)?;
        let counter = self.meter.f64_counter(name.to_string()).build();
        Ok(Arc::new(OtlpInstrument::Counter(counter)))
    }

    fn create_histogram(
        &self,
        name: &str,
        boundaries: &BucketBoundaries,
    ) -> SimulatorResult<Arc<dyn Instrument>> {
        validate_instrument_name(name, MetricKind::Histogram)?;
        let histogram = self
            .meter
            .f64_histogram(name.to_string())
            .with_boundaries(boundaries.as_slice().to_vec())
            .build();
        Ok(Arc::new(OtlpInstrument::Histogram(histogram)))
    }

    async fn shutdown(&self) -> SimulatorResult<()> {
        // SDK shutdown blocks until the final export completes
        let provider = self.provider.clone();
        tokio::task::spawn_blocking(move || provider.shutdown())
            .await
            .map_err(|e| SimulationError::exporter(&self.resource, e))?
            .map_err(|e| SimulationError::exporter(&self.resource, e))
    }
}

enum OtlpInstrument {
    Gauge(Gauge<f64>),
    Counter(Counter<f64>),
    Histogram(Histogram<f64>),
}

impl Instrument for OtlpInstrument {
    fn record(&self, value: f64) {
        match self {
            Self::Gauge(gauge) => gauge.record(value, &[]),
            Self::Counter(counter) => counter.add(value, &[]),
            Self::Histogram(histogram) => histogram.record(value, &[]),
        }
    }
}
