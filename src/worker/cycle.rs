//! Per-cycle helpers: sample timestamps and instrument sets

use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};

use crate::error::SimulatorResult;
use crate::exporter::{create_instrument, Instrument, MetricsExporter};
use crate::generator::{BucketBoundaries, MetricDescriptor, MetricKind};

/// A generated reading
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
}

/// Hands out strictly increasing timestamps within one cycle
#[derive(Debug, Clone)]
pub struct CycleClock {
    start: DateTime<Utc>,
    sequence: i64,
}

impl CycleClock {
    pub fn start() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(start: DateTime<Utc>) -> Self {
        Self { start, sequence: 0 }
    }

    /// Stamp a value with the next timestamp, one millisecond after the last
    pub fn sample(&mut self, value: f64) -> Sample {
        self.sequence += 1;
        Sample {
            value,
            timestamp: self.start + ChronoDuration::milliseconds(self.sequence),
        }
    }
}

/// The instruments one metric is emitted through
pub struct InstrumentSet {
    instruments: Vec<(MetricKind, Arc<dyn Instrument>)>,
}

impl InstrumentSet {
    /// Create every instrument the descriptor asks for; the first failure
    /// aborts the whole set
    pub fn create(
        exporter: &dyn MetricsExporter,
        descriptor: &MetricDescriptor,
        boundaries: &BucketBoundaries,
    ) -> SimulatorResult<Self> {
        let instruments = descriptor
            .kinds
            .iter()
            .map(|&kind| {
                create_instrument(exporter, kind, &descriptor.name, boundaries)
                    .map(|instrument| (kind, instrument))
            })
            .collect::<SimulatorResult<Vec<_>>>()?;

        Ok(Self { instruments })
    }

    pub fn record(&self, sample: &Sample) {
        for (_, instrument) in &self.instruments {
            instrument.record(sample.value);
        }
    }
}
