//! Data generation configuration

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SimulationError, SimulatorResult};
use crate::generator::{BucketBoundaries, MetricKind};

/// Maximum supported decimal precision for generated values
pub const MAX_PRECISION: u32 = 6;

/// Largest grid step count every f64 represents exactly (2^53)
const MAX_EXACT_STEP: f64 = 9_007_199_254_740_992.0;

/// Data generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Metrics per resource per cycle
    pub metric_count: CountRange,
    /// Samples per metric per cycle
    pub data_points: CountRange,
    /// Range of generated readings
    pub values: ValueRange,
    /// Histogram upper bounds, strictly ascending
    pub bucket_boundaries: Vec<f64>,
    /// Simulated weight added to a bucket per observation
    pub bucket_weight: CountRange,
    /// Instruments each sample is emitted through
    pub instruments: Vec<MetricKind>,
    /// Resource-name pattern to metric-suffix rules, first match wins
    pub naming: Vec<NamingRule>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            metric_count: CountRange::new(3, 7),
            data_points: CountRange::new(5, 25),
            values: ValueRange::default(),
            bucket_boundaries: vec![0.5, 1.0, 2.5, 5.0, 10.0, 100.0, 1000.0, 10000.0],
            bucket_weight: CountRange::new(1, 5),
            instruments: MetricKind::ALL.to_vec(),
            naming: default_naming_rules(),
        }
    }
}

impl GenerationConfig {
    pub fn validate(&self) -> SimulatorResult<()> {
        self.metric_count.validate("generation.metric_count")?;
        self.data_points.validate("generation.data_points")?;
        self.bucket_weight.validate("generation.bucket_weight")?;
        self.values.validate()?;
        self.boundaries()?;

        if self.instruments.is_empty() {
            return Err(SimulationError::validation(
                "at least one instrument kind is required",
                "generation.instruments",
            ));
        }

        for (i, rule) in self.naming.iter().enumerate() {
            rule.validate().map_err(|e| SimulationError::Validation {
                message: format!("Invalid naming rule {}: {}", i, e),
                param: Some(format!("generation.naming[{}]", i)),
            })?;
        }

        Ok(())
    }

    /// Validated histogram boundaries
    pub fn boundaries(&self) -> SimulatorResult<BucketBoundaries> {
        BucketBoundaries::new(self.bucket_boundaries.clone())
    }
}

/// Inclusive integer range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    /// Uniform draw from `min..=max`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }

    pub fn contains(&self, value: usize) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn validate(&self, param: &str) -> SimulatorResult<()> {
        if self.min == 0 {
            return Err(SimulationError::validation("range minimum must be at least 1", param));
        }
        if self.min > self.max {
            return Err(SimulationError::validation(
                format!("range minimum {} exceeds maximum {}", self.min, self.max),
                param,
            ));
        }
        Ok(())
    }
}

/// Bounded range of generated readings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    /// Decimal places kept on every value
    pub precision: u32,
}

impl Default for ValueRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 15_000.0,
            precision: 2,
        }
    }
}

impl ValueRange {
    pub fn scale(&self) -> f64 {
        10f64.powi(self.precision.min(MAX_PRECISION) as i32)
    }

    /// Inclusive bounds in units of the precision grid, both inside the range.
    /// Only exact for ranges accepted by [`ValueRange::validate`].
    pub fn step_bounds(&self) -> (u64, u64) {
        let scale = self.scale();
        let mut low = (self.min.max(0.0) * scale).ceil().min(MAX_EXACT_STEP) as u64;
        let mut high = (self.max.max(0.0) * scale).floor().min(MAX_EXACT_STEP) as u64;

        // ceil/floor of a rounded product can land one step outside
        if (low as f64) / scale < self.min {
            low = low.saturating_add(1);
        }
        if (high as f64) / scale > self.max {
            high = high.saturating_sub(1);
        }
        (low, high)
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub fn validate(&self) -> SimulatorResult<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(SimulationError::validation(
                "value bounds must be finite",
                "generation.values",
            ));
        }
        if self.min < 0.0 {
            return Err(SimulationError::validation(
                "value minimum cannot be negative",
                "generation.values.min",
            ));
        }
        if self.precision > MAX_PRECISION {
            return Err(SimulationError::validation(
                format!("precision cannot exceed {}", MAX_PRECISION),
                "generation.values.precision",
            ));
        }
        if self.max * self.scale() > MAX_EXACT_STEP {
            return Err(SimulationError::validation(
                format!(
                    "range maximum {} is too large for precision {}",
                    self.max, self.precision
                ),
                "generation.values.max",
            ));
        }
        let (low, high) = self.step_bounds();
        if self.min > self.max || low > high {
            return Err(SimulationError::validation(
                format!(
                    "range [{}, {}] holds no value at precision {}",
                    self.min, self.max, self.precision
                ),
                "generation.values",
            ));
        }
        Ok(())
    }
}

/// Maps resources matching `pattern` to metrics named `<resource>-<suffix>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingRule {
    /// Exact resource name, or a prefix followed by `*`
    pub pattern: String,
    pub suffix: String,
}

impl NamingRule {
    pub fn new(pattern: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            suffix: suffix.into(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.pattern.trim().is_empty() || self.pattern == "*" {
            return Err("pattern cannot be empty".to_string());
        }
        let body = self.pattern.strip_suffix('*').unwrap_or(&self.pattern);
        if body.contains('*') {
            return Err("'*' is only allowed at the end of a pattern".to_string());
        }
        if self.suffix.trim().is_empty() {
            return Err("suffix cannot be empty".to_string());
        }
        Ok(())
    }
}

/// Well-known service archetypes and the metric each one reports
pub fn default_naming_rules() -> Vec<NamingRule> {
    [
        ("web-service-*", "http_request_duration_seconds"),
        ("order-service", "order_count"),
        ("inventory-service", "db_query_duration_seconds"),
        ("user-service", "http_requests_total"),
        ("payment-service", "payment_processing_time_seconds"),
        ("notification-service", "queue_length"),
        ("database-service", "db_query_duration_seconds"),
    ]
    .into_iter()
    .map(|(pattern, suffix)| NamingRule::new(pattern, suffix))
    .collect()
}
