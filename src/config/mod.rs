//! Configuration module for the metrics simulator
//!
//! Provides the immutable configuration surface read once at startup:
//! - YAML/TOML/JSON config files
//! - Environment variable overrides
//! - Validation

mod generation;

pub use generation::*;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::error::{SimulationError, SimulatorResult};
use crate::resource::Resource;

/// Prefix for environment variable overrides
pub const ENV_PREFIX: &str = "OTEL_METRICS_SIMULATOR";

/// Resources simulated when none are configured
pub const DEFAULT_RESOURCES: [&str; 8] = [
    "web-service-a",
    "web-service-b",
    "order-service",
    "inventory-service",
    "user-service",
    "payment-service",
    "notification-service",
    "database-service",
];

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Metrics exporter settings
    pub exporter: ExporterConfig,
    /// Service identity attached to every resource
    pub identity: IdentityConfig,
    /// Names of the resources to simulate
    pub resources: Vec<String>,
    /// Data generation settings
    pub generation: GenerationConfig,
    /// Cycle pacing and shutdown timing
    pub schedule: ScheduleConfig,
    /// Logging settings
    pub telemetry: TelemetryConfig,
    /// Seed for reproducible runs (None = random)
    pub seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            exporter: ExporterConfig::default(),
            identity: IdentityConfig::default(),
            resources: DEFAULT_RESOURCES.iter().map(|r| r.to_string()).collect(),
            generation: GenerationConfig::default(),
            schedule: ScheduleConfig::default(),
            telemetry: TelemetryConfig::default(),
            seed: None,
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> SimulatorResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimulationError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => {
                return Err(SimulationError::Config(
                    "Unsupported config file format. Use .yaml, .toml, or .json".to_string(),
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load the default configuration with environment variable overrides
    pub fn from_env() -> SimulatorResult<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `OTEL_METRICS_SIMULATOR_*` overrides
    pub fn apply_env(&mut self) -> SimulatorResult<()> {
        self.apply_overrides(|key| std::env::var(format!("{}_{}", ENV_PREFIX, key)).ok())
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> SimulatorResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(endpoint) = lookup("ENDPOINT") {
            self.exporter.endpoint = endpoint;
        }

        if let Some(val) = lookup("INSECURE") {
            self.exporter.insecure = val
                .parse()
                .map_err(|_| SimulationError::Config(format!("Invalid INSECURE value: {}", val)))?;
        }

        if let Some(val) = lookup("EXPORTER") {
            self.exporter.kind = match val.to_lowercase().as_str() {
                "otlp" => ExporterKind::Otlp,
                "log" => ExporterKind::Log,
                other => {
                    return Err(SimulationError::Config(format!("Unknown exporter kind: {}", other)))
                }
            };
        }

        if let Some(list) = lookup("RESOURCES") {
            self.resources = list
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from)
                .collect();
        }

        if let Some(seed) = lookup("SEED") {
            self.seed = Some(
                seed.parse()
                    .map_err(|_| SimulationError::Config("Invalid seed value".to_string()))?,
            );
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> SimulatorResult<()> {
        self.exporter.validate()?;
        self.identity.validate()?;
        self.generation.validate()?;
        self.schedule.validate()?;

        if self.resources.is_empty() {
            return Err(SimulationError::validation(
                "at least one resource is required",
                "resources",
            ));
        }

        let mut seen = HashSet::new();
        for name in &self.resources {
            if name.trim().is_empty() {
                return Err(SimulationError::validation(
                    "resource names cannot be blank",
                    "resources",
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(SimulationError::validation(
                    format!("duplicate resource '{}'", name),
                    "resources",
                ));
            }
        }

        Ok(())
    }

    /// Configured resources, in order
    pub fn resources(&self) -> Vec<Resource> {
        self.resources.iter().map(|name| Resource::new(name.as_str())).collect()
    }
}

/// Which exporter implementation workers use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExporterKind {
    /// OTLP over gRPC
    #[default]
    Otlp,
    /// Write readings to the log only
    Log,
}

/// Metrics exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    pub kind: ExporterKind,
    /// Collector address, `host:port` or a full URL
    pub endpoint: String,
    /// Use plaintext transport when the endpoint has no scheme
    pub insecure: bool,
    /// How often the periodic reader pushes collected metrics
    #[serde(with = "humantime_serde")]
    pub export_interval: Duration,
    /// Export request timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            kind: ExporterKind::Otlp,
            endpoint: crate::DEFAULT_ENDPOINT.to_string(),
            insecure: true,
            export_interval: Duration::from_secs(1),
            timeout: Duration::from_secs(10),
        }
    }
}

impl ExporterConfig {
    pub fn validate(&self) -> SimulatorResult<()> {
        if self.endpoint.trim().is_empty() {
            return Err(SimulationError::validation(
                "endpoint cannot be empty",
                "exporter.endpoint",
            ));
        }
        if self.export_interval.is_zero() {
            return Err(SimulationError::validation(
                "export_interval must be greater than 0",
                "exporter.export_interval",
            ));
        }
        Ok(())
    }

    /// Endpoint as a URL, adding a scheme that matches the transport choice
    pub fn endpoint_url(&self) -> String {
        let endpoint = self.endpoint.trim();
        if endpoint.contains("://") {
            endpoint.to_string()
        } else if self.insecure {
            format!("http://{}", endpoint)
        } else {
            format!("https://{}", endpoint)
        }
    }
}

/// Fixed service metadata attached to every resource
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub service_name: String,
    pub service_version: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            service_name: "otel-metrics-generator".to_string(),
            service_version: "v1.0.0".to_string(),
        }
    }
}

impl IdentityConfig {
    pub fn validate(&self) -> SimulatorResult<()> {
        if self.service_name.trim().is_empty() {
            return Err(SimulationError::validation(
                "service_name cannot be empty",
                "identity.service_name",
            ));
        }
        Ok(())
    }
}

/// Cycle pacing and shutdown timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Idle interval between cycles
    #[serde(with = "humantime_serde")]
    pub cooldown: Duration,
    /// Delay between consecutive samples of a metric
    #[serde(with = "humantime_serde")]
    pub sample_interval: Duration,
    /// How long shutdown waits for workers before abandoning them
    #[serde(with = "humantime_serde")]
    pub grace_period: Duration,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(1),
            sample_interval: Duration::from_millis(50),
            grace_period: Duration::from_secs(2),
        }
    }
}

impl ScheduleConfig {
    pub fn validate(&self) -> SimulatorResult<()> {
        if self.cooldown.is_zero() {
            return Err(SimulationError::validation(
                "cooldown must be greater than 0",
                "schedule.cooldown",
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Enable the log subscriber
    pub enabled: bool,
    /// Log level
    pub log_level: String,
    /// Enable JSON logging
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Helper module for Duration serialization
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_millis() == 0 {
            serializer.serialize_str(&format!("{}s", duration.as_secs()))
        } else {
            serializer.serialize_str(&format!("{}ms", duration.as_millis()))
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        if let Some(millis) = s.strip_suffix("ms") {
            millis.trim().parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|_| format!("Invalid duration: {}", s))
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.trim().parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| format!("Invalid duration: {}", s))
        } else if let Some(mins) = s.strip_suffix('m') {
            mins.trim().parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|_| format!("Invalid duration: {}", s))
        } else {
            s.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| format!("Invalid duration: {}", s))
        }
    }
}
