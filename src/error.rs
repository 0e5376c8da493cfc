//! Error types for the metrics simulator

use std::fmt;

use thiserror::Error;

use crate::generator::MetricKind;

/// Result type alias for simulator operations
pub type SimulatorResult<T> = Result<T, SimulationError>;

/// Main error type for simulation operations
#[derive(Error, Debug, Clone)]
pub enum SimulationError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        param: Option<String>,
    },

    // Exporter errors, scoped to one worker cycle
    #[error("Exporter error for resource '{resource}': {message}")]
    Exporter { resource: String, message: String },

    // Instrument errors, scoped to one metric
    #[error("Failed to create {kind} '{metric}': {message}")]
    Instrument {
        metric: String,
        kind: MetricKind,
        message: String,
    },

    // Signal handling
    #[error("Signal handler error: {0}")]
    Signal(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SimulationError {
    pub fn validation(message: impl Into<String>, param: &str) -> Self {
        Self::Validation {
            message: message.into(),
            param: Some(param.to_string()),
        }
    }

    pub fn exporter(resource: &str, message: impl fmt::Display) -> Self {
        Self::Exporter {
            resource: resource.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether the error only affects a single cycle or metric
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Exporter { .. } | Self::Instrument { .. })
    }

    pub fn error_type(&self) -> &str {
        match self {
            Self::Config(_) => "configuration_error",
            Self::Validation { .. } => "validation_error",
            Self::Exporter { .. } => "exporter_error",
            Self::Instrument { .. } => "instrument_error",
            Self::Signal(_) => "signal_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<std::io::Error> for SimulationError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for SimulationError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {}", err))
    }
}

impl From<serde_yaml::Error> for SimulationError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(format!("YAML error: {}", err))
    }
}

impl From<toml::de::Error> for SimulationError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("TOML parse error: {}", err))
    }
}
