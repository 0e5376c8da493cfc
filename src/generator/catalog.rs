//! Metric catalog construction
//!
//! Each cycle a worker asks the catalog builder which metrics to simulate for
//! its resource. Naming follows a declarative table mapping resource-name
//! patterns to well-known metric suffixes; resources that match no rule get
//! generic `<resource>-metric-<index>` names.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{CountRange, GenerationConfig, NamingRule};
use crate::resource::Resource;

/// Kind of instrument a metric is emitted through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Gauge,
    Counter,
    Histogram,
}

impl MetricKind {
    /// All kinds, in emission order
    pub const ALL: [MetricKind; 3] = [Self::Gauge, Self::Counter, Self::Histogram];
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gauge => write!(f, "gauge"),
            Self::Counter => write!(f, "counter"),
            Self::Histogram => write!(f, "histogram"),
        }
    }
}

/// A metric to simulate during one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricDescriptor {
    pub name: String,
    /// 1-based position in the cycle's catalog
    pub index: usize,
    pub kinds: Vec<MetricKind>,
}

impl MetricDescriptor {
    pub fn emits(&self, kind: MetricKind) -> bool {
        self.kinds.contains(&kind)
    }
}

/// Resource-name pattern to metric-suffix lookup table
#[derive(Debug, Clone, Default)]
pub struct NamingTable {
    rules: Vec<NamingRule>,
}

impl NamingTable {
    pub fn new(rules: Vec<NamingRule>) -> Self {
        Self { rules }
    }

    /// Suffix of the first rule matching the resource, if any
    pub fn suffix_for(&self, resource: &str) -> Option<&str> {
        self.rules
            .iter()
            .find(|rule| rule.matches(resource))
            .map(|rule| rule.suffix.as_str())
    }

    /// Metric name for the `index`-th metric of a resource. Total over all
    /// resource names.
    pub fn metric_name(&self, resource: &str, index: usize) -> String {
        match self.suffix_for(resource) {
            Some(suffix) => format!("{}-{}", resource, suffix),
            None => format!("{}-metric-{}", resource, index),
        }
    }
}

impl NamingRule {
    /// Exact match, or prefix match when the pattern ends in `*`
    pub fn matches(&self, resource: &str) -> bool {
        match self.pattern.strip_suffix('*') {
            Some(prefix) => resource.starts_with(prefix),
            None => resource == self.pattern,
        }
    }
}

/// Builds a fresh catalog for a resource each cycle
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    naming: NamingTable,
    metric_count: CountRange,
    kinds: Vec<MetricKind>,
}

impl CatalogBuilder {
    pub fn new(naming: NamingTable, metric_count: CountRange, kinds: Vec<MetricKind>) -> Self {
        Self {
            naming,
            metric_count,
            kinds,
        }
    }

    pub fn from_config(config: &GenerationConfig) -> Self {
        Self::new(
            NamingTable::new(config.naming.clone()),
            config.metric_count,
            config.instruments.clone(),
        )
    }

    /// Roll a new catalog; nothing is cached between calls
    pub fn build<R: Rng + ?Sized>(&self, resource: &Resource, rng: &mut R) -> Vec<MetricDescriptor> {
        let count = self.metric_count.sample(rng);

        (1..=count)
            .map(|index| MetricDescriptor {
                name: self.naming.metric_name(resource.name(), index),
                index,
                kinds: self.kinds.clone(),
            })
            .collect()
    }
}
