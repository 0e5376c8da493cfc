//! Histogram bucket simulation

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;

use crate::config::CountRange;
use crate::error::{SimulationError, SimulatorResult};

/// Strictly ascending histogram upper bounds
#[derive(Debug, Clone, PartialEq)]
pub struct BucketBoundaries {
    bounds: Vec<f64>,
}

impl BucketBoundaries {
    pub fn new(bounds: Vec<f64>) -> SimulatorResult<Self> {
        if bounds.is_empty() {
            return Err(SimulationError::validation(
                "bucket boundaries cannot be empty",
                "generation.bucket_boundaries",
            ));
        }
        if let Some(bad) = bounds.iter().find(|b| !b.is_finite()) {
            return Err(SimulationError::validation(
                format!("bucket boundary {} is not finite", bad),
                "generation.bucket_boundaries",
            ));
        }
        if let Some(pair) = bounds.windows(2).find(|pair| pair[0] >= pair[1]) {
            return Err(SimulationError::validation(
                format!(
                    "bucket boundaries must be strictly ascending ({} followed by {})",
                    pair[0], pair[1]
                ),
                "generation.bucket_boundaries",
            ));
        }

        Ok(Self { bounds })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Upper bound of a bucket, `None` for the overflow bucket
    pub fn upper_bound(&self, key: BucketKey) -> Option<f64> {
        match key {
            BucketKey::Bounded(position) => self.bounds.get(position - 1).copied(),
            BucketKey::Overflow => None,
        }
    }

    /// Bucket for a value: the first bound it does not exceed, else overflow
    pub fn classify(&self, value: f64) -> BucketKey {
        self.bounds
            .iter()
            .position(|&bound| value <= bound)
            .map(|idx| BucketKey::Bounded(idx + 1))
            .unwrap_or(BucketKey::Overflow)
    }
}

/// Free-function form of [`BucketBoundaries::classify`]
pub fn classify(value: f64, boundaries: &BucketBoundaries) -> BucketKey {
    boundaries.classify(value)
}

/// Identifies a histogram bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BucketKey {
    /// 1-based position of the bound in the boundary set
    Bounded(usize),
    Overflow,
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(position) => write!(f, "le{}", position),
            Self::Overflow => write!(f, "le+Inf"),
        }
    }
}

/// Per-metric simulated bucket counts for one cycle
#[derive(Debug, Clone, Default)]
pub struct BucketTally {
    counts: BTreeMap<BucketKey, u64>,
}

impl BucketTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: BucketKey, weight: u64) {
        *self.counts.entry(key).or_insert(0) += weight;
    }

    /// Classify a value and add a random bursty weight to its bucket
    pub fn observe<R: Rng + ?Sized>(
        &mut self,
        value: f64,
        boundaries: &BucketBoundaries,
        weight: &CountRange,
        rng: &mut R,
    ) -> BucketKey {
        let key = boundaries.classify(value);
        self.add(key, weight.sample(rng) as u64);
        key
    }

    pub fn get(&self, key: BucketKey) -> u64 {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BucketKey, u64)> + '_ {
        self.counts.iter().map(|(key, count)| (*key, *count))
    }
}
