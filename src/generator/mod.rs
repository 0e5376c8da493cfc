//! Synthetic data generation
//!
//! The pure, RNG-driven building blocks of a simulation cycle:
//! - Bounded value sampling
//! - Per-resource metric catalogs
//! - Histogram bucket classification and tallies

mod buckets;
mod catalog;
mod value;

pub use buckets::*;
pub use catalog::*;
pub use value::*;
