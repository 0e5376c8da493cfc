//! Property-based tests using proptest
//!
//! Invariants of value generation, bucket classification and catalogs.

pub mod catalog_tests;
pub mod value_tests;
