//! Integration test module
//!
//! End-to-end runs against the in-memory exporter on tokio's paused clock.

pub mod common;
pub mod scenario_tests;
pub mod supervisor_tests;
pub mod worker_tests;
