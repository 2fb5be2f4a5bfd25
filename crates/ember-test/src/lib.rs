//! Ember Test Harness - Fixtures and instrumented handlers
//!
//! This crate provides:
//! - Entity topologies covering every context kind
//! - Recording, failing and re-entrant handlers
//! - Generated handler trees of configurable shape
//! - A recording dispatch observer
//! - End-to-end dispatch scenarios and property tests

pub mod fixtures;
pub mod harness;
pub mod tree;

#[cfg(test)]
mod properties;
#[cfg(test)]
mod scenarios;

pub use fixtures::*;
pub use harness::*;
pub use tree::*;
