//! Shared test utilities for vibery.

pub mod fixtures;
pub mod runner;

pub use fixtures::CatalogFixture;
pub use runner::{FakeRunner, RecordedCall};
