//! vibery - template and kit catalog manager
//!
//! Library side of the `vibery` CLI: the asset store and kit catalog, the
//! importer, registry generation, packaging and publishing.

pub mod app;
pub mod bundler;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod import;
pub mod publish;
pub mod registry;
pub mod test_utils;
pub mod utils;

pub use error::{Result, VbError};
