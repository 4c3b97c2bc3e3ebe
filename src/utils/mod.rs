//! Utility functions and helpers.

pub mod format;
pub mod fs;
pub mod process;

// Re-exports for convenience
pub use format::*;
pub use fs::*;
