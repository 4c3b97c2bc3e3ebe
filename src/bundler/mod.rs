//! Packaging for distribution: kit zips and release tarballs.

pub mod archive;
pub mod release;

pub use archive::{kit_entries, write_kit_zip};
pub use release::{ReleaseBuilder, ReleaseEntry, ReleaseRegistry, extract_description};
