//! Property test suite entry point.

mod catalog_properties;
mod registry_properties;
