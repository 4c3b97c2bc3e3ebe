//! E2E test suite entry point.

mod kit_workflow;
mod publish_workflow;
mod pull_workflow;
mod sync_workflow;
