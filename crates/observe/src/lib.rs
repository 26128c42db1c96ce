//! Logging initialization shared by the workspace binaries.
pub mod config;
pub mod tracing;
