//! Telemetry modules and exports.

pub mod tracing;
