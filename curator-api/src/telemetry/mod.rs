//! Curator Telemetry
//!
//! Structured logging for the API binary. Request spans come from the
//! tower-http `TraceLayer` installed on the router.

pub mod tracer;

pub use tracer::{init_tracer, LogFormat, TelemetryConfig, DEFAULT_LOG_FILTER};
