//! # traffic-log - HTTP Traffic Logging Utilities
//!
//! Two small, independent pieces of HTTP middleware:
//!
//! - [`client::CountingTransport`]: wraps an outbound HTTP executor, counts
//!   the round trips it performs and optionally logs a start and end line
//!   with the elapsed time of each.
//! - [`middleware::AccessLogLayer`]: a tower layer that records every request
//!   served by the wrapped service and writes Combined Log Format lines to
//!   hourly-rotated files and/or standard output from a background task.
//!
//! ## Module Layout
//! - `core`: error type and configuration structures
//! - `client`: the round-trip seam and the counting transport
//! - `middleware`: the access-log layer, its record, formatter and writer
//! - `observability`: process log (tracing subscriber) setup

/// Error type and configuration structures shared by every module
pub mod core;

/// Outbound HTTP: the `RoundTrip` trait and the counting transport
pub mod client;

/// Server-side access logging
pub mod middleware;

/// Process log setup
pub mod observability;

pub use crate::core::config::{AccessLogConfig, AppConfig, TransportConfig};
pub use crate::core::error::{BoxError, TrafficLogError, TrafficLogResult};

pub use client::{CountingTransport, RoundTrip};
pub use middleware::{AccessLogLayer, AccessLogService, RequestRecord};
