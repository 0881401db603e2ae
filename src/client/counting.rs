//! # Counting Transport
//!
//! [`CountingTransport`] wraps another [`RoundTrip`] (or the process-default
//! client) and counts the requests it performs. Each round trip gets a
//! sequence number, the post-increment counter value, so numbers follow the
//! order requests were started, not the order they completed.
//!
//! With verbose logging on, every round trip logs a start line and an end line:
//!
//! ```text
//! (3) GET https://example.com/ ...
//! (3) GET https://example.com/ = status 200 (in 41.2ms)
//! (4) GET https://example.com/missing = error: connection refused (in 1.3ms)
//! ```
//!
//! The counter is bumped even when the inner executor fails. Responses and
//! errors are handed back untouched.

use async_trait::async_trait;
use reqwest::{Request, Response};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use super::transport::{build_client, default_client, RoundTrip};
use crate::core::config::TransportConfig;
use crate::core::error::{BoxError, TrafficLogResult};

#[derive(Default)]
pub struct CountingTransport {
    requests: AtomicU64,
    transport: Option<Arc<dyn RoundTrip>>,
    verbose: bool,
}

impl CountingTransport {
    /// Counting transport over the process-default client
    pub fn new() -> Self {
        Self::default()
    }

    /// Counting transport over `transport`
    pub fn with_transport<T>(transport: T) -> Self
    where
        T: RoundTrip + 'static,
    {
        Self {
            transport: Some(Arc::new(transport)),
            ..Self::default()
        }
    }

    /// Build from config: a dedicated client with the configured timeout
    pub fn from_config(config: &TransportConfig) -> TrafficLogResult<Self> {
        Ok(Self::with_transport(build_client(config)?).verbose(config.verbose))
    }

    /// Enable or disable the start/end log lines
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Number of round trips started so far
    pub fn requests(&self) -> u64 {
        self.requests.load(Ordering::SeqCst)
    }

    fn inner(&self) -> &dyn RoundTrip {
        match &self.transport {
            Some(transport) => transport.as_ref(),
            None => default_client(),
        }
    }
}

#[async_trait]
impl RoundTrip for CountingTransport {
    async fn round_trip(&self, request: Request) -> Result<Response, BoxError> {
        let n = self.requests.fetch_add(1, Ordering::SeqCst) + 1;
        let transport = self.inner();

        if !self.verbose {
            return transport.round_trip(request).await;
        }

        let method = request.method().clone();
        let url = request.url().clone();
        let started = Instant::now();
        info!("({}) {} {} ...", n, method, url);

        let result = transport.round_trip(request).await;

        let elapsed = started.elapsed();
        match &result {
            Ok(response) => info!(
                "({}) {} {} = status {} (in {:?})",
                n,
                method,
                url,
                response.status().as_u16(),
                elapsed
            ),
            Err(err) => info!("({}) {} {} = error: {} (in {:?})", n, method, url, err, elapsed),
        }

        result
    }
}
