//! The round-trip seam
//!
//! [`RoundTrip`] executes exactly one HTTP request and returns the response
//! or the executor's error, with no retry or redirect logic of its own above
//! what the executor does. Wrappers implement it too, so transports chain.

use async_trait::async_trait;
use reqwest::{Client, Request, Response};
use std::sync::{Arc, OnceLock};

use crate::core::config::TransportConfig;
use crate::core::error::{BoxError, TrafficLogResult};

#[async_trait]
pub trait RoundTrip: Send + Sync {
    async fn round_trip(&self, request: Request) -> Result<Response, BoxError>;
}

#[async_trait]
impl RoundTrip for Client {
    async fn round_trip(&self, request: Request) -> Result<Response, BoxError> {
        self.execute(request).await.map_err(Into::into)
    }
}

#[async_trait]
impl<T> RoundTrip for Arc<T>
where
    T: RoundTrip + ?Sized,
{
    async fn round_trip(&self, request: Request) -> Result<Response, BoxError> {
        (**self).round_trip(request).await
    }
}

static DEFAULT_CLIENT: OnceLock<Client> = OnceLock::new();

/// Process-wide client used by transports with no executor configured
pub fn default_client() -> &'static Client {
    DEFAULT_CLIENT.get_or_init(Client::new)
}

/// Build a client honouring the configured timeout
pub fn build_client(config: &TransportConfig) -> TrafficLogResult<Client> {
    Ok(Client::builder().timeout(config.timeout).build()?)
}
