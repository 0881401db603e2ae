//! Tower layer and service for the access log
//!
//! The layer owns the sending half of the bounded record queue; constructing
//! it spawns the single writer task. Each request gets a [`RequestRecord`],
//! the inner service runs and its status is recorded. The response is then
//! held until a queue slot is reserved for the record, so a full queue blocks
//! the request. Its body is wrapped in a [`LoggedBody`] that counts bytes and
//! fills the reserved slot when done.
//!
//! Errors returned by the inner service pass through unchanged and produce
//! no record.

use axum::body::Body;
use axum::http::{Request, Response};
use bytes::Bytes;
use futures::future::BoxFuture;
use http_body::Body as HttpBody;
use std::path::Path;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tower::{BoxError, Layer, Service};
use tracing::debug;

use super::body::LoggedBody;
use super::record::RequestRecord;
use super::writer::LogWriter;
use crate::core::config::AccessLogConfig;
use crate::core::error::{TrafficLogError, TrafficLogResult};

/// Access log middleware layer
///
/// Must be constructed inside a Tokio runtime: construction spawns the writer.
#[derive(Clone)]
pub struct AccessLogLayer {
    sender: mpsc::Sender<RequestRecord>,
}

impl AccessLogLayer {
    /// Create the layer and spawn its writer for the lifetime of the process
    pub fn new(config: AccessLogConfig) -> Self {
        let (layer, _writer) = Self::spawn(config);
        layer
    }

    /// Create the layer from an output directory (empty disables file output)
    /// and a stdout flag, with the default queue capacity
    pub fn with_options<P: AsRef<Path>>(directory: P, stdout: bool) -> Self {
        Self::new(AccessLogConfig::new(directory, stdout))
    }

    /// Create the layer and keep a handle on the writer task
    pub fn spawn(config: AccessLogConfig) -> (Self, WriterHandle) {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let writer = LogWriter::new(&config);
        let task = tokio::spawn(writer.run(receiver));
        (Self { sender }, WriterHandle { task })
    }
}

impl<S> Layer<S> for AccessLogLayer {
    type Service = AccessLogService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessLogService {
            inner,
            sender: self.sender.clone(),
        }
    }
}

/// Handle on the background writer task
pub struct WriterHandle {
    task: JoinHandle<()>,
}

impl WriterHandle {
    /// Resolve once every layer, service and in-flight body is dropped and
    /// the writer has written everything left in the queue.
    pub async fn closed(self) -> TrafficLogResult<()> {
        self.task
            .await
            .map_err(|e| TrafficLogError::internal(format!("Access log writer failed: {}", e)))
    }
}

/// Access log middleware service
#[derive(Clone)]
pub struct AccessLogService<S> {
    inner: S,
    sender: mpsc::Sender<RequestRecord>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AccessLogService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>>,
    S::Future: Send + 'static,
    ResBody: HttpBody<Data = Bytes> + Send + 'static,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        let mut record = RequestRecord::from_request(&request);
        let sender = self.sender.clone();
        let future = self.inner.call(request);

        Box::pin(async move {
            let response = future.await?;
            let (parts, body) = response.into_parts();
            record.write_header(parts.status);

            // Waits while the queue is full.
            let permit = match sender.reserve_owned().await {
                Ok(permit) => Some(permit),
                Err(_) => {
                    debug!("Access log writer is gone, record discarded");
                    None
                }
            };

            let body = LoggedBody::new(Body::new(body), record, permit);
            Ok(Response::from_parts(parts, Body::new(body)))
        })
    }
}

/// Wrap `inner` in the access log, writing to `directory` (empty disables
/// file output) and optionally mirroring to stdout
pub fn access_log<S, P: AsRef<Path>>(inner: S, directory: P, stdout: bool) -> AccessLogService<S> {
    AccessLogLayer::with_options(directory, stdout).layer(inner)
}
