//! Response body observer
//!
//! [`LoggedBody`] sits between the inner handler's response body and the
//! server. Every data frame it hands downstream is added to the record's byte
//! count. The record goes into the queue slot reserved for it by the service,
//! either when the body ends or when the body is dropped. Servers drop
//! fixed-length bodies once the declared length is written, and HEAD
//! responses or departed clients never finish theirs, so `Drop` is the
//! common path.

use std::pin::Pin;
use std::task::{ready, Context, Poll};

use axum::body::Body;
use bytes::Bytes;
use http_body::{Body as HttpBody, Frame, SizeHint};
use tokio::sync::mpsc::OwnedPermit;

use super::record::RequestRecord;

/// Response body that counts bytes and enqueues its record when done
pub struct LoggedBody {
    inner: Body,
    record: Option<RequestRecord>,
    permit: Option<OwnedPermit<RequestRecord>>,
}

impl LoggedBody {
    /// Wrap `inner`. Without a permit (writer gone) the record is discarded.
    pub fn new(
        inner: Body,
        record: RequestRecord,
        permit: Option<OwnedPermit<RequestRecord>>,
    ) -> Self {
        Self {
            inner,
            record: Some(record),
            permit,
        }
    }

    fn enqueue(&mut self) {
        if let (Some(record), Some(permit)) = (self.record.take(), self.permit.take()) {
            permit.send(record);
        }
    }
}

impl HttpBody for LoggedBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();

        match ready!(Pin::new(&mut this.inner).poll_frame(cx)) {
            Some(Ok(frame)) => {
                if let (Some(data), Some(record)) = (frame.data_ref(), this.record.as_mut()) {
                    record.record_write(data.len());
                }
                Poll::Ready(Some(Ok(frame)))
            }
            Some(Err(err)) => Poll::Ready(Some(Err(err))),
            None => {
                this.enqueue();
                Poll::Ready(None)
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> SizeHint {
        self.inner.size_hint()
    }
}

impl Drop for LoggedBody {
    fn drop(&mut self) {
        self.enqueue();
    }
}
