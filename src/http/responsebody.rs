//! Response body handle.

use crate::base::clienterror::BoxError;
use crate::base::neterror::NetError;
use bytes::Bytes;
use http_body::Body;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};
use tokio::time::Instant;

/// Type-erased response body. It can be drained once; `bytes` consumes it.
///
/// A body may carry a deadline; draining past it fails with
/// [`NetError::ConnectionTimedOut`].
pub struct ResponseBody {
    inner: UnsyncBoxBody<Bytes, BoxError>,
    deadline: Option<Instant>,
}

impl ResponseBody {
    /// Wrap any body whose errors convert into [`BoxError`].
    pub fn new<B>(body: B) -> Self
    where
        B: Body<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self {
            inner: body.map_err(Into::into).boxed_unsync(),
            deadline: None,
        }
    }

    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::new(Full::new(bytes.into()))
    }

    pub fn empty() -> Self {
        Self::new(Empty::<Bytes>::new())
    }

    /// Bound reading to `deadline`. An earlier deadline already set wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Read the entire body.
    pub async fn bytes(self) -> Result<Bytes, BoxError> {
        let collected = match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, self.inner.collect())
                .await
                .map_err(|_| Box::new(NetError::ConnectionTimedOut) as BoxError)??,
            None => self.inner.collect().await?,
        };
        Ok(collected.to_bytes())
    }

    /// Drop the body without reading it.
    pub fn discard(self) {
        drop(self.inner);
    }
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseBody")
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
