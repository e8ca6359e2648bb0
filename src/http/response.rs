//! Wire-level response returned by a client.

use crate::base::neterror::NetError;
use crate::http::ResponseBody;
use http::{HeaderMap, StatusCode, Version};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use tokio::time::Instant;
use tracing::debug;

/// Response as received from the transport, body not yet read.
#[derive(Debug)]
pub struct HttpResponse {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: ResponseBody,
}

impl HttpResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: ResponseBody) -> Self {
        Self {
            status,
            version: Version::HTTP_11,
            headers,
            body,
        }
    }

    pub fn from_hyper(resp: http::Response<Incoming>) -> Self {
        let (parts, body) = resp.into_parts();
        Self {
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            body: ResponseBody::new(body.map_err(|e| {
                debug!(error = %e, "response body read failed");
                NetError::HttpBodyError
            })),
        }
    }

    /// Bound reading of the body to `deadline`.
    pub fn with_body_deadline(mut self, deadline: Instant) -> Self {
        self.body = self.body.with_deadline(deadline);
        self
    }

    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn into_parts(self) -> (StatusCode, Version, HeaderMap, ResponseBody) {
        (self.status, self.version, self.headers, self.body)
    }

    pub fn into_body(self) -> ResponseBody {
        self.body
    }
}
