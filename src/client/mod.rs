//! HTTP client interface bound to a session.
//!
//! [`HttpClient`] is the narrow seam the session layer talks to; a
//! [`ClientConstructor`] builds one from a resolved profile. The built-in
//! implementation is [`FingerprintClient`].

mod fingerprint;
pub mod pool;

pub use fingerprint::{FingerprintClient, FingerprintConstructor};

use crate::base::neterror::NetError;
use crate::fingerprint::ClientProfile;
use crate::http::{HttpResponse, WireRequest};
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::Duration;

/// Shared handle to a session's client.
pub type ClientHandle = Arc<dyn HttpClient>;

/// Response type returned by [`HttpClient::execute`].
pub type WireResponse = HttpResponse;

/// Default redirect limit.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Options a client is constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub follow_redirects: bool,
    pub max_redirects: usize,
    pub proxy_url: Option<String>,
    pub insecure_skip_verify: bool,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            follow_redirects: false,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            proxy_url: None,
            insecure_skip_verify: false,
        }
    }
}

/// A live HTTP client with a fixed fingerprint and mutable proxy and
/// redirect policy.
pub trait HttpClient: Send + Sync + std::fmt::Debug {
    fn profile(&self) -> &ClientProfile;

    fn timeout(&self) -> Duration;

    /// Current proxy URL, empty when none.
    fn proxy(&self) -> String;

    /// Replace the proxy. An empty string clears it. On error the current
    /// proxy is kept.
    fn set_proxy(&self, proxy_url: &str) -> Result<(), NetError>;

    fn follow_redirects(&self) -> bool;

    fn set_follow_redirects(&self, follow: bool);

    /// Send `request`, bounded by [`timeout`](Self::timeout).
    fn execute(&self, request: WireRequest) -> BoxFuture<'_, Result<WireResponse, NetError>>;
}

/// Builds clients for new sessions.
pub trait ClientConstructor: Send + Sync {
    fn construct(
        &self,
        profile: ClientProfile,
        options: ClientOptions,
    ) -> Result<ClientHandle, NetError>;
}
