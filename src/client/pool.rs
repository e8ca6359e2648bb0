use crate::socket::proxy::ProxySettings;
use bytes::Bytes;
use dashmap::DashMap;
use http_body_util::Full;
use hyper::client::conn::http2::SendRequest;
use tracing::trace;
use url::Url;

/// Identifies a connection group: origin plus the proxy it is reached
/// through.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupId {
    scheme: String,
    host: String,
    port: u16,
    proxy: Option<String>,
}

impl GroupId {
    pub fn new(url: &Url, proxy: Option<&ProxySettings>) -> Option<Self> {
        Some(GroupId {
            scheme: url.scheme().to_string(),
            host: url.host_str()?.to_ascii_lowercase(),
            port: url.port_or_known_default()?,
            proxy: proxy.map(|p| p.as_str().to_string()),
        })
    }
}

/// Live HTTP/2 connections of one client, one per group.
///
/// HTTP/1.1 connections are not pooled.
#[derive(Default)]
pub struct H2Pool {
    senders: DashMap<GroupId, SendRequest<Full<Bytes>>>,
}

impl H2Pool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sender for `group`, dropping it first if its connection has closed.
    pub fn get(&self, group: &GroupId) -> Option<SendRequest<Full<Bytes>>> {
        let sender = self.senders.get(group).map(|s| s.clone())?;
        if sender.is_closed() {
            self.senders.remove(group);
            trace!(?group, "evicted closed h2 connection");
            return None;
        }
        Some(sender)
    }

    pub fn insert(&self, group: GroupId, sender: SendRequest<Full<Bytes>>) {
        self.senders.insert(group, sender);
    }

    pub fn remove(&self, group: &GroupId) {
        self.senders.remove(group);
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    pub fn clear(&self) {
        self.senders.clear();
    }
}

impl std::fmt::Debug for H2Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("H2Pool")
            .field("connections", &self.senders.len())
            .finish()
    }
}
