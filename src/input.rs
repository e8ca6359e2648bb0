//! Caller-facing request description.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A PRIORITY frame as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriorityFrameInput {
    pub stream_id: u32,
    pub priority_param: PriorityParamInput,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriorityParamInput {
    pub stream_dep: u32,
    pub exclusive: bool,
    pub weight: u8,
}

/// Caller-defined fingerprint: a JA3 handshake plus the HTTP/2 knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomTlsClient {
    pub ja3_string: String,
    pub h2_settings: BTreeMap<u16, u32>,
    pub h2_settings_order: Vec<u16>,
    pub pseudo_header_order: Vec<String>,
    pub connection_flow: u32,
    pub priority_frames: Vec<PriorityFrameInput>,
}

impl CustomTlsClient {
    pub fn new(ja3: impl Into<String>) -> Self {
        Self {
            ja3_string: ja3.into(),
            ..Default::default()
        }
    }
}

/// Everything needed to pick a session client and describe one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestInput {
    pub session_id: Option<String>,
    pub tls_client_identifier: Option<String>,
    pub custom_tls_client: Option<CustomTlsClient>,
    /// `Some("")` clears the proxy of an existing session.
    pub proxy_url: Option<String>,
    pub follow_redirects: bool,
    /// Zero or unset means the factory default.
    pub timeout_seconds: Option<u64>,
    pub insecure_skip_verify: bool,
    pub request_method: String,
    pub request_url: String,
    pub request_body: Option<String>,
    /// Keys are case-sensitive here. `Accept` and `accept` both reach the
    /// wire as separate values of one header.
    pub headers: BTreeMap<String, String>,
    pub header_order: Vec<String>,
}

impl RequestInput {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            request_method: method.into(),
            request_url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_session_id(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.tls_client_identifier = Some(identifier.into());
        self
    }

    pub fn with_custom_client(mut self, custom: CustomTlsClient) -> Self {
        self.custom_tls_client = Some(custom);
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy_url = Some(proxy.into());
        self
    }

    pub fn with_follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }

    pub fn with_timeout_seconds(mut self, secs: u64) -> Self {
        self.timeout_seconds = Some(secs);
        self
    }

    pub fn with_insecure_skip_verify(mut self, insecure: bool) -> Self {
        self.insecure_skip_verify = insecure;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.request_body = Some(body.into());
        self
    }

    /// Set a header and append its name to the header order.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.header_order.push(name.clone());
        self.headers.insert(name, value.into());
        self
    }

    pub fn with_header_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.header_order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Session id if one was supplied and is non-empty.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref().filter(|s| !s.is_empty())
    }
}
