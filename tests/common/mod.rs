//! In-memory client doubles shared by the integration tests.

#![allow(dead_code)]

use bytes::Bytes;
use futures::future::BoxFuture;
use http::{HeaderMap, HeaderValue, StatusCode};
use sessionnet::fingerprint::ClientProfile;
use sessionnet::http::{HeaderOrder, HttpResponse, ResponseBody};
use sessionnet::socket::proxy::ProxySettings;
use sessionnet::{
    ClientConstructor, ClientHandle, ClientOptions, HttpClient, NetError, WireRequest,
    WireResponse,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Client that answers every request locally.
///
/// The response echoes the request: body is the request body, `x-method`
/// and `x-uri` carry the request line, `x-header-order` the header order
/// extension. `Set-Cookie` headers are added from `cookies`.
#[derive(Debug)]
pub struct MockClient {
    pub profile: ClientProfile,
    pub options: ClientOptions,
    proxy: Mutex<String>,
    follow: AtomicBool,
    pub cookies: Vec<&'static str>,
    pub executed: AtomicUsize,
    pub fail_with: Option<NetError>,
}

impl MockClient {
    pub fn new(profile: ClientProfile, options: ClientOptions) -> Self {
        Self {
            profile,
            proxy: Mutex::new(options.proxy_url.clone().unwrap_or_default()),
            follow: AtomicBool::new(options.follow_redirects),
            options,
            cookies: vec!["a=1; Path=/", "b=2", "a=3"],
            executed: AtomicUsize::new(0),
            fail_with: None,
        }
    }
}

impl HttpClient for MockClient {
    fn profile(&self) -> &ClientProfile {
        &self.profile
    }

    fn timeout(&self) -> Duration {
        self.options.timeout
    }

    fn proxy(&self) -> String {
        self.proxy.lock().unwrap().clone()
    }

    fn set_proxy(&self, proxy_url: &str) -> Result<(), NetError> {
        if !proxy_url.is_empty() {
            ProxySettings::parse(proxy_url)?;
        }
        *self.proxy.lock().unwrap() = proxy_url.to_string();
        Ok(())
    }

    fn follow_redirects(&self) -> bool {
        self.follow.load(Ordering::SeqCst)
    }

    fn set_follow_redirects(&self, follow: bool) {
        self.follow.store(follow, Ordering::SeqCst);
    }

    fn execute(&self, request: WireRequest) -> BoxFuture<'_, Result<WireResponse, NetError>> {
        Box::pin(async move {
            self.executed.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.fail_with {
                return Err(err);
            }

            let mut headers = HeaderMap::new();
            headers.insert(
                "x-method",
                HeaderValue::from_str(request.method().as_str()).unwrap(),
            );
            headers.insert(
                "x-uri",
                HeaderValue::from_str(&request.uri().to_string()).unwrap(),
            );
            if let Some(order) = request.extensions().get::<HeaderOrder>() {
                headers.insert(
                    "x-header-order",
                    HeaderValue::from_str(&order.names().join(",")).unwrap(),
                );
            }
            for cookie in &self.cookies {
                headers.append(http::header::SET_COOKIE, HeaderValue::from_static(cookie));
            }

            let body: Bytes = request.into_body();
            Ok(HttpResponse::new(
                StatusCode::OK,
                headers,
                ResponseBody::from_bytes(body),
            ))
        })
    }
}

/// Constructor that counts calls and builds [`MockClient`]s.
#[derive(Debug, Default)]
pub struct CountingConstructor {
    pub constructed: AtomicUsize,
    pub delay: Option<Duration>,
    pub fail_with: Option<NetError>,
    pub client_fail_with: Option<NetError>,
}

impl CountingConstructor {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.constructed.load(Ordering::SeqCst)
    }
}

impl ClientConstructor for CountingConstructor {
    fn construct(
        &self,
        profile: ClientProfile,
        options: ClientOptions,
    ) -> Result<ClientHandle, NetError> {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.constructed.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_with {
            return Err(err);
        }
        let mut client = MockClient::new(profile, options);
        client.fail_with = self.client_fail_with;
        Ok(Arc::new(client))
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
