use super::pool::{GroupId, H2Pool};
use super::{ClientConstructor, ClientHandle, ClientOptions, HttpClient, WireResponse};
use crate::base::neterror::NetError;
use crate::fingerprint::{ClientProfile, H2Fingerprint, SettingId};
use crate::http::{HeaderOrder, HttpResponse, WireRequest};
use crate::socket::connectjob::ConnectJob;
use crate::socket::proxy::ProxySettings;
use crate::socket::tls::AlpnProtocol;
use boring::ssl::SslConnector;
use bytes::Bytes;
use futures::future::BoxFuture;
use http::header::{
    AUTHORIZATION, CONNECTION, CONTENT_LENGTH, CONTENT_TYPE, COOKIE, HOST, LOCATION,
    TRANSFER_ENCODING, UPGRADE,
};
use http::{HeaderMap, HeaderValue, Method, Request, StatusCode, Uri, Version};
use http_body_util::Full;
use hyper::client::conn::{http1, http2};
use hyper_util::rt::{TokioExecutor, TokioIo};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace, warn};
use url::Url;

const MIN_FRAME_SIZE: u32 = 16_384;
const MAX_FRAME_SIZE: u32 = 16_777_215;
const MAX_WINDOW_SIZE: u32 = 0x7fff_ffff;
const DEFAULT_CONN_WINDOW: u32 = 65_535;

/// Client that connects with a profile's TLS and HTTP/2 fingerprint.
pub struct FingerprintClient {
    profile: ClientProfile,
    connector: SslConnector,
    timeout: Duration,
    max_redirects: usize,
    insecure_skip_verify: bool,
    proxy: RwLock<Option<ProxySettings>>,
    follow_redirects: AtomicBool,
    pool: H2Pool,
}

impl std::fmt::Debug for FingerprintClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FingerprintClient")
            .field("profile", &self.profile.name())
            .field("timeout", &self.timeout)
            .field("proxy", &self.proxy())
            .field("follow_redirects", &self.follow_redirects())
            .field("pool", &self.pool)
            .finish()
    }
}

impl FingerprintClient {
    pub fn new(profile: ClientProfile, options: ClientOptions) -> Result<Self, NetError> {
        let connector = profile
            .hello()
            .tls_options()
            .build_connector(options.insecure_skip_verify)?;
        let proxy = match options.proxy_url.as_deref() {
            Some(url) if !url.is_empty() => Some(ProxySettings::parse(url)?),
            _ => None,
        };
        Ok(Self {
            profile,
            connector,
            timeout: options.timeout,
            max_redirects: options.max_redirects,
            insecure_skip_verify: options.insecure_skip_verify,
            proxy: RwLock::new(proxy),
            follow_redirects: AtomicBool::new(options.follow_redirects),
            pool: H2Pool::new(),
        })
    }

    /// Number of pooled HTTP/2 connections.
    pub fn pooled_connections(&self) -> usize {
        self.pool.len()
    }

    fn current_proxy(&self) -> Option<ProxySettings> {
        self.proxy
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn execute_with_redirects(&self, mut request: WireRequest) -> Result<HttpResponse, NetError> {
        let follow = self.follow_redirects();
        let mut redirects = 0;
        loop {
            let response = self.send_once(&request).await?;
            if !follow || !response.status().is_redirection() {
                return Ok(response);
            }
            let Some(location) = response.headers().get(LOCATION).cloned() else {
                return Ok(response);
            };
            if redirects >= self.max_redirects {
                return Err(NetError::TooManyRedirects);
            }
            redirects += 1;

            let status = response.status();
            response.into_body().discard();
            request = redirect_request(request, status, &location)?;
            debug!(
                status = status.as_u16(),
                location = %request.uri(),
                redirects,
                "following redirect"
            );
        }
    }

    async fn send_once(&self, request: &WireRequest) -> Result<HttpResponse, NetError> {
        let url = Url::parse(&request.uri().to_string()).map_err(|_| NetError::InvalidUrl)?;
        match url.scheme() {
            "http" | "https" => {}
            _ => return Err(NetError::UnknownUrlScheme),
        }
        // Proxy and group come from one snapshot; a connect that finishes
        // after a proxy change lands in the old proxy's group.
        let proxy = self.current_proxy();
        let group = GroupId::new(&url, proxy.as_ref()).ok_or(NetError::InvalidUrl)?;

        if let Some(sender) = self.pool.get(&group) {
            trace!(?group, "reusing h2 connection");
            return self.send_h2(sender, &group, request).await;
        }

        let socket = ConnectJob::new(&self.connector, proxy.as_ref(), self.insecure_skip_verify)
            .connect(&url)
            .await?;

        if select_protocol(socket.negotiated_alpn())? == Version::HTTP_2 {
            let mut builder = http2::Builder::new(TokioExecutor::new());
            apply_h2_fingerprint(&mut builder, self.profile.h2());
            let (sender, conn) = builder
                .handshake::<_, Full<Bytes>>(TokioIo::new(socket))
                .await
                .map_err(|e| {
                    debug!(error = %e, "h2 handshake failed");
                    NetError::Http2ProtocolError
                })?;
            tokio::spawn(async move {
                if let Err(e) = conn.await {
                    debug!(error = %e, "h2 connection closed");
                }
            });
            self.pool.insert(group.clone(), sender.clone());
            self.send_h2(sender, &group, request).await
        } else {
            let (mut sender, conn) = http1::handshake::<_, Full<Bytes>>(TokioIo::new(socket))
                .await
                .map_err(|_| NetError::ConnectionFailed)?;
            tokio::spawn(async move {
                if let Err(e) = conn.await {
                    debug!(error = %e, "http/1.1 connection closed");
                }
            });
            sender.ready().await.map_err(|_| NetError::ConnectionClosed)?;
            let response = sender
                .send_request(h1_request(request)?)
                .await
                .map_err(map_hyper_error)?;
            Ok(HttpResponse::from_hyper(response))
        }
    }

    async fn send_h2(
        &self,
        mut sender: http2::SendRequest<Full<Bytes>>,
        group: &GroupId,
        request: &WireRequest,
    ) -> Result<HttpResponse, NetError> {
        if sender.ready().await.is_err() {
            self.pool.remove(group);
            return Err(NetError::ConnectionClosed);
        }
        match sender.send_request(h2_request(request)?).await {
            Ok(response) => Ok(HttpResponse::from_hyper(response)),
            Err(e) => {
                self.pool.remove(group);
                Err(map_hyper_error(e))
            }
        }
    }
}

impl HttpClient for FingerprintClient {
    fn profile(&self) -> &ClientProfile {
        &self.profile
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn proxy(&self) -> String {
        self.current_proxy()
            .map(|p| p.as_str().to_string())
            .unwrap_or_default()
    }

    fn set_proxy(&self, proxy_url: &str) -> Result<(), NetError> {
        let next = if proxy_url.is_empty() {
            None
        } else {
            Some(ProxySettings::parse(proxy_url)?)
        };
        let mut guard = self.proxy.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
        drop(guard);
        // Pooled connections were tunnelled through the previous proxy.
        self.pool.clear();
        debug!(has_proxy = !proxy_url.is_empty(), "proxy changed");
        Ok(())
    }

    fn follow_redirects(&self) -> bool {
        self.follow_redirects.load(Ordering::Acquire)
    }

    fn set_follow_redirects(&self, follow: bool) {
        self.follow_redirects.store(follow, Ordering::Release);
    }

    fn execute(&self, request: WireRequest) -> BoxFuture<'_, Result<WireResponse, NetError>> {
        Box::pin(async move {
            let deadline = Instant::now() + self.timeout;
            match tokio::time::timeout_at(deadline, self.execute_with_redirects(request)).await {
                Ok(result) => result.map(|response| response.with_body_deadline(deadline)),
                Err(_) => {
                    warn!(timeout = ?self.timeout, "request timed out");
                    Err(NetError::ConnectionTimedOut)
                }
            }
        })
    }
}

/// Builds [`FingerprintClient`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct FingerprintConstructor;

impl ClientConstructor for FingerprintConstructor {
    fn construct(
        &self,
        profile: ClientProfile,
        options: ClientOptions,
    ) -> Result<ClientHandle, NetError> {
        Ok(Arc::new(FingerprintClient::new(profile, options)?))
    }
}

/// HTTP version for the ALPN result. No ALPN means HTTP/1.1; a protocol
/// this client does not speak fails the connection.
fn select_protocol(alpn: Option<&[u8]>) -> Result<Version, NetError> {
    match alpn {
        None => Ok(Version::HTTP_11),
        Some(proto) if proto == AlpnProtocol::HTTP1.as_bytes() => Ok(Version::HTTP_11),
        Some(proto) if proto == AlpnProtocol::HTTP2.as_bytes() => Ok(Version::HTTP_2),
        Some(proto) => {
            debug!(alpn = %String::from_utf8_lossy(proto), "unexpected ALPN protocol");
            Err(NetError::AlpnNegotiationFailed)
        }
    }
}

/// Map the profile's SETTINGS and window sizes onto hyper's builder.
///
/// Values hyper would reject are skipped so the connection falls back to its
/// defaults. Settings order, pseudo-header order and PRIORITY frames are not
/// configurable through hyper and stay on the profile.
fn apply_h2_fingerprint(builder: &mut http2::Builder<TokioExecutor>, h2: &H2Fingerprint) {
    if let Some(size) = h2.setting(SettingId::InitialWindowSize) {
        if size <= MAX_WINDOW_SIZE {
            builder.initial_stream_window_size(size);
        }
    }
    if h2.connection_flow > 0 {
        let conn_window = h2
            .connection_flow
            .saturating_add(DEFAULT_CONN_WINDOW)
            .min(MAX_WINDOW_SIZE);
        builder.initial_connection_window_size(conn_window);
    }
    if let Some(size) = h2.setting(SettingId::MaxFrameSize) {
        if (MIN_FRAME_SIZE..=MAX_FRAME_SIZE).contains(&size) {
            builder.max_frame_size(size);
        }
    }
    if let Some(size) = h2.setting(SettingId::MaxHeaderListSize) {
        builder.max_header_list_size(size);
    }
}

fn ordered_headers(request: &WireRequest) -> HeaderMap {
    match request.extensions().get::<HeaderOrder>() {
        Some(order) if !order.is_empty() => order.apply(request.headers()),
        _ => request.headers().clone(),
    }
}

fn authority(uri: &Uri) -> Result<HeaderValue, NetError> {
    let authority = uri.authority().ok_or(NetError::InvalidUrl)?;
    HeaderValue::from_str(authority.as_str()).map_err(|_| NetError::InvalidUrl)
}

fn h1_request(request: &WireRequest) -> Result<Request<Full<Bytes>>, NetError> {
    let uri = request.uri();
    let path = uri
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or("/")
        .parse::<Uri>()
        .map_err(|_| NetError::InvalidUrl)?;

    let mut headers = ordered_headers(request);
    if !headers.contains_key(HOST) {
        let mut with_host = HeaderMap::with_capacity(headers.len() + 1);
        with_host.insert(HOST, authority(uri)?);
        with_host.extend(headers);
        headers = with_host;
    }

    let mut out = Request::new(Full::new(request.body().clone()));
    *out.method_mut() = request.method().clone();
    *out.uri_mut() = path;
    *out.version_mut() = Version::HTTP_11;
    *out.headers_mut() = headers;
    Ok(out)
}

fn h2_request(request: &WireRequest) -> Result<Request<Full<Bytes>>, NetError> {
    let mut headers = ordered_headers(request);
    for name in [
        HOST,
        CONNECTION,
        TRANSFER_ENCODING,
        UPGRADE,
        http::header::HeaderName::from_static("keep-alive"),
        http::header::HeaderName::from_static("proxy-connection"),
    ] {
        headers.remove(name);
    }

    let mut out = Request::new(Full::new(request.body().clone()));
    *out.method_mut() = request.method().clone();
    *out.uri_mut() = request.uri().clone();
    *out.version_mut() = Version::HTTP_2;
    *out.headers_mut() = headers;
    Ok(out)
}

fn map_hyper_error(e: hyper::Error) -> NetError {
    debug!(error = %e, "request failed");
    if e.is_timeout() {
        NetError::ConnectionTimedOut
    } else if e.is_parse() {
        NetError::InvalidResponse
    } else if e.is_incomplete_message() {
        NetError::EmptyResponse
    } else if e.is_closed() || e.is_canceled() {
        NetError::ConnectionClosed
    } else {
        NetError::ConnectionReset
    }
}

/// Rewrite `request` for the next hop of a redirect.
///
/// 303, and 301/302 after a POST, switch to GET without a body; 307 and 308
/// keep method and body. Credentials are dropped when the host changes.
pub(crate) fn redirect_request(
    mut request: WireRequest,
    status: StatusCode,
    location: &HeaderValue,
) -> Result<WireRequest, NetError> {
    let location = location.to_str().map_err(|_| NetError::InvalidRedirect)?;
    let current = Url::parse(&request.uri().to_string()).map_err(|_| NetError::InvalidUrl)?;
    let next = current.join(location).map_err(|_| NetError::InvalidRedirect)?;
    match next.scheme() {
        "http" | "https" => {}
        _ => return Err(NetError::InvalidRedirect),
    }

    let to_get = match status {
        StatusCode::SEE_OTHER => request.method() != Method::HEAD,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => request.method() == Method::POST,
        _ => false,
    };
    if to_get {
        *request.method_mut() = Method::GET;
        *request.body_mut() = Bytes::new();
        let headers = request.headers_mut();
        headers.remove(CONTENT_TYPE);
        headers.remove(CONTENT_LENGTH);
    }

    if current.host_str() != next.host_str() {
        let headers = request.headers_mut();
        headers.remove(AUTHORIZATION);
        headers.remove(COOKIE);
        headers.remove(HOST);
    }

    *request.uri_mut() = next
        .as_str()
        .parse::<Uri>()
        .map_err(|_| NetError::InvalidRedirect)?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::{BuiltinCatalog, ProfileCatalog};

    fn request(method: Method, uri: &str) -> WireRequest {
        let mut req = Request::new(Bytes::from_static(b"payload"));
        *req.method_mut() = method;
        *req.uri_mut() = uri.parse().unwrap();
        req.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        req.headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_static("Bearer x"));
        req
    }

    #[test]
    fn test_see_other_switches_to_get() {
        let req = request(Method::POST, "https://a.example/form");
        let next =
            redirect_request(req, StatusCode::SEE_OTHER, &HeaderValue::from_static("/done"))
                .unwrap();
        assert_eq!(next.method(), Method::GET);
        assert!(next.body().is_empty());
        assert!(next.headers().get(CONTENT_TYPE).is_none());
        assert_eq!(next.uri().to_string(), "https://a.example/done");
        assert!(next.headers().get(AUTHORIZATION).is_some());
    }

    #[test]
    fn test_temporary_redirect_keeps_method_and_body() {
        let req = request(Method::PUT, "https://a.example/x");
        let next = redirect_request(
            req,
            StatusCode::TEMPORARY_REDIRECT,
            &HeaderValue::from_static("https://a.example/y"),
        )
        .unwrap();
        assert_eq!(next.method(), Method::PUT);
        assert_eq!(next.body().as_ref(), b"payload");
    }

    #[test]
    fn test_cross_host_drops_credentials() {
        let req = request(Method::GET, "https://a.example/x");
        let next = redirect_request(
            req,
            StatusCode::FOUND,
            &HeaderValue::from_static("https://b.example/"),
        )
        .unwrap();
        assert!(next.headers().get(AUTHORIZATION).is_none());
        assert_eq!(next.method(), Method::GET);
    }

    #[test]
    fn test_non_http_redirect_rejected() {
        let req = request(Method::GET, "https://a.example/x");
        assert_eq!(
            redirect_request(
                req,
                StatusCode::FOUND,
                &HeaderValue::from_static("ftp://a.example/")
            )
            .unwrap_err(),
            NetError::InvalidRedirect
        );
    }

    #[test]
    fn test_h1_request_adds_host_first() {
        let mut req = request(Method::GET, "https://a.example:8443/p?q=1");
        req.extensions_mut()
            .insert(HeaderOrder::new(["authorization", "content-type"]));
        let out = h1_request(&req).unwrap();
        assert_eq!(out.uri().to_string(), "/p?q=1");
        let names: Vec<_> = out.headers().keys().map(|k| k.as_str()).collect();
        assert_eq!(names, vec!["host", "authorization", "content-type"]);
        assert_eq!(out.headers()[HOST], "a.example:8443");
    }

    #[test]
    fn test_h2_request_strips_connection_headers() {
        let mut req = request(Method::GET, "https://a.example/");
        req.headers_mut()
            .insert(CONNECTION, HeaderValue::from_static("keep-alive"));
        let out = h2_request(&req).unwrap();
        assert!(out.headers().get(CONNECTION).is_none());
        assert_eq!(out.version(), Version::HTTP_2);
        assert_eq!(out.uri().host(), Some("a.example"));
    }

    #[test]
    fn test_proxy_mutation() {
        let client =
            FingerprintClient::new(BuiltinCatalog.default_profile(), ClientOptions::default())
                .unwrap();
        assert_eq!(client.proxy(), "");
        client.set_proxy("http://127.0.0.1:8080").unwrap();
        assert_eq!(client.proxy(), "http://127.0.0.1:8080");
        assert_eq!(
            client.set_proxy("ftp://nope").unwrap_err(),
            NetError::NoSupportedProxies
        );
        assert_eq!(client.proxy(), "http://127.0.0.1:8080");
        client.set_proxy("").unwrap();
        assert_eq!(client.proxy(), "");
    }

    #[tokio::test]
    async fn test_connection_from_previous_proxy_not_reused() {
        let (client_end, _server_end) = tokio::io::duplex(65_536);
        let (sender, conn) = http2::Builder::new(TokioExecutor::new())
            .handshake::<_, Full<Bytes>>(TokioIo::new(client_end))
            .await
            .unwrap();
        tokio::spawn(conn);

        let client =
            FingerprintClient::new(BuiltinCatalog.default_profile(), ClientOptions::default())
                .unwrap();
        let url = Url::parse("https://a.example/").unwrap();
        client.set_proxy("http://127.0.0.1:8080").unwrap();
        let old_group = GroupId::new(&url, client.current_proxy().as_ref()).unwrap();
        client.pool.insert(old_group.clone(), sender.clone());
        assert!(client.pool.get(&old_group).is_some());

        client.set_proxy("http://127.0.0.1:8081").unwrap();
        // A connect that started under the first proxy finishes late.
        client.pool.insert(old_group, sender);
        let new_group = GroupId::new(&url, client.current_proxy().as_ref()).unwrap();
        assert!(client.pool.get(&new_group).is_none());
    }

    #[test]
    fn test_select_protocol() {
        assert_eq!(select_protocol(None).unwrap(), Version::HTTP_11);
        assert_eq!(select_protocol(Some(&b"http/1.1"[..])).unwrap(), Version::HTTP_11);
        assert_eq!(select_protocol(Some(&b"h2"[..])).unwrap(), Version::HTTP_2);
        assert_eq!(
            select_protocol(Some(&b"spdy/3"[..])).unwrap_err(),
            NetError::AlpnNegotiationFailed
        );
    }

    #[test]
    fn test_invalid_initial_proxy_fails_construction() {
        let options = ClientOptions {
            proxy_url: Some("::bad::".into()),
            ..Default::default()
        };
        assert_eq!(
            FingerprintClient::new(BuiltinCatalog.default_profile(), options).unwrap_err(),
            NetError::InvalidUrl
        );
    }

    #[tokio::test]
    async fn test_unknown_scheme_rejected() {
        let client =
            FingerprintClient::new(BuiltinCatalog.default_profile(), ClientOptions::default())
                .unwrap();
        let mut req = Request::new(Bytes::new());
        *req.uri_mut() = "ftp://example.com/".parse().unwrap();
        assert_eq!(
            client.execute(req).await.unwrap_err(),
            NetError::UnknownUrlScheme
        );
    }

    #[tokio::test]
    async fn test_http1_round_trip_against_local_server() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let _ = sock.read(&mut buf).await.unwrap();
            sock.write_all(
                b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\nSet-Cookie: a=1\r\n\r\nok",
            )
            .await
            .unwrap();
        });

        let client =
            FingerprintClient::new(BuiltinCatalog.default_profile(), ClientOptions::default())
                .unwrap();
        let mut req = Request::new(Bytes::new());
        *req.uri_mut() = format!("http://{}/", addr).parse().unwrap();
        let response = client.execute(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().bytes().await.unwrap();
        assert_eq!(body.as_ref(), b"ok");
    }
}
