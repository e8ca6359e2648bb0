use crate::base::neterror::NetError;
use crate::socket::proxy::{ProxySettings, ProxyType};
use crate::socket::stream::SocketType;
use crate::socket::tls::should_set_sni;
use boring::ssl::SslConnector;
use std::net::{IpAddr, SocketAddr};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::{debug, trace};
use url::Url;

const MAX_TUNNEL_RESPONSE: usize = 8192;

/// Manages the connection process: DNS -> TCP -> proxy tunnel -> SSL.
/// Roughly equivalent to net::ConnectJob.
pub struct ConnectJob<'a> {
    connector: &'a SslConnector,
    proxy: Option<&'a ProxySettings>,
    insecure_skip_verify: bool,
}

impl<'a> ConnectJob<'a> {
    pub fn new(
        connector: &'a SslConnector,
        proxy: Option<&'a ProxySettings>,
        insecure_skip_verify: bool,
    ) -> Self {
        Self {
            connector,
            proxy,
            insecure_skip_verify,
        }
    }

    pub async fn connect(&self, url: &Url) -> Result<SocketType, NetError> {
        let target_host = url.host_str().ok_or(NetError::InvalidUrl)?;
        let target_port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;

        let mut stream = match self.proxy {
            Some(proxy) => {
                let (host, port) = proxy.host_port()?;
                let mut stream = tcp_connect(host, port).await.map_err(|e| match e {
                    NetError::NameNotResolved => e,
                    _ => NetError::ProxyConnectionFailed,
                })?;
                match proxy.proxy_type() {
                    ProxyType::Http => {
                        http_connect(&mut stream, proxy, target_host, target_port).await?
                    }
                    ProxyType::Socks5 => {
                        socks5_connect(&mut stream, proxy, target_host, target_port).await?
                    }
                }
                debug!(proxy = host, target = target_host, "proxy tunnel established");
                stream
            }
            None => tcp_connect(target_host, target_port).await?,
        };

        if url.scheme() != "https" {
            return Ok(SocketType::Tcp(stream));
        }

        let mut config = self
            .connector
            .configure()
            .map_err(|_| NetError::SslProtocolError)?;
        let host = target_host.trim_start_matches('[').trim_end_matches(']');
        config.set_use_server_name_indication(should_set_sni(host));
        if self.insecure_skip_verify {
            config.set_verify_hostname(false);
        }

        let _ = stream.set_nodelay(true);
        let tls = tokio_boring::connect(config, host, stream)
            .await
            .map_err(|e| {
                debug!(host, error = %e, "TLS handshake failed");
                NetError::SslProtocolError
            })?;
        let socket = SocketType::Ssl(tls);
        trace!(
            host,
            alpn = ?socket.negotiated_alpn().map(String::from_utf8_lossy),
            "TLS handshake complete"
        );
        Ok(socket)
    }
}

async fn tcp_connect(host: &str, port: u16) -> Result<TcpStream, NetError> {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    let addrs: Vec<SocketAddr> = match host.parse::<IpAddr>() {
        Ok(ip) => vec![SocketAddr::new(ip, port)],
        Err(_) => tokio::net::lookup_host((host, port))
            .await
            .map_err(|_| NetError::NameNotResolved)?
            .collect(),
    };
    if addrs.is_empty() {
        return Err(NetError::NameNotResolved);
    }

    let mut last = NetError::ConnectionFailed;
    for addr in addrs {
        match TcpStream::connect(addr).await {
            Ok(s) => {
                trace!(%addr, "tcp connected");
                return Ok(s);
            }
            Err(e) => {
                last = match e.kind() {
                    std::io::ErrorKind::ConnectionRefused => NetError::ConnectionRefused,
                    std::io::ErrorKind::TimedOut => NetError::ConnectionTimedOut,
                    _ => NetError::ConnectionFailed,
                };
            }
        }
    }
    Err(last)
}

/// Establish an HTTP CONNECT tunnel to `host:port` through `proxy`.
pub(crate) async fn http_connect<S>(
    stream: &mut S,
    proxy: &ProxySettings,
    host: &str,
    port: u16,
) -> Result<(), NetError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let target = format!("{}:{}", host, port);
    let mut request = format!("CONNECT {} HTTP/1.1\r\nHost: {}\r\n", target, target);
    if let Some(auth) = proxy.auth_header() {
        request.push_str(&format!("Proxy-Authorization: {}\r\n", auth));
    }
    request.push_str("\r\n");

    stream
        .write_all(request.as_bytes())
        .await
        .map_err(|_| NetError::TunnelConnectionFailed)?;

    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        if buf.len() > MAX_TUNNEL_RESPONSE {
            return Err(NetError::TunnelConnectionFailed);
        }
        let n = stream
            .read(&mut chunk)
            .await
            .map_err(|_| NetError::TunnelConnectionFailed)?;
        if n == 0 {
            return Err(NetError::TunnelConnectionFailed);
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let head = String::from_utf8_lossy(&buf);
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|code| code.parse::<u16>().ok());
    match status {
        Some(200..=299) => Ok(()),
        Some(407) => Err(NetError::ProxyAuthRequested),
        _ => {
            debug!(status = ?status, "proxy refused CONNECT");
            Err(NetError::TunnelConnectionFailed)
        }
    }
}

/// RFC 1928 handshake with optional RFC 1929 username/password auth.
pub(crate) async fn socks5_connect<S>(
    stream: &mut S,
    proxy: &ProxySettings,
    host: &str,
    port: u16,
) -> Result<(), NetError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let io = |_| NetError::SocksConnectionFailed;
    let auth = proxy.socks5_auth();

    let greeting: &[u8] = if auth.is_some() {
        &[0x05, 0x02, 0x00, 0x02]
    } else {
        &[0x05, 0x01, 0x00]
    };
    stream.write_all(greeting).await.map_err(io)?;

    let mut choice = [0u8; 2];
    stream.read_exact(&mut choice).await.map_err(io)?;
    if choice[0] != 0x05 {
        return Err(NetError::SocksConnectionFailed);
    }
    match (choice[1], auth) {
        (0x00, _) => {}
        (0x02, Some((user, pass))) => {
            if user.len() > 255 || pass.len() > 255 {
                return Err(NetError::SocksConnectionFailed);
            }
            let mut msg = Vec::with_capacity(3 + user.len() + pass.len());
            msg.push(0x01);
            msg.push(user.len() as u8);
            msg.extend_from_slice(user.as_bytes());
            msg.push(pass.len() as u8);
            msg.extend_from_slice(pass.as_bytes());
            stream.write_all(&msg).await.map_err(io)?;

            let mut status = [0u8; 2];
            stream.read_exact(&mut status).await.map_err(io)?;
            if status[1] != 0x00 {
                return Err(NetError::ProxyAuthRequested);
            }
        }
        (0x02, None) => return Err(NetError::ProxyAuthRequested),
        _ => return Err(NetError::SocksConnectionFailed),
    }

    let mut req = vec![0x05, 0x01, 0x00];
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => {
            req.push(0x01);
            req.extend_from_slice(&ip.octets());
        }
        Ok(IpAddr::V6(ip)) => {
            req.push(0x04);
            req.extend_from_slice(&ip.octets());
        }
        Err(_) => {
            if host.len() > 255 {
                return Err(NetError::InvalidUrl);
            }
            req.push(0x03);
            req.push(host.len() as u8);
            req.extend_from_slice(host.as_bytes());
        }
    }
    req.extend_from_slice(&port.to_be_bytes());
    stream.write_all(&req).await.map_err(io)?;

    let mut reply = [0u8; 4];
    stream.read_exact(&mut reply).await.map_err(io)?;
    match reply[1] {
        0x00 => {}
        0x03 | 0x04 => return Err(NetError::SocksConnectionHostUnreachable),
        _ => return Err(NetError::SocksConnectionFailed),
    }

    let addr_len = match reply[3] {
        0x01 => 4,
        0x04 => 16,
        0x03 => {
            let mut len = [0u8; 1];
            stream.read_exact(&mut len).await.map_err(io)?;
            len[0] as usize
        }
        _ => return Err(NetError::SocksConnectionFailed),
    };
    let mut bound = vec![0u8; addr_len + 2];
    stream.read_exact(&mut bound).await.map_err(io)?;
    Ok(())
}
