use thiserror::Error;

/// Transport-level error codes.
///
/// Values in the Chromium ranges keep their `net_error_list.h` codes; errors
/// specific to this crate live at -10000 and below.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum NetError {
    // Connection Errors
    #[error("Connection closed (TCP FIN)")]
    ConnectionClosed,
    #[error("Connection reset (TCP RST)")]
    ConnectionReset,
    #[error("Connection refused")]
    ConnectionRefused,
    #[error("Connection failed")]
    ConnectionFailed,
    #[error("Name not resolved")]
    NameNotResolved,
    #[error("SSL protocol error")]
    SslProtocolError,
    #[error("Tunnel connection failed")]
    TunnelConnectionFailed,
    #[error("Connection timed out")]
    ConnectionTimedOut,
    #[error("SOCKS connection failed")]
    SocksConnectionFailed,
    #[error("SOCKS connection host unreachable")]
    SocksConnectionHostUnreachable,
    #[error("ALPN negotiation failed")]
    AlpnNegotiationFailed,
    #[error("Proxy auth requested")]
    ProxyAuthRequested,
    #[error("Proxy connection failed")]
    ProxyConnectionFailed,

    // HTTP Errors
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Unknown URL scheme")]
    UnknownUrlScheme,
    #[error("Invalid redirect")]
    InvalidRedirect,
    #[error("Too many redirects")]
    TooManyRedirects,
    #[error("Invalid response")]
    InvalidResponse,
    #[error("Empty response")]
    EmptyResponse,
    #[error("No supported proxies")]
    NoSupportedProxies,
    #[error("HTTP/2 protocol error")]
    Http2ProtocolError,

    // Crate-specific
    #[error("HTTP body error")]
    HttpBodyError,

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::ConnectionClosed => -100,
            NetError::ConnectionReset => -101,
            NetError::ConnectionRefused => -102,
            NetError::ConnectionFailed => -104,
            NetError::NameNotResolved => -105,
            NetError::SslProtocolError => -107,
            NetError::TunnelConnectionFailed => -111,
            NetError::ConnectionTimedOut => -118,
            NetError::SocksConnectionFailed => -120,
            NetError::SocksConnectionHostUnreachable => -121,
            NetError::AlpnNegotiationFailed => -122,
            NetError::ProxyAuthRequested => -127,
            NetError::ProxyConnectionFailed => -130,

            NetError::InvalidUrl => -300,
            NetError::UnknownUrlScheme => -302,
            NetError::InvalidRedirect => -303,
            NetError::TooManyRedirects => -310,
            NetError::InvalidResponse => -320,
            NetError::EmptyResponse => -324,
            NetError::NoSupportedProxies => -336,
            NetError::Http2ProtocolError => -337,

            NetError::HttpBodyError => -10001,
            NetError::Unknown(code) => *code,
        }
    }

    /// Whether the error happened while talking to a proxy.
    pub fn is_proxy_error(&self) -> bool {
        matches!(
            self,
            NetError::TunnelConnectionFailed
                | NetError::SocksConnectionFailed
                | NetError::SocksConnectionHostUnreachable
                | NetError::ProxyAuthRequested
                | NetError::ProxyConnectionFailed
                | NetError::NoSupportedProxies
        )
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -100 => NetError::ConnectionClosed,
            -101 => NetError::ConnectionReset,
            -102 => NetError::ConnectionRefused,
            -104 => NetError::ConnectionFailed,
            -105 => NetError::NameNotResolved,
            -107 => NetError::SslProtocolError,
            -111 => NetError::TunnelConnectionFailed,
            -118 => NetError::ConnectionTimedOut,
            -120 => NetError::SocksConnectionFailed,
            -121 => NetError::SocksConnectionHostUnreachable,
            -122 => NetError::AlpnNegotiationFailed,
            -127 => NetError::ProxyAuthRequested,
            -130 => NetError::ProxyConnectionFailed,

            -300 => NetError::InvalidUrl,
            -302 => NetError::UnknownUrlScheme,
            -303 => NetError::InvalidRedirect,
            -310 => NetError::TooManyRedirects,
            -320 => NetError::InvalidResponse,
            -324 => NetError::EmptyResponse,
            -336 => NetError::NoSupportedProxies,
            -337 => NetError::Http2ProtocolError,

            -10001 => NetError::HttpBodyError,
            _ => NetError::Unknown(code),
        }
    }
}
