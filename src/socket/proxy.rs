use crate::base::neterror::NetError;
use base64::{engine::general_purpose, Engine as _};
use url::Url;
use zeroize::Zeroizing;

/// Proxy protocol type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyType {
    /// HTTP proxy, tunnelled with CONNECT
    Http,
    /// SOCKS5 proxy
    Socks5,
}

/// A parsed proxy URL.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    raw: String,
    pub url: Url,
    pub username: Option<String>,
    /// Zeroized on drop
    pub password: Option<Zeroizing<String>>,
}

impl PartialEq for ProxySettings {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl ProxySettings {
    /// Parse `http://[user:pass@]host:port` or `socks5://...`.
    ///
    /// Malformed URLs give `InvalidUrl`; other schemes give `NoSupportedProxies`.
    pub fn parse(url_str: &str) -> Result<Self, NetError> {
        let url = Url::parse(url_str).map_err(|_| NetError::InvalidUrl)?;
        match url.scheme() {
            "http" | "socks5" | "socks5h" => {}
            _ => return Err(NetError::NoSupportedProxies),
        }
        if url.host_str().map_or(true, str::is_empty) {
            return Err(NetError::InvalidUrl);
        }

        let username = Some(url.username())
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        let password = url.password().map(|p| Zeroizing::new(p.to_string()));

        Ok(Self {
            raw: url_str.to_string(),
            url,
            username,
            password,
        })
    }

    /// The URL exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn proxy_type(&self) -> ProxyType {
        match self.url.scheme() {
            "socks5" | "socks5h" => ProxyType::Socks5,
            _ => ProxyType::Http,
        }
    }

    pub fn is_socks(&self) -> bool {
        matches!(self.proxy_type(), ProxyType::Socks5)
    }

    /// `Proxy-Authorization` header value for HTTP proxies.
    pub fn auth_header(&self) -> Option<String> {
        let user = self.username.as_ref()?;
        let pass = self.password.as_ref().map(|p| p.as_str()).unwrap_or("");
        let creds = Zeroizing::new(format!("{}:{}", user, pass));
        Some(format!(
            "Basic {}",
            general_purpose::STANDARD.encode(creds.as_bytes())
        ))
    }

    /// Username/password pair for SOCKS5 authentication.
    pub fn socks5_auth(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) => Some((u.as_str(), p.as_str())),
            (Some(u), None) => Some((u.as_str(), "")),
            _ => None,
        }
    }

    pub fn host_port(&self) -> Result<(&str, u16), NetError> {
        let host = self.url.host_str().ok_or(NetError::InvalidUrl)?;
        let port = self.url.port().unwrap_or(match self.proxy_type() {
            ProxyType::Http => 80,
            ProxyType::Socks5 => 1080,
        });
        Ok((host, port))
    }
}
