//! TLS configuration for fingerprinted ClientHellos.

use boring::ssl::SslVersion;

pub mod options;

pub use self::options::{TlsOptions, TlsOptionsBuilder};

/// TLS protocol version bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TlsVersion(u16);

impl TlsVersion {
    pub const TLS_1_0: TlsVersion = TlsVersion(0x0301);
    pub const TLS_1_1: TlsVersion = TlsVersion(0x0302);
    pub const TLS_1_2: TlsVersion = TlsVersion(0x0303);
    pub const TLS_1_3: TlsVersion = TlsVersion(0x0304);

    /// Map a wire version number (as found in JA3) to a known version.
    pub fn from_wire(version: u16) -> Option<Self> {
        match version {
            0x0301..=0x0304 => Some(TlsVersion(version)),
            _ => None,
        }
    }

    pub fn wire(self) -> u16 {
        self.0
    }

    pub(crate) fn to_ssl(self) -> SslVersion {
        match self.0 {
            0x0301 => SslVersion::TLS1,
            0x0302 => SslVersion::TLS1_1,
            0x0303 => SslVersion::TLS1_2,
            _ => SslVersion::TLS1_3,
        }
    }
}

/// Application protocol identifier used in ALPN and ALPS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlpnProtocol(&'static str);

impl AlpnProtocol {
    pub const HTTP1: AlpnProtocol = AlpnProtocol("http/1.1");
    pub const HTTP2: AlpnProtocol = AlpnProtocol("h2");

    pub fn as_bytes(&self) -> &'static [u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Certificate compression algorithm advertised in the ClientHello.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CertCompression {
    Zlib,
    Brotli,
    Zstd,
}

/// Per RFC 6066, SNI must not be sent for literal IP addresses.
pub fn should_set_sni(host: &str) -> bool {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse::<std::net::IpAddr>()
        .is_err()
}
