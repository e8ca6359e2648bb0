//! JA3 string parsing and translation into BoringSSL options.
//!
//! A JA3 string is `version,ciphers,extensions,groups,point_formats` where
//! every list is dash-separated decimal values. The last four lists may be
//! empty; the cipher list may not.

use crate::socket::tls::{AlpnProtocol, CertCompression, TlsOptions, TlsVersion};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error produced by a malformed JA3 string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Ja3Error {
    #[error("ja3 string has {0} fields, expected 5")]
    FieldCount(usize),
    #[error("invalid {field} value {value:?} in ja3 string")]
    InvalidValue { field: &'static str, value: String },
    #[error("unsupported tls version {0} in ja3 string")]
    UnsupportedVersion(u16),
    #[error("ja3 string lists no cipher suites")]
    NoCipherSuites,
}

/// TLS extension ids that change how the ClientHello is configured.
mod ext {
    pub const STATUS_REQUEST: u16 = 5;
    pub const ALPN: u16 = 16;
    pub const SIGNED_CERTIFICATE_TIMESTAMP: u16 = 18;
    pub const COMPRESS_CERTIFICATE: u16 = 27;
    pub const SESSION_TICKET: u16 = 35;
    pub const PRE_SHARED_KEY: u16 = 41;
    pub const SUPPORTED_VERSIONS: u16 = 43;
    pub const APPLICATION_SETTINGS: u16 = 17513;
    pub const ENCRYPTED_CLIENT_HELLO: u16 = 65037;
}

/// Parsed JA3 handshake description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ja3Spec {
    pub tls_version: u16,
    pub cipher_suites: Vec<u16>,
    pub extensions: Vec<u16>,
    pub supported_groups: Vec<u16>,
    pub point_formats: Vec<u8>,
}

/// RFC 8701 GREASE values have the form 0x?a?a with equal bytes.
pub fn is_grease(value: u16) -> bool {
    (value & 0x0f0f) == 0x0a0a && (value >> 8) == (value & 0xff)
}

fn parse_list<T: FromStr>(field: &'static str, raw: &str) -> Result<Vec<T>, Ja3Error> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split('-')
        .map(|item| {
            item.trim().parse::<T>().map_err(|_| Ja3Error::InvalidValue {
                field,
                value: item.to_string(),
            })
        })
        .collect()
}

impl FromStr for Ja3Spec {
    type Err = Ja3Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.trim().split(',').collect();
        if fields.len() != 5 {
            return Err(Ja3Error::FieldCount(fields.len()));
        }

        let tls_version =
            fields[0]
                .trim()
                .parse::<u16>()
                .map_err(|_| Ja3Error::InvalidValue {
                    field: "version",
                    value: fields[0].to_string(),
                })?;
        if TlsVersion::from_wire(tls_version).is_none() {
            return Err(Ja3Error::UnsupportedVersion(tls_version));
        }

        let cipher_suites = parse_list::<u16>("cipher", fields[1])?;
        if cipher_suites.is_empty() {
            return Err(Ja3Error::NoCipherSuites);
        }

        Ok(Self {
            tls_version,
            cipher_suites,
            extensions: parse_list("extension", fields[2])?,
            supported_groups: parse_list("group", fields[3])?,
            point_formats: parse_list("point format", fields[4])?,
        })
    }
}

impl fmt::Display for Ja3Spec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn join<T: ToString>(items: &[T]) -> String {
            items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("-")
        }
        write!(
            f,
            "{},{},{},{},{}",
            self.tls_version,
            join(&self.cipher_suites),
            join(&self.extensions),
            join(&self.supported_groups),
            join(&self.point_formats)
        )
    }
}

fn is_tls13_suite(id: u16) -> bool {
    matches!(id, 0x1301..=0x1303)
}

/// BoringSSL cipher name for an IANA cipher suite id.
fn cipher_name(id: u16) -> Option<&'static str> {
    Some(match id {
        0x1301 => "TLS_AES_128_GCM_SHA256",
        0x1302 => "TLS_AES_256_GCM_SHA384",
        0x1303 => "TLS_CHACHA20_POLY1305_SHA256",
        0xc02b => "ECDHE-ECDSA-AES128-GCM-SHA256",
        0xc02f => "ECDHE-RSA-AES128-GCM-SHA256",
        0xc02c => "ECDHE-ECDSA-AES256-GCM-SHA384",
        0xc030 => "ECDHE-RSA-AES256-GCM-SHA384",
        0xcca9 => "ECDHE-ECDSA-CHACHA20-POLY1305",
        0xcca8 => "ECDHE-RSA-CHACHA20-POLY1305",
        0xc009 => "ECDHE-ECDSA-AES128-SHA",
        0xc00a => "ECDHE-ECDSA-AES256-SHA",
        0xc013 => "ECDHE-RSA-AES128-SHA",
        0xc014 => "ECDHE-RSA-AES256-SHA",
        0x009c => "AES128-GCM-SHA256",
        0x009d => "AES256-GCM-SHA384",
        0x002f => "AES128-SHA",
        0x0035 => "AES256-SHA",
        0x000a => "DES-CBC3-SHA",
        _ => return None,
    })
}

/// BoringSSL group name for a named-group id.
fn group_name(id: u16) -> Option<&'static str> {
    Some(match id {
        29 => "X25519",
        23 => "P-256",
        24 => "P-384",
        25 => "P-521",
        25497 => "X25519Kyber768Draft00",
        _ => return None,
    })
}

impl Ja3Spec {
    /// Whether any GREASE placeholder appears in the handshake lists.
    pub fn uses_grease(&self) -> bool {
        self.cipher_suites
            .iter()
            .chain(&self.extensions)
            .chain(&self.supported_groups)
            .any(|v| is_grease(*v))
    }

    pub fn has_extension(&self, id: u16) -> bool {
        self.extensions.contains(&id)
    }

    /// Translate into ClientHello options. Ids BoringSSL cannot name are
    /// skipped; GREASE values switch GREASE on instead of being listed.
    pub fn to_tls_options(&self) -> TlsOptions {
        let mut builder = TlsOptions::builder();

        // BoringSSL always enables the TLS 1.3 suites and rejects a list
        // that names nothing else.
        let suites: Vec<u16> = self
            .cipher_suites
            .iter()
            .copied()
            .filter(|c| !is_grease(*c))
            .collect();
        if suites.iter().any(|c| !is_tls13_suite(*c)) {
            let ciphers: Vec<&str> = suites.iter().filter_map(|c| cipher_name(*c)).collect();
            builder = builder.cipher_list(&ciphers.join(":"));
        }

        let groups: Vec<&str> = self
            .supported_groups
            .iter()
            .filter(|g| !is_grease(**g))
            .filter_map(|g| group_name(*g))
            .collect();
        if !groups.is_empty() {
            builder = builder.curves_list(&groups.join(":"));
        }

        let version = TlsVersion::from_wire(self.tls_version).unwrap_or(TlsVersion::TLS_1_2);
        let (min, max) = if self.has_extension(ext::SUPPORTED_VERSIONS) {
            (version.min(TlsVersion::TLS_1_2), TlsVersion::TLS_1_3)
        } else {
            (version, version)
        };
        builder = builder.min_tls_version(min).max_tls_version(max);

        builder = if self.has_extension(ext::ALPN) {
            builder.alpn_protocols([AlpnProtocol::HTTP2, AlpnProtocol::HTTP1])
        } else {
            builder.alpn_protocols([])
        };

        if self.has_extension(ext::APPLICATION_SETTINGS) {
            builder = builder.alps_protocols([AlpnProtocol::HTTP2]);
        }
        if self.has_extension(ext::COMPRESS_CERTIFICATE) {
            builder = builder.certificate_compression([CertCompression::Brotli]);
        }

        builder
            .grease_enabled(self.uses_grease())
            .permute_extensions(false)
            .enable_ocsp_stapling(self.has_extension(ext::STATUS_REQUEST))
            .enable_signed_cert_timestamps(self.has_extension(ext::SIGNED_CERTIFICATE_TIMESTAMP))
            .session_ticket(self.has_extension(ext::SESSION_TICKET))
            .pre_shared_key(self.has_extension(ext::PRE_SHARED_KEY))
            .enable_ech_grease(self.has_extension(ext::ENCRYPTED_CLIENT_HELLO))
            .build()
    }
}
