use super::{AlpnProtocol, CertCompression, TlsVersion};
use crate::base::neterror::NetError;
use boring::ssl::{SslConnector, SslConnectorBuilder, SslMethod, SslOptions, SslVerifyMode};

/// Builder for `TlsOptions`.
#[must_use]
#[derive(Debug, Clone)]
pub struct TlsOptionsBuilder {
    config: TlsOptions,
}

/// ClientHello configuration handed to BoringSSL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsOptions {
    /// ALPN protocols, in preference order.
    pub alpn_protocols: Vec<AlpnProtocol>,

    /// Minimum TLS version.
    pub min_tls_version: Option<TlsVersion>,

    /// Maximum TLS version.
    pub max_tls_version: Option<TlsVersion>,

    /// Offer session tickets.
    pub session_ticket: bool,

    /// Cipher suite configuration string.
    pub cipher_list: Option<String>,

    /// Supported curves list.
    pub curves_list: Option<String>,

    /// Supported signature algorithms.
    pub sigalgs_list: Option<String>,

    /// Enable OCSP stapling.
    pub enable_ocsp_stapling: bool,

    /// Enable Signed Certificate Timestamps (SCT).
    pub enable_signed_cert_timestamps: bool,

    /// Enable GREASE.
    pub grease_enabled: Option<bool>,

    /// Permute extensions.
    pub permute_extensions: Option<bool>,

    /// Enable ECH GREASE.
    pub enable_ech_grease: bool,

    /// Pre-shared key (PSK).
    pub pre_shared_key: bool,

    /// ALPS protocols.
    pub alps_protocols: Vec<AlpnProtocol>,

    /// Certificate compression algorithms.
    pub certificate_compression: Vec<CertCompression>,
}

impl Default for TlsOptions {
    fn default() -> Self {
        Self {
            alpn_protocols: vec![AlpnProtocol::HTTP2, AlpnProtocol::HTTP1],
            min_tls_version: Some(TlsVersion::TLS_1_2),
            max_tls_version: Some(TlsVersion::TLS_1_3),
            session_ticket: true,
            cipher_list: None,
            curves_list: None,
            sigalgs_list: None,
            enable_ocsp_stapling: false,
            enable_signed_cert_timestamps: false,
            grease_enabled: None,
            permute_extensions: None,
            enable_ech_grease: false,
            pre_shared_key: false,
            alps_protocols: Vec::new(),
            certificate_compression: Vec::new(),
        }
    }
}

impl Default for TlsOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TlsOptionsBuilder {
    pub fn new() -> Self {
        Self {
            config: TlsOptions::default(),
        }
    }

    pub fn alpn_protocols<I>(mut self, alpn: I) -> Self
    where
        I: IntoIterator<Item = AlpnProtocol>,
    {
        self.config.alpn_protocols = alpn.into_iter().collect();
        self
    }

    pub fn min_tls_version(mut self, version: TlsVersion) -> Self {
        self.config.min_tls_version = Some(version);
        self
    }

    pub fn max_tls_version(mut self, version: TlsVersion) -> Self {
        self.config.max_tls_version = Some(version);
        self
    }

    pub fn session_ticket(mut self, enabled: bool) -> Self {
        self.config.session_ticket = enabled;
        self
    }

    pub fn cipher_list(mut self, ciphers: &str) -> Self {
        self.config.cipher_list = Some(ciphers.to_string());
        self
    }

    pub fn curves_list(mut self, curves: &str) -> Self {
        self.config.curves_list = Some(curves.to_string());
        self
    }

    pub fn sigalgs_list(mut self, sigalgs: &str) -> Self {
        self.config.sigalgs_list = Some(sigalgs.to_string());
        self
    }

    pub fn grease_enabled(mut self, enabled: bool) -> Self {
        self.config.grease_enabled = Some(enabled);
        self
    }

    pub fn enable_ocsp_stapling(mut self, enabled: bool) -> Self {
        self.config.enable_ocsp_stapling = enabled;
        self
    }

    pub fn enable_signed_cert_timestamps(mut self, enabled: bool) -> Self {
        self.config.enable_signed_cert_timestamps = enabled;
        self
    }

    pub fn permute_extensions(mut self, permute: bool) -> Self {
        self.config.permute_extensions = Some(permute);
        self
    }

    pub fn enable_ech_grease(mut self, enabled: bool) -> Self {
        self.config.enable_ech_grease = enabled;
        self
    }

    pub fn pre_shared_key(mut self, enabled: bool) -> Self {
        self.config.pre_shared_key = enabled;
        self
    }

    pub fn alps_protocols<I>(mut self, alps: I) -> Self
    where
        I: IntoIterator<Item = AlpnProtocol>,
    {
        self.config.alps_protocols = alps.into_iter().collect();
        self
    }

    pub fn certificate_compression<I>(mut self, algs: I) -> Self
    where
        I: IntoIterator<Item = CertCompression>,
    {
        self.config.certificate_compression = algs.into_iter().collect();
        self
    }

    pub fn build(self) -> TlsOptions {
        self.config
    }
}

impl TlsOptions {
    pub fn builder() -> TlsOptionsBuilder {
        TlsOptionsBuilder::new()
    }

    /// ALPN protocols in wire format (length-prefixed, concatenated).
    pub fn alpn_wire(&self) -> Result<Vec<u8>, NetError> {
        let mut wire = Vec::new();
        for proto in &self.alpn_protocols {
            let bytes = proto.as_bytes();
            if bytes.is_empty() || bytes.len() > 255 {
                return Err(NetError::SslProtocolError);
            }
            wire.push(bytes.len() as u8);
            wire.extend_from_slice(bytes);
        }
        Ok(wire)
    }

    /// Build a connector carrying this ClientHello configuration.
    pub fn build_connector(&self, insecure_skip_verify: bool) -> Result<SslConnector, NetError> {
        let mut builder =
            SslConnector::builder(SslMethod::tls()).map_err(|_| NetError::SslProtocolError)?;
        self.apply_to_builder(&mut builder)?;
        if insecure_skip_verify {
            builder.set_verify(SslVerifyMode::NONE);
        }
        Ok(builder.build())
    }

    /// Apply this configuration to an SSL connector builder.
    pub fn apply_to_builder(&self, builder: &mut SslConnectorBuilder) -> Result<(), NetError> {
        if let Some(min) = self.min_tls_version {
            builder
                .set_min_proto_version(Some(min.to_ssl()))
                .map_err(|_| NetError::SslProtocolError)?;
        }
        if let Some(max) = self.max_tls_version {
            builder
                .set_max_proto_version(Some(max.to_ssl()))
                .map_err(|_| NetError::SslProtocolError)?;
        }

        if let Some(ciphers) = &self.cipher_list {
            builder
                .set_cipher_list(ciphers)
                .map_err(|_| NetError::SslProtocolError)?;
        }

        if !self.alpn_protocols.is_empty() {
            let wire = self.alpn_wire()?;
            builder
                .set_alpn_protos(&wire)
                .map_err(|_| NetError::SslProtocolError)?;
        }

        if let Some(sigalgs) = &self.sigalgs_list {
            builder
                .set_sigalgs_list(sigalgs)
                .map_err(|_| NetError::SslProtocolError)?;
        }

        if let Some(curves) = &self.curves_list {
            builder
                .set_curves_list(curves)
                .map_err(|_| NetError::SslProtocolError)?;
        }

        if !self.session_ticket {
            builder.set_options(SslOptions::NO_TICKET);
        }

        if let Some(grease) = self.grease_enabled {
            builder.set_grease_enabled(grease);
        }

        if let Some(permute) = self.permute_extensions {
            builder.set_permute_extensions(permute);
        }

        if self.enable_ocsp_stapling {
            builder.enable_ocsp_stapling();
        }

        if self.enable_signed_cert_timestamps {
            builder.enable_signed_cert_timestamps();
        }

        builder.set_verify(SslVerifyMode::PEER);

        // ECH GREASE, PSK, ALPS and certificate compression stay descriptive:
        // the safe boring API needs per-connection hooks or compressor
        // implementations for them.

        Ok(())
    }
}
