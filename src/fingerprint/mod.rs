//! Client fingerprint profiles.
//!
//! A [`ClientProfile`] pairs a TLS handshake identity with an HTTP/2
//! fingerprint. Profiles come either from the [`BuiltinCatalog`] by name or
//! from a caller-supplied JA3 string plus HTTP/2 parameters.

pub mod catalog;
pub mod h2;
pub mod ja3;
mod profiles;
pub mod resolver;

pub use catalog::{BuiltinCatalog, ProfileCatalog};
pub use h2::{H2Fingerprint, PriorityFrame, SettingId, StreamDependency};
pub use ja3::{Ja3Error, Ja3Spec};
pub use profiles::DEFAULT_PROFILE;
pub use resolver::{resolve_profile, ProfileSource};

use crate::socket::tls::TlsOptions;

/// How the ClientHello is described.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelloSpec {
    /// Hand-tuned options of a built-in browser profile.
    Preset(TlsOptions),
    /// Parsed from a caller's JA3 string.
    Ja3(Ja3Spec),
}

/// Handshake identity: who the ClientHello claims to be, and how to build it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHelloId {
    pub client: String,
    pub version: String,
    pub spec: HelloSpec,
}

impl ClientHelloId {
    pub const CUSTOM_CLIENT: &'static str = "Custom";
    pub const CUSTOM_VERSION: &'static str = "1";

    pub fn preset(client: &str, version: &str, tls: TlsOptions) -> Self {
        Self {
            client: client.to_string(),
            version: version.to_string(),
            spec: HelloSpec::Preset(tls),
        }
    }

    pub fn custom(spec: Ja3Spec) -> Self {
        Self {
            client: Self::CUSTOM_CLIENT.to_string(),
            version: Self::CUSTOM_VERSION.to_string(),
            spec: HelloSpec::Ja3(spec),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self.spec, HelloSpec::Ja3(_))
    }

    /// BoringSSL options for this handshake.
    pub fn tls_options(&self) -> TlsOptions {
        match &self.spec {
            HelloSpec::Preset(opts) => opts.clone(),
            HelloSpec::Ja3(spec) => spec.to_tls_options(),
        }
    }
}

impl Default for ClientHelloId {
    fn default() -> Self {
        Self::preset("Golang", "0", TlsOptions::default())
    }
}

/// Immutable fingerprint descriptor a client is built from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientProfile {
    hello: ClientHelloId,
    h2: H2Fingerprint,
}

impl ClientProfile {
    pub fn new(hello: ClientHelloId, h2: H2Fingerprint) -> Self {
        Self { hello, h2 }
    }

    pub fn hello(&self) -> &ClientHelloId {
        &self.hello
    }

    pub fn h2(&self) -> &H2Fingerprint {
        &self.h2
    }

    /// `client_version` label used in logs.
    pub fn name(&self) -> String {
        format!("{}_{}", self.hello.client, self.hello.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_hello_tags() {
        let spec: Ja3Spec = "771,4865,,,".parse().unwrap();
        let hello = ClientHelloId::custom(spec);
        assert!(hello.is_custom());
        assert_eq!(hello.client, "Custom");
        assert_eq!(hello.version, "1");
    }

    #[test]
    fn test_profile_name() {
        let profile = BuiltinCatalog.default_profile();
        assert_eq!(profile.name(), "Chrome_124");
        assert!(!profile.hello().is_custom());
    }
}
