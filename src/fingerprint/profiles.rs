//! Built-in browser profiles.

use super::h2::{H2Fingerprint, SettingId, StreamDependency};
use super::{ClientHelloId, ClientProfile};
use crate::socket::tls::{AlpnProtocol, CertCompression, TlsOptions, TlsVersion};

const CHROME_CIPHERS: &str = "TLS_AES_128_GCM_SHA256:TLS_AES_256_GCM_SHA384:TLS_CHACHA20_POLY1305_SHA256:ECDHE-ECDSA-AES128-GCM-SHA256:ECDHE-RSA-AES128-GCM-SHA256:ECDHE-ECDSA-AES256-GCM-SHA384:ECDHE-RSA-AES256-GCM-SHA384:ECDHE-ECDSA-CHACHA20-POLY1305:ECDHE-RSA-CHACHA20-POLY1305:ECDHE-RSA-AES128-SHA:ECDHE-RSA-AES256-SHA:AES128-GCM-SHA256:AES256-GCM-SHA384:AES128-SHA:AES256-SHA";
const CHROME_CURVES: &str = "X25519:P-256:P-384";
const CHROME_SIGALGS: &str = "ecdsa_secp256r1_sha256:rsa_pss_rsae_sha256:rsa_pkcs1_sha256:ecdsa_secp384r1_sha384:rsa_pss_rsae_sha384:rsa_pkcs1_sha384:rsa_pss_rsae_sha512:rsa_pkcs1_sha512";

const FIREFOX_CIPHERS: &str = "TLS_AES_128_GCM_SHA256:TLS_CHACHA20_POLY1305_SHA256:TLS_AES_256_GCM_SHA384:ECDHE-ECDSA-AES128-GCM-SHA256:ECDHE-RSA-AES128-GCM-SHA256:ECDHE-ECDSA-CHACHA20-POLY1305:ECDHE-RSA-CHACHA20-POLY1305:ECDHE-ECDSA-AES256-GCM-SHA384:ECDHE-RSA-AES256-GCM-SHA384:ECDHE-ECDSA-AES256-SHA:ECDHE-ECDSA-AES128-SHA:ECDHE-RSA-AES128-SHA:ECDHE-RSA-AES256-SHA:AES128-GCM-SHA256:AES256-GCM-SHA384:AES128-SHA:AES256-SHA";
const FIREFOX_CURVES: &str = "X25519:P-256:P-384:P-521";
const FIREFOX_SIGALGS: &str = "ecdsa_secp256r1_sha256:ecdsa_secp384r1_sha384:ecdsa_secp521r1_sha512:rsa_pss_rsae_sha256:rsa_pss_rsae_sha384:rsa_pss_rsae_sha512:rsa_pkcs1_sha256:rsa_pkcs1_sha384:rsa_pkcs1_sha512:ecdsa_sha1:rsa_pkcs1_sha1";

const SAFARI_CIPHERS: &str = "TLS_AES_128_GCM_SHA256:TLS_AES_256_GCM_SHA384:TLS_CHACHA20_POLY1305_SHA256:ECDHE-ECDSA-AES256-GCM-SHA384:ECDHE-ECDSA-AES128-GCM-SHA256:ECDHE-ECDSA-CHACHA20-POLY1305:ECDHE-RSA-AES256-GCM-SHA384:ECDHE-RSA-AES128-GCM-SHA256:ECDHE-RSA-CHACHA20-POLY1305:ECDHE-ECDSA-AES256-SHA:ECDHE-ECDSA-AES128-SHA:ECDHE-RSA-AES256-SHA:ECDHE-RSA-AES128-SHA:AES256-GCM-SHA384:AES128-GCM-SHA256:AES256-SHA:AES128-SHA:DES-CBC3-SHA";
const SAFARI_CURVES: &str = "X25519:P-256:P-384:P-521";
const SAFARI_SIGALGS: &str = "ecdsa_secp256r1_sha256:rsa_pss_rsae_sha256:rsa_pkcs1_sha256:ecdsa_secp384r1_sha384:ecdsa_sha1:rsa_pss_rsae_sha384:rsa_pkcs1_sha384:rsa_pss_rsae_sha512:rsa_pkcs1_sha512:rsa_pkcs1_sha1";

const OKHTTP_CIPHERS: &str = "TLS_AES_128_GCM_SHA256:TLS_AES_256_GCM_SHA384:TLS_CHACHA20_POLY1305_SHA256:ECDHE-ECDSA-AES128-GCM-SHA256:ECDHE-RSA-AES128-GCM-SHA256:ECDHE-ECDSA-AES256-GCM-SHA384:ECDHE-RSA-AES256-GCM-SHA384:ECDHE-ECDSA-CHACHA20-POLY1305:ECDHE-RSA-CHACHA20-POLY1305:ECDHE-RSA-AES128-SHA:ECDHE-RSA-AES256-SHA:AES128-GCM-SHA256:AES256-GCM-SHA384:AES128-SHA:AES256-SHA";
const OKHTTP_CURVES: &str = "X25519:P-256:P-384";

fn chrome_tls() -> TlsOptions {
    TlsOptions::builder()
        .cipher_list(CHROME_CIPHERS)
        .curves_list(CHROME_CURVES)
        .sigalgs_list(CHROME_SIGALGS)
        .min_tls_version(TlsVersion::TLS_1_2)
        .max_tls_version(TlsVersion::TLS_1_3)
        .enable_ech_grease(true)
        .grease_enabled(true)
        .permute_extensions(true)
        .pre_shared_key(true)
        .enable_ocsp_stapling(true)
        .enable_signed_cert_timestamps(true)
        .alps_protocols([AlpnProtocol::HTTP2])
        .certificate_compression([CertCompression::Brotli])
        .build()
}

fn chrome_h2() -> H2Fingerprint {
    H2Fingerprint::builder()
        .setting(SettingId::HeaderTableSize, 65536)
        .setting(SettingId::EnablePush, 0)
        .setting(SettingId::InitialWindowSize, 6291456)
        .setting(SettingId::MaxHeaderListSize, 262144)
        .connection_flow(15663105)
        .pseudo_header_order([":method", ":authority", ":scheme", ":path"])
        .build()
}

/// Chrome before 120 still sent MAX_CONCURRENT_STREAMS and PRIORITY frames.
fn chrome_legacy_h2() -> H2Fingerprint {
    H2Fingerprint::builder()
        .setting(SettingId::HeaderTableSize, 65536)
        .setting(SettingId::EnablePush, 0)
        .setting(SettingId::MaxConcurrentStreams, 1000)
        .setting(SettingId::InitialWindowSize, 6291456)
        .setting(SettingId::MaxHeaderListSize, 262144)
        .connection_flow(15663105)
        .pseudo_header_order([":method", ":authority", ":scheme", ":path"])
        .priority(3, StreamDependency::new(0, 200, false))
        .priority(5, StreamDependency::new(0, 100, false))
        .priority(7, StreamDependency::new(0, 0, false))
        .priority(9, StreamDependency::new(7, 0, false))
        .priority(11, StreamDependency::new(3, 0, false))
        .build()
}

fn firefox_tls() -> TlsOptions {
    TlsOptions::builder()
        .cipher_list(FIREFOX_CIPHERS)
        .curves_list(FIREFOX_CURVES)
        .sigalgs_list(FIREFOX_SIGALGS)
        .min_tls_version(TlsVersion::TLS_1_2)
        .max_tls_version(TlsVersion::TLS_1_3)
        .enable_ech_grease(true)
        .pre_shared_key(true)
        .enable_ocsp_stapling(true)
        .certificate_compression([
            CertCompression::Zlib,
            CertCompression::Brotli,
            CertCompression::Zstd,
        ])
        .build()
}

fn firefox_h2() -> H2Fingerprint {
    H2Fingerprint::builder()
        .setting(SettingId::HeaderTableSize, 65536)
        .setting(SettingId::InitialWindowSize, 131072)
        .setting(SettingId::MaxFrameSize, 16384)
        .connection_flow(12517377)
        .pseudo_header_order([":method", ":path", ":authority", ":scheme"])
        .priority(3, StreamDependency::new(0, 200, false))
        .priority(5, StreamDependency::new(0, 100, false))
        .priority(7, StreamDependency::new(0, 0, false))
        .priority(9, StreamDependency::new(7, 0, false))
        .priority(11, StreamDependency::new(3, 0, false))
        .priority(13, StreamDependency::new(0, 240, false))
        .build()
}

fn safari_tls() -> TlsOptions {
    TlsOptions::builder()
        .cipher_list(SAFARI_CIPHERS)
        .curves_list(SAFARI_CURVES)
        .sigalgs_list(SAFARI_SIGALGS)
        .min_tls_version(TlsVersion::TLS_1_0)
        .max_tls_version(TlsVersion::TLS_1_3)
        .session_ticket(false)
        .grease_enabled(true)
        .enable_ocsp_stapling(true)
        .enable_signed_cert_timestamps(true)
        .certificate_compression([CertCompression::Zlib])
        .build()
}

fn safari_h2() -> H2Fingerprint {
    H2Fingerprint::builder()
        .setting(SettingId::InitialWindowSize, 4194304)
        .setting(SettingId::MaxConcurrentStreams, 100)
        .connection_flow(10485760)
        .pseudo_header_order([":method", ":scheme", ":path", ":authority"])
        .build()
}

fn okhttp_tls() -> TlsOptions {
    TlsOptions::builder()
        .cipher_list(OKHTTP_CIPHERS)
        .curves_list(OKHTTP_CURVES)
        .min_tls_version(TlsVersion::TLS_1_2)
        .max_tls_version(TlsVersion::TLS_1_3)
        .build()
}

fn okhttp_h2() -> H2Fingerprint {
    H2Fingerprint::builder()
        .setting(SettingId::HeaderTableSize, 4096)
        .setting(SettingId::InitialWindowSize, 16777216)
        .setting(SettingId::MaxConcurrentStreams, 1000)
        .connection_flow(16711681)
        .pseudo_header_order([":method", ":path", ":authority", ":scheme"])
        .build()
}

fn profile(client: &str, version: &str, tls: TlsOptions, h2: H2Fingerprint) -> ClientProfile {
    ClientProfile::new(ClientHelloId::preset(client, version, tls), h2)
}

/// Identifier used when a named profile is unknown.
pub const DEFAULT_PROFILE: &str = "chrome_124";

/// Every built-in identifier with its profile constructor.
pub(crate) const BUILTIN: &[(&str, fn() -> ClientProfile)] = &[
    ("chrome_103", || profile("Chrome", "103", chrome_tls(), chrome_legacy_h2())),
    ("chrome_110", || profile("Chrome", "110", chrome_tls(), chrome_legacy_h2())),
    ("chrome_117", || profile("Chrome", "117", chrome_tls(), chrome_legacy_h2())),
    ("chrome_120", || profile("Chrome", "120", chrome_tls(), chrome_h2())),
    ("chrome_124", || profile("Chrome", "124", chrome_tls(), chrome_h2())),
    ("chrome_131", || profile("Chrome", "131", chrome_tls(), chrome_h2())),
    ("firefox_117", || profile("Firefox", "117", firefox_tls(), firefox_h2())),
    ("firefox_120", || profile("Firefox", "120", firefox_tls(), firefox_h2())),
    ("firefox_128", || profile("Firefox", "128", firefox_tls(), firefox_h2())),
    ("safari_15_6_1", || profile("Safari", "15.6.1", safari_tls(), safari_h2())),
    ("safari_16_0", || profile("Safari", "16.0", safari_tls(), safari_h2())),
    ("safari_ios_17_0", || profile("iOS", "17.0", safari_tls(), safari_h2())),
    ("okhttp4_android_12", || profile("OkHttp4", "12", okhttp_tls(), okhttp_h2())),
    ("okhttp4_android_13", || profile("OkHttp4", "13", okhttp_tls(), okhttp_h2())),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_builtin_connector_builds() {
        for (name, make) in BUILTIN {
            let profile = make();
            assert!(
                profile.hello().tls_options().build_connector(false).is_ok(),
                "{name} connector failed"
            );
        }
    }

    #[test]
    fn test_default_is_listed() {
        assert!(BUILTIN.iter().any(|(name, _)| *name == DEFAULT_PROFILE));
    }

    #[test]
    fn test_pseudo_orders_differ_by_browser() {
        let chrome = chrome_h2();
        let firefox = firefox_h2();
        assert_eq!(chrome.pseudo_header_order[1], ":authority");
        assert_eq!(firefox.pseudo_header_order[1], ":path");
    }
}
