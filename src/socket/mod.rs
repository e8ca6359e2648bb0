//! Socket and connection management.
//!
//! - [`connectjob`]: DNS → TCP → proxy tunnel → TLS connection flow
//! - [`proxy`]: HTTP CONNECT and SOCKS5 proxy settings
//! - [`stream`]: the connected socket handed to hyper
//! - [`tls`]: ClientHello configuration with BoringSSL

pub mod connectjob;
pub mod proxy;
pub mod stream;
pub mod tls;
