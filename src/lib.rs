//! # sessionnet
//!
//! Session-scoped HTTP clients with TLS and HTTP/2 fingerprint emulation.
//!
//! Callers name a session with an opaque id. The first call for an id builds
//! a client from a browser profile (by name, or from a JA3 string plus HTTP/2
//! parameters); later calls reuse it, applying proxy and redirect changes in
//! place. Requests and responses are translated from and to plain data so the
//! crate can sit behind a foreign-function or RPC boundary.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sessionnet::{RequestInput, SessionFactory};
//!
//! #[tokio::main]
//! async fn main() {
//!     let factory = SessionFactory::default();
//!     let input = RequestInput::new("GET", "https://example.com")
//!         .with_session_id("my-session")
//!         .with_identifier("chrome_124")
//!         .with_header("accept", "*/*");
//!     let response = factory.request(&input).await.unwrap();
//!     println!("Status: {}", response.status);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error types
//! - [`fingerprint`] - Browser profiles, JA3 parsing, HTTP/2 fingerprints
//! - [`session`] - Session registry and factory
//! - [`http`] - Request and response translation
//! - [`client`] - Client interface and the fingerprinting transport
//! - [`socket`] - Proxy tunnels and BoringSSL configuration

pub mod base;
pub mod client;
pub mod config;
pub mod fingerprint;
pub mod http;
pub mod input;
pub mod session;
pub mod socket;

pub use base::clienterror::{ErrorKind, TlsClientError, TlsClientResult};
pub use base::neterror::NetError;
pub use client::{ClientConstructor, ClientHandle, ClientOptions, HttpClient, WireResponse};
pub use config::FactoryConfig;
pub use fingerprint::{BuiltinCatalog, ClientHelloId, ClientProfile, ProfileCatalog};
pub use http::{build_request, build_response, Response, WireRequest};
pub use input::{CustomTlsClient, PriorityFrameInput, PriorityParamInput, RequestInput};
pub use session::{SessionFactory, SessionRegistry};
