//! Base types and error handling.
//!
//! - [`NetError`](neterror::NetError): transport error codes, Chromium numbering
//! - [`TlsClientError`](clienterror::TlsClientError): the tagged error returned to callers

pub mod clienterror;
pub mod neterror;
