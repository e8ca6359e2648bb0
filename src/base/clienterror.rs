//! The single error type surfaced to callers of the factory.

use crate::base::neterror::NetError;
use std::fmt;
use thiserror::Error;

/// Boxed error used for body and I/O failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type TlsClientResult<T> = Result<T, TlsClientError>;

/// Which stage of the pipeline produced a [`TlsClientError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad or conflicting input, reported before anything is touched.
    Validation,
    /// A profile or client could not be built from the supplied data.
    Construction,
    /// A live client rejected a proxy change.
    Modification,
    /// The response body could not be drained.
    Io,
    /// The client failed to execute a request.
    Transport,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Construction => "construction",
            ErrorKind::Modification => "modification",
            ErrorKind::Io => "io",
            ErrorKind::Transport => "transport",
        };
        f.write_str(name)
    }
}

/// Factory error. `Display` is the human-readable message, which already
/// embeds the underlying cause.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct TlsClientError {
    kind: ErrorKind,
    message: String,
    session_id: Option<String>,
    #[source]
    source: Option<BoxError>,
}

impl TlsClientError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            session_id: None,
            source: None,
        }
    }

    /// Wrap `cause`, appending its message after `context`.
    pub fn with_cause<E>(kind: ErrorKind, context: &str, cause: E) -> Self
    where
        E: Into<BoxError>,
    {
        let cause = cause.into();
        Self {
            kind,
            message: format!("{}: {}", context, cause),
            session_id: None,
            source: Some(cause),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn construction<E: Into<BoxError>>(context: &str, cause: E) -> Self {
        Self::with_cause(ErrorKind::Construction, context, cause)
    }

    pub fn modification(context: &str, cause: NetError) -> Self {
        Self::with_cause(ErrorKind::Modification, context, cause)
    }

    pub fn io<E: Into<BoxError>>(context: &str, cause: E) -> Self {
        Self::with_cause(ErrorKind::Io, context, cause)
    }

    pub fn transport(context: &str, cause: NetError) -> Self {
        Self::with_cause(ErrorKind::Transport, context, cause)
    }

    /// Attach the session id the failing call was bound to.
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Session id of the call that failed, when one had been assigned.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// The transport error underneath, if this wraps one.
    pub fn net_error(&self) -> Option<NetError> {
        self.source
            .as_ref()
            .and_then(|e| e.downcast_ref::<NetError>())
            .copied()
    }
}
