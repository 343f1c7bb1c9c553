//! Error types for RPC provider operations.
//!
//! Two kinds of failure are kept strictly apart:
//!
//! - [`InitializerError`]: the provider itself could not be constructed, so no
//!   node can be reached through it.
//! - [`CallError`]: one call against a working provider failed.
//!
//! A [`CallError`] is tagged with a [`CallErrorKind`] and carries exactly one
//! root cause: either the node's structured [`RpcResponseError`] or a
//! [`CallFault`] describing what went wrong below the node.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

use super::endpoint::Endpoint;
use super::types::RpcResponseError;

/// Errors raised while constructing an RPC provider.
///
/// These are fatal to the provider instance; the caller must build a new one
/// with corrected settings.
#[derive(Debug, Error)]
pub enum InitializerError {
    /// The configured node URL could not be parsed.
    #[error("Invalid node URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The node URL parsed, but does not use HTTP or HTTPS.
    #[error("Unsupported node URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    /// The HTTP transport could not be built (e.g. TLS backend failure).
    #[error("Failed to build HTTP transport: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Classification of a failed call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallErrorKind {
    /// The HTTP exchange never completed: connection refused, DNS failure,
    /// timeout, or the body could not be read.
    Transport,
    /// The node answered with its documented error shape.
    Backend,
    /// The node answered with something that is neither the expected success
    /// shape nor the error shape.
    Unclassified,
}

impl fmt::Display for CallErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallErrorKind::Transport => write!(f, "transport"),
            CallErrorKind::Backend => write!(f, "backend"),
            CallErrorKind::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// Lower level cause of a transport or unclassified call failure.
#[derive(Debug, Error)]
pub enum CallFault {
    #[error("{}: {source}", describe_transport(.source))]
    Transport {
        #[source]
        source: reqwest_middleware::Error,
    },

    #[error("Could not build endpoint URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Malformed response body: {0}")]
    Body(#[source] serde_json::Error),

    #[error("Unexpected HTTP status {status}: {body}")]
    Status { status: StatusCode, body: String },
}

impl From<reqwest_middleware::Error> for CallFault {
    fn from(source: reqwest_middleware::Error) -> Self {
        CallFault::Transport { source }
    }
}

impl From<reqwest::Error> for CallFault {
    fn from(source: reqwest::Error) -> Self {
        CallFault::Transport {
            source: reqwest_middleware::Error::Reqwest(source),
        }
    }
}

impl CallFault {
    pub fn is_timeout(&self) -> bool {
        matches!(self, CallFault::Transport { source: reqwest_middleware::Error::Reqwest(e) } if e.is_timeout())
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, CallFault::Transport { source: reqwest_middleware::Error::Reqwest(e) } if e.is_connect())
    }
}

fn describe_transport(error: &reqwest_middleware::Error) -> &'static str {
    match error {
        reqwest_middleware::Error::Reqwest(e) if e.is_timeout() => "Request timed out",
        reqwest_middleware::Error::Reqwest(e) if e.is_connect() => "Connection refused or unreachable",
        reqwest_middleware::Error::Reqwest(e) if e.is_body() || e.is_decode() => "Failed to read response body",
        _ => "Transport failure",
    }
}

/// A single RPC call failed.
///
/// Constructed only through [`CallError::transport`], [`CallError::backend`]
/// and [`CallError::unclassified`], which guarantee that either
/// [`rpc_response_error`](CallError::rpc_response_error) or
/// [`source`](std::error::Error::source) is present, never both and never
/// neither.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CallError {
    kind: CallErrorKind,
    endpoint: Endpoint,
    message: String,
    rpc_response_error: Option<RpcResponseError>,
    #[source]
    source: Option<CallFault>,
}

impl CallError {
    pub(crate) fn transport(endpoint: Endpoint, fault: CallFault) -> Self {
        Self {
            kind: CallErrorKind::Transport,
            endpoint,
            message: format!("Error {}: {}", endpoint.action(), fault),
            rpc_response_error: None,
            source: Some(fault),
        }
    }

    pub(crate) fn backend(endpoint: Endpoint, rpc_response_error: RpcResponseError) -> Self {
        Self {
            kind: CallErrorKind::Backend,
            endpoint,
            message: format!("Error {}: {}", endpoint.action(), rpc_response_error),
            rpc_response_error: Some(rpc_response_error),
            source: None,
        }
    }

    pub(crate) fn unclassified(endpoint: Endpoint, fault: CallFault) -> Self {
        Self {
            kind: CallErrorKind::Unclassified,
            endpoint,
            message: format!("Error {}: unrecognized response: {}", endpoint.action(), fault),
            rpc_response_error: None,
            source: Some(fault),
        }
    }

    pub fn kind(&self) -> CallErrorKind {
        self.kind
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The node's structured error, present only for [`CallErrorKind::Backend`].
    pub fn rpc_response_error(&self) -> Option<&RpcResponseError> {
        self.rpc_response_error.as_ref()
    }

    /// The transport or parse fault, absent for [`CallErrorKind::Backend`].
    pub fn fault(&self) -> Option<&CallFault> {
        self.source.as_ref()
    }

    /// The node's error code (`error.code`), if the node reported one.
    pub fn node_error_code(&self) -> Option<i64> {
        self.rpc_response_error.as_ref().map(|e| e.error.code)
    }

    pub fn is_transport(&self) -> bool {
        self.kind == CallErrorKind::Transport
    }

    pub fn is_backend(&self) -> bool {
        self.kind == CallErrorKind::Backend
    }
}
