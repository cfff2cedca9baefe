//! Error model shared by the search core and its adapters.

use thiserror::Error;

/// Result type used across the search core.
pub type HubResult<T> = Result<T, HubError>;

/// Coarse classification of a [`HubError`], for callers that only branch on kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UpstreamUnavailable,
    Validation,
}

/// Core-level error.
///
/// An empty search is *not* an error: zero products after every tier is a valid
/// terminal state and is rendered as a "nothing found" message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HubError {
    /// ERP authentication or an RPC call failed (network, credentials, protocol, timeout).
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// A caller-supplied value failed validation.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl HubError {
    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::UpstreamUnavailable(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }

    /// The underlying message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::UpstreamUnavailable(msg) | Self::Validation(msg) => msg,
        }
    }
}
