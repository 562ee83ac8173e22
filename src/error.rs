//! Error types for the WaveCX SDK core.
//!
//! All errors are strongly typed using thiserror. Fetch failures never
//! reach the caller of `start_user_session`; they travel to the registered
//! listener inside a `ContentEvent::Error`, which is why every error here is
//! `Clone`.

use thiserror::Error;

/// Errors produced by a content source while fetching a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Transport failure or a non-success status without a dedicated meaning.
    #[error("Network error: {message}")]
    Network {
        message: String,
    },

    /// The content service does not know the organization.
    #[error("Organization code '{org_code}' was rejected")]
    InvalidOrg {
        org_code: String,
    },

    /// The content service refused the request (401/403).
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Malformed content response: {message}")]
    MalformedResponse {
        message: String,
    },

    /// The source itself broke (panicked or was torn down) before answering.
    #[error("Content source failed: {message}")]
    SourceFailed {
        message: String,
    },
}

/// Errors raised by operations that need a live user session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The command needs a session and none is active.
    #[error("No active user session")]
    NoActiveSession,
}

/// Errors raised while building an SDK instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `organization_code` is empty or whitespace.
    #[error("Organization code cannot be empty")]
    EmptyOrganizationCode,

    /// `api_base_url` cannot be used for requests.
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl {
        url: String,
        reason: String,
    },

    /// The JSON configuration could not be parsed.
    #[error("Invalid configuration document: {message}")]
    Malformed {
        message: String,
    },

    /// The owned fetch runtime could not be built.
    #[error("Failed to start fetch runtime: {message}")]
    Runtime {
        message: String,
    },
}

/// Coarse classification of a [`WaveCxError`], as reported to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Transport failure or unusable response.
    Network,
    /// The organization code was rejected by the content service.
    InvalidOrg,
    /// The content service refused the credentials.
    Unauthorized,
    /// An operation requiring a session was called without one.
    NoActiveSession,
    /// The SDK was configured incorrectly.
    Configuration,
    /// An internal channel or worker went away.
    Internal,
}

impl ErrorKind {
    /// Stable string form of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::InvalidOrg => "invalid_org",
            Self::Unauthorized => "unauthorized",
            Self::NoActiveSession => "no_active_session",
            Self::Configuration => "configuration",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level error type for the SDK.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WaveCxError {
    /// Catalog fetch failed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Command needed a session.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// SDK could not be configured.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An internal channel closed.
    #[error("Channel disconnected: {path}")]
    Disconnected {
        path: String,
    },

    /// A bounded wait expired.
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout {
        duration_ms: u64,
    },

    /// Unexpected internal failure.
    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl WaveCxError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns the classification of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Fetch(FetchError::Network { .. } | FetchError::MalformedResponse { .. }) => {
                ErrorKind::Network
            }
            Self::Fetch(FetchError::InvalidOrg { .. }) => ErrorKind::InvalidOrg,
            Self::Fetch(FetchError::Unauthorized { .. }) => ErrorKind::Unauthorized,
            Self::Fetch(FetchError::SourceFailed { .. }) => ErrorKind::Internal,
            Self::Session(SessionError::NoActiveSession) => ErrorKind::NoActiveSession,
            Self::Config(_) => ErrorKind::Configuration,
            Self::Timeout { .. } => ErrorKind::Network,
            Self::Disconnected { .. } | Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns true if this is a fetch error.
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }

    /// Returns true if this is a session error.
    #[must_use]
    pub const fn is_session(&self) -> bool {
        matches!(self, Self::Session(_))
    }

    /// Returns true if starting a new session could plausibly succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch(e) => matches!(e, FetchError::Network { .. }),
            Self::Timeout { .. } => true,
            Self::Session(_) | Self::Config(_) | Self::Disconnected { .. } | Self::Internal { .. } => false,
        }
    }
}

/// Result type alias for SDK operations.
pub type WaveCxResult<T> = Result<T, WaveCxError>;
