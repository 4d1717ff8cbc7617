// src/error.rs
use thiserror::Error;

/// Everything a resolution call can fail with. Nothing here is retried internally.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Missing/empty secret or unusable endpoint; raised before any network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid entry reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    /// The request never produced a response (connect, TLS, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// A response arrived but with a non-2xx status. Body is kept verbatim.
    #[error("remote request failed with HTTP {status}: {body}")]
    RemoteRequest { status: u16, body: String },

    #[error("no entry matched {reference} within the searched feed pages")]
    NotFound { reference: String },

    #[error("malformed feed document: {0}")]
    Parse(String),

    #[error("search exceeded its deadline of {secs}s")]
    DeadlineExceeded { secs: u64 },
}

impl ResolveError {
    pub fn invalid_reference(reference: &str, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            reference: reference.to_string(),
            reason: reason.into(),
        }
    }

    /// Process exit code used by the binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) => 2,
            Self::InvalidReference { .. } => 3,
            Self::NotFound { .. } => 4,
            Self::Transport(_)
            | Self::RemoteRequest { .. }
            | Self::Parse(_)
            | Self::DeadlineExceeded { .. } => 1,
        }
    }
}

impl From<quick_xml::DeError> for ResolveError {
    fn from(e: quick_xml::DeError) -> Self {
        Self::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ResolveError>;
