//! Error types for text-to-image generation.

/// Errors that can occur while collecting parameters, generating or
/// presenting images.
#[derive(Debug, thiserror::Error)]
pub enum Text2ImageError {
    /// No Hugging Face token could be resolved from any source.
    #[error(
        "Missing Hugging Face token. Set HF_TOKEN in the secrets file \
         or HUGGINGFACEHUB_API_TOKEN as an environment variable."
    )]
    CredentialMissing,

    /// The remote inference call failed. The provider message is kept verbatim.
    #[error("Generation error: {0}")]
    RemoteCall(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Failed to re-encode a result for download.
    #[error("failed to encode image: {0}")]
    Encode(String),

    /// I/O error (e.g., saving a download).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Text2ImageError {
    /// Builds a remote-call failure from any displayable provider error.
    pub fn remote(err: impl std::fmt::Display) -> Self {
        Self::RemoteCall(err.to_string())
    }

    /// Returns true for the two errors that abort a generation action.
    pub fn is_generation_failure(&self) -> bool {
        matches!(self, Self::CredentialMissing | Self::RemoteCall(_))
    }

    /// Returns the provider message of a remote-call failure.
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Self::RemoteCall(message) => Some(message),
            _ => None,
        }
    }
}

/// Result type alias for text-to-image operations.
pub type Result<T> = std::result::Result<T, Text2ImageError>;
