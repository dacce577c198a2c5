use thiserror::Error;

/// Errors raised while loading or validating configuration at startup.
///
/// These are fatal and surface before any thread state is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing secret: environment variable '{0}' is not set")]
    MissingSecret(String),

    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to read config file '{path}': {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: String, message: String },
}

/// Errors from conversation snapshot operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No snapshot exists yet. Callers start a fresh thread.
    #[error("snapshot not found")]
    NotFound,

    #[error("snapshot I/O error: {0}")]
    Io(String),

    #[error("snapshot serialization error: {0}")]
    Serialization(String),

    #[error("post sequence mismatch: expected {expected}, got {actual}")]
    SequenceMismatch { expected: u64, actual: u64 },
}

/// Errors from the remote feed service.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("not authenticated")]
    NotAuthenticated,

    #[error("post rejected by feed service: {0}")]
    Rejected(String),

    #[error("feed transport error: {0}")]
    Transport(String),

    #[error("unexpected feed response: {0}")]
    Deserialization(String),
}

/// Errors from secret lookups.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("secret provider unavailable")]
    ProviderUnavailable,

    #[error("secret '{0}' is not valid unicode")]
    InvalidEncoding(String),
}
