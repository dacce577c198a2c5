//! SecretProvider trait for resolving credentials at startup.

use threadbot_types::error::SecretError;

/// Read-only source of secret values keyed by name.
///
/// Returns `Ok(None)` when the key is not set.
pub trait SecretProvider: Send + Sync {
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, SecretError>> + Send;
}
