//! Environment variable secret provider.
//!
//! Resolves persona credentials and backend API keys from the process
//! environment. Empty values count as unset.

use threadbot_core::repository::secret::SecretProvider;
use threadbot_types::error::SecretError;

/// Environment variable secret provider.
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretProvider for EnvSecretProvider {
    async fn get(&self, key: &str) -> Result<Option<String>, SecretError> {
        match std::env::var(key) {
            Ok(val) if val.is_empty() => Ok(None),
            Ok(val) => Ok(Some(val)),
            Err(std::env::VarError::NotPresent) => Ok(None),
            Err(std::env::VarError::NotUnicode(_)) => {
                Err(SecretError::InvalidEncoding(key.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_env_provider_get_existing() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("THREADBOT_TEST_SECRET_1", "app-password-123") };

        let provider = EnvSecretProvider::new();
        let result = provider.get("THREADBOT_TEST_SECRET_1").await.unwrap();
        assert_eq!(result, Some("app-password-123".to_string()));

        // SAFETY: the var was just set above by this test.
        unsafe { std::env::remove_var("THREADBOT_TEST_SECRET_1") };
    }

    #[tokio::test]
    async fn test_env_provider_get_missing() {
        let provider = EnvSecretProvider::new();
        let result = provider.get("NONEXISTENT_VAR_THREADBOT_XYZ").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_env_provider_empty_is_missing() {
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("THREADBOT_TEST_EMPTY_SECRET", "") };

        let provider = EnvSecretProvider::new();
        let result = provider.get("THREADBOT_TEST_EMPTY_SECRET").await.unwrap();
        assert!(result.is_none());

        // SAFETY: the var was just set above by this test.
        unsafe { std::env::remove_var("THREADBOT_TEST_EMPTY_SECRET") };
    }
}
