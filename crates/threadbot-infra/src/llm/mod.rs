//! Generation backend implementations.
//!
//! Contains concrete implementations of the [`LlmProvider`] trait defined in
//! `threadbot-core`, plus the factory ([`create_provider`]) that picks one
//! from the resolved [`ProviderSettings`].
//!
//! [`LlmProvider`]: threadbot_core::llm::provider::LlmProvider

pub mod openrouter;
pub mod replicate;

use secrecy::{ExposeSecret, SecretString};
use threadbot_core::llm::box_provider::BoxLlmProvider;
use threadbot_types::config::ProviderSettings;
use threadbot_types::llm::{LlmError, ProviderType};

use self::openrouter::OpenRouterProvider;
use self::replicate::ReplicateProvider;

/// Create a [`BoxLlmProvider`] from resolved provider settings.
///
/// # Errors
///
/// Returns [`LlmError::InvalidRequest`] if the model identifier is not valid
/// for the chosen backend.
pub fn create_provider(settings: &ProviderSettings) -> Result<BoxLlmProvider, LlmError> {
    let provider = match settings.kind {
        ProviderType::Replicate => {
            let mut provider = ReplicateProvider::new(
                SecretString::from(settings.api_key.expose_secret().to_string()),
                settings.model.clone(),
            )?;
            if let Some(base_url) = settings.base_url.as_ref() {
                provider = provider.with_base_url(base_url.clone());
            }
            BoxLlmProvider::new(provider)
        }
        ProviderType::OpenRouter => BoxLlmProvider::new(OpenRouterProvider::new(
            &settings.api_key,
            settings.model.clone(),
            settings.base_url.as_deref(),
        )),
    };

    tracing::debug!(
        provider = provider.name(),
        model = provider.model(),
        delivery = %provider.delivery(),
        "generation backend selected"
    );
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadbot_types::llm::{Delivery, SamplingParams};

    fn settings(kind: ProviderType, model: &str) -> ProviderSettings {
        ProviderSettings {
            kind,
            model: model.to_string(),
            api_key: SecretString::from("key".to_string()),
            base_url: None,
            sampling: SamplingParams::default(),
        }
    }

    #[test]
    fn test_create_replicate() {
        let provider =
            create_provider(&settings(ProviderType::Replicate, "meta/llama-2-70b-chat")).unwrap();
        assert_eq!(provider.name(), "replicate");
        assert_eq!(provider.delivery(), Delivery::Streaming);
    }

    #[test]
    fn test_create_openrouter() {
        let provider = create_provider(&settings(
            ProviderType::OpenRouter,
            "neversleep/noromaid-mixtral-8x7b-instruct",
        ))
        .unwrap();
        assert_eq!(provider.name(), "openrouter");
        assert_eq!(provider.model(), "neversleep/noromaid-mixtral-8x7b-instruct");
        assert_eq!(provider.delivery(), Delivery::SingleShot);
    }

    #[test]
    fn test_create_replicate_bad_model() {
        let result = create_provider(&settings(ProviderType::Replicate, "not-a-model"));
        assert!(matches!(result, Err(LlmError::InvalidRequest(_))));
    }
}
