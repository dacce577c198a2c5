//! BoxLlmProvider -- object-safe dynamic dispatch wrapper for LlmProvider.
//!
//! 1. Define an object-safe `LlmProviderDyn` trait with boxed futures
//! 2. Blanket-impl `LlmProviderDyn` for all `T: LlmProvider`
//! 3. `BoxLlmProvider` wraps `Box<dyn LlmProviderDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use threadbot_types::llm::{Delivery, GenerationRequest, LlmError};

use super::provider::LlmProvider;

/// Object-safe version of [`LlmProvider`] with boxed futures.
pub trait LlmProviderDyn: Send + Sync {
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    fn delivery(&self) -> Delivery;

    fn generate_boxed<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>>;
}

impl<T: LlmProvider> LlmProviderDyn for T {
    fn name(&self) -> &str {
        LlmProvider::name(self)
    }

    fn model(&self) -> &str {
        LlmProvider::model(self)
    }

    fn delivery(&self) -> Delivery {
        LlmProvider::delivery(self)
    }

    fn generate_boxed<'a>(
        &'a self,
        request: &'a GenerationRequest,
    ) -> Pin<Box<dyn Future<Output = Result<String, LlmError>> + Send + 'a>> {
        Box::pin(self.generate(request))
    }
}

/// Type-erased generation provider.
///
/// The backend is picked once when the engine is constructed; callers never
/// branch on which one they hold.
pub struct BoxLlmProvider {
    inner: Box<dyn LlmProviderDyn + Send + Sync>,
}

impl BoxLlmProvider {
    /// Wrap a concrete `LlmProvider` in a type-erased box.
    pub fn new<T: LlmProvider + 'static>(provider: T) -> Self {
        Self {
            inner: Box::new(provider),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }

    pub fn delivery(&self) -> Delivery {
        self.inner.delivery()
    }

    /// Generate the full reply text.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        self.inner.generate_boxed(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadbot_types::llm::SamplingParams;

    struct EchoProvider;

    impl LlmProvider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        fn model(&self) -> &str {
            "echo-1"
        }

        fn delivery(&self) -> Delivery {
            Delivery::SingleShot
        }

        async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
            Ok(format!("{} / {}", request.system_prompt, request.prompt))
        }
    }

    #[tokio::test]
    async fn test_box_provider_delegates() {
        let provider = BoxLlmProvider::new(EchoProvider);
        assert_eq!(provider.name(), "echo");
        assert_eq!(provider.model(), "echo-1");
        assert_eq!(provider.delivery(), Delivery::SingleShot);

        let request = GenerationRequest {
            system_prompt: "sys".to_string(),
            prompt: "user".to_string(),
            params: SamplingParams::default(),
        };
        assert_eq!(provider.generate(&request).await.unwrap(), "sys / user");
    }
}
