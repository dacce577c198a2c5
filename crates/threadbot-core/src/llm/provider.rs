//! LlmProvider trait definition.
//!
//! This is the single `generate` capability every backend implements. Uses
//! RPITIT for `generate` so concrete providers can be plain `async fn`s.

use threadbot_types::llm::{Delivery, GenerationRequest, LlmError};

/// Trait for generation backends (Replicate, OpenRouter, ...).
///
/// Implementations must return the fully assembled reply text. A streaming
/// backend drains its stream before returning; a single-shot backend returns
/// the one completion it received.
///
/// Implementations live in threadbot-infra.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "replicate").
    fn name(&self) -> &str;

    /// Model identifier sent to the backend.
    fn model(&self) -> &str;

    /// Whether the backend streams tokens or answers in one response.
    fn delivery(&self) -> Delivery;

    /// Generate a reply for `request`.
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl std::future::Future<Output = Result<String, LlmError>> + Send;
}
