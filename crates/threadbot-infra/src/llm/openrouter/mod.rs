//! OpenRouter generation backend.
//!
//! OpenRouter exposes an OpenAI-compatible chat completions API, so
//! [`OpenRouterProvider`] uses [`async_openai`] with a custom base URL. One
//! request per generation: a system message carrying the persona prompt and a
//! user message carrying the rendered thread prompt.

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use async_openai::Client;
use secrecy::{ExposeSecret, SecretString};

use threadbot_core::llm::provider::LlmProvider;
use threadbot_types::llm::{Delivery, GenerationRequest, LlmError};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// OpenRouter chat completions backend.
///
/// Does NOT derive Debug; the API key lives inside the `async_openai::Client`.
pub struct OpenRouterProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenRouterProvider {
    pub fn new(api_key: &SecretString, model: String, base_url: Option<&str>) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(base_url.unwrap_or(DEFAULT_BASE_URL));

        Self {
            client: Client::with_config(openai_config),
            model,
        }
    }

    /// Build a [`CreateChatCompletionRequest`] from a [`GenerationRequest`].
    ///
    /// `min_new_tokens` has no chat-completions equivalent and is not sent.
    fn build_request(&self, request: &GenerationRequest) -> CreateChatCompletionRequest {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(
                    request.system_prompt.clone(),
                ),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(request.prompt.clone()),
                name: None,
            }),
        ];

        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            max_completion_tokens: Some(request.params.max_new_tokens),
            temperature: Some(request.params.temperature as f32),
            top_p: Some(request.params.top_p as f32),
            ..Default::default()
        }
    }
}

impl LlmProvider for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn delivery(&self) -> Delivery {
        Delivery::SingleShot
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let oai_request = self.build_request(request);

        let response = self
            .client
            .chat()
            .create(oai_request)
            .await
            .map_err(map_openai_error)?;

        if let Some(usage) = response.usage.as_ref() {
            tracing::debug!(
                input_tokens = usage.prompt_tokens,
                output_tokens = usage.completion_tokens,
                "openrouter usage"
            );
        }

        // Only the first choice matters; a missing message body is an error,
        // not an empty post.
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(LlmError::EmptyCompletion)
    }
}

/// Map an `async_openai::error::OpenAIError` to an [`LlmError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> LlmError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::ApiError(api_err) => {
            let code = api_err.code.as_deref().unwrap_or("");
            let error_type = api_err.r#type.as_deref().unwrap_or("");

            if code == "401"
                || error_type == "authentication_error"
                || api_err.message.contains("No auth credentials")
                || api_err.message.contains("Invalid API key")
            {
                LlmError::AuthenticationFailed
            } else if code == "429" || error_type == "rate_limit_error" {
                LlmError::RateLimited
            } else if code == "400" {
                LlmError::InvalidRequest(api_err.message.clone())
            } else {
                LlmError::Provider {
                    message: err.to_string(),
                }
            }
        }
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status().map(|s| s.as_u16()) {
            Some(401) => LlmError::AuthenticationFailed,
            Some(429) => LlmError::RateLimited,
            _ => LlmError::Provider {
                message: err.to_string(),
            },
        },
        OpenAIError::JSONDeserialize(_, content) => {
            LlmError::Deserialization(format!("failed to parse response: {content}"))
        }
        OpenAIError::InvalidArgument(msg) => LlmError::InvalidRequest(msg.clone()),
        _ => LlmError::Provider {
            message: err.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadbot_types::llm::SamplingParams;

    fn provider() -> OpenRouterProvider {
        OpenRouterProvider::new(
            &SecretString::from("sk-or-test".to_string()),
            "neversleep/noromaid-mixtral-8x7b-instruct".to_string(),
            None,
        )
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            system_prompt: "You are Jason Calicanis.".to_string(),
            prompt: "Previous Messages:\nUser: Elon Musk\nMessage: hi\n\n".to_string(),
            params: SamplingParams {
                temperature: 0.7,
                max_new_tokens: 256,
                ..SamplingParams::default()
            },
        }
    }

    #[test]
    fn test_identity() {
        let p = provider();
        assert_eq!(LlmProvider::name(&p), "openrouter");
        assert_eq!(LlmProvider::model(&p), "neversleep/noromaid-mixtral-8x7b-instruct");
        assert_eq!(LlmProvider::delivery(&p), Delivery::SingleShot);
    }

    #[test]
    fn test_build_request_messages() {
        let oai_req = provider().build_request(&request());

        assert_eq!(oai_req.model, "neversleep/noromaid-mixtral-8x7b-instruct");
        assert_eq!(oai_req.messages.len(), 2);
        assert!(matches!(
            &oai_req.messages[0],
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(text),
                ..
            }) if text == "You are Jason Calicanis."
        ));
        assert!(matches!(
            &oai_req.messages[1],
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(text),
                ..
            }) if text.starts_with("Previous Messages:")
        ));
    }

    #[test]
    fn test_build_request_sampling() {
        let oai_req = provider().build_request(&request());
        assert_eq!(oai_req.max_completion_tokens, Some(256));
        assert_eq!(oai_req.temperature, Some(0.7_f32));
        assert_eq!(oai_req.top_p, Some(1.0_f32));
        assert!(oai_req.stream.is_none());
    }
}
