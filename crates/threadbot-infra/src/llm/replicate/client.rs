//! ReplicateProvider -- streaming [`LlmProvider`] implementation for Replicate.
//!
//! Creates a prediction with `stream: true`, then reads the generated text
//! from the prediction's SSE stream URL. `generate` drains that stream and
//! returns the concatenated chunks.
//!
//! The API token is wrapped in [`secrecy::SecretString`] and only exposed
//! while building the `Authorization` header, which is marked sensitive.

use std::pin::Pin;
use std::time::Duration;

use futures_util::Stream;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use secrecy::{ExposeSecret, SecretString};

use threadbot_core::llm::provider::LlmProvider;
use threadbot_core::llm::stream::collect_text;
use threadbot_types::llm::{Delivery, GenerationRequest, LlmError, StreamEvent};

use super::streaming::create_replicate_stream;
use super::types::{ApiErrorBody, CreatePrediction, ModelRef, Prediction, PredictionInput};

pub const DEFAULT_BASE_URL: &str = "https://api.replicate.com";

/// Replicate generation backend.
///
/// Does not derive Debug; the token never appears in formatted output.
pub struct ReplicateProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
    model_ref: ModelRef,
}

impl ReplicateProvider {
    /// Create a provider for `model` (`owner/name` or `owner/name:version`).
    pub fn new(api_key: SecretString, model: String) -> Result<Self, LlmError> {
        let model_ref = ModelRef::parse(&model).ok_or_else(|| {
            LlmError::InvalidRequest(format!(
                "replicate model must look like 'owner/name' or 'owner/name:version', got '{model}'"
            ))
        })?;

        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model,
            model_ref,
        })
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn auth_header(&self) -> Result<HeaderValue, LlmError> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", self.api_key.expose_secret()))
            .map_err(|_| LlmError::InvalidRequest("API token contains invalid characters".to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }

    fn prediction_body(&self, request: &GenerationRequest) -> CreatePrediction {
        CreatePrediction {
            version: self.model_ref.version.clone(),
            input: PredictionInput::from(request),
            stream: true,
        }
    }

    /// Stream the generated text for `request`.
    ///
    /// Creating the prediction happens lazily on first poll.
    pub fn stream(
        &self,
        request: &GenerationRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let auth = match self.auth_header() {
            Ok(auth) => auth,
            Err(e) => return Box::pin(futures_util::stream::once(async move { Err(e) })),
        };

        let client = self.client.clone();
        let url = self.url(&self.model_ref.predictions_path());
        let body = self.prediction_body(request);

        Box::pin(async_stream::try_stream! {
            let prediction = create_prediction(&client, &url, &body, auth.clone()).await?;
            let stream_url = prediction.urls.stream.ok_or_else(|| LlmError::Provider {
                message: format!("prediction {} has no stream URL", prediction.id),
            })?;
            tracing::debug!(prediction_id = %prediction.id, "prediction created");

            let mut inner = create_replicate_stream(&client, &stream_url, auth);

            use futures_util::StreamExt;
            while let Some(event) = inner.next().await {
                match event {
                    Ok(ev) => yield ev,
                    Err(e) => Err(e)?,
                }
            }
        })
    }
}

async fn create_prediction(
    client: &reqwest::Client,
    url: &str,
    body: &CreatePrediction,
    auth: HeaderValue,
) -> Result<Prediction, LlmError> {
    let response = client
        .post(url)
        .header(AUTHORIZATION, auth)
        .json(body)
        .send()
        .await
        .map_err(|e| LlmError::Provider {
            message: format!("HTTP request failed: {e}"),
        })?;

    let status = response.status();
    if !status.is_success() {
        let error_body = response.text().await.unwrap_or_default();
        return Err(map_status_error(status.as_u16(), &error_body));
    }

    let prediction: Prediction = response
        .json()
        .await
        .map_err(|e| LlmError::Deserialization(format!("failed to parse prediction: {e}")))?;

    if let Some(error) = prediction.error.as_ref().filter(|e| !e.is_null()) {
        return Err(LlmError::Provider {
            message: format!("prediction {} failed: {error}", prediction.id),
        });
    }
    Ok(prediction)
}

/// Map a non-2xx response from the predictions API to an [`LlmError`].
fn map_status_error(status: u16, body: &str) -> LlmError {
    let detail = serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|b| b.detail.or(b.title))
        .unwrap_or_else(|| body.to_string());

    match status {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited,
        400 | 404 | 422 => LlmError::InvalidRequest(detail),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {detail}"),
        },
    }
}

impl LlmProvider for ReplicateProvider {
    fn name(&self) -> &str {
        "replicate"
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn delivery(&self) -> Delivery {
        Delivery::Streaming
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        collect_text(self.stream(request)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadbot_types::llm::SamplingParams;

    fn provider(model: &str) -> ReplicateProvider {
        ReplicateProvider::new(SecretString::from("r8_secret".to_string()), model.to_string())
            .unwrap()
    }

    #[test]
    fn test_new_rejects_bad_model() {
        let result = ReplicateProvider::new(
            SecretString::from("r8_secret".to_string()),
            "llama".to_string(),
        );
        assert!(matches!(result, Err(LlmError::InvalidRequest(_))));
    }

    #[test]
    fn test_identity() {
        let p = provider("meta/llama-2-70b-chat");
        assert_eq!(LlmProvider::name(&p), "replicate");
        assert_eq!(LlmProvider::model(&p), "meta/llama-2-70b-chat");
        assert_eq!(LlmProvider::delivery(&p), Delivery::Streaming);
    }

    #[test]
    fn test_urls() {
        let p = provider("meta/llama-2-70b-chat").with_base_url("http://localhost:9000/".to_string());
        assert_eq!(
            p.url(&p.model_ref.predictions_path()),
            "http://localhost:9000/v1/models/meta/llama-2-70b-chat/predictions"
        );
    }

    #[test]
    fn test_pinned_version_in_body() {
        let p = provider("meta/llama-2-70b-chat:02e509c7");
        let request = GenerationRequest {
            system_prompt: "sys".to_string(),
            prompt: "prompt".to_string(),
            params: SamplingParams::default(),
        };
        let body = p.prediction_body(&request);
        assert_eq!(body.version.as_deref(), Some("02e509c7"));
        assert!(body.stream);
    }

    #[test]
    fn test_auth_header_is_sensitive() {
        let p = provider("meta/llama-2-70b-chat");
        let header = p.auth_header().unwrap();
        assert!(header.is_sensitive());
        assert_eq!(header.to_str().unwrap(), "Bearer r8_secret");
    }

    #[test]
    fn test_map_status_error() {
        assert!(matches!(map_status_error(401, ""), LlmError::AuthenticationFailed));
        assert!(matches!(map_status_error(429, ""), LlmError::RateLimited));
        match map_status_error(422, r#"{"detail":"Invalid version"}"#) {
            LlmError::InvalidRequest(detail) => assert_eq!(detail, "Invalid version"),
            other => panic!("expected InvalidRequest, got {other:?}"),
        }
        match map_status_error(500, "boom") {
            LlmError::Provider { message } => assert_eq!(message, "HTTP 500: boom"),
            other => panic!("expected Provider, got {other:?}"),
        }
    }
}
