//! Replicate predictions API types.
//!
//! These are Replicate-specific request/response structures. They are NOT the
//! generic generation types from threadbot-types.

use serde::{Deserialize, Serialize};

use threadbot_types::llm::GenerationRequest;

/// Model input for the Llama 2 chat family.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionInput {
    pub debug: bool,
    pub top_p: f64,
    pub prompt: String,
    pub temperature: f64,
    pub system_prompt: String,
    pub max_new_tokens: u32,
    pub min_new_tokens: i32,
}

impl From<&GenerationRequest> for PredictionInput {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            debug: false,
            top_p: request.params.top_p,
            prompt: request.prompt.clone(),
            temperature: request.params.temperature,
            system_prompt: request.system_prompt.clone(),
            max_new_tokens: request.params.max_new_tokens,
            min_new_tokens: request.params.min_new_tokens,
        }
    }
}

/// Body of `POST /v1/models/{owner}/{name}/predictions` or `POST /v1/predictions`.
#[derive(Debug, Clone, Serialize)]
pub struct CreatePrediction {
    /// Pinned model version; only sent to `/v1/predictions`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub input: PredictionInput,
    pub stream: bool,
}

/// The subset of the prediction object we read back.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    #[serde(default)]
    pub urls: PredictionUrls,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionUrls {
    #[serde(default)]
    pub stream: Option<String>,
}

/// Payload of the `done` SSE event. Empty on normal completion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DonePayload {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Error body returned by the API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

/// A model reference: `owner/name` or `owner/name:version`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRef {
    pub owner: String,
    pub name: String,
    pub version: Option<String>,
}

impl ModelRef {
    pub fn parse(model: &str) -> Option<Self> {
        let (path, version) = match model.split_once(':') {
            Some((path, version)) if !version.is_empty() => (path, Some(version.to_string())),
            Some(_) => return None,
            None => (model, None),
        };
        let (owner, name) = path.split_once('/')?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return None;
        }
        Some(Self {
            owner: owner.to_string(),
            name: name.to_string(),
            version,
        })
    }

    /// API path that creates a prediction for this model.
    pub fn predictions_path(&self) -> String {
        match self.version {
            Some(_) => "/v1/predictions".to_string(),
            None => format!("/v1/models/{}/{}/predictions", self.owner, self.name),
        }
    }
}
