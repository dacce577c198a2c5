//! Generation request/response types.
//!
//! These model the data shapes for a single language-model call: the rendered
//! prompt, the persona's system prompt, the fixed sampling parameters, and the
//! events a streaming backend emits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed sampling parameters shared by every backend.
///
/// These are provider configuration, not per-call input, so swapping backends
/// does not change the character of the replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Nucleus sampling probability.
    #[serde(default = "default_top_p")]
    pub top_p: f64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    /// Minimum generated tokens; `-1` disables the floor.
    #[serde(default = "default_min_new_tokens")]
    pub min_new_tokens: i32,
}

fn default_top_p() -> f64 {
    1.0
}

fn default_temperature() -> f64 {
    0.5
}

fn default_max_new_tokens() -> u32 {
    500
}

fn default_min_new_tokens() -> i32 {
    -1
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            top_p: default_top_p(),
            temperature: default_temperature(),
            max_new_tokens: default_max_new_tokens(),
            min_new_tokens: default_min_new_tokens(),
        }
    }
}

/// A single generation call.
///
/// The persona's system prompt and the rendered instruction prompt travel as
/// two separate channels; they are never merged into one string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub prompt: String,
    pub params: SamplingParams,
}

/// How a backend delivers its output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delivery {
    /// Token/event stream concatenated in arrival order.
    Streaming,
    /// One request, one response body.
    SingleShot,
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::Streaming => write!(f, "streaming"),
            Delivery::SingleShot => write!(f, "single_shot"),
        }
    }
}

/// Events emitted by a streaming backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Connection established with the backend.
    Connected,

    /// A chunk of generated text.
    TextDelta { text: String },

    /// The backend signalled completion.
    Done,
}

/// Errors from generation backends.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider error: {message}")]
    Provider { message: String },

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("rate limited")]
    RateLimited,

    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("empty completion")]
    EmptyCompletion,
}

/// Type of generation backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    /// Replicate predictions API, streamed over SSE.
    Replicate,
    /// OpenRouter chat completions, single-shot.
    #[serde(rename = "openrouter")]
    OpenRouter,
}

impl ProviderType {
    /// Model used when the config does not name one.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderType::Replicate => "meta/llama-2-70b-chat",
            ProviderType::OpenRouter => "neversleep/noromaid-mixtral-8x7b-instruct",
        }
    }

    /// Environment variable holding the backend credential by default.
    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            ProviderType::Replicate => "REPLICATE_API_TOKEN",
            ProviderType::OpenRouter => "OPENROUTER_API_KEY",
        }
    }

    pub fn delivery(&self) -> Delivery {
        match self {
            ProviderType::Replicate => Delivery::Streaming,
            ProviderType::OpenRouter => Delivery::SingleShot,
        }
    }
}

impl fmt::Display for ProviderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderType::Replicate => write!(f, "replicate"),
            ProviderType::OpenRouter => write!(f, "openrouter"),
        }
    }
}

impl FromStr for ProviderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "replicate" => Ok(ProviderType::Replicate),
            "openrouter" => Ok(ProviderType::OpenRouter),
            other => Err(format!("invalid provider type: '{other}'")),
        }
    }
}
