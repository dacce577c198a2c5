//! Configuration types for threadbot.
//!
//! [`AppConfig`] is the on-disk `threadbot.toml` shape; it only names the
//! environment variables that hold secrets. [`Settings`] is the validated,
//! fully-resolved form handed to the engine at startup.

use std::path::PathBuf;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::llm::{ProviderType, SamplingParams};
use crate::persona::Persona;

/// Maximum length of a posted message, in characters.
pub const DEFAULT_MAX_POST_LENGTH: usize = 300;

/// Every three hours, on the hour.
pub const DEFAULT_SCHEDULE: &str = "0 0 */3 * * *";

pub const DEFAULT_FEED_SERVICE: &str = "https://bsky.social";

/// Top-level `threadbot.toml`. All fields have defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Snapshot file; relative paths resolve against the data directory.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,

    /// Cron expression or human-readable cadence for `threadbot schedule`.
    #[serde(default = "default_schedule")]
    pub schedule: String,

    #[serde(default = "default_max_post_length")]
    pub max_post_length: usize,

    #[serde(default)]
    pub provider: ProviderSection,

    #[serde(default)]
    pub sampling: SamplingParams,

    #[serde(default)]
    pub feed: FeedSection,

    #[serde(default = "default_personas")]
    pub personas: Vec<PersonaDefinition>,
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("post.json")
}

fn default_schedule() -> String {
    DEFAULT_SCHEDULE.to_string()
}

fn default_max_post_length() -> usize {
    DEFAULT_MAX_POST_LENGTH
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
            schedule: default_schedule(),
            max_post_length: default_max_post_length(),
            provider: ProviderSection::default(),
            sampling: SamplingParams::default(),
            feed: FeedSection::default(),
            personas: default_personas(),
        }
    }
}

/// `[provider]` section: which backend generates replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSection {
    #[serde(default = "default_provider_kind")]
    pub kind: ProviderType,
    /// Model identifier; defaults per backend.
    pub model: Option<String>,
    /// Environment variable holding the API key; defaults per backend.
    pub api_key_env: Option<String>,
    /// Override the backend base URL (proxies, testing).
    pub base_url: Option<String>,
}

fn default_provider_kind() -> ProviderType {
    ProviderType::Replicate
}

impl Default for ProviderSection {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            model: None,
            api_key_env: None,
            base_url: None,
        }
    }
}

/// `[feed]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSection {
    #[serde(default = "default_feed_service")]
    pub service: String,
}

fn default_feed_service() -> String {
    DEFAULT_FEED_SERVICE.to_string()
}

impl Default for FeedSection {
    fn default() -> Self {
        Self {
            service: default_feed_service(),
        }
    }
}

/// A `[[personas]]` entry. Credentials are referenced by env var name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaDefinition {
    pub handle: String,
    pub display_name: String,
    pub system_prompt: String,
    pub identifier_env: String,
    pub password_env: String,
}

impl PersonaDefinition {
    fn stock(handle: &str, display_name: &str, system_prompt: &str, slot: u8) -> Self {
        Self {
            handle: handle.to_string(),
            display_name: display_name.to_string(),
            system_prompt: system_prompt.to_string(),
            identifier_env: format!("AGENT_{slot}_USERNAME"),
            password_env: format!("AGENT_{slot}_PASSWORD"),
        }
    }
}

/// The four stock personas used when the config file lists none.
pub fn default_personas() -> Vec<PersonaDefinition> {
    vec![
        PersonaDefinition::stock(
            "barackbeefbot.bsky.social",
            "Mark Zuckerberg",
            "You are Mark Zuckerberg, the CEO of facebook. You are a metahuman and advanced \
             species. You believe in your tech's superiority and aren't afraid to tell people \
             about it",
            1,
        ),
        PersonaDefinition::stock(
            "trumpbeefbot.bsky.social",
            "Elon Musk",
            "You are Elon Musk. You are so rich that you don't even care anymore. You like \
             starting arguments and think science is king.",
            2,
        ),
        PersonaDefinition::stock(
            "bidenbeefbot.bsky.social",
            "Jason Calicanis",
            "You are Jason Calicanis. You are a VC who is completely full of himself because he \
             got lucky on a few investments. You think your advice is sage wisdom but say \
             incredibly naive things all the time.",
            3,
        ),
        PersonaDefinition::stock(
            "michellebeefbot.bsky.social",
            "Balaji Srinivasan",
            "You are Balaji Srinivasan, legendary investor. You made a few good bets but are too \
             deep into your own ideology. You have wild visions of the future and aren't afraid \
             to tell other people about it.",
            4,
        ),
    ]
}

/// Resolved generation backend settings.
#[derive(Debug)]
pub struct ProviderSettings {
    pub kind: ProviderType,
    pub model: String,
    pub api_key: SecretString,
    pub base_url: Option<String>,
    pub sampling: SamplingParams,
}

/// Validated startup configuration, passed by reference into the engine.
#[derive(Debug)]
pub struct Settings {
    pub personas: Vec<Persona>,
    pub provider: ProviderSettings,
    pub feed_service: String,
    pub snapshot_path: PathBuf,
    pub schedule: String,
    pub max_post_length: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.snapshot_path, PathBuf::from("post.json"));
        assert_eq!(config.schedule, DEFAULT_SCHEDULE);
        assert_eq!(config.max_post_length, 300);
        assert_eq!(config.provider.kind, ProviderType::Replicate);
        assert_eq!(config.feed.service, "https://bsky.social");
        assert_eq!(config.personas.len(), 4);
    }

    #[test]
    fn test_stock_persona_env_names() {
        let personas = default_personas();
        assert_eq!(personas[0].display_name, "Mark Zuckerberg");
        assert_eq!(personas[0].identifier_env, "AGENT_1_USERNAME");
        assert_eq!(personas[3].password_env, "AGENT_4_PASSWORD");
    }

    #[test]
    fn test_toml_with_values() {
        let toml_str = r#"
snapshot_path = "/var/lib/threadbot/thread.json"
max_post_length = 280

[provider]
kind = "openrouter"
model = "mistralai/mixtral-8x7b-instruct"

[sampling]
temperature = 0.8

[[personas]]
handle = "grace.bsky.social"
display_name = "Grace Hopper"
system_prompt = "You are Grace Hopper."
identifier_env = "GRACE_USERNAME"
password_env = "GRACE_PASSWORD"
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.max_post_length, 280);
        assert_eq!(config.provider.kind, ProviderType::OpenRouter);
        assert_eq!(
            config.provider.model.as_deref(),
            Some("mistralai/mixtral-8x7b-instruct")
        );
        assert!(config.provider.api_key_env.is_none());
        assert!((config.sampling.temperature - 0.8).abs() < f64::EPSILON);
        assert!((config.sampling.top_p - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.personas.len(), 1);
        assert_eq!(config.personas[0].handle, "grace.bsky.social");
    }
}
