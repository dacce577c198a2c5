//! Persona types.
//!
//! A persona is a character identity with its own feed-service login and a
//! system prompt steering how the language model writes as that character.

use secrecy::SecretString;

/// Login credentials for a persona's feed-service account.
///
/// The password is a [`SecretString`] and never shows up in `Debug` output.
#[derive(Debug)]
pub struct PersonaCredentials {
    pub identifier: String,
    pub password: SecretString,
}

impl PersonaCredentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// A fully-resolved persona: identity, character prompt and credentials.
///
/// Personas are immutable once built at startup and keyed by `handle`.
#[derive(Debug)]
pub struct Persona {
    /// Feed-service handle, e.g. `barackbeefbot.bsky.social`.
    pub handle: String,
    /// Name shown in the rendered thread history.
    pub display_name: String,
    /// System prompt defining the character.
    pub system_prompt: String,
    pub credentials: PersonaCredentials,
}

impl Persona {
    /// Login identifier used for the feed service.
    pub fn identifier(&self) -> &str {
        &self.credentials.identifier
    }
}
