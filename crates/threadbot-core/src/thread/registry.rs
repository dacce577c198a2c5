//! Persona registry.
//!
//! Static catalog of the personas configured at startup. Selection is uniform
//! random on every run; repeats across consecutive runs are expected.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use threadbot_types::error::ConfigError;
use threadbot_types::persona::Persona;

/// Immutable set of personas keyed by feed handle.
#[derive(Debug)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
}

impl PersonaRegistry {
    /// Build a registry, rejecting an empty list or duplicate handles.
    pub fn new(personas: Vec<Persona>) -> Result<Self, ConfigError> {
        if personas.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one persona must be configured".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for persona in &personas {
            if !seen.insert(persona.handle.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate persona handle '{}'",
                    persona.handle
                )));
            }
        }

        Ok(Self { personas })
    }

    /// All registered personas.
    pub fn all(&self) -> &[Persona] {
        &self.personas
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn get(&self, handle: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.handle == handle)
    }

    /// Pick a persona uniformly at random using the thread-local RNG.
    pub fn pick_random(&self) -> &Persona {
        self.pick_with(&mut rand::thread_rng())
    }

    /// Pick a persona uniformly at random from `rng`.
    pub fn pick_with<R: Rng + ?Sized>(&self, rng: &mut R) -> &Persona {
        // `new` guarantees at least one persona.
        self.personas
            .choose(rng)
            .unwrap_or(&self.personas[0])
    }
}
