//! Secret providers.

pub mod env;

pub use env::EnvSecretProvider;
