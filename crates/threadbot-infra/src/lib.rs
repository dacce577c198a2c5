//! Infrastructure layer for threadbot.
//!
//! Contains implementations of the ports defined in `threadbot-core`: the
//! JSON snapshot repository, the environment secret provider, the Replicate
//! and OpenRouter generation backends, and the Bluesky feed client. Also owns
//! config file loading and startup validation.

pub mod config;
pub mod feed;
pub mod llm;
pub mod secret;
pub mod storage;
