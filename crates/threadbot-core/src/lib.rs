//! Thread-continuation engine and port definitions for threadbot.
//!
//! This crate defines the "ports" (repository, secret, feed and LLM traits)
//! that the infrastructure layer implements, plus the business logic that
//! drives one run. It depends only on `threadbot-types` -- never on
//! `threadbot-infra` or any HTTP/filesystem crate.

pub mod feed;
pub mod llm;
pub mod repository;
pub mod schedule;
pub mod thread;
