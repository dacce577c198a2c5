//! Replicate generation backend.
//!
//! This module provides the [`ReplicateProvider`] which implements the
//! [`LlmProvider`](threadbot_core::llm::provider::LlmProvider) trait on top of
//! Replicate's predictions API, reading the output over its SSE stream.

pub mod client;
pub mod streaming;
pub mod types;

pub use client::ReplicateProvider;
