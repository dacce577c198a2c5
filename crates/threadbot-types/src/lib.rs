//! Shared domain types for threadbot.
//!
//! This crate contains the types used across the workspace: personas, the
//! persisted conversation thread, generation requests and their errors.
//!
//! Zero infrastructure dependencies -- only serde, secrecy, thiserror.

pub mod config;
pub mod error;
pub mod llm;
pub mod persona;
pub mod thread;
