//! Repository trait definitions (ports).
//!
//! These traits define the storage and secret interfaces that the
//! infrastructure layer (threadbot-infra) implements.

pub mod conversation;
pub mod secret;
