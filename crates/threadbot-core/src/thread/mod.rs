//! The thread-continuation engine.
//!
//! One run: load the snapshot, pick a persona, compile the prompt, generate,
//! sanitize, post into the thread, append and save.

pub mod engine;
pub mod poster;
pub mod prompt;
pub mod registry;
pub mod sanitize;
