//! Bluesky (AT Protocol) feed client.
//!
//! Talks XRPC over HTTPS: `com.atproto.server.createSession` to log in and
//! `com.atproto.repo.createRecord` to write `app.bsky.feed.post` records.

pub mod client;
pub mod types;

pub use client::BlueskyClient;
