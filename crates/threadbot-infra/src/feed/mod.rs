//! Feed service clients.

pub mod bluesky;

pub use bluesky::BlueskyClient;
