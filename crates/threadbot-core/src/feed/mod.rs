//! Feed client port.
//!
//! The core only needs two things from the remote feed service: log in as a
//! persona, and submit a post (optionally as a reply) to get back its strong
//! reference. The concrete client lives in threadbot-infra.

use threadbot_types::error::FeedError;
use threadbot_types::persona::PersonaCredentials;
use threadbot_types::thread::{ReplyRefs, StrongRef};

/// Client for the remote social feed.
pub trait FeedClient: Send + Sync {
    /// Open a session as the given account. Later submissions post as it.
    fn authenticate(
        &self,
        credentials: &PersonaCredentials,
    ) -> impl std::future::Future<Output = Result<(), FeedError>> + Send;

    /// Submit a post, threaded under `reply` when given.
    fn submit_post(
        &self,
        text: &str,
        reply: Option<&ReplyRefs>,
    ) -> impl std::future::Future<Output = Result<StrongRef, FeedError>> + Send;
}
