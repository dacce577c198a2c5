//! Thread poster.
//!
//! Decides whether the next post opens the thread or replies within it,
//! submits it through the [`FeedClient`] as the chosen persona, and builds the
//! [`ThreadPost`] record for the store.
//!
//! Two states only:
//! - `Empty`: no posts stored; submit a top-level post with no linkage.
//! - `Ongoing`: reply with root = first stored post, parent = last stored post.
//!
//! The first post's own strong reference becomes the thread root, so the root
//! only starts appearing in submitted linkage from the second post onwards.

use tracing::{debug, info};

use threadbot_types::error::FeedError;
use threadbot_types::persona::Persona;
use threadbot_types::thread::{ConversationStore, PostKind, ReplyRefs, ThreadPost};

use crate::feed::FeedClient;

/// Where the thread stands before the next post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadState {
    Empty,
    Ongoing(ReplyRefs),
}

impl ThreadState {
    /// Compute the state (and reply linkage) from the stored posts.
    pub fn of(store: &ConversationStore) -> Self {
        match (store.first(), store.last()) {
            (Some(first), Some(last)) => ThreadState::Ongoing(ReplyRefs {
                root: first.strong_ref.clone(),
                parent: last.strong_ref.clone(),
            }),
            _ => ThreadState::Empty,
        }
    }

    pub fn reply_refs(&self) -> Option<&ReplyRefs> {
        match self {
            ThreadState::Empty => None,
            ThreadState::Ongoing(refs) => Some(refs),
        }
    }
}

/// Submits posts into the thread through a feed client.
pub struct ThreadPoster<'a, F: FeedClient> {
    feed: &'a F,
}

impl<'a, F: FeedClient> ThreadPoster<'a, F> {
    pub fn new(feed: &'a F) -> Self {
        Self { feed }
    }

    /// Authenticate as `persona`, submit `text`, and return the record to
    /// append. The store itself is not modified.
    pub async fn publish(
        &self,
        store: &ConversationStore,
        persona: &Persona,
        text: &str,
    ) -> Result<ThreadPost, FeedError> {
        self.feed.authenticate(&persona.credentials).await?;
        debug!(handle = %persona.handle, "authenticated with feed service");

        let state = ThreadState::of(store);
        let strong_ref = self.feed.submit_post(text, state.reply_refs()).await?;

        let kind = match state {
            ThreadState::Empty => PostKind::First,
            ThreadState::Ongoing(refs) => PostKind::Reply {
                root_strong_ref: refs.root,
                parent_strong_ref: refs.parent,
            },
        };

        info!(
            uri = %strong_ref.uri,
            reply = matches!(kind, PostKind::Reply { .. }),
            "post submitted"
        );

        Ok(ThreadPost {
            id: store.next_sequence(),
            message: text.to_string(),
            username: persona.display_name.clone(),
            agent_identifier: persona.identifier().to_string(),
            strong_ref,
            kind,
        })
    }
}
