//! Conversation thread types.
//!
//! The thread is persisted as a single [`ConversationStore`] snapshot holding
//! an ordered list of [`ThreadPost`]s. Each post is either the thread's first
//! post or a reply; reply linkage only exists on replies, so there is no
//! "maybe present" root/parent field to get wrong.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Opaque reference addressing one exact post on the feed service.
///
/// On AT Protocol feeds this is the record URI plus its content hash (CID).
/// The engine never inspects it; it only stores and forwards it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrongRef {
    pub uri: String,
    pub cid: String,
}

/// Reply linkage submitted alongside a post that continues a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRefs {
    /// Strong reference of the thread's first post.
    pub root: StrongRef,
    /// Strong reference of the post being replied to.
    pub parent: StrongRef,
}

/// Whether a stored post opened the thread or replied within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PostKind {
    /// The top-level post. Its own strong reference is the thread root.
    First,
    /// A reply carrying the root and parent it was submitted with.
    #[serde(rename_all = "camelCase")]
    Reply {
        root_strong_ref: StrongRef,
        parent_strong_ref: StrongRef,
    },
}

/// One turn in the thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPost {
    /// 1-based sequence number, unique within the store.
    pub id: u64,
    /// Sanitized text that was posted.
    pub message: String,
    /// Display name of the authoring persona.
    pub username: String,
    /// Feed login identifier of the authoring persona.
    pub agent_identifier: String,
    /// Reference to this post on the feed.
    pub strong_ref: StrongRef,
    #[serde(flatten)]
    pub kind: PostKind,
}

impl ThreadPost {
    /// Strong reference of the thread root this post belongs to.
    ///
    /// For the first post that is the post itself.
    pub fn root_strong_ref(&self) -> &StrongRef {
        match &self.kind {
            PostKind::First => &self.strong_ref,
            PostKind::Reply {
                root_strong_ref, ..
            } => root_strong_ref,
        }
    }

    /// Strong reference of the post this one replied to, if any.
    pub fn parent_strong_ref(&self) -> Option<&StrongRef> {
        match &self.kind {
            PostKind::First => None,
            PostKind::Reply {
                parent_strong_ref, ..
            } => Some(parent_strong_ref),
        }
    }

    pub fn is_reply(&self) -> bool {
        matches!(self.kind, PostKind::Reply { .. })
    }
}

/// The durable record of the thread.
///
/// Serialized as `{ "posts": [...], "postCount": n }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationStore {
    posts: Vec<ThreadPost>,
    post_count: u64,
}

/// On-disk shape; `postCount` may be missing from hand-written snapshots.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawConversationStore {
    #[serde(default)]
    posts: Vec<RawThreadPost>,
    post_count: Option<u64>,
}

/// A stored post before its kind is settled.
///
/// Untagged posts come from the legacy layout, where every post carries a
/// `rootStrongRef`, there is no `parentStrongRef`, and ids may be null or
/// repeated because the running count was never advanced.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawThreadPost {
    #[serde(default)]
    id: Option<u64>,
    message: String,
    username: String,
    agent_identifier: String,
    strong_ref: StrongRef,
    kind: Option<RawPostKind>,
    root_strong_ref: Option<StrongRef>,
    parent_strong_ref: Option<StrongRef>,
}

#[derive(Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
enum RawPostKind {
    First,
    Reply,
}

impl<'de> Deserialize<'de> for ConversationStore {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawConversationStore::deserialize(deserializer)?;
        let tagged = raw.posts.iter().filter(|p| p.kind.is_some()).count();
        let store = if tagged == 0 && !raw.posts.is_empty() {
            Ok(ConversationStore::from_legacy(raw))
        } else if tagged == raw.posts.len() {
            ConversationStore::from_tagged(raw)
        } else {
            Err("snapshot mixes tagged and untagged posts".to_string())
        };
        store.map_err(serde::de::Error::custom)
    }
}

impl ConversationStore {
    fn from_tagged(raw: RawConversationStore) -> Result<Self, String> {
        let mut posts = Vec::with_capacity(raw.posts.len());
        let mut prev_id = 0;

        for (index, post) in raw.posts.into_iter().enumerate() {
            let id = post
                .id
                .ok_or_else(|| format!("post at position {} has no id", index + 1))?;
            if id <= prev_id {
                return Err(format!(
                    "post ids must strictly increase: {id} follows {prev_id}"
                ));
            }
            prev_id = id;

            let kind = match (index, post.kind) {
                (0, Some(RawPostKind::First)) => PostKind::First,
                (0, _) => return Err(format!("first post (id {id}) is not the thread root")),
                (_, Some(RawPostKind::First)) => {
                    return Err(format!("post {id} claims to be the thread root"));
                }
                _ => match (post.root_strong_ref, post.parent_strong_ref) {
                    (Some(root_strong_ref), Some(parent_strong_ref)) => PostKind::Reply {
                        root_strong_ref,
                        parent_strong_ref,
                    },
                    _ => return Err(format!("reply {id} is missing its root or parent")),
                },
            };

            posts.push(ThreadPost {
                id,
                message: post.message,
                username: post.username,
                agent_identifier: post.agent_identifier,
                strong_ref: post.strong_ref,
                kind,
            });
        }

        let post_count = raw.post_count.unwrap_or(prev_id);
        if post_count < posts.len() as u64 || post_count < prev_id {
            return Err(format!(
                "postCount {post_count} is behind the stored posts (len {}, last id {prev_id})",
                posts.len()
            ));
        }

        Ok(Self { posts, post_count })
    }

    fn from_legacy(raw: RawConversationStore) -> Self {
        let mut posts: Vec<ThreadPost> = Vec::with_capacity(raw.posts.len());

        for (index, post) in raw.posts.into_iter().enumerate() {
            let kind = match posts.first() {
                None => PostKind::First,
                Some(first) => PostKind::Reply {
                    root_strong_ref: post
                        .root_strong_ref
                        .unwrap_or_else(|| first.strong_ref.clone()),
                    parent_strong_ref: posts[index - 1].strong_ref.clone(),
                },
            };
            posts.push(ThreadPost {
                id: index as u64 + 1,
                message: post.message,
                username: post.username,
                agent_identifier: post.agent_identifier,
                strong_ref: post.strong_ref,
                kind,
            });
        }

        let post_count = raw.post_count.unwrap_or(0).max(posts.len() as u64);
        Self { posts, post_count }
    }

    /// An empty store for a thread that has not started yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> &[ThreadPost] {
        &self.posts
    }

    pub fn post_count(&self) -> u64 {
        self.post_count
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Sequence number the next appended post must carry.
    pub fn next_sequence(&self) -> u64 {
        self.post_count + 1
    }

    /// The thread's first post.
    pub fn first(&self) -> Option<&ThreadPost> {
        self.posts.first()
    }

    /// The most recently stored post.
    pub fn last(&self) -> Option<&ThreadPost> {
        self.posts.last()
    }

    /// Append a post, advancing the running count.
    ///
    /// Only checks that the post carries `post_count + 1`.
    pub fn append(&mut self, post: ThreadPost) -> Result<(), StoreError> {
        let expected = self.next_sequence();
        if post.id != expected {
            return Err(StoreError::SequenceMismatch {
                expected,
                actual: post.id,
            });
        }
        self.posts.push(post);
        self.post_count = expected;
        Ok(())
    }
}
