//! Conversation snapshot repository trait.

use threadbot_types::error::StoreError;
use threadbot_types::thread::ConversationStore;

/// Durable storage for the single conversation thread.
///
/// `load` returns [`StoreError::NotFound`] when no snapshot has been written
/// yet. `save` replaces the whole snapshot; readers must never observe a
/// half-written one.
pub trait ConversationRepository: Send + Sync {
    fn load(&self) -> impl std::future::Future<Output = Result<ConversationStore, StoreError>> + Send;

    fn save(
        &self,
        store: &ConversationStore,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

/// Load the snapshot, starting a fresh thread when none exists yet.
///
/// Any other failure is returned to the caller.
pub async fn load_or_empty<R: ConversationRepository>(
    repo: &R,
) -> Result<ConversationStore, StoreError> {
    match repo.load().await {
        Ok(store) => Ok(store),
        Err(StoreError::NotFound) => {
            tracing::info!("no conversation snapshot yet, starting a new thread");
            Ok(ConversationStore::new())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    enum Stub {
        Missing,
        Broken,
        Present(ConversationStore),
    }

    impl ConversationRepository for Stub {
        async fn load(&self) -> Result<ConversationStore, StoreError> {
            match self {
                Stub::Missing => Err(StoreError::NotFound),
                Stub::Broken => Err(StoreError::Io("permission denied".to_string())),
                Stub::Present(store) => Ok(store.clone()),
            }
        }

        async fn save(&self, _store: &ConversationStore) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_missing_snapshot_starts_empty() {
        let store = load_or_empty(&Stub::Missing).await.unwrap();
        assert!(store.is_empty());
        assert_eq!(store.post_count(), 0);
    }

    #[tokio::test]
    async fn test_io_failure_propagates() {
        let err = load_or_empty(&Stub::Broken).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[tokio::test]
    async fn test_present_snapshot_returned() {
        let store = load_or_empty(&Stub::Present(ConversationStore::new()))
            .await
            .unwrap();
        assert!(store.is_empty());
    }
}
