//! JSON snapshot repository.
//!
//! The whole [`ConversationStore`] lives in one pretty-printed JSON file. Saves
//! write a sibling temp file and rename it over the snapshot, so a reader sees
//! either the old file or the new one, never a partial write.

use std::path::{Path, PathBuf};

use threadbot_core::repository::conversation::ConversationRepository;
use threadbot_types::error::StoreError;
use threadbot_types::thread::ConversationStore;

/// File-backed [`ConversationRepository`].
#[derive(Debug, Clone)]
pub struct JsonSnapshotRepository {
    path: PathBuf,
}

impl JsonSnapshotRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Temp file used while saving: `{name}.tmp` next to the snapshot.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl ConversationRepository for JsonSnapshotRepository {
    async fn load(&self) -> Result<ConversationStore, StoreError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound);
            }
            Err(err) => {
                return Err(StoreError::Io(format!(
                    "failed to read {}: {err}",
                    self.path.display()
                )));
            }
        };

        let store: ConversationStore = serde_json::from_str(&content).map_err(|e| {
            StoreError::Serialization(format!("failed to parse {}: {e}", self.path.display()))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            posts = store.post_count(),
            "snapshot loaded"
        );
        Ok(store)
    }

    async fn save(&self, store: &ConversationStore) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(store)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::Io(format!("failed to create {}: {e}", parent.display())))?;
            }
        }

        let temp = self.temp_path();
        if let Err(e) = tokio::fs::write(&temp, json).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StoreError::Io(format!(
                "failed to write {}: {e}",
                temp.display()
            )));
        }

        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(StoreError::Io(format!(
                "failed to replace {}: {e}",
                self.path.display()
            )));
        }

        tracing::info!(
            path = %self.path.display(),
            posts = store.post_count(),
            "snapshot saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use threadbot_types::thread::{PostKind, StrongRef, ThreadPost};

    fn first_post() -> ThreadPost {
        ThreadPost {
            id: 1,
            message: "We are a metahuman species.".to_string(),
            username: "Mark Zuckerberg".to_string(),
            agent_identifier: "zuck.bsky.social".to_string(),
            strong_ref: StrongRef {
                uri: "at://did:plc:zuck/app.bsky.feed.post/3k".to_string(),
                cid: "bafyreia".to_string(),
            },
            kind: PostKind::First,
        }
    }

    #[tokio::test]
    async fn test_load_missing_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonSnapshotRepository::new(tmp.path().join("post.json"));
        assert!(matches!(repo.load().await, Err(StoreError::NotFound)));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonSnapshotRepository::new(tmp.path().join("post.json"));

        let mut store = ConversationStore::new();
        store.append(first_post()).unwrap();
        repo.save(&store).await.unwrap();

        let loaded = repo.load().await.unwrap();
        assert_eq!(loaded, store);
        assert!(!repo.temp_path().exists());
    }

    #[tokio::test]
    async fn test_save_overwrites_wholesale() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("post.json");
        tokio::fs::write(&path, "{\"posts\": [], \"postCount\": 0, \"junk\": true}")
            .await
            .unwrap();
        let repo = JsonSnapshotRepository::new(&path);

        let mut store = ConversationStore::new();
        store.append(first_post()).unwrap();
        repo.save(&store).await.unwrap();

        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(!raw.contains("junk"));
        assert!(raw.contains("\"postCount\": 1"));
    }

    #[tokio::test]
    async fn test_save_creates_parent_dirs() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonSnapshotRepository::new(tmp.path().join("a").join("b").join("post.json"));
        repo.save(&ConversationStore::new()).await.unwrap();
        assert!(repo.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_serialization_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("post.json");
        tokio::fs::write(&path, "{ not json").await.unwrap();
        let repo = JsonSnapshotRepository::new(&path);

        assert!(matches!(
            repo.load().await,
            Err(StoreError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_directory_in_place_of_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonSnapshotRepository::new(tmp.path());
        assert!(matches!(repo.load().await, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn test_failed_write_keeps_old_snapshot() {
        let tmp = TempDir::new().unwrap();
        let repo = JsonSnapshotRepository::new(tmp.path().join("post.json"));
        repo.save(&ConversationStore::new()).await.unwrap();
        let before = tokio::fs::read(repo.path()).await.unwrap();

        // A directory squatting on the temp path makes the write fail.
        tokio::fs::create_dir(repo.temp_path()).await.unwrap();

        let mut store = ConversationStore::new();
        store.append(first_post()).unwrap();
        let err = repo.save(&store).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        assert_eq!(tokio::fs::read(repo.path()).await.unwrap(), before);
        assert!(repo.temp_path().is_dir());
    }

    #[tokio::test]
    async fn test_failed_rename_removes_temp_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("post.json");
        // A non-empty directory at the snapshot path cannot be replaced.
        tokio::fs::create_dir(&path).await.unwrap();
        tokio::fs::write(path.join("keep"), "x").await.unwrap();
        let repo = JsonSnapshotRepository::new(&path);

        let mut store = ConversationStore::new();
        store.append(first_post()).unwrap();
        let err = repo.save(&store).await.unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));

        assert!(!repo.temp_path().exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn test_temp_path_is_sibling() {
        let repo = JsonSnapshotRepository::new("/var/lib/threadbot/post.json");
        assert_eq!(
            repo.temp_path(),
            PathBuf::from("/var/lib/threadbot/post.json.tmp")
        );
    }
}
