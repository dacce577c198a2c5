//! Application state wiring the engine together.
//!
//! `AppState` holds the loaded config. Inspection commands only need that;
//! `build_engine` resolves secrets and pins the engine to the concrete infra
//! implementations.

use std::path::{Path, PathBuf};

use threadbot_core::thread::engine::{EngineOptions, ThreadEngine};
use threadbot_core::thread::registry::PersonaRegistry;
use threadbot_infra::config::{
    load_config, resolve_config_path, resolve_data_dir, resolve_settings, resolve_snapshot_path,
};
use threadbot_infra::feed::BlueskyClient;
use threadbot_infra::llm::create_provider;
use threadbot_infra::secret::EnvSecretProvider;
use threadbot_infra::storage::JsonSnapshotRepository;
use threadbot_types::config::AppConfig;

/// The engine pinned to the snapshot file, Bluesky and the env secret store.
pub type ConcreteEngine = ThreadEngine<JsonSnapshotRepository, BlueskyClient>;

pub struct AppState {
    pub data_dir: PathBuf,
    pub config_path: PathBuf,
    pub config: AppConfig,
}

impl AppState {
    /// Resolve the data dir and load the config file.
    pub async fn load(config_flag: Option<&Path>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config_path = resolve_config_path(config_flag, &data_dir);
        let config = load_config(&config_path).await?;

        Ok(Self {
            data_dir,
            config_path,
            config,
        })
    }

    pub fn snapshot_path(&self) -> PathBuf {
        resolve_snapshot_path(&self.config.snapshot_path, &self.data_dir)
    }

    pub fn snapshot_repository(&self) -> JsonSnapshotRepository {
        JsonSnapshotRepository::new(self.snapshot_path())
    }

    /// Resolve secrets and build the engine. Fails before anything is posted
    /// if a credential is missing or the backend config is invalid.
    pub async fn build_engine(self) -> anyhow::Result<ConcreteEngine> {
        let settings = resolve_settings(self.config, &self.data_dir, &EnvSecretProvider::new()).await?;

        let registry = PersonaRegistry::new(settings.personas)?;
        let provider = create_provider(&settings.provider)?;
        let feed = BlueskyClient::new(&settings.feed_service)?;
        let options = EngineOptions {
            sampling: settings.provider.sampling.clone(),
            max_post_length: settings.max_post_length,
        };

        tracing::debug!(
            config = %self.config_path.display(),
            personas = registry.len(),
            "engine ready"
        );

        Ok(ThreadEngine::new(
            JsonSnapshotRepository::new(settings.snapshot_path),
            feed,
            provider,
            registry,
            options,
        ))
    }
}
