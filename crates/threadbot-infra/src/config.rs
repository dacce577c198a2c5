//! Configuration loading for threadbot.
//!
//! Reads `threadbot.toml` (by default from the data directory, `~/.threadbot/`
//! in production) into [`AppConfig`], then resolves it against a
//! [`SecretProvider`] into validated [`Settings`]. Everything here runs once at
//! startup; any error is fatal before the thread is touched.

use std::path::{Path, PathBuf};

use secrecy::SecretString;
use threadbot_core::repository::secret::SecretProvider;
use threadbot_types::config::{AppConfig, ProviderSettings, Settings};
use threadbot_types::error::{ConfigError, SecretError};
use threadbot_types::persona::{Persona, PersonaCredentials};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "THREADBOT_DATA_DIR";

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "THREADBOT_CONFIG";

pub const CONFIG_FILE_NAME: &str = "threadbot.toml";

/// Resolve the data directory.
///
/// Uses `THREADBOT_DATA_DIR` if set, then `~/.threadbot`, then `.threadbot`
/// in the current directory.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".threadbot");
    }

    PathBuf::from(".threadbot")
}

/// Resolve the config file path: explicit flag, then `THREADBOT_CONFIG`, then
/// `{data_dir}/threadbot.toml`.
pub fn resolve_config_path(explicit: Option<&Path>, data_dir: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }
    data_dir.join(CONFIG_FILE_NAME)
}

/// Relative snapshot paths resolve against the data directory.
pub fn resolve_snapshot_path(snapshot_path: &Path, data_dir: &Path) -> PathBuf {
    if snapshot_path.is_absolute() {
        snapshot_path.to_path_buf()
    } else {
        data_dir.join(snapshot_path)
    }
}

/// Load `threadbot.toml` from `path`.
///
/// - Missing file: [`AppConfig::default()`] (stock personas, Replicate backend).
/// - Unreadable or malformed file: an error. A typo in the config must not
///   silently fall back to the stock personas.
pub async fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(AppConfig::default());
        }
        Err(err) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    let config = toml::from_str::<AppConfig>(&content).map_err(|err| ConfigError::Parse {
        path: path.display().to_string(),
        message: err.to_string(),
    })?;

    tracing::debug!(
        path = %path.display(),
        personas = config.personas.len(),
        provider = %config.provider.kind,
        "config loaded"
    );
    Ok(config)
}

/// Resolve `config` into validated [`Settings`].
///
/// Every persona credential and the backend API key are looked up through
/// `secrets`. All missing variables are reported together in one
/// [`ConfigError::MissingSecret`], comma-separated.
pub async fn resolve_settings<S: SecretProvider>(
    config: AppConfig,
    data_dir: &Path,
    secrets: &S,
) -> Result<Settings, ConfigError> {
    if config.personas.is_empty() {
        return Err(ConfigError::Invalid(
            "at least one persona must be configured".to_string(),
        ));
    }
    if config.max_post_length == 0 {
        return Err(ConfigError::Invalid(
            "max_post_length must be greater than zero".to_string(),
        ));
    }

    let mut missing: Vec<String> = Vec::new();

    let mut personas = Vec::with_capacity(config.personas.len());
    for def in config.personas {
        let identifier = lookup(secrets, &def.identifier_env, &mut missing).await?;
        let password = lookup(secrets, &def.password_env, &mut missing).await?;
        if let (Some(identifier), Some(password)) = (identifier, password) {
            personas.push(Persona {
                handle: def.handle,
                display_name: def.display_name,
                system_prompt: def.system_prompt,
                credentials: PersonaCredentials::new(identifier, password),
            });
        }
    }

    let kind = config.provider.kind;
    let key_env = config
        .provider
        .api_key_env
        .unwrap_or_else(|| kind.default_api_key_env().to_string());
    let api_key = lookup(secrets, &key_env, &mut missing).await?;

    if !missing.is_empty() {
        return Err(ConfigError::MissingSecret(missing.join(", ")));
    }
    let Some(api_key) = api_key else {
        return Err(ConfigError::MissingSecret(key_env));
    };

    let snapshot_path = resolve_snapshot_path(&config.snapshot_path, data_dir);

    let provider = ProviderSettings {
        kind,
        model: config
            .provider
            .model
            .unwrap_or_else(|| kind.default_model().to_string()),
        api_key: SecretString::from(api_key),
        base_url: config.provider.base_url,
        sampling: config.sampling,
    };

    tracing::info!(
        personas = personas.len(),
        provider = %provider.kind,
        model = %provider.model,
        snapshot = %snapshot_path.display(),
        "settings resolved"
    );

    Ok(Settings {
        personas,
        provider,
        feed_service: config.feed.service,
        snapshot_path,
        schedule: config.schedule,
        max_post_length: config.max_post_length,
    })
}

async fn lookup<S: SecretProvider>(
    secrets: &S,
    key: &str,
    missing: &mut Vec<String>,
) -> Result<Option<String>, ConfigError> {
    match secrets.get(key).await {
        Ok(Some(value)) => Ok(Some(value)),
        Ok(None) => {
            if !missing.iter().any(|m| m == key) {
                missing.push(key.to_string());
            }
            Ok(None)
        }
        Err(SecretError::InvalidEncoding(name)) => Err(ConfigError::Invalid(format!(
            "environment variable '{name}' is not valid unicode"
        ))),
        Err(err) => Err(ConfigError::Invalid(err.to_string())),
    }
}
