use crate::domain::model::{NotificationTarget, Settings};
use crate::domain::ports::SettingsStore;
use crate::utils::error::{CheckerError, Result};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

pub const DEFAULT_SETTINGS_FILE: &str = "settings.json";

/// Settings kept in a JSON file. Saves go through a temp file and a rename so
/// the file on disk is always either the old or the new document.
#[derive(Debug, Clone)]
pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SettingsStore for JsonFileSettingsStore {
    async fn load(&self) -> Result<Settings> {
        match tokio::fs::read(&self.path).await {
            Ok(data) => {
                let settings = serde_json::from_slice(&data).map_err(|e| {
                    CheckerError::SettingsError {
                        message: format!("{} is not valid settings JSON: {}", self.path.display(), e),
                    }
                })?;
                Ok(settings)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No settings file yet, using defaults");
                Ok(Settings::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, settings: &Settings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let data = serde_json::to_vec(settings)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &data).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        tracing::debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

/// The configured notification target, loaded once and updated through `set`.
/// `set` holds the write lock until the store has persisted the new value, so
/// readers never observe a target that is not on disk.
pub struct TargetSettings<S: SettingsStore> {
    store: S,
    current: RwLock<Option<NotificationTarget>>,
}

impl<S: SettingsStore> TargetSettings<S> {
    pub async fn load(store: S) -> Result<Self> {
        let settings = store.load().await?;
        let current = settings.target();
        match &current {
            Some(target) => tracing::info!(number = %target.identifier(), "Loaded notification target"),
            None => tracing::info!("No notification target configured"),
        }

        Ok(Self {
            store,
            current: RwLock::new(current),
        })
    }

    pub async fn current(&self) -> Option<NotificationTarget> {
        self.current.read().await.clone()
    }

    /// Persists `target` and makes it current. On a storage error the previous
    /// target stays in effect.
    pub async fn set(&self, target: NotificationTarget) -> Result<()> {
        let mut current = self.current.write().await;
        self.store
            .save(&Settings::with_target(&target))
            .await
            .map_err(|e| match e {
                CheckerError::SettingsError { .. } => e,
                other => CheckerError::SettingsError {
                    message: other.to_string(),
                },
            })?;

        tracing::info!(number = %target.identifier(), "Notification target updated");
        *current = Some(target);
        Ok(())
    }
}
