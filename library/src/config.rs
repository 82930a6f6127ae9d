use super::{Library, Persist, Settings, SyncList};
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "settings_config.json";
pub const SYNC_LIST_FILE: &str = "sync_list.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io error reading or writing config: {0}")]
    IO(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),
}

#[derive(Clone, Debug)]
pub struct Config {
    pub config_dir: PathBuf,
    pub settings_file: PathBuf,
    pub sync_list_file: PathBuf,
    pub library: Library,
    pub settings: Settings,
    pub sync_list: SyncList,
}

impl Config {
    /// Opens the configuration in `config_dir`, creating the folders and any
    /// missing file with defaults.
    ///
    /// A file that exists but cannot be read is logged and left untouched so
    /// that it is not overwritten with defaults.
    pub async fn open<T: AsRef<Path> + Send + Sync>(
        config_dir: T,
        library: Library,
    ) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref().to_owned();
        let settings_file = config_dir.join(SETTINGS_FILE);
        let sync_list_file = config_dir.join(SYNC_LIST_FILE);

        tokio::fs::create_dir_all(&config_dir).await?;
        tokio::fs::create_dir_all(&library.path).await?;

        let settings = load_or_create::<Settings>(&settings_file).await?.sanitized();
        let sync_list = load_or_create::<SyncList>(&sync_list_file).await?;

        tracing::info!(
            library = %library.path.display(),
            playlists = sync_list.len(),
            sync_start_times = ?settings.sync_start_times,
            "loaded configuration"
        );
        Ok(Self {
            config_dir,
            settings_file,
            sync_list_file,
            library,
            settings,
            sync_list,
        })
    }

    pub async fn save_settings(&self) -> Result<(), ConfigError> {
        self.settings.save(&self.settings_file).await
    }

    pub async fn save_sync_list(&self) -> Result<(), ConfigError> {
        self.sync_list.save(&self.sync_list_file).await
    }
}

async fn load_or_create<T>(file: &Path) -> Result<T, ConfigError>
where
    T: Persist + Default,
{
    match T::load(file).await {
        Ok(value) => Ok(value),
        Err(ConfigError::IO(err)) if err.kind() == std::io::ErrorKind::NotFound => {
            let value = T::default();
            value.save(file).await?;
            Ok(value)
        }
        Err(err) => {
            tracing::error!(file = %file.display(), "error loading config: {}", err);
            Ok(T::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use playsync_model::PlaylistEntry;

    #[tokio::test]
    async fn creates_missing_files_with_defaults() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let library = Library::new(dir.path().join("download"));
        let config = Config::open(dir.path().join("config"), library).await?;
        assert_eq!(config.settings, Settings::default());
        assert!(config.sync_list.is_empty());
        assert!(config.settings_file.exists());
        assert!(config.sync_list_file.exists());
        assert!(dir.path().join("download").is_dir());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_file_keeps_defaults_and_is_not_overwritten() -> Result<()> {
        let dir = tempfile::tempdir()?;
        tokio::fs::write(dir.path().join(SETTINGS_FILE), "{ not json").await?;
        let config = Config::open(dir.path(), Library::new(dir.path().join("lib"))).await?;
        assert_eq!(config.settings.sync_start_times, vec![0]);
        let raw = tokio::fs::read_to_string(dir.path().join(SETTINGS_FILE)).await?;
        assert_eq!(raw, "{ not json");
        Ok(())
    }

    #[tokio::test]
    async fn sync_list_survives_reopen() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let library = Library::new(dir.path().join("lib"));
        let mut config = Config::open(dir.path(), library.clone()).await?;
        config
            .sync_list
            .upsert(PlaylistEntry::new("Focus", "https://open.spotify.com/playlist/x", 1));
        config.save_sync_list().await?;

        let reopened = Config::open(dir.path(), library).await?;
        assert_eq!(reopened.sync_list.len(), 1);
        assert_eq!(reopened.sync_list[0].name, "Focus");
        Ok(())
    }
}
