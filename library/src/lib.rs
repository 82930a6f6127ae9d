mod config;
mod persist;
pub mod schedule;
mod settings;
mod sync_list;

pub use config::{Config, ConfigError, SETTINGS_FILE, SYNC_LIST_FILE};
pub use persist::Persist;
pub use settings::Settings;
pub use sync_list::SyncList;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root folder of the local audio library; every playlist syncs into a
/// subfolder named after it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Library {
    pub path: PathBuf,
}

impl Library {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn playlist_dir(&self, playlist_name: &str) -> PathBuf {
        self.path.join(playlist_name)
    }
}

impl Default for Library {
    fn default() -> Self {
        let path = dirs::audio_dir()
            .or_else(dirs::download_dir)
            .map(|dir| dir.join("playsync"))
            .unwrap_or_else(|| PathBuf::from("download"));
        Library { path }
    }
}
