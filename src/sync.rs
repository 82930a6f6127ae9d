//! One sync pass over every configured playlist.

use crate::normalize::folder_name;
use crate::orchestrate::{self, FetchReport};
use crate::state::PassGuard;
use crate::{notify, Engine, Error};
use chrono::NaiveDateTime;
use library::Library;
use playsync_model::PlaylistEntry;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistReport {
    pub name: String,
    pub tracks: usize,
    pub candidates: usize,
    pub fetch: FetchReport,
    pub song_count: usize,
    pub synced_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub playlists: Vec<PlaylistReport>,
    /// Playlists whose resolution or folder handling failed.
    pub failed: Vec<String>,
    pub media_refresh_owed: bool,
    /// Number of media servers that accepted a refresh.
    pub notified: usize,
    /// Whether the pass reached persistence, as opposed to ending on an error.
    pub completed: bool,
}

impl Engine {
    /// Runs a pass on the calling task unless one is already running.
    pub async fn sync_now(&self) -> Option<PassReport> {
        let guard = match self.state.try_begin() {
            Some(guard) => guard,
            None => {
                tracing::warn!("sync already in progress");
                return None;
            }
        };
        match self.spawn_pass(guard).await {
            Ok(report) => Some(report),
            Err(err) => {
                tracing::error!("sync pass panicked: {}", err);
                Some(PassReport::default())
            }
        }
    }

    /// Starts a pass on its own task unless one is already running.
    pub fn trigger(&self) -> Option<JoinHandle<PassReport>> {
        let guard = match self.state.try_begin() {
            Some(guard) => guard,
            None => {
                tracing::warn!("manual sync ignored, sync already in progress");
                return None;
            }
        };
        tracing::info!("manual sync triggered");
        Some(self.spawn_pass(guard))
    }

    fn spawn_pass(&self, guard: PassGuard) -> JoinHandle<PassReport> {
        let engine = self.clone();
        tokio::spawn(async move {
            let _guard = guard;
            match engine.pass().await {
                Ok(report) => {
                    tracing::info!(
                        playlists = report.playlists.len(),
                        failed = report.failed.len(),
                        "sync completed successfully"
                    );
                    report
                }
                Err(err) => {
                    tracing::error!("sync pass aborted: {}", err);
                    PassReport {
                        media_refresh_owed: engine.state.media_refresh_owed(),
                        ..PassReport::default()
                    }
                }
            }
        })
    }

    async fn pass(&self) -> Result<PassReport, Error> {
        self.state.reset_refresh_owed();
        tracing::info!("sync task started");

        let (entries, library) = {
            let config = self.config.read().await;
            (config.sync_list.to_vec(), config.library.clone())
        };

        let mut report = PassReport::default();
        for entry in &entries {
            match self.sync_playlist(entry, &library).await {
                Ok(playlist) => report.playlists.push(playlist),
                Err(err) => {
                    tracing::error!(playlist = %entry.name, "playlist sync failed: {}", err);
                    report.failed.push(entry.name.clone());
                }
            }
        }

        let (snapshot, settings) = {
            let mut config = self.config.write().await;
            for playlist in &report.playlists {
                // the list may have been edited while the pass was running
                if let Some(entry) = config
                    .sync_list
                    .iter_mut()
                    .find(|entry| entry.name == playlist.name)
                {
                    entry.song_count = playlist.song_count;
                    entry.last_synced_at = Some(playlist.synced_at);
                }
            }
            config.save_sync_list().await?;
            (config.sync_list.clone(), config.settings.clone())
        };
        self.publish(snapshot);
        report.completed = true;

        report.media_refresh_owed = self.state.media_refresh_owed();
        if report.media_refresh_owed {
            let notifiers = (self.notifiers)(&settings);
            if !notifiers.is_empty() {
                report.notified = notify::refresh_all(&notifiers).await;
            }
        }
        Ok(report)
    }

    async fn sync_playlist(
        &self,
        entry: &PlaylistEntry,
        library: &Library,
    ) -> Result<PlaylistReport, Error> {
        tracing::info!(playlist = %entry.name, "looking for playlist songs");
        let folder = folder_name(&entry.name)
            .map(|name| library.playlist_dir(&name))
            .ok_or_else(|| Error::InvalidPlaylistName(entry.name.clone()))?;
        let tracks = self.resolver.resolve(&entry.link).await?;

        tokio::fs::create_dir_all(&folder).await?;
        let candidates = self.orchestrator.build_candidates(&tracks, &folder).await?;
        let num_candidates = candidates.len();

        tracing::info!(playlist = %entry.name, candidates = num_candidates, "starting downloading list");
        let fetch = self
            .orchestrator
            .fetch_all(candidates, &folder, Duration::from_secs(entry.sleep))
            .await;
        tracing::info!(
            playlist = %entry.name,
            fetched = fetch.fetched,
            failed = fetch.failed,
            "finished downloading list"
        );

        let song_count = orchestrate::count_files(&folder).await?;
        tracing::info!(playlist = %entry.name, song_count, "files in directory");
        Ok(PlaylistReport {
            name: entry.name.clone(),
            tracks: tracks.len(),
            candidates: num_candidates,
            fetch,
            song_count,
            synced_at: chrono::Local::now().naive_local(),
        })
    }
}
