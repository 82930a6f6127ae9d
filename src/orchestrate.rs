use crate::matching::LinkMatcher;
use crate::normalize::{normalize, normalize_file_name};
use crate::state::SyncState;
use futures::stream::{self, StreamExt};
use playsync_model::sink::Sink;
use playsync_model::{watch_url, CanonicalTrack, DownloadCandidate};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

pub type DynSink = Arc<dyn Sink>;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchReport {
    pub attempted: usize,
    pub fetched: usize,
    pub failed: usize,
}

/// Leftovers of an interrupted or failed yt-dlp run.
const LEFTOVER_EXTENSIONS: [&str; 4] = ["part", "ytdl", "temp", "webp"];

/// Regular files in `folder` that are not download leftovers.
async fn song_files(folder: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(folder).await?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        let path = entry.path();
        let leftover = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| {
                LEFTOVER_EXTENSIONS
                    .iter()
                    .any(|leftover| ext.eq_ignore_ascii_case(leftover))
            });
        if !leftover {
            files.push(path);
        }
    }
    Ok(files)
}

/// Normalized names of the songs already in `folder`.
///
/// A missing folder has no songs.
pub async fn existing_names(folder: &Path) -> std::io::Result<HashSet<String>> {
    match song_files(folder).await {
        Ok(files) => Ok(files
            .iter()
            .filter_map(|path| path.file_name())
            .map(normalize_file_name)
            .collect()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(HashSet::new()),
        Err(err) => Err(err),
    }
}

/// Number of songs in `folder`.
pub async fn count_files(folder: &Path) -> std::io::Result<usize> {
    Ok(song_files(folder).await?.len())
}

enum Lookup {
    Known(String),
    Search(CanonicalTrack),
}

/// Turns tracks into downloads: skips what is on disk, matches the rest and
/// fetches the candidates, each stage on a pool of `concurrency` workers.
#[derive(Clone)]
pub struct DownloadOrchestrator {
    matcher: LinkMatcher,
    sink: DynSink,
    state: Arc<SyncState>,
    concurrency: usize,
}

impl std::fmt::Debug for DownloadOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadOrchestrator")
            .field("matcher", &self.matcher)
            .field("concurrency", &self.concurrency)
            .finish()
    }
}

impl DownloadOrchestrator {
    pub fn new(
        matcher: LinkMatcher,
        sink: DynSink,
        state: Arc<SyncState>,
        concurrency: usize,
    ) -> Self {
        Self {
            matcher,
            sink,
            state,
            concurrency: concurrency.max(1),
        }
    }

    /// Candidates for every track that is not yet present in `folder`, in
    /// track order. Tracks without a match are logged and left out.
    pub async fn build_candidates(
        &self,
        tracks: &[CanonicalTrack],
        folder: &Path,
    ) -> std::io::Result<Vec<DownloadCandidate>> {
        let existing = existing_names(folder).await?;

        let mut lookups: Vec<(String, Lookup)> = Vec::new();
        for track in tracks {
            let destination_title = normalize(&track.file_stem());
            if existing.contains(&destination_title) {
                tracing::info!(song = %destination_title, "file already in folder");
                continue;
            }
            let lookup = match &track.known_media_id {
                Some(id) => Lookup::Known(watch_url(id)),
                None => {
                    tracing::info!(song = %destination_title, "searching for song");
                    Lookup::Search(track.clone())
                }
            };
            lookups.push((destination_title, lookup));
        }

        let matcher = &self.matcher;
        let resolved: Vec<(String, Option<String>)> = stream::iter(lookups)
            .map(|(destination_title, lookup)| async move {
                let uri = match lookup {
                    Lookup::Known(uri) => Some(uri),
                    Lookup::Search(track) => matcher.find(&track.artist, &track.title).await,
                };
                (destination_title, uri)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        Ok(resolved
            .into_iter()
            .filter_map(|(destination_title, uri)| match uri {
                Some(source_uri) => {
                    tracing::info!(song = %destination_title, link = %source_uri, "added song to download list");
                    Some(DownloadCandidate {
                        destination_title,
                        source_uri,
                    })
                }
                None => {
                    tracing::error!(song = %destination_title, "no link found");
                    None
                }
            })
            .collect())
    }

    /// Fetches every candidate into `folder` and waits for all of them.
    ///
    /// `delay` is slept after each successful fetch. Failed fetches are
    /// logged and not retried.
    pub async fn fetch_all(
        &self,
        candidates: Vec<DownloadCandidate>,
        folder: &Path,
        delay: Duration,
    ) -> FetchReport {
        let attempted = candidates.len();
        let sink = &self.sink;
        let state = &self.state;
        let results: Vec<bool> = stream::iter(candidates)
            .map(|candidate| async move {
                state.mark_refresh_owed();
                let destination = folder.join(&candidate.destination_title);
                tracing::info!(link = %candidate.source_uri, "download started");
                match sink.fetch(&candidate.source_uri, &destination).await {
                    Ok(()) => {
                        tracing::info!(link = %candidate.source_uri, "download complete");
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        true
                    }
                    Err(err) => {
                        tracing::error!(
                            link = %candidate.source_uri,
                            "error downloading song: {}", err
                        );
                        false
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let fetched = results.iter().filter(|ok| **ok).count();
        FetchReport {
            attempted,
            fetched,
            failed: attempted - fetched,
        }
    }
}
