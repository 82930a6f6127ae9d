use chrono::{DateTime, Utc};
use playsync_model::CanonicalTrack;
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u32,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SimplifiedArtist {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SimplifiedTrack {
    pub name: String,
    pub artists: Vec<SimplifiedArtist>,
}

impl SimplifiedTrack {
    pub fn artist_string(&self) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<&str>>()
            .join(", ")
    }

    pub fn into_canonical(self, folder: &str) -> CanonicalTrack {
        CanonicalTrack::new(self.artist_string(), self.name, folder)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlaylistItem {
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    pub track: Option<SimplifiedTrack>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Album {
    pub name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PlaylistTracksRef {
    pub total: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Playlist {
    pub name: String,
    pub tracks: PlaylistTracksRef,
}

/// Sorts playlist items by the time they were added, oldest first.
/// Items without a timestamp keep their relative order at the end.
pub fn sort_by_added_at(items: &mut [PlaylistItem]) {
    use std::cmp::Ordering;
    items.sort_by(|a, b| match (&a.added_at, &b.added_at) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}
