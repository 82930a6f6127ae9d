pub mod notify;
pub mod search;
pub mod serialization;
pub mod sink;
pub mod source;

use serde::{Deserialize, Serialize};
use std::fmt;

pub const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Source URI of a video on the video platform.
pub fn watch_url(video_id: &str) -> String {
    format!("{}{}", WATCH_URL, video_id)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Service {
    Spotify,
    Youtube,
}

impl Service {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            Service::Spotify => "SPOTIFY",
            Service::Youtube => "YOUTUBE",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_name())
    }
}

/// Resolved track metadata, independent of the catalog it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalTrack {
    /// Display string of all artists joined by `", "`.
    pub artist: String,
    pub title: String,
    /// Name of the playlist or album the track was resolved from.
    pub folder: String,
    /// Set when the track already is a downloadable item and needs no matching.
    pub known_media_id: Option<String>,
}

impl CanonicalTrack {
    pub fn new(artist: impl Into<String>, title: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            artist: artist.into(),
            title: title.into(),
            folder: folder.into(),
            known_media_id: None,
        }
    }

    pub fn with_media_id(mut self, id: impl Into<String>) -> Self {
        self.known_media_id = Some(id.into());
        self
    }

    /// Raw (not yet normalized) file stem `"{title} - {artist}"`.
    pub fn file_stem(&self) -> String {
        format!("{} - {}", self.title, self.artist)
    }
}

impl fmt::Display for CanonicalTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist, self.title)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DownloadCandidate {
    pub destination_title: String,
    pub source_uri: String,
}

/// A configured sync target.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Link")]
    pub link: String,
    /// Delay in seconds applied after every successful download.
    #[serde(
        rename = "Sleep",
        default,
        deserialize_with = "serialization::ok_or_default"
    )]
    pub sleep: u64,
    #[serde(rename = "Song_Count", default)]
    pub song_count: usize,
    #[serde(rename = "Last_Synced", default, with = "serialization::last_synced")]
    pub last_synced_at: Option<chrono::NaiveDateTime>,
}

impl PlaylistEntry {
    pub fn new(name: impl Into<String>, link: impl Into<String>, sleep: u64) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
            sleep,
            song_count: 0,
            last_synced_at: None,
        }
    }
}
