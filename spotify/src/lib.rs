pub mod auth;
pub mod error;
pub mod model;
pub mod source;
pub mod stream;

use error::{ApiError, Error};
use futures::TryStreamExt;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

pub const PLAYLIST_PAGE_SIZE: u32 = 100;
/// The album tracks endpoint does not accept pages larger than 50.
pub const ALBUM_PAGE_SIZE: u32 = 50;
pub const PLAYLIST_ITEM_FIELDS: &str = "items(added_at,track(name,artists(name))),total,next";

#[macro_export]
macro_rules! api {
    ($path:expr) => {
        reqwest::Url::parse("https://api.spotify.com/v1/").and_then(|url| url.join(&$path))
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Playlist,
    Album,
}

/// Extracts the kind and id from `https://open.spotify.com/{kind}/{id}` and
/// `spotify:{kind}:{id}` links.
pub fn parse_link(link: &url::Url) -> Option<(LinkKind, String)> {
    let segments: Vec<String> = if link.scheme() == "spotify" {
        link.path().split(':').map(str::to_string).collect()
    } else {
        link.path_segments()?.map(str::to_string).collect()
    };
    segments.windows(2).find_map(|pair| {
        let kind = match pair[0].as_str() {
            "playlist" => LinkKind::Playlist,
            "album" => LinkKind::Album,
            _ => return None,
        };
        let id = pair[1].trim();
        (!id.is_empty()).then(|| (kind, id.to_string()))
    })
}

#[derive(Clone)]
pub struct Spotify {
    pub authenticator: Arc<auth::ClientCredentials>,
    pub client: Arc<reqwest::Client>,
}

impl std::fmt::Debug for Spotify {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spotify").finish()
    }
}

impl Spotify {
    pub fn new(creds: auth::Credentials) -> Self {
        let client = Arc::new(reqwest::Client::new());
        Self {
            authenticator: Arc::new(auth::ClientCredentials::new(creds, client.clone())),
            client,
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: String,
        query: &[(&str, String)],
    ) -> Result<T, Error> {
        let url = api!(path)?;
        let res = self
            .client
            .get(url)
            .headers(self.authenticator.auth_headers().await?)
            .query(query)
            .send()
            .await?;
        match res.status() {
            reqwest::StatusCode::NOT_FOUND | reqwest::StatusCode::BAD_REQUEST => {
                Err(Error::NotFound)
            }
            _ => {
                let res = res.error_for_status()?;
                res.json::<T>().await.map_err(Into::into)
            }
        }
    }

    pub async fn album(&self, id: &str) -> Result<model::Album, Error> {
        self.get(format!("albums/{}", id), &[]).await
    }

    pub async fn album_tracks_page(
        &self,
        id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<model::Page<Value>, Error> {
        self.get(
            format!("albums/{}/tracks", id),
            &[("limit", limit.to_string()), ("offset", offset.to_string())],
        )
        .await
    }

    pub async fn playlist(&self, id: &str) -> Result<model::Playlist, Error> {
        self.get(
            format!("playlists/{}", id),
            &[("fields", "name,tracks.total".to_string())],
        )
        .await
    }

    pub async fn playlist_items_page(
        &self,
        id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<model::Page<Value>, Error> {
        self.get(
            format!("playlists/{}/tracks", id),
            &[
                ("fields", PLAYLIST_ITEM_FIELDS.to_string()),
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
            ],
        )
        .await
    }

    /// All raw album track objects in album order.
    pub async fn album_tracks(&self, id: &str) -> Result<Vec<Value>, Error> {
        stream::paginate(
            move |limit, offset| self.album_tracks_page(id, limit, offset),
            ALBUM_PAGE_SIZE,
        )
        .try_collect()
        .await
    }

    /// All raw playlist item objects in playlist order.
    pub async fn playlist_items(&self, id: &str) -> Result<Vec<Value>, Error> {
        stream::paginate(
            move |limit, offset| self.playlist_items_page(id, limit, offset),
            PLAYLIST_PAGE_SIZE,
        )
        .try_collect()
        .await
    }
}

/// Deserializes every item on its own so one malformed entry is skipped
/// instead of failing the whole listing.
pub(crate) fn parse_items<T: DeserializeOwned>(items: Vec<Value>) -> Vec<T> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| match serde_json::from_value::<T>(item) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::debug!(idx, "skipping malformed item: {}", ApiError::from(err));
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn url(s: &str) -> url::Url {
        url::Url::parse(s).expect("valid url")
    }

    #[test]
    fn parses_web_links() {
        assert_eq!(
            parse_link(&url("https://open.spotify.com/playlist/37i9dQZF1DX?si=abc")),
            Some((LinkKind::Playlist, "37i9dQZF1DX".to_string()))
        );
        assert_eq!(
            parse_link(&url("https://open.spotify.com/intl-de/album/4aawyAB9vmqN3uQ7FjRGTy")),
            Some((LinkKind::Album, "4aawyAB9vmqN3uQ7FjRGTy".to_string()))
        );
        assert_eq!(parse_link(&url("https://open.spotify.com/track/abc")), None);
    }

    #[test]
    fn parses_uris() {
        assert_eq!(
            parse_link(&url("spotify:album:4aawyAB9vmqN3uQ7FjRGTy")),
            Some((LinkKind::Album, "4aawyAB9vmqN3uQ7FjRGTy".to_string()))
        );
    }

    #[test]
    fn malformed_items_are_skipped() {
        let items = vec![
            json!({"name": "ok", "artists": [{"name": "A"}]}),
            json!({"artists": "broken"}),
            json!({"name": "also ok", "artists": []}),
        ];
        let parsed: Vec<model::SimplifiedTrack> = parse_items(items);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[1].name, "also ok");
    }
}
