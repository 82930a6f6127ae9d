use crate::error::Error;
use crate::{model, parse_items, parse_link, LinkKind, Spotify};
use playsync_model::{source, CanonicalTrack, Service};
use serde_json::Value;

/// Converts raw playlist items into tracks ordered by the time they were added.
pub fn playlist_tracks(playlist_name: &str, items: Vec<Value>) -> Vec<CanonicalTrack> {
    let mut items: Vec<model::PlaylistItem> = parse_items(items);
    model::sort_by_added_at(&mut items);
    items
        .into_iter()
        .filter_map(|item| item.track)
        .map(|track| track.into_canonical(playlist_name))
        .collect()
}

/// Converts raw album tracks into tracks in album order.
pub fn album_tracks(album_name: &str, items: Vec<Value>) -> Vec<CanonicalTrack> {
    parse_items::<model::SimplifiedTrack>(items)
        .into_iter()
        .map(|track| track.into_canonical(album_name))
        .collect()
}

impl Spotify {
    async fn resolve_album(&self, id: &str) -> Result<Vec<CanonicalTrack>, Error> {
        let album = self.album(id).await?;
        let items = self.album_tracks(id).await?;
        tracing::debug!(album = %album.name, items = items.len(), "fetched album");
        Ok(album_tracks(&album.name, items))
    }

    async fn resolve_playlist(&self, id: &str) -> Result<Vec<CanonicalTrack>, Error> {
        let playlist = self.playlist(id).await?;
        if playlist.tracks.total == 0 {
            return Ok(Vec::new());
        }
        let items = self.playlist_items(id).await?;
        tracing::debug!(
            playlist = %playlist.name,
            total = playlist.tracks.total,
            items = items.len(),
            "fetched playlist"
        );
        Ok(playlist_tracks(&playlist.name, items))
    }
}

#[async_trait::async_trait]
impl source::Source for Spotify {
    fn id(&self) -> Service {
        Service::Spotify
    }

    fn handles(&self, link: &url::Url) -> bool {
        link.scheme() == "spotify"
            || link
                .host_str()
                .map(|host| host == "spotify.com" || host.ends_with(".spotify.com"))
                .unwrap_or(false)
    }

    async fn resolve(&self, link: &url::Url) -> Result<Vec<CanonicalTrack>, source::Error> {
        let (kind, id) = parse_link(link)
            .ok_or_else(|| source::Error::invalid_link(link, "expected a playlist or album"))?;
        let tracks = match kind {
            LinkKind::Album => self.resolve_album(&id).await,
            LinkKind::Playlist => self.resolve_playlist(&id).await,
        }
        .map_err(source::Error::custom)?;
        if tracks.is_empty() {
            return Err(source::Error::Empty(link.to_string()));
        }
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Credentials;
    use playsync_model::source::Source;
    use serde_json::json;

    #[test]
    fn playlist_items_follow_chronology_and_skip_broken_entries() {
        let items = vec![
            json!({"added_at": "2023-02-01T00:00:00Z", "track": {"name": "Second", "artists": [{"name": "B"}]}}),
            json!({"added_at": "2023-01-01T00:00:00Z", "track": {"name": "First", "artists": [{"name": "A"}, {"name": "C"}]}}),
            json!({"added_at": "2023-03-01T00:00:00Z", "track": null}),
            json!({"added_at": "2023-04-01T00:00:00Z", "track": {"name": 42}}),
        ];
        let tracks = playlist_tracks("Road Trip", items);
        assert_eq!(
            tracks,
            vec![
                CanonicalTrack::new("A, C", "First", "Road Trip"),
                CanonicalTrack::new("B", "Second", "Road Trip"),
            ]
        );
    }

    #[test]
    fn album_keeps_track_order() {
        let items = vec![
            json!({"name": "Intro", "artists": [{"name": "X"}]}),
            json!({"name": "Outro", "artists": [{"name": "X"}]}),
        ];
        let titles: Vec<_> = album_tracks("LP", items).into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["Intro", "Outro"]);
    }

    #[test]
    fn handles_spotify_links_only() {
        let spotify = Spotify::new(Credentials::default());
        let link = |s: &str| url::Url::parse(s).expect("valid url");
        assert!(spotify.handles(&link("https://open.spotify.com/playlist/abc")));
        assert!(spotify.handles(&link("spotify:album:abc")));
        assert!(!spotify.handles(&link("https://music.youtube.com/playlist?list=PL1")));
    }

    #[tokio::test]
    async fn track_links_are_rejected() {
        let spotify = Spotify::new(Credentials::default());
        let link = url::Url::parse("https://open.spotify.com/track/abc").expect("valid url");
        let res = spotify.resolve(&link).await;
        assert!(matches!(res, Err(source::Error::InvalidLink { .. })));
    }
}
