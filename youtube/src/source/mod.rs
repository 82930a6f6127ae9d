use crate::{model, Error, YoutubeMusic};
use playsync_model::search::{ResultType, SearchHit};
use playsync_model::{source, CanonicalTrack, Service};
use serde_json::Value;

/// Upper bound on continuation requests for a single playlist.
const MAX_CONTINUATIONS: usize = 200;

/// The `list` query parameter of a playlist link.
pub fn playlist_id(link: &url::Url) -> Option<String> {
    link.query_pairs()
        .find(|(key, _)| key == "list")
        .map(|(_, value)| value.into_owned())
        .filter(|id| !id.is_empty())
}

fn into_track(hit: SearchHit, folder: &str) -> Option<CanonicalTrack> {
    let artist = hit.artist_string();
    let id = hit.video_id?;
    Some(CanonicalTrack::new(artist, hit.title, folder).with_media_id(id))
}

/// Converts browse pages of a playlist into tracks in playlist order.
pub fn playlist_tracks(folder: &str, pages: &[Value]) -> Vec<CanonicalTrack> {
    pages
        .iter()
        .flat_map(|page| model::parse_list_items(page, ResultType::Song))
        .filter_map(|hit| into_track(hit, folder))
        .collect()
}

impl YoutubeMusic {
    async fn playlist_pages(&self, id: &str) -> Result<(String, Vec<Value>), Error> {
        let first = self.browse(&format!("VL{}", id)).await?;
        let title = model::playlist_title(&first).ok_or(Error::Layout("playlist header"))?;
        let mut token = model::continuation(&first);
        let mut pages = vec![first];
        while let Some(next) = token.take() {
            if pages.len() > MAX_CONTINUATIONS {
                tracing::warn!(playlist = id, "stopping after {} pages", pages.len());
                break;
            }
            let page = self.browse_continuation(&next).await?;
            token = model::continuation(&page);
            pages.push(page);
        }
        Ok((title, pages))
    }
}

#[async_trait::async_trait]
impl source::Source for YoutubeMusic {
    fn id(&self) -> Service {
        Service::Youtube
    }

    fn handles(&self, link: &url::Url) -> bool {
        link.host_str()
            .map(|host| {
                host == "youtu.be"
                    || host == "youtube.com"
                    || host.ends_with(".youtube.com")
            })
            .unwrap_or(false)
    }

    async fn resolve(&self, link: &url::Url) -> Result<Vec<CanonicalTrack>, source::Error> {
        let id = playlist_id(link)
            .ok_or_else(|| source::Error::invalid_link(link, "missing `list` parameter"))?;
        let (title, pages) = self
            .playlist_pages(&id)
            .await
            .map_err(source::Error::custom)?;
        let tracks = playlist_tracks(&title, &pages);
        tracing::debug!(playlist = %title, pages = pages.len(), tracks = tracks.len(), "fetched playlist");
        if tracks.is_empty() {
            return Err(source::Error::Empty(link.to_string()));
        }
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::song_row;
    use playsync_model::source::Source;
    use serde_json::json;

    #[test]
    fn extracts_playlist_id() -> anyhow::Result<()> {
        let link = url::Url::parse("https://music.youtube.com/playlist?list=PL123abc")?;
        assert_eq!(playlist_id(&link).as_deref(), Some("PL123abc"));
        let link = url::Url::parse("https://www.youtube.com/watch?v=abc")?;
        assert_eq!(playlist_id(&link), None);
        Ok(())
    }

    #[test]
    fn handles_youtube_hosts_only() -> anyhow::Result<()> {
        let yt = YoutubeMusic::default();
        assert!(yt.handles(&url::Url::parse("https://music.youtube.com/playlist?list=PL1")?));
        assert!(yt.handles(&url::Url::parse("https://youtu.be/abc")?));
        assert!(!yt.handles(&url::Url::parse("https://open.spotify.com/playlist/1")?));
        assert!(!yt.handles(&url::Url::parse("https://notyoutube.com/playlist?list=PL1")?));
        Ok(())
    }

    #[tokio::test]
    async fn rejects_links_without_list() -> anyhow::Result<()> {
        let yt = YoutubeMusic::default();
        let link = url::Url::parse("https://www.youtube.com/watch?v=abc")?;
        let res = yt.resolve(&link).await;
        assert!(matches!(res, Err(source::Error::InvalidLink { .. })));
        Ok(())
    }

    #[test]
    fn tracks_carry_media_ids_across_pages() {
        let pages = vec![
            json!({"contents": [song_row("Around the World", &["Daft Punk"], "K0HSD_i2DvA")]}),
            json!({"continuationContents": [song_row("Da Funk", &["Daft Punk"], "mmi60Bd4jSs")]}),
        ];
        let tracks = playlist_tracks("French House", &pages);
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].folder, "French House");
        assert_eq!(tracks[0].artist, "Daft Punk");
        assert_eq!(tracks[1].known_media_id.as_deref(), Some("mmi60Bd4jSs"));
    }
}
