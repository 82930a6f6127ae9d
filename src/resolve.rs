use playsync_model::source::{self, Source};
use playsync_model::CanonicalTrack;
use std::sync::Arc;

pub type DynSource = Arc<dyn Source>;

/// Dispatches playlist links to the catalog that understands them.
#[derive(Clone, Default)]
pub struct TrackResolver {
    sources: Vec<DynSource>,
}

impl std::fmt::Debug for TrackResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackResolver")
            .field(
                "sources",
                &self.sources.iter().map(|s| s.id()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl TrackResolver {
    pub fn new(sources: Vec<DynSource>) -> Self {
        Self { sources }
    }

    fn source_for(&self, link: &url::Url) -> Option<&DynSource> {
        self.sources.iter().find(|source| source.handles(link))
    }

    /// Resolves `link` into tracks in sync order.
    pub async fn resolve(&self, link: &str) -> Result<Vec<CanonicalTrack>, source::Error> {
        let link = url::Url::parse(link.trim()).map_err(|err| source::Error::InvalidLink {
            link: link.to_string(),
            reason: err.to_string(),
        })?;
        let source = self
            .source_for(&link)
            .ok_or_else(|| source::Error::Unsupported(link.to_string()))?;
        let tracks = source.resolve(&link).await?;
        tracing::debug!(service = %source.id(), tracks = tracks.len(), "resolved {}", link);
        Ok(tracks)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use playsync_model::Service;
    use std::collections::HashMap;

    /// Serves fixed track lists for `https://fake.test/...` links.
    #[derive(Debug, Default)]
    pub struct FakeSource {
        pub playlists: HashMap<String, Vec<CanonicalTrack>>,
    }

    impl FakeSource {
        pub fn with(mut self, link: &str, tracks: Vec<CanonicalTrack>) -> Self {
            self.playlists.insert(link.to_string(), tracks);
            self
        }
    }

    #[async_trait::async_trait]
    impl Source for FakeSource {
        fn id(&self) -> Service {
            Service::Spotify
        }

        fn handles(&self, link: &url::Url) -> bool {
            link.host_str() == Some("fake.test")
        }

        async fn resolve(&self, link: &url::Url) -> Result<Vec<CanonicalTrack>, source::Error> {
            match self.playlists.get(link.as_str()) {
                Some(tracks) if !tracks.is_empty() => Ok(tracks.clone()),
                Some(_) => Err(source::Error::Empty(link.to_string())),
                None => Err(source::Error::invalid_link(link, "unknown playlist")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeSource;
    use super::*;

    fn resolver() -> TrackResolver {
        let tracks = vec![
            CanonicalTrack::new("Daft Punk", "One More Time", "Mix"),
            CanonicalTrack::new("Justice", "D.A.N.C.E.", "Mix"),
        ];
        TrackResolver::new(vec![Arc::new(
            FakeSource::default().with("https://fake.test/mix", tracks),
        )])
    }

    #[tokio::test]
    async fn dispatches_on_link_shape() -> anyhow::Result<()> {
        let tracks = resolver().resolve("https://fake.test/mix").await?;
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1].title, "D.A.N.C.E.");
        Ok(())
    }

    #[tokio::test]
    async fn unknown_links_are_unsupported() {
        let res = resolver().resolve("https://elsewhere.test/mix").await;
        assert!(matches!(res, Err(source::Error::Unsupported(_))));
        let res = resolver().resolve("not a link").await;
        assert!(matches!(res, Err(source::Error::InvalidLink { .. })));
    }

    #[tokio::test]
    async fn youtube_links_without_list_fail_cleanly() {
        let resolver = TrackResolver::new(vec![Arc::new(youtube::YoutubeMusic::default())]);
        let res = resolver
            .resolve("https://www.youtube.com/watch?v=FGBhQbmPwH8")
            .await;
        assert!(matches!(res, Err(source::Error::InvalidLink { .. })));
    }
}
