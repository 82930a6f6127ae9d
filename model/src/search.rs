#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResultType {
    Song,
    Video,
    Album,
    Artist,
    Playlist,
    Other,
}

impl ResultType {
    pub fn is_playable(&self) -> bool {
        matches!(self, ResultType::Song | ResultType::Video)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub artists: Vec<String>,
    pub video_id: Option<String>,
    pub result_type: ResultType,
}

impl SearchHit {
    pub fn song(title: impl Into<String>, artists: &[&str], video_id: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artists: artists.iter().map(|a| a.to_string()).collect(),
            video_id: Some(video_id.into()),
            result_type: ResultType::Song,
        }
    }

    /// Artist names flattened to a comma separated string.
    pub fn artist_string(&self) -> String {
        self.artists.join(", ")
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("search for `{query}` failed: {source}")]
    Failed {
        query: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("unexpected search response: {0}")]
    Response(String),
}

/// Song search of the download catalog.
#[async_trait::async_trait]
pub trait Search: Send + Sync + 'static {
    /// Searches with the songs filter applied, returning at most `limit` hits.
    async fn search_songs(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, Error>;

    /// The unfiltered search's top result, if the catalog reports one.
    async fn top_result(&self, query: &str) -> Result<Option<SearchHit>, Error>;
}
