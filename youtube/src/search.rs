use super::{model, YoutubeMusic, SONGS_FILTER};
use async_trait::async_trait;
use playsync_model::search::{self, ResultType, Search, SearchHit};

fn failed(query: &str, err: super::Error) -> search::Error {
    search::Error::Failed {
        query: query.to_string(),
        source: Box::new(err),
    }
}

#[async_trait]
impl Search for YoutubeMusic {
    async fn search_songs(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, search::Error> {
        let response = self
            .search_raw(query, Some(SONGS_FILTER))
            .await
            .map_err(|err| failed(query, err))?;
        let mut hits = model::parse_list_items(&response, ResultType::Song);
        hits.truncate(limit);
        tracing::debug!(query, hits = hits.len(), "song search");
        Ok(hits)
    }

    async fn top_result(&self, query: &str) -> Result<Option<SearchHit>, search::Error> {
        let response = self
            .search_raw(query, None)
            .await
            .map_err(|err| failed(query, err))?;
        Ok(model::parse_top_result(&response))
    }
}
