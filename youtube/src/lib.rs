pub mod error;
pub mod innertube;
pub mod model;
pub mod search;
pub mod source;

pub use error::Error;
use innertube::Innertube;
use serde_json::{json, Value};
use std::sync::Arc;

/// Search filter selecting only songs.
pub const SONGS_FILTER: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";

#[derive(Clone, Debug)]
pub struct YoutubeMusic {
    client: Arc<reqwest::Client>,
    innertube: Innertube,
}

impl Default for YoutubeMusic {
    fn default() -> Self {
        Self::new(Arc::new(reqwest::Client::new()))
    }
}

impl YoutubeMusic {
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self {
            client,
            innertube: Innertube::WebRemix,
        }
    }

    async fn post(&self, endpoint: &str, mut body: Value) -> Result<Value, Error> {
        let config = self.innertube.config();
        body["context"] = config.context();
        let res = self
            .client
            .post(config.endpoint(endpoint)?)
            .headers(config.headers())
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(res.json::<Value>().await?)
    }

    pub async fn search_raw(&self, query: &str, params: Option<&str>) -> Result<Value, Error> {
        let mut body = json!({ "query": query });
        if let Some(params) = params {
            body["params"] = Value::from(params);
        }
        self.post("search", body).await
    }

    pub async fn browse(&self, browse_id: &str) -> Result<Value, Error> {
        self.post("browse", json!({ "browseId": browse_id })).await
    }

    pub async fn browse_continuation(&self, token: &str) -> Result<Value, Error> {
        self.post("browse", json!({ "continuation": token })).await
    }
}
