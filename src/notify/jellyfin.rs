use super::http_error;
use playsync_model::notify::{self, Notifier};
use std::sync::Arc;

/// Triggers a full library scan on a Jellyfin server.
#[derive(Debug, Clone)]
pub struct JellyfinNotifier {
    client: Arc<reqwest::Client>,
    address: String,
    token: String,
}

impl JellyfinNotifier {
    pub fn new(client: Arc<reqwest::Client>, address: &str, token: &str) -> Self {
        Self {
            client,
            address: address.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    pub fn refresh_url(&self) -> String {
        format!("{}/Library/Refresh", self.address)
    }
}

#[async_trait::async_trait]
impl Notifier for JellyfinNotifier {
    fn name(&self) -> &str {
        "jellyfin"
    }

    async fn refresh(&self) -> Result<(), notify::Error> {
        let res = self
            .client
            .post(self.refresh_url())
            .query(&[("api_key", &self.token)])
            .send()
            .await
            .map_err(http_error)?;
        match res.status() {
            reqwest::StatusCode::NO_CONTENT => Ok(()),
            status => Err(notify::Error::Status(status.as_u16())),
        }
    }
}
