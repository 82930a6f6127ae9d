use super::http_error;
use playsync_model::notify::{self, Notifier};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
struct SectionsResponse {
    #[serde(rename = "MediaContainer")]
    container: MediaContainer,
}

#[derive(Debug, Deserialize)]
struct MediaContainer {
    #[serde(rename = "Directory", default)]
    directories: Vec<Section>,
}

#[derive(Debug, Clone, Deserialize)]
struct Section {
    key: String,
    title: String,
}

/// Refreshes one library section of a Plex server.
#[derive(Debug, Clone)]
pub struct PlexNotifier {
    client: Arc<reqwest::Client>,
    address: String,
    token: String,
    section: String,
}

impl PlexNotifier {
    pub fn new(client: Arc<reqwest::Client>, address: &str, token: &str, section: &str) -> Self {
        Self {
            client,
            address: address.trim_end_matches('/').to_string(),
            token: token.to_string(),
            section: section.to_string(),
        }
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, notify::Error> {
        let res = self
            .client
            .get(format!("{}{}", self.address, path))
            .header("X-Plex-Token", &self.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(http_error)?;
        if !res.status().is_success() {
            return Err(notify::Error::Status(res.status().as_u16()));
        }
        Ok(res)
    }

    async fn section_key(&self) -> Result<String, notify::Error> {
        let sections: SectionsResponse = self
            .get("/library/sections")
            .await?
            .json()
            .await
            .map_err(http_error)?;
        find_section(&sections.container.directories, &self.section)
            .map(|section| section.key.clone())
            .ok_or_else(|| notify::Error::SectionNotFound(self.section.clone()))
    }
}

fn find_section<'a>(sections: &'a [Section], name: &str) -> Option<&'a Section> {
    sections.iter().find(|section| section.title == name)
}

#[async_trait::async_trait]
impl Notifier for PlexNotifier {
    fn name(&self) -> &str {
        "plex"
    }

    async fn refresh(&self) -> Result<(), notify::Error> {
        let key = self.section_key().await?;
        self.get(&format!("/library/sections/{}/refresh", key))
            .await?;
        tracing::debug!(section = %self.section, key = %key, "plex section refresh requested");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_section_by_title() -> anyhow::Result<()> {
        let body = r#"{"MediaContainer": {"size": 2, "Directory": [
            {"key": "1", "title": "Movies", "type": "movie"},
            {"key": "7", "title": "You Tube", "type": "artist"}
        ]}}"#;
        let sections: SectionsResponse = serde_json::from_str(body)?;
        let found = find_section(&sections.container.directories, "You Tube");
        assert_eq!(found.map(|s| s.key.as_str()), Some("7"));
        assert!(find_section(&sections.container.directories, "Music").is_none());
        Ok(())
    }

    #[test]
    fn strips_trailing_slash() {
        let plex = PlexNotifier::new(Arc::new(reqwest::Client::new()), "http://plex:32400/", "t", "Music");
        assert_eq!(plex.address, "http://plex:32400");
    }
}
