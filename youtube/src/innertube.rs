use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct InnertubeConfig<'a> {
    pub client_name: &'static str,
    pub client_version: &'a str,
    pub client_hl: &'a str,
    pub host: &'a str,
    pub context_client_name: u32,
}

impl Default for InnertubeConfig<'_> {
    fn default() -> Self {
        Self {
            client_name: "",
            client_version: "",
            client_hl: "en",
            host: "www.youtube.com",
            context_client_name: 1,
        }
    }
}

impl InnertubeConfig<'_> {
    pub fn context(&self) -> Value {
        json!({
            "client": {
                "clientName": self.client_name,
                "clientVersion": self.client_version,
                "hl": self.client_hl,
            }
        })
    }

    pub fn endpoint(&self, name: &str) -> Result<reqwest::Url, url::ParseError> {
        reqwest::Url::parse(&format!(
            "https://{}/youtubei/v1/{}?prettyPrint=false",
            self.host, name
        ))
    }

    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for pair in [
            (
                HeaderName::from_lowercase(b"x-youtube-client-name").ok(),
                Some(HeaderValue::from(self.context_client_name)),
            ),
            (
                HeaderName::from_lowercase(b"x-youtube-client-version").ok(),
                HeaderValue::from_str(self.client_version).ok(),
            ),
            (
                HeaderName::from_lowercase(b"origin").ok(),
                HeaderValue::from_str(&format!("https://{}", self.host)).ok(),
            ),
        ] {
            if let (Some(name), Some(value)) = pair {
                headers.insert(name, value);
            }
        }
        headers
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Innertube {
    /// The YouTube Music web client.
    WebRemix,
}

impl Innertube {
    pub fn config(&self) -> InnertubeConfig<'static> {
        match *self {
            Self::WebRemix => InnertubeConfig {
                client_name: "WEB_REMIX",
                client_version: "1.20240501.01.00",
                host: "music.youtube.com",
                context_client_name: 67,
                ..Default::default()
            },
        }
    }
}
