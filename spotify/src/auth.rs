use crate::error::{AuthError, Error};
use chrono::{DateTime, Duration, Utc};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";

/// Client credentials of a registered Spotify application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub id: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(id: &str, secret: &str) -> Self {
        Credentials {
            id: id.to_owned(),
            secret: secret.to_owned(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.id.is_empty() && !self.secret.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Token {
    /// Check if the token is expired. It includes a margin of 10 seconds (which
    /// is how much a request would take in the worst case scenario).
    pub fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(10) >= self.expires_at
    }
}

/// Client credentials flow: the token is fetched lazily and cached until it
/// is about to expire or the credentials change.
#[derive(Debug)]
pub struct ClientCredentials {
    creds: RwLock<Credentials>,
    client: Arc<reqwest::Client>,
    token: Mutex<Option<Token>>,
}

impl ClientCredentials {
    pub fn new(creds: Credentials, client: Arc<reqwest::Client>) -> Self {
        Self {
            creds: RwLock::new(creds),
            client,
            token: Mutex::new(None),
        }
    }

    pub async fn credentials(&self) -> Credentials {
        self.creds.read().await.clone()
    }

    /// Swaps the credentials and drops the token obtained with the old ones.
    pub async fn set_credentials(&self, creds: Credentials) {
        let mut token = self.token.lock().await;
        let mut current = self.creds.write().await;
        if *current != creds {
            tracing::info!("spotify credentials changed");
            *current = creds;
            *token = None;
        }
    }

    async fn request_token(&self) -> Result<Token, Error> {
        let creds = self.credentials().await;
        if !creds.is_complete() {
            return Err(AuthError::MissingCredentials.into());
        }
        tracing::debug!("requesting client credentials token");
        let res = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&creds.id, Some(&creds.secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;
        if !res.status().is_success() {
            return Err(AuthError::Rejected(res.status()).into());
        }
        let res = res.json::<TokenResponse>().await?;
        Ok(Token {
            access_token: res.access_token,
            expires_at: Utc::now() + Duration::seconds(res.expires_in),
        })
    }

    pub async fn access_token(&self) -> Result<String, Error> {
        let mut token = self.token.lock().await;
        match token.as_ref() {
            Some(current) if !current.is_expired() => Ok(current.access_token.clone()),
            _ => {
                let fresh = self.request_token().await?;
                let access_token = fresh.access_token.clone();
                *token = Some(fresh);
                Ok(access_token)
            }
        }
    }

    pub async fn auth_headers(&self) -> Result<HeaderMap, Error> {
        let access_token = self.access_token().await?;
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", access_token)) {
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}
