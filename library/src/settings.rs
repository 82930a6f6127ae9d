use super::{schedule, Persist};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hours of the day at which a sync pass starts.
    pub sync_start_times: Vec<u32>,
    pub plex_address: String,
    pub plex_token: String,
    pub plex_library_name: String,
    pub jellyfin_address: String,
    pub jellyfin_token: String,
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sync_start_times: schedule::default_hours(),
            plex_address: String::new(),
            plex_token: String::new(),
            plex_library_name: String::new(),
            jellyfin_address: String::new(),
            jellyfin_token: String::new(),
            spotify_client_id: String::new(),
            spotify_client_secret: String::new(),
        }
    }
}

impl Persist for Settings {}

impl Settings {
    /// Re-establishes the schedule invariants on values read from disk.
    pub fn sanitized(mut self) -> Self {
        self.sync_start_times = schedule::normalize(
            self.sync_start_times.iter().map(|&hour| i64::from(hour)),
        );
        self
    }

    /// Parses a comma separated list of hours, falling back to midnight.
    pub fn update_schedule(&mut self, input: &str) {
        self.sync_start_times = schedule::parse_or_default(input);
        tracing::info!(sync_start_times = ?self.sync_start_times, "updated sync times");
    }

    pub fn has_plex(&self) -> bool {
        !self.plex_address.is_empty()
            && !self.plex_token.is_empty()
            && !self.plex_library_name.is_empty()
    }

    pub fn has_jellyfin(&self) -> bool {
        !self.jellyfin_address.is_empty() && !self.jellyfin_token.is_empty()
    }

    pub fn has_spotify(&self) -> bool {
        !self.spotify_client_id.is_empty() && !self.spotify_client_secret.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_persisted_hours() {
        let settings = Settings {
            sync_start_times: vec![30, 4, 4, 2],
            ..Default::default()
        }
        .sanitized();
        assert_eq!(settings.sync_start_times, vec![0, 2, 4]);
    }

    #[test]
    fn media_server_requires_complete_credentials() {
        let mut settings = Settings::default();
        assert!(!settings.has_plex());
        settings.plex_address = "http://plex:32400".into();
        settings.plex_token = "token".into();
        assert!(!settings.has_plex());
        settings.plex_library_name = "Music".into();
        assert!(settings.has_plex());
        settings.jellyfin_address = "http://jellyfin:8096".into();
        assert!(!settings.has_jellyfin());
    }

    #[test]
    fn partial_json_uses_defaults() -> Result<(), serde_json::Error> {
        let settings: Settings = serde_json::from_str(r#"{"plex_token": "abc"}"#)?;
        assert_eq!(settings.plex_token, "abc");
        assert_eq!(settings.sync_start_times, vec![0]);
        Ok(())
    }
}
