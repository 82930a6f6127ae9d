use clap::{Args, Parser, Subcommand};
use library::Settings;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(
    name = "playsync",
    version,
    about = "Mirrors streaming playlists into a local audio library"
)]
pub struct Opts {
    #[clap(long = "config-dir", env = "PLAYSYNC_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,
    #[clap(
        long = "download-dir",
        env = "PLAYSYNC_DOWNLOAD_DIR",
        default_value = "download"
    )]
    pub download_dir: PathBuf,
    /// Workers used for both matching and downloading.
    #[clap(long = "thread-limit", env = "THREAD_LIMIT", default_value = "1")]
    pub thread_limit: usize,
    #[clap(long = "yt-dlp", env = "PLAYSYNC_YT_DLP", default_value = "yt-dlp")]
    pub yt_dlp: PathBuf,
    #[clap(long = "ffmpeg-location", env = "PLAYSYNC_FFMPEG_LOCATION")]
    pub ffmpeg_location: Option<PathBuf>,
    #[clap(long = "cookies-file", env = "PLAYSYNC_COOKIES_FILE")]
    pub cookies_file: Option<PathBuf>,
    #[clap(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the scheduler; type `sync` to start a pass right away
    Serve,
    /// Run one sync pass and wait for it
    Sync,
    /// Set the hours of the day at which passes start
    Schedule {
        /// Comma separated hours, e.g. "2, 14"
        hours: String,
    },
    /// Manage the sync list
    #[clap(subcommand)]
    Playlist(PlaylistCommand),
    /// Inspect or change settings
    #[clap(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug, Clone)]
pub enum PlaylistCommand {
    /// Add a playlist, replacing one with the same name
    Add {
        name: String,
        link: String,
        /// Seconds to wait after every download
        #[clap(long = "sleep", default_value = "0")]
        sleep: u64,
    },
    Remove {
        name: String,
    },
    List,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    Show,
    /// Change the given settings, leaving the others as they are
    Set(SettingsUpdate),
}

#[derive(Args, Debug, Clone, Default)]
pub struct SettingsUpdate {
    #[clap(long = "plex-address")]
    pub plex_address: Option<String>,
    #[clap(long = "plex-token")]
    pub plex_token: Option<String>,
    #[clap(long = "plex-library")]
    pub plex_library_name: Option<String>,
    #[clap(long = "jellyfin-address")]
    pub jellyfin_address: Option<String>,
    #[clap(long = "jellyfin-token")]
    pub jellyfin_token: Option<String>,
    #[clap(long = "spotify-client-id")]
    pub spotify_client_id: Option<String>,
    #[clap(long = "spotify-client-secret")]
    pub spotify_client_secret: Option<String>,
}

impl SettingsUpdate {
    pub fn apply(self, settings: &mut Settings) {
        let fields = [
            (self.plex_address, &mut settings.plex_address),
            (self.plex_token, &mut settings.plex_token),
            (self.plex_library_name, &mut settings.plex_library_name),
            (self.jellyfin_address, &mut settings.jellyfin_address),
            (self.jellyfin_token, &mut settings.jellyfin_token),
            (self.spotify_client_id, &mut settings.spotify_client_id),
            (self.spotify_client_secret, &mut settings.spotify_client_secret),
        ];
        for (value, field) in fields {
            if let Some(value) = value {
                *field = value.trim().to_string();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serving() {
        let opts = Opts::parse_from(["playsync"]);
        assert!(opts.command.is_none());
        assert_eq!(opts.config_dir, PathBuf::from("config"));
        assert_eq!(opts.yt_dlp, PathBuf::from("yt-dlp"));
    }

    #[test]
    fn parses_playlist_add() {
        let opts = Opts::parse_from([
            "playsync",
            "--thread-limit",
            "4",
            "playlist",
            "add",
            "Mix",
            "https://open.spotify.com/playlist/abc",
            "--sleep",
            "3",
        ]);
        assert_eq!(opts.thread_limit, 4);
        match opts.command {
            Some(Command::Playlist(PlaylistCommand::Add { name, sleep, .. })) => {
                assert_eq!(name, "Mix");
                assert_eq!(sleep, 3);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn settings_set_only_touches_given_fields() {
        let opts = Opts::parse_from([
            "playsync",
            "settings",
            "set",
            "--spotify-client-id",
            " client ",
            "--spotify-client-secret",
            "secret",
        ]);
        let update = match opts.command {
            Some(Command::Settings(SettingsCommand::Set(update))) => update,
            other => panic!("unexpected command {:?}", other),
        };
        let mut settings = Settings {
            plex_token: "plex".into(),
            ..Settings::default()
        };
        update.apply(&mut settings);
        assert_eq!(settings.spotify_client_id, "client");
        assert_eq!(settings.spotify_client_secret, "secret");
        assert_eq!(settings.plex_token, "plex");
    }
}
