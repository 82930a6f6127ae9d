mod builder;
pub mod progress;

pub use builder::Builder;

use playsync_model::sink::{self, DownloadProgress, Sink};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;

pub const DEFAULT_PROGRAM: &str = "yt-dlp";

type ProgressCallback = Box<dyn Fn(&str, DownloadProgress) + Send + Sync + 'static>;

/// How yt-dlp selects, converts and tags the fetched audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub format: String,
    pub audio_format: String,
    pub add_metadata: bool,
    pub embed_thumbnail: bool,
    pub ffmpeg_location: Option<PathBuf>,
    pub cookies_file: Option<PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            format: "251/best".to_string(),
            audio_format: "mp3".to_string(),
            add_metadata: true,
            embed_thumbnail: true,
            ffmpeg_location: None,
            cookies_file: None,
        }
    }
}

impl Options {
    /// Command line for fetching `uri` to `destination` with the extension picked by yt-dlp.
    pub fn args(&self, uri: &str, destination: &Path) -> Vec<OsString> {
        let mut template = destination.as_os_str().to_owned();
        template.push(".%(ext)s");

        let mut args: Vec<OsString> = vec![
            "--newline".into(),
            "--no-playlist".into(),
            "-f".into(),
            self.format.as_str().into(),
            "-x".into(),
            "--audio-format".into(),
            self.audio_format.as_str().into(),
        ];
        if self.add_metadata {
            args.push("--add-metadata".into());
        }
        if self.embed_thumbnail {
            args.push("--embed-thumbnail".into());
        }
        if let Some(ffmpeg) = &self.ffmpeg_location {
            args.push("--ffmpeg-location".into());
            args.push(ffmpeg.as_os_str().to_owned());
        }
        if let Some(cookies) = &self.cookies_file {
            args.push("--cookies".into());
            args.push(cookies.as_os_str().to_owned());
        }
        args.push("-o".into());
        args.push(template);
        args.push(uri.into());
        args
    }
}

/// Fetches media by driving the `yt-dlp` executable.
pub struct YtDlp {
    program: PathBuf,
    options: Options,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for YtDlp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YtDlp")
            .field("program", &self.program)
            .field("options", &self.options)
            .finish()
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        Builder::default().build()
    }
}

impl YtDlp {
    pub fn builder() -> Builder {
        Builder::new()
    }

    async fn run(&self, uri: &str, destination: &Path) -> Result<(), sink::Error> {
        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut child = Command::new(&self.program)
            .args(self.options.args(uri, destination))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let stderr = child.stderr.take();
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            if let Some(mut stderr) = stderr {
                let _ = stderr.read_to_string(&mut buf).await;
            }
            buf
        });

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                match progress::parse_line(&line) {
                    Some(p) => {
                        if let Some(callback) = &self.progress {
                            (callback)(uri, p);
                        }
                    }
                    None => tracing::trace!(uri, "{}", line),
                }
            }
        }

        let status = child.wait().await?;
        let stderr = stderr_task.await.unwrap_or_default();
        if status.success() {
            Ok(())
        } else {
            let reason = stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("exited with {}", status));
            Err(sink::Error::Failed {
                uri: uri.to_string(),
                reason,
            })
        }
    }
}

#[async_trait::async_trait]
impl Sink for YtDlp {
    async fn fetch(&self, uri: &str, destination: &Path) -> Result<(), sink::Error> {
        tracing::debug!(uri, destination = %destination.display(), "fetching");
        self.run(uri, destination).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn default_args_extract_tagged_mp3() {
        let args = strings(Options::default().args(
            "https://www.youtube.com/watch?v=abc",
            Path::new("/music/Mix/Song - Artist"),
        ));
        assert_eq!(
            args,
            vec![
                "--newline",
                "--no-playlist",
                "-f",
                "251/best",
                "-x",
                "--audio-format",
                "mp3",
                "--add-metadata",
                "--embed-thumbnail",
                "-o",
                "/music/Mix/Song - Artist.%(ext)s",
                "https://www.youtube.com/watch?v=abc",
            ]
        );
    }

    #[test]
    fn optional_locations_are_passed() {
        let options = Options {
            ffmpeg_location: Some(PathBuf::from("/opt/ffmpeg")),
            cookies_file: Some(PathBuf::from("cookies.txt")),
            ..Options::default()
        };
        let args = strings(options.args("uri", Path::new("out")));
        let ffmpeg = args.iter().position(|a| a == "--ffmpeg-location").unwrap();
        assert_eq!(args[ffmpeg + 1], "/opt/ffmpeg");
        let cookies = args.iter().position(|a| a == "--cookies").unwrap();
        assert_eq!(args[cookies + 1], "cookies.txt");
    }

    #[tokio::test]
    async fn missing_program_fails_to_spawn() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let ytdlp = YtDlp::builder()
            .program(dir.path().join("does-not-exist"))
            .build();
        let res = ytdlp.fetch("uri", &dir.path().join("out")).await;
        assert!(matches!(res, Err(sink::Error::Spawn(_))));
        Ok(())
    }
}
