use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    pub percent: f32,
    pub total: Option<String>,
    pub speed: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to start downloader: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("download of `{uri}` failed: {reason}")]
    Failed { uri: String, reason: String },
}

/// Fetches a media item into the local library.
#[async_trait::async_trait]
pub trait Sink: Send + Sync + 'static {
    /// Downloads `uri` to `destination`, which carries no file extension.
    async fn fetch(&self, uri: &str, destination: &Path) -> Result<(), Error>;
}
