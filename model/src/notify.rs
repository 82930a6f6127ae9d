#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("http error: {0}")]
    Http(Box<dyn std::error::Error + Send + Sync>),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("library section `{0}` not found")]
    SectionNotFound(String),
}

/// A media server that can be asked to rescan its library.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn refresh(&self) -> Result<(), Error>;
}
