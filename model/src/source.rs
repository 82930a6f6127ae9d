use crate::{CanonicalTrack, Service};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("link `{0}` is not handled by any source")]
    Unsupported(String),
    #[error("invalid link `{link}`: {reason}")]
    InvalidLink { link: String, reason: String },
    #[error("`{0}` has no tracks")]
    Empty(String),
    #[error(transparent)]
    Custom(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn invalid_link(link: &url::Url, reason: impl Into<String>) -> Self {
        Self::InvalidLink {
            link: link.to_string(),
            reason: reason.into(),
        }
    }

    pub fn custom(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Custom(Box::new(err))
    }
}

/// A catalog that can turn a playlist or album link into canonical tracks.
#[async_trait::async_trait]
pub trait Source: Send + Sync + 'static {
    fn id(&self) -> Service;

    /// Whether the link has the shape this catalog resolves.
    fn handles(&self, link: &url::Url) -> bool;

    /// Resolves the link into tracks in sync order.
    ///
    /// Items that fail to parse are skipped individually.
    async fn resolve(&self, link: &url::Url) -> Result<Vec<CanonicalTrack>, Error>;
}
