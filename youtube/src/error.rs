#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("url parse error: {0}")]
    ParseError(#[from] url::ParseError),
    #[error("unexpected response layout: missing `{0}`")]
    Layout(&'static str),
}
