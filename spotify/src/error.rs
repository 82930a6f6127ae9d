#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing client id or client secret")]
    MissingCredentials,
    #[error("token request rejected with status {0}")]
    Rejected(reqwest::StatusCode),
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("url parse error: {0}")]
    ParseError(#[from] url::ParseError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("auth: {0}")]
    Auth(#[from] AuthError),
    #[error("api request error: {0}")]
    Api(#[from] ApiError),
    #[error("not found")]
    NotFound,
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Api(ApiError::Http(err))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Api(ApiError::ParseError(err))
    }
}
