use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The playlist does not exist or belongs to another owner. The two cases
    /// are deliberately reported the same way.
    #[error("playlist not found")]
    NotFoundOrAccessDenied,

    #[error("track not found: {0}")]
    TrackNotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
