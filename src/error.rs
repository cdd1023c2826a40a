use std::path::PathBuf;

use thiserror::Error;

use crate::archive::Archive;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("parameter {code:?} is not in the {archive} catalog")]
    MissingParameter { code: String, archive: Archive },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("credentials error: {0}")]
    Credentials(String),

    #[error("archive reported failure: {reason}")]
    Remote { reason: String },

    #[error("cannot create output directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// True for errors caused by the configuration rather than by retrieval.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Error::MissingParameter { .. } | Error::InvalidConfig(_) | Error::Credentials(_)
        )
    }
}
