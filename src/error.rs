use crate::fetch::FetchError;
use std::path::PathBuf;
use thiserror::Error;

pub type PanelResult<T> = Result<T, PanelError>;

#[derive(Error, Debug)]
pub enum PanelError {
    #[error("Panel has been destroyed")]
    Destroyed,

    #[error("Unknown property '{name}'")]
    UnknownProperty { name: String },

    #[error("Invalid value for property '{name}': {reason}")]
    InvalidPropertyValue { name: String, reason: String },

    #[error("Host rejected property '{name}': {reason}")]
    Host { name: String, reason: String },

    #[error("Default fetcher unavailable: {0}")]
    Fetcher(#[from] FetchError),

    #[error("Failed to write document to {}: {source}", .path.display())]
    DocumentWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
