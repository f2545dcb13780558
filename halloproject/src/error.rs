//! Types d'erreurs pour halloproject

use std::path::PathBuf;

/// Erreurs d'export/import de projet
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("No project document (*.json) in {0}")]
    MissingDocument(PathBuf),

    #[error("Several project documents in {dir}: {found:?}")]
    AmbiguousDocument { dir: PathBuf, found: Vec<PathBuf> },

    #[error("Invalid project name: {0:?}")]
    InvalidName(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed project document: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Scheduler(#[from] halloscheduler::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Type Result spécialisé pour halloproject
pub type Result<T> = std::result::Result<T, Error>;
