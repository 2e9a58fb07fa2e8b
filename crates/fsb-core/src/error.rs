use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::game::Game;

/// Failures that stop a whole store operation. Problems with individual
/// files are collected in the operation's report instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("no {game} backup named '{name}'")]
    SnapshotNotFound { game: Game, name: String },

    #[error("invalid backup name '{0}'")]
    InvalidSnapshotName(String),

    #[error("no save profile folder found for {game} under {}", .path.display())]
    NoProfileDir { game: Game, path: PathBuf },

    #[error("{game} saves not found at {}", .path.display())]
    SourceMissing { game: Game, path: PathBuf },

    #[error("unknown game '{0}'")]
    UnknownGame(String),

    #[error("could not determine the per-user application data directory")]
    NoUserDir,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }
}
