use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("malformed catalog record #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    #[error("missing resource {}", .0.display())]
    MissingResource(PathBuf),

    #[error("could not match {} to a song in album {album}", .file.display())]
    UnmatchedFile { file: PathBuf, album: String },

    #[error(transparent)]
    LockedSong(#[from] LockedSongError),

    #[error("no album or song named {0}")]
    UnknownEventTarget(String),

    #[error("catalog is not a list of records")]
    BrokenCatalog,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockReason {
    SongLocked,
    AlbumLocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockedSongError {
    pub title: String,
    pub album: Option<String>,
    pub reason: LockReason,
}

impl LockedSongError {
    pub fn message(&self) -> String {
        match (&self.reason, &self.album) {
            (LockReason::AlbumLocked, Some(album)) => {
                format!("{} requires album {album} to be unlocked!", self.title)
            }
            _ => format!("{} is not unlocked yet!", self.title),
        }
    }
}

impl fmt::Display for LockedSongError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for LockedSongError {}
