pub mod catalog;
pub mod config;
pub mod error;
pub mod library;
pub mod logging;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod queue;
pub mod session;
pub mod slot;
pub mod unlock;
pub mod visibility;

pub use error::{Error, LockReason, LockedSongError, Result};
