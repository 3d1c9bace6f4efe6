use thiserror::Error;

use crate::constants::{ALREADY_LIKED_MESSAGE, UNAUTHENTICATED_MESSAGE};

/// Every failure an engine operation can report.
///
/// Missing authentication and backend failures are distinct kinds so callers
/// can tell "no data" apart from "request failed".
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{}", UNAUTHENTICATED_MESSAGE)]
    Unauthenticated,

    #[error("{}", ALREADY_LIKED_MESSAGE)]
    AlreadyLiked,

    #[error("cannot swipe on your own profile")]
    InvalidTarget,

    #[error("no swipe to rewind")]
    NothingToRewind,

    #[error("daily rewind limit reached ({used}/{limit})")]
    RewindLimitReached { used: i64, limit: i64 },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type EngineResult<T> = std::result::Result<T, EngineError>;
