pub mod compatibility;
pub mod likes;
pub mod session;
pub mod swipes;

pub use compatibility::{CompatibilityMode, CompatibilityScore, ScoreSource};
pub use likes::{LikeOutcome, LikeRecord, MatchRecord};
pub use session::{Plan, Session};
pub use swipes::{RewindOutcome, SwipeAction, SwipeRecord};

use thiserror::Error;

/// Raised when a stored or submitted label does not name a known variant.
#[derive(Debug, Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
