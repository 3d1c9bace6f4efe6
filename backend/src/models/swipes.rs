use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Row, postgres::PgRow};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Like,
    Pass,
    Superlike,
}

impl SwipeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeAction::Like => "like",
            SwipeAction::Pass => "pass",
            SwipeAction::Superlike => "superlike",
        }
    }

    /// Like and superlike both create a directed like edge.
    pub fn is_like(&self) -> bool {
        matches!(self, SwipeAction::Like | SwipeAction::Superlike)
    }
}

impl fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwipeAction {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(SwipeAction::Like),
            "pass" => Ok(SwipeAction::Pass),
            "superlike" => Ok(SwipeAction::Superlike),
            other => Err(UnknownVariant {
                kind: "swipe action",
                value: other.to_string(),
            }),
        }
    }
}

/// One row of `swipe_history`. Only `rewound` ever changes after insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_profile_id: Uuid,
    pub action: SwipeAction,
    pub created_at: DateTime<Utc>,
    pub rewound: bool,
}

impl SwipeRecord {
    pub fn new(user_id: Uuid, target_profile_id: Uuid, action: SwipeAction, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            target_profile_id,
            action,
            created_at,
            rewound: false,
        }
    }
}

/// Result of an atomic rewind of the latest swipe.
#[derive(Debug, Clone, PartialEq)]
pub enum RewindOutcome {
    Rewound(SwipeRecord),
    /// The daily allowance was already used up.
    LimitReached { used: i64, limit: i64 },
    NothingToRewind,
}

impl<'r> FromRow<'r, PgRow> for SwipeRecord {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        let action: String = row.try_get("action")?;
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            target_profile_id: row.try_get("target_profile_id")?,
            action: action.parse().map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            created_at: row.try_get("created_at")?,
            rewound: row.try_get("rewound")?,
        })
    }
}
