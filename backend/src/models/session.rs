use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use super::UnknownVariant;
use crate::constants::{FREE_DAILY_REWINDS, PLUS_DAILY_REWINDS};

/// The authenticated caller. Passed explicitly into every engine operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
}

impl Session {
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    #[default]
    Free,
    Plus,
    Premium,
}

impl Plan {
    /// Rewinds allowed per local day; `None` is unlimited.
    pub fn daily_rewind_limit(&self) -> Option<i64> {
        match self {
            Plan::Free => Some(FREE_DAILY_REWINDS),
            Plan::Plus => Some(PLUS_DAILY_REWINDS),
            Plan::Premium => None,
        }
    }
}

impl FromStr for Plan {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Plan::Free),
            "plus" => Ok(Plan::Plus),
            "premium" => Ok(Plan::Premium),
            other => Err(UnknownVariant {
                kind: "plan",
                value: other.to_string(),
            }),
        }
    }
}
