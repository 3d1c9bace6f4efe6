use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::UnknownVariant;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityMode {
    #[default]
    Dating,
    Friends,
}

impl CompatibilityMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompatibilityMode::Dating => "dating",
            CompatibilityMode::Friends => "friends",
        }
    }
}

impl fmt::Display for CompatibilityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompatibilityMode {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dating" => Ok(CompatibilityMode::Dating),
            "friends" => Ok(CompatibilityMode::Friends),
            other => Err(UnknownVariant {
                kind: "compatibility mode",
                value: other.to_string(),
            }),
        }
    }
}

/// Where a reported score came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreSource {
    Cached,
    Computed,
    /// Backend failed; the neutral score was substituted and not cached.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompatibilityScore {
    pub score: u8,
    pub source: ScoreSource,
}
