use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::matching::MatchPolicy;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown exercise mode: {0}")]
pub struct ModeParseError(pub String);

/// Exercise mode selected by the learner.
///
/// `Soft` checks the whole page at once with lenient matching.
/// `Hard` runs the sequential session with exact matching and locks answers after checking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Soft,
    Hard,
}

impl Mode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Soft => "soft",
            Self::Hard => "hard",
        }
    }

    /// Matching strictness bound to this mode.
    #[must_use]
    pub fn policy(self) -> MatchPolicy {
        match self {
            Self::Soft => MatchPolicy::Soft,
            Self::Hard => MatchPolicy::Hard,
        }
    }

    /// Whether this mode drives the sequential session controller.
    #[must_use]
    pub fn is_sequential(self) -> bool {
        matches!(self, Self::Hard)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soft" => Ok(Self::Soft),
            "hard" => Ok(Self::Hard),
            other => Err(ModeParseError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_only_known_modes() {
        assert_eq!("soft".parse::<Mode>(), Ok(Mode::Soft));
        assert_eq!("hard".parse::<Mode>(), Ok(Mode::Hard));
        assert!("Hard".parse::<Mode>().is_err());
        assert!("".parse::<Mode>().is_err());
    }

    #[test]
    fn hard_mode_binds_hard_policy() {
        assert_eq!(Mode::Hard.policy(), MatchPolicy::Hard);
        assert_eq!(Mode::Soft.policy(), MatchPolicy::Soft);
        assert!(Mode::Hard.is_sequential());
        assert!(!Mode::Soft.is_sequential());
    }
}
