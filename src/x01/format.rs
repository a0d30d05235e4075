//! Match format.
//!
//! A match is played as sets of legs. Both levels are won by reaching a [`Target`] number of
//! wins, expressed either as "first to N" or "best of N".

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// The lowest starting score that still leaves a finish to play for.
const MIN_STARTING_SCORE: u16 = 2;
/// The highest starting score commonly played.
const MAX_STARTING_SCORE: u16 = 1001;

/// A win condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// The first player to `n` wins.
    FirstTo(u32),
    /// Best of `n`, which requires `ceil(n / 2)` wins.
    BestOf(u32),
}

impl Target {
    /// The number of wins needed to meet the target.
    pub fn wins_required(self) -> u32 {
        match self {
            Target::FirstTo(n) => n,
            Target::BestOf(n) => (n + 1) / 2,
        }
    }

    /// Whether `wins` meets the target.
    pub fn is_met(self, wins: u32) -> bool {
        wins >= self.wins_required()
    }

    fn count(self) -> u32 {
        match self {
            Target::FirstTo(n) | Target::BestOf(n) => n,
        }
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::FirstTo(n) => write!(f, "first to {n}"),
            Target::BestOf(n) => write!(f, "best of {n}"),
        }
    }
}

/// How a leg must be finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutMode {
    /// The last dart must be a double or the bull. Leaving 1 is a bust.
    #[default]
    Double,
    /// Any dart that reaches zero finishes.
    Straight,
}

/// Validated match configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFormat {
    starting_score: u16,
    out_mode: OutMode,
    legs: Target,
    sets: Target,
}

impl Default for MatchFormat {
    fn default() -> Self {
        Self {
            starting_score: 501,
            out_mode: OutMode::Double,
            legs: Target::FirstTo(1),
            sets: Target::FirstTo(1),
        }
    }
}

impl MatchFormat {
    /// Creates a double-out format. Fails on a starting score outside 2-1001 or a zero target.
    pub fn new(starting_score: u16, legs: Target, sets: Target) -> Result<Self, ConfigError> {
        validate_starting_score(starting_score)?;
        if legs.count() == 0 || sets.count() == 0 {
            return Err(ConfigError::ZeroTarget);
        }
        Ok(Self {
            starting_score,
            out_mode: OutMode::Double,
            legs,
            sets,
        })
    }

    /// Sets the out mode.
    pub fn with_out_mode(mut self, out_mode: OutMode) -> Self {
        self.out_mode = out_mode;
        self
    }

    /// The default starting score for players in this match.
    pub fn starting_score(&self) -> u16 {
        self.starting_score
    }

    pub fn out_mode(&self) -> OutMode {
        self.out_mode
    }

    /// Legs needed to win a set.
    pub fn legs(&self) -> Target {
        self.legs
    }

    /// Sets needed to win the match.
    pub fn sets(&self) -> Target {
        self.sets
    }
}

/// Checks that a starting score is playable.
pub fn validate_starting_score(score: u16) -> Result<(), ConfigError> {
    if (MIN_STARTING_SCORE..=MAX_STARTING_SCORE).contains(&score) {
        Ok(())
    } else {
        Err(ConfigError::InvalidStartingScore(score))
    }
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_wins_required() {
        assert_eq!(Target::FirstTo(3).wins_required(), 3);
        assert_eq!(Target::BestOf(5).wins_required(), 3);
        assert_eq!(Target::BestOf(4).wins_required(), 2);
        assert_eq!(Target::BestOf(1).wins_required(), 1);
        assert!(Target::BestOf(3).is_met(2));
        assert!(!Target::FirstTo(3).is_met(2));
    }

    #[test]
    fn test_new_validates() {
        assert_matches!(
            MatchFormat::new(0, Target::FirstTo(1), Target::FirstTo(1)),
            Err(ConfigError::InvalidStartingScore(0))
        );
        assert_matches!(
            MatchFormat::new(1002, Target::FirstTo(1), Target::FirstTo(1)),
            Err(ConfigError::InvalidStartingScore(1002))
        );
        assert_matches!(
            MatchFormat::new(501, Target::BestOf(0), Target::FirstTo(1)),
            Err(ConfigError::ZeroTarget)
        );
        let format = MatchFormat::new(301, Target::BestOf(5), Target::FirstTo(2))
            .unwrap()
            .with_out_mode(OutMode::Straight);
        assert_eq!(format.starting_score(), 301);
        assert_eq!(format.out_mode(), OutMode::Straight);
        assert_eq!(format.legs().wins_required(), 3);
    }
}
