//! Error types

use super::PlayerId;

/// A rejected transition. The state that was asked to transition is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// Visit scores run from 0 to 180.
    #[error("{0} is not a valid visit score")]
    InvalidScore(u16),

    /// A checkout uses one to three darts, and no fewer than its route requires.
    #[error("a checkout of {score} cannot take {darts} darts")]
    InvalidDarts { score: u16, darts: u8 },

    /// Double attempts are bounded by the darts thrown.
    #[error("{doubles} darts at a double is not possible with {darts} darts")]
    InvalidDoubles { doubles: u8, darts: u8 },

    /// Double attempts were reported from a score with no finish on.
    #[error("no finish was on from {0}")]
    ImplausibleDoubleAttempt(u16),

    #[error("expected {expected} to throw")]
    NotPlayersTurn { expected: PlayerId },

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("a checkout by {0} is awaiting confirmation")]
    CheckoutPending(PlayerId),

    #[error("no checkout is awaiting confirmation")]
    NoCheckoutPending,

    #[error("nothing to undo")]
    NothingToUndo,

    #[error("match over")]
    MatchOver,
}

/// A match that could not be set up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("a match needs at least one player")]
    NoPlayers,
    #[error("player id {0} is used more than once")]
    DuplicatePlayer(PlayerId),
    #[error("starting score {0} is out of range")]
    InvalidStartingScore(u16),
    #[error("targets must be at least one")]
    ZeroTarget,
}
