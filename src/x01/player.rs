//! Players.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Opaque player identity, unique within a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

impl Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A player, as registered at match setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// The score each leg starts from for this player.
    pub starting_score: u16,
}

impl Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

impl Player {
    /// Creates a new [`Player`].
    pub fn new<S: Into<String>>(id: u32, name: S, starting_score: u16) -> Self {
        Self {
            id: PlayerId(id),
            name: name.into(),
            starting_score,
        }
    }
}
