//! Player records.

use serde::{Deserialize, Serialize};

/// Per-player record kept inside the game state.
///
/// Race selection happens during the installation phase, either directly or
/// by resolving an ordered wish list (first available wish wins, in turn
/// order).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Chosen race, `None` until the installation phase resolves it.
    pub race: Option<String>,
    /// Race names ordered by preference.
    pub race_wishes: Vec<String>,
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_race(race: impl Into<String>) -> Self {
        Self {
            race: Some(race.into()),
            race_wishes: Vec::new(),
        }
    }
}
