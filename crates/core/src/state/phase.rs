//! Game and turn phases.

use serde::{Deserialize, Serialize};

/// Stage within one of the nine classic turns.
///
/// Ordering follows the fixed in-turn sequence: ACTION, then BATTLE, then
/// UPKEEP, then CLEANUP.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
)]
#[strum(serialize_all = "lowercase")]
pub enum TurnPhase {
    Action,
    Battle,
    Upkeep,
    Cleanup,
}

impl TurnPhase {
    /// The phase that follows this one within the same turn, or `None` after
    /// CLEANUP (the sequencer then opens the next turn or ends the game).
    pub fn next(self) -> Option<TurnPhase> {
        match self {
            TurnPhase::Action => Some(TurnPhase::Battle),
            TurnPhase::Battle => Some(TurnPhase::Upkeep),
            TurnPhase::Upkeep => Some(TurnPhase::Cleanup),
            TurnPhase::Cleanup => None,
        }
    }

    /// Phases driven by system-generated actions rather than player input.
    pub fn is_automatic(self) -> bool {
        !matches!(self, TurnPhase::Action)
    }
}

/// Overall game phase.
///
/// The turn phase lives inside the `Turn` variant, so "a turn phase exists
/// exactly when the game is in TURN" holds by construction. The derived
/// ordering (`Init < Turn(_) < End`, with turn phases in sequence order)
/// backs the phase-monotonicity property.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum GamePhase {
    /// One-time installation phase: players pick races.
    Init,
    /// One of the nine classic turns, in the given turn phase.
    Turn(TurnPhase),
    /// Terminal: every further action is rejected.
    End,
}

impl GamePhase {
    /// Returns the turn phase if the game is in a turn.
    pub fn turn_phase(self) -> Option<TurnPhase> {
        match self {
            GamePhase::Turn(phase) => Some(phase),
            _ => None,
        }
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GamePhase::Init => write!(f, "init"),
            GamePhase::Turn(phase) => write!(f, "turn/{phase}"),
            GamePhase::End => write!(f, "end"),
        }
    }
}
