//! Checkpoint/revert: a clean slate for an abandoned sub-turn.
//!
//! States are immutable values, so a checkpoint is just a retained clone of
//! the state at the start of a player's ACTION sub-turn — no transactional
//! storage involved. Reverting hands that clone back unchanged, as many
//! times as asked.

use crate::state::{GameState, PlayerId};

/// Holds at most one checkpoint: the state before the active player's first
/// action of their sub-turn.
#[derive(Clone, Debug, Default)]
pub struct CheckpointManager {
    holder: Option<PlayerId>,
    saved: Option<GameState>,
}

impl CheckpointManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a checkpoint for `player` unless one for this sub-turn already
    /// exists. Never mutates the state; the previous End-of-turn already
    /// left the pending sub-turn log empty.
    pub fn ensure(&mut self, player: PlayerId, state: &GameState) {
        if self.holder == Some(player) {
            return;
        }
        self.holder = Some(player);
        self.saved = Some(state.clone());
    }

    /// The last checkpointed state, if any. Idempotent: reverting twice
    /// yields the same state.
    pub fn revert(&self) -> Option<GameState> {
        self.saved.clone()
    }

    /// The player whose sub-turn the current checkpoint belongs to.
    pub fn holder(&self) -> Option<PlayerId> {
        self.holder
    }

    /// Drops the checkpoint; called once a sub-turn commits.
    pub fn clear(&mut self) {
        self.holder = None;
        self.saved = None;
    }
}
