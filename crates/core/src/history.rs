//! The append-only action history and deterministic replay.
//!
//! One entry per applied action across the whole game, keyed by the snapshot
//! ids the store assigned before and after. The log is the single source of
//! truth for auditing (a textual narrative) and for reconstructing any later
//! snapshot from an earlier one.

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::engine::{self, EngineError};
use crate::hooks::HookRegistry;
use crate::state::{GameState, SnapshotId};

/// One applied action, bracketed by the persisted snapshots around it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub before: SnapshotId,
    pub action: Action,
    pub after: SnapshotId,
}

/// Append-only ordered sequence of applied actions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, before: SnapshotId, action: Action, after: SnapshotId) {
        self.entries.push(HistoryEntry {
            before,
            action,
            after,
        });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// The actions recorded after snapshot `from`, in order. Used to replay
    /// a game forward from a persisted snapshot.
    pub fn actions_after(&self, from: SnapshotId) -> impl Iterator<Item = &Action> {
        self.entries
            .iter()
            .filter(move |entry| entry.before >= from)
            .map(|entry| &entry.action)
    }

    /// Human-readable narrative of the entries between two snapshot ids
    /// (inclusive), one line per applied action.
    pub fn narrate(&self, from: SnapshotId, to: SnapshotId) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| entry.before >= from && entry.after <= to)
            .map(|entry| {
                format!(
                    "{} -> {}: {}",
                    entry.before,
                    entry.after,
                    entry.action.describe()
                )
            })
            .collect()
    }
}

/// Replays an action sequence from an initial state through the normal
/// pipeline. Deterministic and referentially transparent: the same inputs
/// always produce the same final state.
pub fn replay<'a>(
    initial: GameState,
    actions: impl IntoIterator<Item = &'a Action>,
    hooks: &HookRegistry,
) -> Result<GameState, EngineError> {
    let mut state = initial;
    for action in actions {
        state = engine::step(&state, action, hooks)?;
    }
    Ok(state)
}
