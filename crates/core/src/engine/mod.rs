//! The action pipeline and its surroundings.
//!
//! [`validate`] and [`apply`] are pure functions; [`step`] chains them and
//! re-checks the structural invariants on the successor state, so a caller
//! either gets a fresh, consistent [`GameState`] value or an error with the
//! input untouched. [`GameEngine`] wraps the pipeline around an owned state
//! for callers that drive a whole game in memory (tests, replay).

mod apply;
mod checkpoint;
pub mod sequencer;
mod validate;

pub use apply::apply;
pub use checkpoint::CheckpointManager;
pub use sequencer::SetupError;
pub use validate::validate;

use serde::{Deserialize, Serialize};

use crate::action::{Action, EngineFault, RejectReason};
use crate::hooks::HookRegistry;
use crate::state::GameState;

/// Errors surfaced by the pipeline, keeping player mistakes and programmer
/// errors as distinct categories.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum EngineError {
    /// The action is illegal against the current state; recoverable.
    #[error("rejected: {0}")]
    Rejected(#[from] RejectReason),

    /// An internal invariant broke; fatal to the in-flight transition.
    #[error("engine fault: {0}")]
    Fault(#[from] EngineFault),
}

/// Validates and applies one action, returning the successor state.
///
/// The successor is checked against the structural invariants before being
/// handed out; on any error the input state is unchanged and unshared.
pub fn step(
    state: &GameState,
    action: &Action,
    hooks: &HookRegistry,
) -> Result<GameState, EngineError> {
    validate(state, action, hooks)?;
    let next = apply(state, action)?;
    next.check_invariants()?;
    Ok(next)
}

/// An owned state plus the pipeline: the in-memory face of one game.
pub struct GameEngine<'h> {
    state: GameState,
    hooks: &'h HookRegistry,
}

impl<'h> GameEngine<'h> {
    pub fn new(state: GameState, hooks: &'h HookRegistry) -> Self {
        Self { state, hooks }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    /// Replaces the whole state, used by revert.
    pub fn restore(&mut self, state: GameState) {
        self.state = state;
    }

    /// Runs one action through the pipeline and commits the successor.
    pub fn execute(&mut self, action: &Action) -> Result<(), EngineError> {
        self.state = step(&self.state, action, self.hooks)?;
        Ok(())
    }

    /// Drives the automatic phases to completion: while the game sits in
    /// BATTLE, UPKEEP or CLEANUP, executes the phase script through the
    /// normal pipeline. Returns every applied system action in order.
    pub fn run_automatic_phases(&mut self) -> Result<Vec<Action>, EngineError> {
        let mut applied = Vec::new();
        while let Some(script) = sequencer::phase_script(&self.state, self.hooks) {
            for action in script {
                self.execute(&action)?;
                applied.push(action);
            }
        }
        Ok(applied)
    }
}
