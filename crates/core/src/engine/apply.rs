//! Pure application: `(state, action) -> next state`.
//!
//! The applier never mutates its input; it clones the state, mutates the
//! clone and returns it. It must only run on actions the validator accepted:
//! a precondition that no longer holds here is a programming error and
//! surfaces as an [`EngineFault`], not as a rejection.

use crate::action::{Action, Actor, EngineFault};
use crate::state::GameState;

use super::sequencer;

/// Applies one validated action and returns the successor state.
pub fn apply(state: &GameState, action: &Action) -> Result<GameState, EngineFault> {
    let mut next = state.clone();
    match action {
        Action::TokenMove {
            actor,
            token,
            from,
            to,
        } => {
            let source = next
                .zones
                .get_mut(from)
                .ok_or(EngineFault::MissingZone { zone: *from })?;
            if !source.occupants.remove(token) {
                return Err(EngineFault::UnvalidatedAction {
                    detail: format!("{token} is not in {from}"),
                });
            }
            let target = next
                .zones
                .get_mut(to)
                .ok_or(EngineFault::MissingZone { zone: *to })?;
            target.occupants.insert(*token);
            // the pending log tracks the active player's sub-turn only
            if matches!(actor, Actor::Player(_)) {
                next.pending_actions.push(action.clone());
            }
        }

        Action::ResourceAdjust {
            actor,
            player,
            kind,
            old_value,
            new_value,
        } => {
            let ledger = next.resources.get_mut(player).ok_or_else(|| {
                EngineFault::UnvalidatedAction {
                    detail: format!("no resource ledger for {player}"),
                }
            })?;
            if ledger.get(*kind) != *old_value {
                return Err(EngineFault::UnvalidatedAction {
                    detail: format!("{kind} counter of {player} moved under us"),
                });
            }
            ledger.set(*kind, *new_value);
            if matches!(actor, Actor::Player(_)) {
                next.pending_actions.push(action.clone());
            }
        }

        Action::EndTurn {
            actor: Actor::Player(player),
        } => sequencer::end_player_turn(&mut next, *player)?,

        Action::EndTurn {
            actor: Actor::System,
        } => sequencer::close_automatic_phase(&mut next)?,
    }
    Ok(next)
}
