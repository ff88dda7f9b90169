//! Phase/turn sequencing.
//!
//! The game walks a fixed machine: INIT, then turns 1–9 each cycling through
//! ACTION, BATTLE, UPKEEP and CLEANUP, then END. ACTION is left when every
//! player has submitted their End-of-turn sentinel; the automatic phases are
//! driven by scripts of system-generated actions (extension contributions,
//! the built-in cleanup sweep, and a closing system sentinel), each of which
//! goes through the same validate/apply pipeline as a player move.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::action::{Action, EngineFault};
use crate::hooks::{HookRegistry, PhaseEvent};
use crate::state::{GamePhase, GameState, PlayerId, TurnPhase, ZoneId, ZoneKind};

/// The nine-turn game; CLEANUP of this turn ends the game.
pub const LAST_TURN: u8 = 9;

/// Errors raised while starting a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SetupError {
    #[error("{player} has not chosen a race")]
    MissingRace { player: PlayerId },

    #[error("game already started")]
    AlreadyStarted,
}

/// Fires the one-time `INIT -> TURN(1, ACTION)` transition.
///
/// Legal only while every player has a resolved race.
pub fn begin(state: &mut GameState) -> Result<(), SetupError> {
    if state.phase != GamePhase::Init {
        return Err(SetupError::AlreadyStarted);
    }
    if let Some((&player, _)) = state.players.iter().find(|(_, p)| p.race.is_none()) {
        return Err(SetupError::MissingRace { player });
    }
    state.turn_number = 1;
    state.phase = GamePhase::Turn(TurnPhase::Action);
    state.current_slot = 0;
    state.passed.clear();
    Ok(())
}

/// Resolves outstanding race wishes: each player without a race takes, in
/// turn order, their first wish that no other player holds yet. Returns the
/// players still unresolved (no wish was available).
pub fn resolve_race_wishes(state: &mut GameState) -> Vec<PlayerId> {
    let mut taken: Vec<String> = state
        .players
        .values()
        .filter_map(|p| p.race.clone())
        .collect();
    let mut unresolved = Vec::new();

    for id in state.players_order.clone() {
        let Some(player) = state.players.get_mut(&id) else {
            continue;
        };
        if player.race.is_some() {
            continue;
        }
        match player
            .race_wishes
            .iter()
            .find(|wish| !taken.iter().any(|t| t == *wish))
            .cloned()
        {
            Some(race) => {
                taken.push(race.clone());
                player.race = Some(race);
            }
            None => unresolved.push(id),
        }
    }
    unresolved
}

/// Applies the player End-of-turn sentinel: records the pass, clears the
/// pending sub-turn log, and hands the floor to the next player still in the
/// round — or to BATTLE once everyone has passed.
pub(crate) fn end_player_turn(state: &mut GameState, player: PlayerId) -> Result<(), EngineFault> {
    if state.current_actor() != Some(player) {
        return Err(EngineFault::UnvalidatedAction {
            detail: format!("{player} ended a turn that was not theirs"),
        });
    }
    state.pending_actions.clear();
    state.passed.insert(player);

    if state.passed.len() == state.players_order.len() {
        state.phase = GamePhase::Turn(TurnPhase::Battle);
        return Ok(());
    }

    let len = state.players_order.len();
    let mut slot = (state.current_slot + 1) % len;
    while state.passed.contains(&state.players_order[slot]) {
        slot = (slot + 1) % len;
    }
    state.current_slot = slot;
    Ok(())
}

/// Applies the system sentinel that closes an automatic phase:
/// `BATTLE -> UPKEEP -> CLEANUP -> next turn's ACTION`, or END after the
/// last turn's cleanup.
pub(crate) fn close_automatic_phase(state: &mut GameState) -> Result<(), EngineFault> {
    let phase = match state.phase {
        GamePhase::Turn(phase) if phase.is_automatic() => phase,
        other => {
            return Err(EngineFault::UnvalidatedAction {
                detail: format!("system sentinel applied in phase {other}"),
            });
        }
    };
    match phase.next() {
        Some(next) => state.phase = GamePhase::Turn(next),
        None => {
            if state.turn_number >= LAST_TURN {
                state.phase = GamePhase::End;
            } else {
                state.turn_number += 1;
                state.phase = GamePhase::Turn(TurnPhase::Action);
                state.current_slot = 0;
                state.passed.clear();
            }
        }
    }
    Ok(())
}

/// The fixed, deterministic action script for the current automatic phase:
/// before-phase hook actions, the built-in actions, after-phase hook actions
/// (plus the game-end hooks during the last cleanup), and the closing system
/// sentinel. Returns `None` outside the automatic phases.
pub fn phase_script(state: &GameState, hooks: &HookRegistry) -> Option<Vec<Action>> {
    let phase = match state.phase {
        GamePhase::Turn(phase) if phase.is_automatic() => phase,
        _ => return None,
    };

    let mut script = hooks.dispatch_phase(PhaseEvent::Before(phase), state);
    script.extend(builtin_actions(state, phase));
    script.extend(hooks.dispatch_phase(PhaseEvent::After(phase), state));
    if phase == TurnPhase::Cleanup && state.turn_number >= LAST_TURN {
        script.extend(hooks.dispatch_phase(PhaseEvent::GameEnd, state));
    }
    script.push(Action::system_end_turn());
    Some(script)
}

/// Built-in system actions per phase. Battle and upkeep carry none — their
/// content is rules territory, supplied by extensions — while cleanup sweeps
/// every graveyard zone and returns each token with a home zone back to it,
/// in token-id order.
///
/// Every emitted move must validate: a home zone that refuses the token kind
/// or has no room (counting the sweep's own earlier moves) keeps its token in
/// the graveyard until an extension makes room, rather than producing a
/// system action the pipeline would reject.
fn builtin_actions(state: &GameState, phase: TurnPhase) -> Vec<Action> {
    if phase != TurnPhase::Cleanup {
        return Vec::new();
    }
    let mut actions = Vec::new();
    let mut planned: BTreeMap<ZoneId, usize> = BTreeMap::new();
    for (&zone_id, zone) in &state.zones {
        if zone.kind != ZoneKind::Graveyard {
            continue;
        }
        for &token in &zone.occupants {
            let Some(home) = state.tokens[&token].home_zone else {
                continue;
            };
            if home == zone_id {
                continue;
            }
            let Some(target) = state.zones.get(&home) else {
                continue;
            };
            let kind = state.tokens[&token].kind;
            let inbound = planned.get(&home).copied().unwrap_or(0);
            let fits = target
                .capacity
                .is_none_or(|cap| target.occupants.len() + inbound < cap as usize);
            if !target.kind.accepts(kind) || !fits {
                continue;
            }
            *planned.entry(home).or_insert(0) += 1;
            actions.push(Action::system_move(token, zone_id, home));
        }
    }
    actions
}

/// Replaces the turn order with a permutation of the same players.
///
/// Meant for extensions acting between turns; rejected mid-ACTION where the
/// active slot would change meaning.
pub fn set_turn_order(state: &mut GameState, order: Vec<PlayerId>) -> Result<(), EngineFault> {
    if state.phase == GamePhase::Turn(TurnPhase::Action) {
        return Err(EngineFault::CorruptTurnOrder);
    }
    let mut sorted = order.clone();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() != order.len() || !sorted.iter().eq(state.players.keys()) {
        return Err(EngineFault::CorruptTurnOrder);
    }
    state.players_order = order;
    state.current_slot = 0;
    Ok(())
}
