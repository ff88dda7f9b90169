//! Pure legality checks: `(state, action) -> legal | illegal-with-reason`.
//!
//! Checks run in a fixed order and short-circuit: phase gating, turn-order
//! gating, existence, location precondition, capacity/target precondition,
//! then the extension validate hooks. A rejection always carries a
//! machine-readable reason, never a bare boolean.

use crate::action::{Action, Actor, RejectReason};
use crate::hooks::HookRegistry;
use crate::state::{GamePhase, GameState, TurnPhase};

/// Validates one action against the current state and phase.
///
/// Leaves the state untouched; the caller applies only on `Ok`.
pub fn validate(
    state: &GameState,
    action: &Action,
    hooks: &HookRegistry,
) -> Result<(), RejectReason> {
    check_phase(state, action)?;
    check_turn_order(state, action)?;
    check_existence(state, action)?;
    check_location(state, action)?;
    check_target(state, action)?;
    hooks.dispatch_validate(state, action)
}

/// Phase gating. Player actions belong to their ACTION sub-turn; system
/// moves may run in any turn phase, but the system sentinel that closes a
/// phase only exists in the automatic phases — ACTION is only ever left
/// through the players' own sentinels.
fn check_phase(state: &GameState, action: &Action) -> Result<(), RejectReason> {
    let wrong = RejectReason::WrongPhase { phase: state.phase };
    let turn_phase = match state.phase {
        GamePhase::Turn(phase) => phase,
        GamePhase::Init | GamePhase::End => return Err(wrong),
    };

    match (action.actor(), action) {
        (Actor::Player(_), _) if turn_phase != TurnPhase::Action => Err(wrong),
        (Actor::System, Action::EndTurn { .. }) if !turn_phase.is_automatic() => Err(wrong),
        _ => Ok(()),
    }
}

/// Turn-order gating: a player action must come from the current actor, and
/// a player may only adjust their own counters.
fn check_turn_order(state: &GameState, action: &Action) -> Result<(), RejectReason> {
    let Actor::Player(player) = action.actor() else {
        return Ok(());
    };
    let current = state.current_actor();
    if current != Some(player) {
        return Err(RejectReason::NotCurrentActor { player, current });
    }
    if let Action::ResourceAdjust { player: target, .. } = action
        && *target != player
    {
        return Err(RejectReason::NotCurrentActor {
            player: *target,
            current,
        });
    }
    Ok(())
}

fn check_existence(state: &GameState, action: &Action) -> Result<(), RejectReason> {
    match action {
        Action::TokenMove {
            token, from, to, ..
        } => {
            if !state.tokens.contains_key(token) {
                return Err(RejectReason::UnknownToken { token: *token });
            }
            for zone in [from, to] {
                if !state.zones.contains_key(zone) {
                    return Err(RejectReason::UnknownZone { zone: *zone });
                }
            }
            Ok(())
        }
        Action::ResourceAdjust { player, .. } => {
            if !state.players.contains_key(player) {
                return Err(RejectReason::UnknownPlayer { player: *player });
            }
            Ok(())
        }
        Action::EndTurn { .. } => Ok(()),
    }
}

/// Location precondition: the token is where the action says it is, or the
/// counter still holds the declared old value.
fn check_location(state: &GameState, action: &Action) -> Result<(), RejectReason> {
    match action {
        Action::TokenMove { token, from, .. } => {
            if !state.zones[from].contains(*token) {
                return Err(RejectReason::ElementNotInSourceZone {
                    token: *token,
                    zone: *from,
                });
            }
            Ok(())
        }
        Action::ResourceAdjust {
            player,
            kind,
            old_value,
            ..
        } => {
            let current = state
                .resources
                .get(player)
                .copied()
                .unwrap_or_default()
                .get(*kind);
            if current != *old_value {
                return Err(RejectReason::StaleResourceValue {
                    player: *player,
                    kind: *kind,
                    declared: *old_value,
                    current,
                });
            }
            Ok(())
        }
        Action::EndTurn { .. } => Ok(()),
    }
}

/// Capacity/target precondition: the destination accepts the token kind and
/// has room. A move within the same zone does not consume room.
fn check_target(state: &GameState, action: &Action) -> Result<(), RejectReason> {
    let Action::TokenMove {
        token, from, to, ..
    } = action
    else {
        return Ok(());
    };
    let kind = state.tokens[token].kind;
    let target = &state.zones[to];
    if !target.kind.accepts(kind) || (from != to && !target.has_room()) {
        return Err(RejectReason::ZoneCapacityViolation {
            zone: *to,
            kind,
        });
    }
    Ok(())
}
