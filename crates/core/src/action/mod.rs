//! The tagged action union.
//!
//! Everything that changes a game state is an [`Action`]: player moves and
//! the system-generated moves of the automatic phases alike. Collapsing both
//! into one union keeps the whole game history a single homogeneous,
//! replayable log, and exhaustiveness checking guarantees every action kind
//! is handled by the validator, the applier and the narrator.

mod error;

pub use error::{EngineFault, RejectReason};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::state::{PlayerId, ResourceKind, TokenId, ZoneId};

/// Who issued an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    /// The engine itself, during the automatic phases.
    System,
    /// A player, during their ACTION sub-turn.
    Player(PlayerId),
}

impl Actor {
    pub fn player(self) -> Option<PlayerId> {
        match self {
            Actor::Player(id) => Some(id),
            Actor::System => None,
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::System => write!(f, "system"),
            Actor::Player(id) => write!(f, "{id}"),
        }
    }
}

/// An atomic state-transition request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Move one token from one zone to another.
    TokenMove {
        actor: Actor,
        token: TokenId,
        from: ZoneId,
        to: ZoneId,
    },

    /// Rewrite a fungible resource counter. Valid only when `old_value`
    /// still matches the counter; whether the exchange itself is legal is
    /// extension content, checked by validate hooks.
    ResourceAdjust {
        actor: Actor,
        player: PlayerId,
        kind: ResourceKind,
        old_value: i32,
        new_value: i32,
    },

    /// Sentinel with no element or zones. For a player it ends their ACTION
    /// sub-turn; for the system it closes the current automatic phase.
    EndTurn { actor: Actor },
}

impl Action {
    /// Convenience constructor for a player token move.
    pub fn player_move(player: PlayerId, token: TokenId, from: ZoneId, to: ZoneId) -> Self {
        Action::TokenMove {
            actor: Actor::Player(player),
            token,
            from,
            to,
        }
    }

    /// Convenience constructor for a system token move.
    pub fn system_move(token: TokenId, from: ZoneId, to: ZoneId) -> Self {
        Action::TokenMove {
            actor: Actor::System,
            token,
            from,
            to,
        }
    }

    /// Convenience constructor for a player adjusting their own counter.
    pub fn adjust(player: PlayerId, kind: ResourceKind, old_value: i32, new_value: i32) -> Self {
        Action::ResourceAdjust {
            actor: Actor::Player(player),
            player,
            kind,
            old_value,
            new_value,
        }
    }

    /// Convenience constructor for the player End-of-turn sentinel.
    pub fn end_turn(player: PlayerId) -> Self {
        Action::EndTurn {
            actor: Actor::Player(player),
        }
    }

    /// The sentinel the sequencer issues to close an automatic phase.
    pub fn system_end_turn() -> Self {
        Action::EndTurn {
            actor: Actor::System,
        }
    }

    /// Who issued this action.
    pub fn actor(&self) -> Actor {
        match self {
            Action::TokenMove { actor, .. }
            | Action::ResourceAdjust { actor, .. }
            | Action::EndTurn { actor } => *actor,
        }
    }

    /// snake_case tag used in logs.
    pub fn as_snake_case(&self) -> &'static str {
        match self {
            Action::TokenMove { .. } => "token_move",
            Action::ResourceAdjust { .. } => "resource_adjust",
            Action::EndTurn { .. } => "end_turn",
        }
    }

    /// One human-readable line, used by the history narrator.
    pub fn describe(&self) -> String {
        match self {
            Action::TokenMove {
                actor,
                token,
                from,
                to,
            } => format!("{actor} moved {token} from {from} to {to}"),
            Action::ResourceAdjust {
                actor,
                player,
                kind,
                old_value,
                new_value,
            } => format!("{actor} set {kind} of {player}: {old_value} -> {new_value}"),
            Action::EndTurn {
                actor: Actor::Player(player),
            } => format!("{player} ended their turn"),
            Action::EndTurn {
                actor: Actor::System,
            } => "system closed the phase".to_string(),
        }
    }
}
