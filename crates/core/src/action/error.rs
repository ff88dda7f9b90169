//! Rejections and faults raised by the action pipeline.
//!
//! The two categories are deliberately distinct: a [`RejectReason`] is a
//! player mistake, recoverable and returned as data with the state untouched;
//! an [`EngineFault`] is a broken internal invariant and fatal to the
//! in-flight transition.

use serde::{Deserialize, Serialize};

use crate::state::{GamePhase, PlayerId, ResourceKind, TokenId, TokenKind, ZoneId};

/// Why an action is illegal against the current state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RejectReason {
    /// The action kind is not permitted in the current phase.
    #[error("action not permitted in phase {phase}")]
    WrongPhase { phase: GamePhase },

    /// The acting player is not the current actor for this sub-turn.
    #[error("{player} is not the current actor")]
    NotCurrentActor {
        player: PlayerId,
        current: Option<PlayerId>,
    },

    /// The referenced token does not exist.
    #[error("unknown token {token}")]
    UnknownToken { token: TokenId },

    /// The referenced zone does not exist.
    #[error("unknown zone {zone}")]
    UnknownZone { zone: ZoneId },

    /// The referenced player does not exist.
    #[error("unknown player {player}")]
    UnknownPlayer { player: PlayerId },

    /// The token is not in the declared source zone.
    #[error("{token} is not in {zone}")]
    ElementNotInSourceZone { token: TokenId, zone: ZoneId },

    /// The declared old counter value does not match the current counter.
    #[error("{kind} counter of {player} is {current}, not {declared}")]
    StaleResourceValue {
        player: PlayerId,
        kind: ResourceKind,
        declared: i32,
        current: i32,
    },

    /// The destination zone refuses the token kind or is full.
    #[error("{zone} cannot take a {kind} token")]
    ZoneCapacityViolation { zone: ZoneId, kind: TokenKind },

    /// An extension's validate hook vetoed the action.
    #[error("vetoed by extension '{extension}': {reason}")]
    ExtensionVeto { extension: String, reason: String },
}

/// An internal invariant was violated. Never expected in correct operation;
/// the applier only ever replaces a whole state value, so a fault cannot
/// leave a half-updated state behind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum EngineFault {
    /// The applier ran on an action the validator would have rejected.
    #[error("apply called on a non-validated action: {detail}")]
    UnvalidatedAction { detail: String },

    /// A zone referenced by validated data disappeared.
    #[error("zone {zone} missing from state")]
    MissingZone { zone: ZoneId },

    /// A zone refused a token during setup.
    #[error("{zone} refused {kind} token")]
    ZoneRefused { zone: ZoneId, kind: TokenKind },

    /// A zone's occupant set references a token the state does not know.
    #[error("{zone} holds unknown {token}")]
    UnknownOccupant { token: TokenId, zone: ZoneId },

    /// A token appears in more than one zone.
    #[error("{token} occupies more than one zone")]
    DuplicateToken { token: TokenId },

    /// A token appears in no zone at all.
    #[error("{token} occupies no zone")]
    OrphanToken { token: TokenId },

    /// `players_order` is not a permutation of the player set.
    #[error("players_order is not a permutation of the player set")]
    CorruptTurnOrder,

    /// The turn counter left the nine-turn game.
    #[error("turn number {turn} out of range")]
    TurnOutOfRange { turn: u8 },
}
