//! Authoritative game state representation.
//!
//! [`GameState`] is a value: the applier clones it, mutates the clone and
//! returns it, so a caller never observes a half-updated state. Ordered maps
//! back every collection, which keeps iteration — and therefore replay —
//! deterministic.

mod common;
mod phase;
mod player;
mod resources;
mod token;
mod zone;

pub use common::{GameId, PlayerId, SnapshotId, TokenId, ZoneId};
pub use phase::{GamePhase, TurnPhase};
pub use player::Player;
pub use resources::{ResourceKind, ResourceLedger};
pub use token::{Token, TokenKind};
pub use zone::{Zone, ZoneKind};

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::action::{Action, EngineFault};

/// Canonical snapshot of one game.
///
/// The snapshot id is deliberately absent: identity is assigned by the
/// persistence store at save time, and the engine never assumes ids are
/// sequential or contiguous.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Overall phase; the turn phase lives inside [`GamePhase::Turn`].
    pub phase: GamePhase,
    /// 0 is the installation turn, 1–9 the classic turns. Only the sequencer
    /// advances it, monotonically.
    pub turn_number: u8,
    /// Player records keyed by their stable id.
    pub players: BTreeMap<PlayerId, Player>,
    /// Turn order for the current turn. Always a permutation of
    /// `players.keys()`; extensions may permute it between turns.
    pub players_order: Vec<PlayerId>,
    /// Index into `players_order` of the active player during ACTION.
    pub current_slot: usize,
    /// Players that have submitted their End-of-turn sentinel this turn.
    pub passed: BTreeSet<PlayerId>,
    /// Every addressable location, keyed by zone id.
    pub zones: BTreeMap<ZoneId, Zone>,
    /// Every discrete piece, keyed by token id.
    pub tokens: BTreeMap<TokenId, Token>,
    /// Fungible resource counters per player.
    pub resources: BTreeMap<PlayerId, ResourceLedger>,
    /// Player actions applied since the active player's sub-turn began.
    /// System actions are never recorded here; a successful End-of-turn
    /// clears it.
    pub pending_actions: Vec<Action>,
    /// Names of the extensions activated for this game. The runtime uses
    /// them to rebuild the hook registry when reloading a persisted game.
    pub extensions: Vec<String>,

    // Monotone id allocators; ids are never reused.
    next_token_id: u32,
    next_zone_id: u32,
}

impl GameState {
    /// Creates an installation-phase state for the given players, in the
    /// given turn order.
    pub fn new(players_order: Vec<PlayerId>) -> Self {
        let players = players_order
            .iter()
            .map(|&id| (id, Player::new()))
            .collect::<BTreeMap<_, _>>();
        let resources = players_order
            .iter()
            .map(|&id| (id, ResourceLedger::default()))
            .collect();
        Self {
            phase: GamePhase::Init,
            turn_number: 0,
            players,
            players_order,
            current_slot: 0,
            passed: BTreeSet::new(),
            zones: BTreeMap::new(),
            tokens: BTreeMap::new(),
            resources,
            pending_actions: Vec::new(),
            extensions: Vec::new(),
            next_token_id: 0,
            next_zone_id: 0,
        }
    }

    /// Adds a zone and returns its freshly allocated id.
    pub fn add_zone(&mut self, kind: ZoneKind, capacity: Option<u32>) -> ZoneId {
        let id = ZoneId(self.next_zone_id);
        self.next_zone_id += 1;
        self.zones.insert(id, Zone::new(kind, capacity));
        id
    }

    /// Creates a token inside `zone` and returns its freshly allocated id.
    ///
    /// Setup-time counterpart of a token move; the zone must exist and have
    /// room for the token kind.
    pub fn spawn_token(&mut self, token: Token, zone: ZoneId) -> Result<TokenId, EngineFault> {
        let target = self
            .zones
            .get_mut(&zone)
            .ok_or(EngineFault::MissingZone { zone })?;
        if !target.kind.accepts(token.kind) || !target.has_room() {
            return Err(EngineFault::ZoneRefused {
                zone,
                kind: token.kind,
            });
        }
        let id = TokenId(self.next_token_id);
        self.next_token_id += 1;
        target.occupants.insert(id);
        self.tokens.insert(id, token);
        Ok(id)
    }

    /// The player whose sub-turn it is, during ACTION only.
    pub fn current_actor(&self) -> Option<PlayerId> {
        if self.phase != GamePhase::Turn(TurnPhase::Action) {
            return None;
        }
        self.players_order.get(self.current_slot).copied()
    }

    /// Finds the zone currently holding `token`, if any.
    pub fn locate(&self, token: TokenId) -> Option<ZoneId> {
        self.zones
            .iter()
            .find(|(_, zone)| zone.contains(token))
            .map(|(&id, _)| id)
    }

    /// Checks the structural invariants of the state.
    ///
    /// Every token occupies exactly one zone, `players_order` is a
    /// permutation of the player set, the active slot is in range, and the
    /// turn counter stays within the nine-turn game.
    pub fn check_invariants(&self) -> Result<(), EngineFault> {
        let mut seen: BTreeSet<TokenId> = BTreeSet::new();
        for (&zone_id, zone) in &self.zones {
            for &token in &zone.occupants {
                if !self.tokens.contains_key(&token) {
                    return Err(EngineFault::UnknownOccupant {
                        token,
                        zone: zone_id,
                    });
                }
                if !seen.insert(token) {
                    return Err(EngineFault::DuplicateToken { token });
                }
            }
        }
        if let Some(&orphan) = self.tokens.keys().find(|id| !seen.contains(id)) {
            return Err(EngineFault::OrphanToken { token: orphan });
        }

        let ordered: BTreeSet<PlayerId> = self.players_order.iter().copied().collect();
        if ordered.len() != self.players_order.len()
            || !ordered.iter().eq(self.players.keys())
        {
            return Err(EngineFault::CorruptTurnOrder);
        }
        if !self.players_order.is_empty() && self.current_slot >= self.players_order.len() {
            return Err(EngineFault::CorruptTurnOrder);
        }
        if self.turn_number > 9 {
            return Err(EngineFault::TurnOutOfRange {
                turn: self.turn_number,
            });
        }
        Ok(())
    }
}
