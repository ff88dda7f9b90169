//! Zones: where tokens are.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{TokenId, TokenKind};

/// What kind of location a zone is.
///
/// The engine treats the physical board as opaque: a zone is just an
/// addressable bag of tokens with a kind that constrains what it accepts.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum ZoneKind {
    /// A position on a player track (influence, population, ...).
    Track,
    /// A board hex cell.
    Hex,
    /// A ship-upgrade slot on a player board.
    UpgradeSlot,
    /// A player or shared reserve.
    Reserve,
    /// A shared draw bag (technology tiles).
    Bag,
    /// Pseudo-zone for destroyed or used pieces. Cleanup returns its
    /// occupants to their home zones.
    Graveyard,
}

impl ZoneKind {
    /// Kind-based acceptance rule for incoming tokens.
    pub fn accepts(self, kind: TokenKind) -> bool {
        match self {
            ZoneKind::UpgradeSlot => kind == TokenKind::TechnologyTile,
            ZoneKind::Track => {
                matches!(kind, TokenKind::Influence | TokenKind::PopulationCube)
            }
            _ => true,
        }
    }
}

/// One addressable location and the tokens currently occupying it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Zone {
    pub kind: ZoneKind,
    /// Maximum number of occupants, or `None` for unbounded zones.
    pub capacity: Option<u32>,
    /// Token ids present here. Ids are unique game-wide, so a set suffices;
    /// ordered for deterministic iteration.
    pub occupants: BTreeSet<TokenId>,
}

impl Zone {
    pub fn new(kind: ZoneKind, capacity: Option<u32>) -> Self {
        Self {
            kind,
            capacity,
            occupants: BTreeSet::new(),
        }
    }

    pub fn has_room(&self) -> bool {
        self.capacity
            .is_none_or(|cap| self.occupants.len() < cap as usize)
    }

    pub fn contains(&self, token: TokenId) -> bool {
        self.occupants.contains(&token)
    }
}
