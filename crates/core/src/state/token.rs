//! Tokens: discrete game pieces with unique identity.

use serde::{Deserialize, Serialize};

use super::{PlayerId, ZoneId};

/// The kind of a discrete game piece.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum TokenKind {
    Ship,
    PopulationCube,
    Influence,
    TechnologyTile,
    PlayerTile,
}

/// One discrete game piece. Its current location is recorded by exactly one
/// zone's occupant set, never here, so a token cannot be in two places.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Owning player, or `None` for neutral pieces (ancient ships).
    pub owner: Option<PlayerId>,
    /// Where cleanup returns this token when it sits in a graveyard zone.
    pub home_zone: Option<ZoneId>,
}

impl Token {
    pub fn new(kind: TokenKind, owner: Option<PlayerId>) -> Self {
        Self {
            kind,
            owner,
            home_zone: None,
        }
    }

    pub fn with_home(mut self, home: ZoneId) -> Self {
        self.home_zone = Some(home);
        self
    }
}
