//! Identifier newtypes shared across the engine.
//!
//! Every id is an opaque integer. Token and zone ids are allocated by the
//! owning [`GameState`](super::GameState) and never reused; game and snapshot
//! ids are assigned by the persistence layer, and the engine never assumes
//! they are sequential or contiguous.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident, $inner:ty, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub $inner);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl From<$inner> for $name {
            fn from(raw: $inner) -> Self {
                Self(raw)
            }
        }
    };
}

id_type!(
    /// Identifies one game across the whole process and the store.
    GameId, u64, "game"
);
id_type!(
    /// Identifies a persisted state snapshot. Assigned by the store at save
    /// time, monotonically increasing but not necessarily contiguous.
    SnapshotId, u64, "state"
);
id_type!(
    /// Identifies a player. Stable for the lifetime of a game.
    PlayerId, u32, "player"
);
id_type!(
    /// Identifies a discrete game piece (ship, cube, tile, marker).
    TokenId, u32, "token"
);
id_type!(
    /// Identifies any addressable location that can hold tokens.
    ZoneId, u32, "zone"
);
