//! Persistence collaborators.
//!
//! The engine consumes two abstract capabilities: a snapshot store (save a
//! state, get back an opaque monotonically increasing id; load a state by
//! id) and an append-only action log. Both are traits so tests run against
//! the in-memory pair while deployments use the file-backed pair. A save is
//! all-or-nothing: a failure leaves no partial write visible and the caller
//! rolls back the in-memory transition.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

use umbra_core::{GameId, GameState, HistoryEntry, SnapshotId};

/// Errors surfaced by repository implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("repository lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("corrupted log: {0}")]
    CorruptedLog(String),
}

pub type Result<T> = std::result::Result<T, RepositoryError>;

/// Stores serialized game snapshots keyed by opaque ids.
///
/// Ids increase monotonically but the engine never assumes they are
/// sequential or contiguous.
pub trait SnapshotStore: Send + Sync {
    /// Persists a snapshot and returns its freshly assigned id.
    fn save_snapshot(&self, game: GameId, state: &GameState) -> Result<SnapshotId>;

    /// Loads a snapshot by id. `Ok(None)` when the id is unknown.
    fn load_snapshot(&self, id: SnapshotId) -> Result<Option<GameState>>;

    /// The most recent snapshot id of a game, if any was ever saved.
    fn latest(&self, game: GameId) -> Result<Option<SnapshotId>>;

    /// Every game with at least one snapshot.
    fn games(&self) -> Result<Vec<GameId>>;
}

/// Append-only per-game action log, one entry per applied action.
pub trait ActionLog: Send + Sync {
    /// Appends one entry; durable once this returns.
    fn append(&self, game: GameId, entry: &HistoryEntry) -> Result<()>;

    /// Reads the whole log of a game in append order.
    fn read_all(&self, game: GameId) -> Result<Vec<HistoryEntry>>;
}
