//! Orchestration around the `umbra-core` engine.
//!
//! The runtime owns everything the pure engine delegates: the games manager
//! (a multi-game cache with per-game mutual exclusion), the persistence
//! repositories (in-memory and file-backed snapshot stores plus an
//! append-only action log), crash recovery by snapshot-and-replay, and
//! `tracing` instrumentation. One game's transitions are strictly ordered —
//! validate, apply, persist, append to history — while different games share
//! nothing and proceed in parallel.
pub mod error;
pub mod manager;
pub mod repository;
pub mod setup;

pub use error::RuntimeError;
pub use manager::GamesManager;
pub use repository::{ActionLog, FileStore, MemoryStore, RepositoryError, SnapshotStore};
pub use setup::{ExtensionCatalog, GameSetup, ZoneRef};
