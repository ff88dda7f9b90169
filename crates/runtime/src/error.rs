//! Runtime error taxonomy.
//!
//! Player mistakes (`Rejected`), programmer errors (`Fault`) and collaborator
//! failures (`Persistence`) stay distinct categories all the way to the
//! caller, so a web layer never reports an engine fault as a player mistake.

use umbra_core::engine::SetupError;
use umbra_core::{EngineError, EngineFault, GameId, RejectReason, SnapshotId};

use crate::repository::RepositoryError;

/// Errors surfaced by the games manager.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The action is illegal; recoverable, state untouched.
    #[error("rejected: {0}")]
    Rejected(RejectReason),

    /// An engine invariant broke; fatal to the in-flight request.
    #[error("engine fault: {0}")]
    Fault(EngineFault),

    /// The save/load collaborator failed; the in-memory transition was
    /// rolled back and the caller may retry.
    #[error("persistence failed: {0}")]
    Persistence(#[from] RepositoryError),

    /// No such game in the store or the cache.
    #[error("{0} not found")]
    GameNotFound(GameId),

    /// No snapshot persisted under this id.
    #[error("{0} not found")]
    SnapshotNotFound(SnapshotId),

    /// The setup named an extension the catalog does not know.
    #[error("unknown extension '{0}'")]
    UnknownExtension(String),

    /// The game setup was structurally invalid.
    #[error("invalid setup: {0}")]
    Setup(String),

    /// Installation-phase operation failed.
    #[error(transparent)]
    Installation(#[from] SetupError),

    /// `revert` called without a checkpoint for the current sub-turn.
    #[error("no checkpoint to revert to")]
    NoCheckpoint,

    /// A per-game mutex was poisoned by a panicking holder.
    #[error("game lock poisoned")]
    LockPoisoned,
}

impl From<EngineError> for RuntimeError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::Rejected(reason) => RuntimeError::Rejected(reason),
            EngineError::Fault(fault) => RuntimeError::Fault(fault),
        }
    }
}

impl From<RejectReason> for RuntimeError {
    fn from(reason: RejectReason) -> Self {
        RuntimeError::Rejected(reason)
    }
}

impl From<EngineFault> for RuntimeError {
    fn from(fault: EngineFault) -> Self {
        RuntimeError::Fault(fault)
    }
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
