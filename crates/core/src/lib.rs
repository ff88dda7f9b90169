//! Deterministic turn/action engine for a phase-structured board game.
//!
//! `umbra-core` owns the authoritative [`state::GameState`], the tagged
//! [`action::Action`] union, and the pure validate/apply pipeline that every
//! mutation flows through — player moves and system-generated cleanup moves
//! alike, so the whole game is one homogeneous, replayable action log. The
//! crate performs no I/O; persistence and multi-game orchestration live in
//! `umbra-runtime`.
pub mod action;
pub mod engine;
pub mod history;
pub mod hooks;
pub mod state;

pub use action::{Action, Actor, EngineFault, RejectReason};
pub use engine::{
    CheckpointManager, EngineError, GameEngine, SetupError, apply, step, validate,
};
pub use history::{History, HistoryEntry, replay};
pub use hooks::{ExtensionHook, HookRegistry, PhaseEvent};
pub use state::{
    GameId, GamePhase, GameState, Player, PlayerId, ResourceKind, ResourceLedger, SnapshotId,
    Token, TokenId, TokenKind, TurnPhase, Zone, ZoneId, ZoneKind,
};
