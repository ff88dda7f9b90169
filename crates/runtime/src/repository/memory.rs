//! In-memory snapshot store and action log.
//!
//! The default pair for tests and single-process play without durability.

use std::collections::HashMap;
use std::sync::Mutex;

use umbra_core::{GameId, GameState, HistoryEntry, SnapshotId};

use super::{ActionLog, RepositoryError, Result, SnapshotStore};

#[derive(Default)]
struct Inner {
    next_id: u64,
    snapshots: HashMap<SnapshotId, (GameId, GameState)>,
    by_game: HashMap<GameId, Vec<SnapshotId>>,
    logs: HashMap<GameId, Vec<HistoryEntry>>,
}

/// Process-local store implementing both persistence capabilities.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| RepositoryError::LockPoisoned)
    }
}

impl SnapshotStore for MemoryStore {
    fn save_snapshot(&self, game: GameId, state: &GameState) -> Result<SnapshotId> {
        let mut inner = self.lock()?;
        let id = SnapshotId(inner.next_id);
        inner.next_id += 1;
        inner.snapshots.insert(id, (game, state.clone()));
        inner.by_game.entry(game).or_default().push(id);
        Ok(id)
    }

    fn load_snapshot(&self, id: SnapshotId) -> Result<Option<GameState>> {
        let inner = self.lock()?;
        Ok(inner.snapshots.get(&id).map(|(_, state)| state.clone()))
    }

    fn latest(&self, game: GameId) -> Result<Option<SnapshotId>> {
        let inner = self.lock()?;
        Ok(inner
            .by_game
            .get(&game)
            .and_then(|ids| ids.last().copied()))
    }

    fn games(&self) -> Result<Vec<GameId>> {
        let inner = self.lock()?;
        let mut games: Vec<GameId> = inner.by_game.keys().copied().collect();
        games.sort_unstable();
        Ok(games)
    }
}

impl ActionLog for MemoryStore {
    fn append(&self, game: GameId, entry: &HistoryEntry) -> Result<()> {
        self.lock()?
            .logs
            .entry(game)
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    fn read_all(&self, game: GameId) -> Result<Vec<HistoryEntry>> {
        Ok(self.lock()?.logs.get(&game).cloned().unwrap_or_default())
    }
}
