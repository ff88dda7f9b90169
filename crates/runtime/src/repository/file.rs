//! File-backed snapshot store and action log.
//!
//! Layout under the base directory, one subdirectory per game:
//!
//! ```text
//! game_{id}/snapshot_{sid}.bin   bincode snapshot record, written atomically
//! game_{id}/actions.log          append-only [u32 length][bincode entry]
//! ```
//!
//! Snapshots are written to a temp file and renamed into place, so a crashed
//! save never leaves a partial snapshot visible. Snapshot ids are allocated
//! from a store-wide counter re-seeded by scanning the directory at open —
//! monotone across restarts, not necessarily contiguous.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use umbra_core::{GameId, GameState, HistoryEntry, SnapshotId};

use super::{ActionLog, RepositoryError, Result, SnapshotStore};

/// What actually lands in a snapshot file.
#[derive(Serialize, Deserialize)]
struct SnapshotRecord {
    game: GameId,
    saved_at: DateTime<Utc>,
    state: GameState,
}

#[derive(Default)]
struct Index {
    next_id: u64,
    snapshots: HashMap<SnapshotId, PathBuf>,
    by_game: HashMap<GameId, Vec<SnapshotId>>,
}

/// Durable store implementing both persistence capabilities.
pub struct FileStore {
    base: PathBuf,
    index: Mutex<Index>,
}

impl FileStore {
    /// Opens (or creates) a store rooted at `base`, rebuilding the snapshot
    /// index from the directory contents.
    pub fn open(base: impl AsRef<Path>) -> Result<Self> {
        let base = base.as_ref().to_path_buf();
        fs::create_dir_all(&base)?;

        let mut index = Index::default();
        for dir in fs::read_dir(&base)? {
            let dir = dir?;
            let Some(game) = parse_prefixed(&dir.file_name().to_string_lossy(), "game_") else {
                continue;
            };
            let game = GameId(game);
            let mut ids = Vec::new();
            for file in fs::read_dir(dir.path())? {
                let file = file?;
                let name = file.file_name().to_string_lossy().into_owned();
                let Some(id) = name
                    .strip_suffix(".bin")
                    .and_then(|stem| parse_prefixed(stem, "snapshot_"))
                else {
                    continue;
                };
                let id = SnapshotId(id);
                index.next_id = index.next_id.max(id.0 + 1);
                index.snapshots.insert(id, file.path());
                ids.push(id);
            }
            ids.sort_unstable();
            index.by_game.insert(game, ids);
        }

        tracing::debug!(
            base = %base.display(),
            snapshots = index.snapshots.len(),
            "opened file store"
        );
        Ok(Self {
            base,
            index: Mutex::new(index),
        })
    }

    fn game_dir(&self, game: GameId) -> PathBuf {
        self.base.join(format!("game_{}", game.0))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Index>> {
        self.index.lock().map_err(|_| RepositoryError::LockPoisoned)
    }
}

fn parse_prefixed(name: &str, prefix: &str) -> Option<u64> {
    name.strip_prefix(prefix)?.parse().ok()
}

impl SnapshotStore for FileStore {
    fn save_snapshot(&self, game: GameId, state: &GameState) -> Result<SnapshotId> {
        let record = SnapshotRecord {
            game,
            saved_at: Utc::now(),
            state: state.clone(),
        };
        let bytes = bincode::serialize(&record)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        let mut index = self.lock()?;
        let id = SnapshotId(index.next_id);

        let dir = self.game_dir(game);
        fs::create_dir_all(&dir)?;
        let path = dir.join(format!("snapshot_{}.bin", id.0));
        let temp = path.with_extension("bin.tmp");
        fs::write(&temp, &bytes)?;
        fs::rename(&temp, &path)?;

        index.next_id += 1;
        index.snapshots.insert(id, path);
        index.by_game.entry(game).or_default().push(id);

        tracing::debug!(%game, snapshot = %id, "saved snapshot");
        Ok(id)
    }

    fn load_snapshot(&self, id: SnapshotId) -> Result<Option<GameState>> {
        let path = match self.lock()?.snapshots.get(&id) {
            Some(path) => path.clone(),
            None => return Ok(None),
        };
        let bytes = fs::read(&path)?;
        let record: SnapshotRecord = bincode::deserialize(&bytes)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        Ok(Some(record.state))
    }

    fn latest(&self, game: GameId) -> Result<Option<SnapshotId>> {
        Ok(self
            .lock()?
            .by_game
            .get(&game)
            .and_then(|ids| ids.last().copied()))
    }

    fn games(&self) -> Result<Vec<GameId>> {
        let index = self.lock()?;
        let mut games: Vec<GameId> = index.by_game.keys().copied().collect();
        games.sort_unstable();
        Ok(games)
    }
}

impl ActionLog for FileStore {
    fn append(&self, game: GameId, entry: &HistoryEntry) -> Result<()> {
        let bytes = bincode::serialize(entry)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;
        let dir = self.game_dir(game);
        fs::create_dir_all(&dir)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join("actions.log"))?;
        file.write_all(&(bytes.len() as u32).to_le_bytes())?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(())
    }

    fn read_all(&self, game: GameId) -> Result<Vec<HistoryEntry>> {
        let path = self.game_dir(game).join("actions.log");
        if !path.exists() {
            return Ok(Vec::new());
        }
        let bytes = fs::read(&path)?;
        let mut entries = Vec::new();
        let mut offset = 0usize;
        while offset < bytes.len() {
            if offset + 4 > bytes.len() {
                return Err(RepositoryError::CorruptedLog(format!(
                    "truncated length header at byte {offset}"
                )));
            }
            let len =
                u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
                    as usize;
            offset += 4;
            if offset + len > bytes.len() {
                return Err(RepositoryError::CorruptedLog(format!(
                    "entry of {len} bytes overruns the file at byte {offset}"
                )));
            }
            let entry: HistoryEntry = bincode::deserialize(&bytes[offset..offset + len])
                .map_err(|e| RepositoryError::CorruptedLog(e.to_string()))?;
            entries.push(entry);
            offset += len;
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use umbra_core::{Action, PlayerId};

    #[test]
    fn snapshots_survive_a_reopen() {
        let dir = TempDir::new().unwrap();
        let state = GameState::new(vec![PlayerId(1), PlayerId(2)]);

        let first = FileStore::open(dir.path()).unwrap();
        let a = first.save_snapshot(GameId(1), &state).unwrap();
        let b = first.save_snapshot(GameId(1), &state).unwrap();
        drop(first);

        let reopened = FileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.latest(GameId(1)).unwrap(), Some(b));
        assert_eq!(reopened.load_snapshot(a).unwrap(), Some(state.clone()));

        // ids keep increasing across restarts
        let c = reopened.save_snapshot(GameId(1), &state).unwrap();
        assert!(c > b);
    }

    #[test]
    fn log_round_trips_in_order() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let entries: Vec<HistoryEntry> = (0..4)
            .map(|i| HistoryEntry {
                before: SnapshotId(i),
                action: Action::end_turn(PlayerId(1)),
                after: SnapshotId(i + 1),
            })
            .collect();
        for entry in &entries {
            store.append(GameId(3), entry).unwrap();
        }
        assert_eq!(store.read_all(GameId(3)).unwrap(), entries);
        assert!(store.read_all(GameId(9)).unwrap().is_empty());
    }

    #[test]
    fn truncated_log_is_reported_as_corrupted() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store
            .append(
                GameId(1),
                &HistoryEntry {
                    before: SnapshotId(0),
                    action: Action::end_turn(PlayerId(1)),
                    after: SnapshotId(1),
                },
            )
            .unwrap();

        let path = dir.path().join("game_1/actions.log");
        let bytes = fs::read(&path).unwrap();
        fs::write(&path, &bytes[..bytes.len() - 2]).unwrap();

        assert!(matches!(
            store.read_all(GameId(1)),
            Err(RepositoryError::CorruptedLog(_))
        ));
    }
}
