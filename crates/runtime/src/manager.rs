//! Multi-game orchestration.
//!
//! [`GamesManager`] is the entry point the web/session layer calls. It keeps
//! an explicit cache of loaded games — load-on-miss from the store, evicted
//! when a game ends — each behind its own mutex, so at most one action is
//! being validated or applied per game while different games proceed in
//! parallel.
//!
//! Per accepted action the ordering is strict: validate, apply, persist the
//! successor snapshot, append to the action log, then commit in memory. A
//! failed persistence call aborts the transition before anything in memory
//! changes, so callers never observe an unsaved state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use tracing::{debug, info};

use umbra_core::engine::{self, sequencer, CheckpointManager, SetupError};
use umbra_core::hooks::PhaseEvent;
use umbra_core::{
    Action, Actor, GameId, GamePhase, GameState, History, HistoryEntry, HookRegistry, PlayerId,
    RejectReason, SnapshotId,
};

use crate::error::{Result, RuntimeError};
use crate::repository::{ActionLog, MemoryStore, RepositoryError, SnapshotStore};
use crate::setup::{ExtensionCatalog, GameSetup};

/// One loaded game: its state, hooks, history and checkpoint.
struct GameSession {
    game: GameId,
    hooks: HookRegistry,
    state: GameState,
    /// Snapshot id of the last persisted state.
    head: SnapshotId,
    history: History,
    checkpoints: CheckpointManager,
}

/// The process-wide entry point for running games.
pub struct GamesManager {
    store: Arc<dyn SnapshotStore>,
    log: Arc<dyn ActionLog>,
    catalog: ExtensionCatalog,
    games: RwLock<HashMap<GameId, Arc<Mutex<GameSession>>>>,
    next_game_id: AtomicU64,
}

impl GamesManager {
    /// Creates a manager over the given collaborators, seeding the game id
    /// allocator past every game already in the store.
    pub fn new(
        store: Arc<dyn SnapshotStore>,
        log: Arc<dyn ActionLog>,
        catalog: ExtensionCatalog,
    ) -> Result<Self> {
        let next = store
            .games()?
            .into_iter()
            .map(|id| id.0 + 1)
            .max()
            .unwrap_or(0);
        Ok(Self {
            store,
            log,
            catalog,
            games: RwLock::new(HashMap::new()),
            next_game_id: AtomicU64::new(next),
        })
    }

    /// Convenience constructor over a process-local store, for tests and
    /// non-durable play.
    pub fn in_memory(catalog: ExtensionCatalog) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store, catalog)
    }

    /// Instantiates a new game from a setup, persists its installation
    /// state, and returns its id.
    pub fn create_game(&self, setup: &GameSetup) -> Result<GameId> {
        let hooks = self.catalog.registry_for(setup.extensions())?;
        let state = setup.build()?;
        let game = GameId(self.next_game_id.fetch_add(1, Ordering::SeqCst));
        let head = self.store.save_snapshot(game, &state)?;

        let session = GameSession {
            game,
            hooks,
            state,
            head,
            history: History::new(),
            checkpoints: CheckpointManager::new(),
        };
        self.cache_write()?.insert(game, Arc::new(Mutex::new(session)));
        info!(%game, "created game");
        Ok(game)
    }

    /// Records a player's race choice during the installation phase and
    /// starts the game once everyone has one.
    pub fn choose_race(
        &self,
        game: GameId,
        player: PlayerId,
        race: impl Into<String>,
    ) -> Result<()> {
        let session = self.session(game)?;
        let mut s = lock(&session)?;
        self.edit_installation(&mut s, |state| {
            let record = state
                .players
                .get_mut(&player)
                .ok_or(RuntimeError::Rejected(RejectReason::UnknownPlayer { player }))?;
            record.race = Some(race.into());
            Ok(())
        })?;
        self.try_begin(&mut s)
    }

    /// Records a player's ordered race wishes during the installation phase.
    pub fn set_race_wishes(
        &self,
        game: GameId,
        player: PlayerId,
        wishes: Vec<String>,
    ) -> Result<()> {
        let session = self.session(game)?;
        let mut s = lock(&session)?;
        self.edit_installation(&mut s, |state| {
            let record = state
                .players
                .get_mut(&player)
                .ok_or(RuntimeError::Rejected(RejectReason::UnknownPlayer { player }))?;
            record.race_wishes = wishes;
            Ok(())
        })
    }

    /// Resolves outstanding race wishes (first available wish wins, in turn
    /// order), starts the game if that settled everyone, and returns the
    /// players still without a race.
    pub fn resolve_races(&self, game: GameId) -> Result<Vec<PlayerId>> {
        let session = self.session(game)?;
        let mut s = lock(&session)?;
        let mut unresolved = Vec::new();
        self.edit_installation(&mut s, |state| {
            unresolved = sequencer::resolve_race_wishes(state);
            Ok(())
        })?;
        self.try_begin(&mut s)?;
        Ok(unresolved)
    }

    /// Submits one action. On success returns the id of the last snapshot
    /// persisted — for an End-of-turn that closes the round this includes
    /// the automatic phases, which run to completion before returning.
    pub fn submit_action(&self, game: GameId, action: Action) -> Result<SnapshotId> {
        let session = self.session(game)?;
        let mut s = lock(&session)?;

        // Checkpoint before the current actor's first action of their
        // sub-turn.
        if let Actor::Player(player) = action.actor()
            && s.state.current_actor() == Some(player)
        {
            let GameSession {
                checkpoints, state, ..
            } = &mut *s;
            checkpoints.ensure(player, state);
        }

        let mut last = self.commit_action(&mut s, &action)?;

        if matches!(
            action,
            Action::EndTurn {
                actor: Actor::Player(_)
            }
        ) {
            s.checkpoints.clear();
        }

        // Drive the automatic phases the committed action may have opened.
        while let Some(script) = sequencer::phase_script(&s.state, &s.hooks) {
            for sys_action in script {
                last = self.commit_action(&mut s, &sys_action)?;
            }
        }

        if s.state.phase == GamePhase::End {
            info!(%game, "game ended, evicting from cache");
            drop(s);
            self.cache_write()?.remove(&game);
        }
        Ok(last)
    }

    /// Restores the checkpoint taken at the start of the active player's
    /// sub-turn, discarding everything applied since. The restored state is
    /// persisted so crash recovery cannot resurrect the abandoned actions.
    pub fn revert(&self, game: GameId) -> Result<SnapshotId> {
        let session = self.session(game)?;
        let mut s = lock(&session)?;
        let checkpoint = s.checkpoints.revert().ok_or(RuntimeError::NoCheckpoint)?;
        let head = self.store.save_snapshot(game, &checkpoint)?;
        s.state = checkpoint;
        s.head = head;
        debug!(%game, %head, "reverted to sub-turn checkpoint");
        Ok(head)
    }

    /// The current in-memory state of a loaded game.
    pub fn get_state(&self, game: GameId) -> Result<GameState> {
        let session = self.session(game)?;
        let s = lock(&session)?;
        Ok(s.state.clone())
    }

    /// The current state serialized as JSON, for presentation layers that
    /// speak text rather than Rust types.
    pub fn export_state(&self, game: GameId) -> Result<String> {
        let state = self.get_state(game)?;
        serde_json::to_string_pretty(&state)
            .map_err(|err| RepositoryError::Serialization(err.to_string()).into())
    }

    /// Human-readable narrative of the actions between two snapshot ids.
    pub fn get_history(&self, game: GameId, from: SnapshotId, to: SnapshotId) -> Result<String> {
        let session = self.session(game)?;
        let s = lock(&session)?;
        Ok(s.history.narrate(from, to).join("\n"))
    }

    /// Reconstructs the state reached from `from` by replaying the persisted
    /// action log through the normal pipeline.
    pub fn replay_from(&self, game: GameId, from: SnapshotId) -> Result<GameState> {
        let initial = self
            .store
            .load_snapshot(from)?
            .ok_or(RuntimeError::SnapshotNotFound(from))?;
        let entries = self.log.read_all(game)?;
        let hooks = {
            let session = self.session(game)?;
            let s = lock(&session)?;
            s.hooks.clone()
        };
        let actions = entries
            .iter()
            .filter(|entry| entry.before >= from)
            .map(|entry| &entry.action);
        umbra_core::replay(initial, actions, &hooks).map_err(RuntimeError::from)
    }

    /// Ids of the games `player` is currently playing.
    pub fn running_games(&self, player: PlayerId) -> Result<Vec<GameId>> {
        self.games_of(player, false)
    }

    /// Ids of the completed games `player` played in.
    pub fn ended_games(&self, player: PlayerId) -> Result<Vec<GameId>> {
        self.games_of(player, true)
    }

    // ------------------------------------------------------------------
    // internals
    // ------------------------------------------------------------------

    /// Validate, apply, persist, append, then commit in memory.
    fn commit_action(&self, s: &mut GameSession, action: &Action) -> Result<SnapshotId> {
        let next = engine::step(&s.state, action, &s.hooks)?;
        let before = s.head;
        let after = self.store.save_snapshot(s.game, &next)?;
        self.log.append(
            s.game,
            &HistoryEntry {
                before,
                action: action.clone(),
                after,
            },
        )?;
        s.history.append(before, action.clone(), after);
        s.state = next;
        s.head = after;
        debug!(
            game = %s.game,
            action = action.as_snake_case(),
            %after,
            "action committed"
        );
        Ok(after)
    }

    /// Applies an installation-phase edit to a copy of the state, persists
    /// it, and commits — the same no-unsaved-state discipline as actions.
    fn edit_installation(
        &self,
        s: &mut GameSession,
        edit: impl FnOnce(&mut GameState) -> Result<()>,
    ) -> Result<()> {
        if s.state.phase != GamePhase::Init {
            return Err(SetupError::AlreadyStarted.into());
        }
        let mut next = s.state.clone();
        edit(&mut next)?;
        let head = self.store.save_snapshot(s.game, &next)?;
        s.state = next;
        s.head = head;
        Ok(())
    }

    /// Fires `INIT -> TURN(1, ACTION)` once every race is resolved, then
    /// runs any game-start hook actions through the pipeline.
    fn try_begin(&self, s: &mut GameSession) -> Result<()> {
        if s.state.phase != GamePhase::Init
            || s.state.players.values().any(|p| p.race.is_none())
        {
            return Ok(());
        }
        let mut next = s.state.clone();
        sequencer::begin(&mut next)?;
        let head = self.store.save_snapshot(s.game, &next)?;
        s.state = next;
        s.head = head;
        info!(game = %s.game, "installation complete, turn 1 begins");

        for action in s.hooks.dispatch_phase(PhaseEvent::GameStart, &s.state) {
            self.commit_action(s, &action)?;
        }
        Ok(())
    }

    /// The cached session for a game, loading it from the store on a miss.
    fn session(&self, game: GameId) -> Result<Arc<Mutex<GameSession>>> {
        if let Some(session) = self.cache_read()?.get(&game) {
            return Ok(session.clone());
        }

        let head = self
            .store
            .latest(game)?
            .ok_or(RuntimeError::GameNotFound(game))?;
        let state = self
            .store
            .load_snapshot(head)?
            .ok_or(RuntimeError::SnapshotNotFound(head))?;
        let hooks = self.catalog.registry_for(&state.extensions)?;

        let mut history = History::new();
        for entry in self.log.read_all(game)? {
            history.append(entry.before, entry.action, entry.after);
        }

        let ended = state.phase == GamePhase::End;
        let session = Arc::new(Mutex::new(GameSession {
            game,
            hooks,
            state,
            head,
            history,
            checkpoints: CheckpointManager::new(),
        }));
        info!(%game, %head, "loaded game from store");

        // finished games are served for queries but never re-enter the cache
        if ended {
            return Ok(session);
        }
        let mut cache = self.cache_write()?;
        Ok(cache.entry(game).or_insert(session).clone())
    }

    fn games_of(&self, player: PlayerId, ended: bool) -> Result<Vec<GameId>> {
        let mut found = Vec::new();
        for game in self.store.games()? {
            let state = match self.cache_read()?.get(&game) {
                Some(session) => lock(session)?.state.clone(),
                None => match self.store.latest(game)? {
                    Some(head) => self
                        .store
                        .load_snapshot(head)?
                        .ok_or(RuntimeError::SnapshotNotFound(head))?,
                    None => continue,
                },
            };
            if state.players.contains_key(&player) && (state.phase == GamePhase::End) == ended {
                found.push(game);
            }
        }
        Ok(found)
    }

    fn cache_read(
        &self,
    ) -> Result<std::sync::RwLockReadGuard<'_, HashMap<GameId, Arc<Mutex<GameSession>>>>> {
        self.games.read().map_err(|_| RuntimeError::LockPoisoned)
    }

    fn cache_write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, HashMap<GameId, Arc<Mutex<GameSession>>>>> {
        self.games.write().map_err(|_| RuntimeError::LockPoisoned)
    }
}

fn lock(session: &Arc<Mutex<GameSession>>) -> Result<MutexGuard<'_, GameSession>> {
    session.lock().map_err(|_| RuntimeError::LockPoisoned)
}
