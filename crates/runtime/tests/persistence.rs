//! Durability: a game survives a process restart and replays identically.

use std::sync::Arc;

use tempfile::TempDir;

use umbra_core::{Action, GamePhase, PlayerId, TokenKind, TurnPhase, ZoneKind};
use umbra_runtime::{ExtensionCatalog, FileStore, GameSetup, GamesManager, RuntimeError};

const P1: PlayerId = PlayerId(1);
const P2: PlayerId = PlayerId(2);

fn open_manager(dir: &TempDir) -> GamesManager {
    // RUST_LOG=debug makes the commit trail visible when a test fails
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    GamesManager::new(store.clone(), store, ExtensionCatalog::new()).unwrap()
}

fn setup() -> GameSetup {
    let mut setup = GameSetup::new(vec![P1, P2]);
    let reserve = setup.add_zone(ZoneKind::Reserve, None);
    let _hex = setup.add_zone(ZoneKind::Hex, None);
    setup.add_token(TokenKind::Ship, Some(P1), reserve);
    setup
}

#[test]
fn a_game_survives_a_restart() {
    let dir = TempDir::new().unwrap();

    let (game, ship, reserve, hex, parted_at) = {
        let manager = open_manager(&dir);
        let game = manager.create_game(&setup()).unwrap();
        manager.choose_race(game, P1, "terran").unwrap();
        manager.choose_race(game, P2, "orion").unwrap();

        let state = manager.get_state(game).unwrap();
        let (&ship, _) = state.tokens.first_key_value().unwrap();
        let mut zones = state.zones.keys().copied();
        let reserve = zones.next().unwrap();
        let hex = zones.next().unwrap();

        manager
            .submit_action(game, Action::player_move(P1, ship, reserve, hex))
            .unwrap();
        manager.submit_action(game, Action::end_turn(P1)).unwrap();
        let at = manager.submit_action(game, Action::end_turn(P2)).unwrap();
        (game, ship, reserve, hex, at)
    };

    // a fresh manager over the same directory, as after a crash
    let manager = open_manager(&dir);
    let state = manager.get_state(game).unwrap();
    assert_eq!(state.phase, GamePhase::Turn(TurnPhase::Action));
    assert_eq!(state.turn_number, 2);
    assert!(state.zones[&hex].contains(ship));
    assert!(!state.zones[&reserve].contains(ship));

    // the reloaded log narrates the pre-restart actions
    let narrative = manager
        .get_history(game, umbra_core::SnapshotId(0), parted_at)
        .unwrap();
    assert!(narrative.contains("ended their turn"));

    // and the game is still playable
    manager.submit_action(game, Action::end_turn(P1)).unwrap();
    assert_eq!(manager.running_games(P1).unwrap(), vec![game]);
}

#[test]
fn replay_from_an_old_snapshot_reaches_the_live_state() {
    let dir = TempDir::new().unwrap();
    let manager = open_manager(&dir);
    let game = manager.create_game(&setup()).unwrap();
    manager.choose_race(game, P1, "terran").unwrap();
    manager.choose_race(game, P2, "orion").unwrap();

    let state = manager.get_state(game).unwrap();
    let (&ship, _) = state.tokens.first_key_value().unwrap();
    let mut zones = state.zones.keys().copied();
    let reserve = zones.next().unwrap();
    let hex = zones.next().unwrap();

    let mid = manager
        .submit_action(game, Action::player_move(P1, ship, reserve, hex))
        .unwrap();
    manager.submit_action(game, Action::end_turn(P1)).unwrap();
    manager.submit_action(game, Action::end_turn(P2)).unwrap();

    // every action after `mid` is in the log, so replaying them from the
    // `mid` snapshot must land exactly on the live state
    let replayed = manager.replay_from(game, mid).unwrap();
    assert_eq!(replayed, manager.get_state(game).unwrap());
}

#[test]
fn game_ids_stay_unique_across_restarts() {
    let dir = TempDir::new().unwrap();
    let first = {
        let manager = open_manager(&dir);
        manager.create_game(&setup()).unwrap()
    };
    let manager = open_manager(&dir);
    let second = manager.create_game(&setup()).unwrap();
    assert_ne!(first, second);
}

#[test]
fn unknown_games_are_reported_not_invented() {
    let dir = TempDir::new().unwrap();
    let manager = open_manager(&dir);
    let err = manager.get_state(umbra_core::GameId(42)).unwrap_err();
    assert!(matches!(err, RuntimeError::GameNotFound(_)));
}
