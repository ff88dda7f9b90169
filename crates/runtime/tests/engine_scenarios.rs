//! End-to-end scenarios driven through the games manager.

use std::sync::Arc;

use umbra_core::{
    Action, GameId, GamePhase, GameState, PlayerId, RejectReason, ResourceKind, SnapshotId,
    TokenId, TokenKind, TurnPhase, ZoneId, ZoneKind,
};
use umbra_runtime::{ExtensionCatalog, GameSetup, GamesManager, RuntimeError};

const P1: PlayerId = PlayerId(1);
const P2: PlayerId = PlayerId(2);

/// Two players, a shared reserve, a hex, a population track, and a graveyard
/// holding one cube that cleanup should send home to the track.
fn new_game(manager: &GamesManager) -> GameId {
    let mut setup = GameSetup::new(vec![P1, P2]);
    let reserve = setup.add_zone(ZoneKind::Reserve, None);
    let _hex = setup.add_zone(ZoneKind::Hex, None);
    let track = setup.add_zone(ZoneKind::Track, None);
    let graveyard = setup.add_zone(ZoneKind::Graveyard, None);
    setup.add_token(TokenKind::Ship, Some(P1), reserve);
    setup.add_token(TokenKind::Ship, Some(P2), reserve);
    setup.add_token_with_home(TokenKind::PopulationCube, Some(P1), graveyard, track);

    let game = manager.create_game(&setup).unwrap();
    manager.choose_race(game, P1, "terran").unwrap();
    manager.choose_race(game, P2, "orion").unwrap();
    game
}

fn manager() -> GamesManager {
    GamesManager::in_memory(ExtensionCatalog::new()).unwrap()
}

fn zone_of_kind(state: &GameState, kind: ZoneKind) -> ZoneId {
    *state
        .zones
        .iter()
        .find(|(_, zone)| zone.kind == kind)
        .map(|(id, _)| id)
        .unwrap()
}

fn ship_of(state: &GameState, player: PlayerId) -> TokenId {
    *state
        .tokens
        .iter()
        .find(|(_, t)| t.kind == TokenKind::Ship && t.owner == Some(player))
        .map(|(id, _)| id)
        .unwrap()
}

#[test]
fn race_choices_open_turn_one() {
    let manager = manager();
    let game = new_game(&manager);
    let state = manager.get_state(game).unwrap();
    assert_eq!(state.phase, GamePhase::Turn(TurnPhase::Action));
    assert_eq!(state.turn_number, 1);
    assert_eq!(state.current_actor(), Some(P1));

    let json = manager.export_state(game).unwrap();
    assert!(json.contains("\"turn_number\": 1"));
}

#[test]
fn end_turn_from_the_wrong_player_is_rejected_and_harmless() {
    let manager = manager();
    let game = new_game(&manager);
    let before = manager.get_state(game).unwrap();

    let err = manager.submit_action(game, Action::end_turn(P2)).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Rejected(RejectReason::NotCurrentActor {
            player: P2,
            current: Some(P1),
        })
    ));
    assert_eq!(manager.get_state(game).unwrap(), before);
}

#[test]
fn move_from_a_zone_the_token_is_not_in_is_rejected() {
    let manager = manager();
    let game = new_game(&manager);
    let state = manager.get_state(game).unwrap();
    let ship = ship_of(&state, P1);
    let hex = zone_of_kind(&state, ZoneKind::Hex);

    // the ship sits in the reserve, not the hex
    let err = manager
        .submit_action(game, Action::player_move(P1, ship, hex, hex))
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Rejected(RejectReason::ElementNotInSourceZone { token, zone })
            if token == ship && zone == hex
    ));
    assert_eq!(manager.get_state(game).unwrap(), state);
}

#[test]
fn all_passes_run_battle_upkeep_and_cleanup_without_player_input() {
    let manager = manager();
    let game = new_game(&manager);
    let state = manager.get_state(game).unwrap();
    let track = zone_of_kind(&state, ZoneKind::Track);
    let graveyard = zone_of_kind(&state, ZoneKind::Graveyard);

    manager.submit_action(game, Action::end_turn(P1)).unwrap();
    let last = manager.submit_action(game, Action::end_turn(P2)).unwrap();

    let after = manager.get_state(game).unwrap();
    assert_eq!(after.phase, GamePhase::Turn(TurnPhase::Action));
    assert_eq!(after.turn_number, 2);
    // the built-in cleanup sweep returned the cube to its home track
    assert!(after.zones[&graveyard].occupants.is_empty());
    assert_eq!(after.zones[&track].occupants.len(), 1);
    // the sub-turn log opens the new turn empty, system moves included
    assert!(after.pending_actions.is_empty());

    // the automatic phases are ordinary logged actions
    let narrative = manager
        .get_history(game, SnapshotId(0), last)
        .unwrap();
    assert_eq!(
        narrative
            .lines()
            .filter(|l| l.ends_with("system closed the phase"))
            .count(),
        3
    );
    assert!(narrative.contains("system moved"));
}

#[test]
fn a_full_home_zone_does_not_stall_the_round() {
    let manager = manager();
    let mut setup = GameSetup::new(vec![P1, P2]);
    let reserve = setup.add_zone(ZoneKind::Reserve, None);
    let track = setup.add_zone(ZoneKind::Track, Some(1));
    let graveyard = setup.add_zone(ZoneKind::Graveyard, None);
    setup.add_token(TokenKind::Ship, Some(P1), reserve);
    setup.add_token(TokenKind::PopulationCube, Some(P2), track);
    // this cube's home track is already at capacity
    setup.add_token_with_home(TokenKind::PopulationCube, Some(P1), graveyard, track);
    let game = manager.create_game(&setup).unwrap();
    manager.choose_race(game, P1, "terran").unwrap();
    manager.choose_race(game, P2, "orion").unwrap();

    manager.submit_action(game, Action::end_turn(P1)).unwrap();
    manager.submit_action(game, Action::end_turn(P2)).unwrap();

    // the round closed despite the stranded cube, which stays put
    let state = manager.get_state(game).unwrap();
    assert_eq!(state.phase, GamePhase::Turn(TurnPhase::Action));
    assert_eq!(state.turn_number, 2);
    let track_id = zone_of_kind(&state, ZoneKind::Track);
    let graveyard_id = zone_of_kind(&state, ZoneKind::Graveyard);
    assert_eq!(state.zones[&track_id].occupants.len(), 1);
    assert_eq!(state.zones[&graveyard_id].occupants.len(), 1);
    manager.submit_action(game, Action::end_turn(P1)).unwrap();
}

#[test]
fn revert_restores_the_sub_turn_checkpoint() {
    let manager = manager();
    let game = new_game(&manager);
    let state = manager.get_state(game).unwrap();
    let ship = ship_of(&state, P1);
    let reserve = zone_of_kind(&state, ZoneKind::Reserve);
    let hex = zone_of_kind(&state, ZoneKind::Hex);

    // two valid actions, then an invalid one
    manager
        .submit_action(game, Action::player_move(P1, ship, reserve, hex))
        .unwrap();
    manager
        .submit_action(game, Action::adjust(P1, ResourceKind::Science, 0, 3))
        .unwrap();
    let err = manager
        .submit_action(game, Action::player_move(P1, ship, reserve, hex))
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Rejected(_)));

    manager.revert(game).unwrap();
    let after = manager.get_state(game).unwrap();
    assert_eq!(after, state);
    assert!(after.zones[&reserve].contains(ship));
    assert_eq!(after.resources[&P1].science, 0);

    // reverting while the checkpoint still stands is idempotent
    manager.revert(game).unwrap();
    assert_eq!(manager.get_state(game).unwrap(), after);
}

#[test]
fn after_turn_nine_the_game_is_over_for_good() {
    let manager = manager();
    let game = new_game(&manager);

    for _ in 1..=9 {
        manager.submit_action(game, Action::end_turn(P1)).unwrap();
        manager.submit_action(game, Action::end_turn(P2)).unwrap();
    }
    let state = manager.get_state(game).unwrap();
    assert_eq!(state.phase, GamePhase::End);

    let err = manager.submit_action(game, Action::end_turn(P1)).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Rejected(RejectReason::WrongPhase {
            phase: GamePhase::End
        })
    ));

    assert_eq!(manager.ended_games(P1).unwrap(), vec![game]);
    assert!(manager.running_games(P1).unwrap().is_empty());

    // the evicted game is reloaded for each query and stays rejected
    assert_eq!(manager.get_state(game).unwrap().phase, GamePhase::End);
    let again = manager.submit_action(game, Action::end_turn(P2)).unwrap_err();
    assert!(matches!(
        again,
        RuntimeError::Rejected(RejectReason::WrongPhase { .. })
    ));
}

#[test]
fn turn_number_and_phase_never_go_backwards() {
    let manager = manager();
    let game = new_game(&manager);
    let mut previous = manager.get_state(game).unwrap();

    for _ in 1..=9 {
        for player in [P1, P2] {
            manager.submit_action(game, Action::end_turn(player)).unwrap();
            let now = manager.get_state(game).unwrap();
            assert!(now.turn_number >= previous.turn_number);
            assert!(
                now.turn_number > previous.turn_number || now.phase >= previous.phase,
                "phase went backwards within a turn"
            );
            assert!(now.check_invariants().is_ok());
            previous = now;
        }
    }
}

#[test]
fn stale_resource_adjust_is_rejected() {
    let manager = manager();
    let game = new_game(&manager);

    manager
        .submit_action(game, Action::adjust(P1, ResourceKind::Money, 0, 8))
        .unwrap();
    let err = manager
        .submit_action(game, Action::adjust(P1, ResourceKind::Money, 0, 12))
        .unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::Rejected(RejectReason::StaleResourceValue {
            current: 8,
            declared: 0,
            ..
        })
    ));
}

mod extensions {
    use super::*;
    use umbra_core::hooks::{ExtensionHook, PhaseEvent};
    use umbra_core::HookRegistry;

    /// A toy rules module: vetoes player moves into a graveyard, and during
    /// battle sends every ship sitting in a hex to the graveyard.
    struct AncientDefenders;

    impl ExtensionHook for AncientDefenders {
        fn name(&self) -> &'static str {
            "ancient_defenders"
        }

        fn validate(&self, state: &GameState, action: &Action) -> Result<(), String> {
            if let Action::TokenMove { actor, to, .. } = action
                && actor.player().is_some()
                && state.zones[to].kind == ZoneKind::Graveyard
            {
                return Err("players cannot scuttle pieces".to_string());
            }
            Ok(())
        }

        fn phase_actions(&self, event: PhaseEvent, state: &GameState) -> Vec<Action> {
            if event != PhaseEvent::Before(TurnPhase::Battle) {
                return Vec::new();
            }
            let graveyard = zone_of_kind(state, ZoneKind::Graveyard);
            let mut actions = Vec::new();
            for (&zone_id, zone) in &state.zones {
                if zone.kind != ZoneKind::Hex {
                    continue;
                }
                for &token in &zone.occupants {
                    if state.tokens[&token].kind == TokenKind::Ship {
                        actions.push(Action::system_move(token, zone_id, graveyard));
                    }
                }
            }
            actions
        }
    }

    fn catalog() -> ExtensionCatalog {
        let mut catalog = ExtensionCatalog::new();
        catalog.register(
            "ancient_defenders",
            Arc::new(|registry: &mut HookRegistry| {
                let hook = Arc::new(AncientDefenders);
                registry.register_validator(hook.clone());
                registry.register_phase(PhaseEvent::Before(TurnPhase::Battle), hook);
            }),
        );
        catalog
    }

    fn extended_game(manager: &GamesManager) -> GameId {
        let mut setup = GameSetup::new(vec![P1, P2]).with_extension("ancient_defenders");
        let reserve = setup.add_zone(ZoneKind::Reserve, None);
        let _hex = setup.add_zone(ZoneKind::Hex, None);
        setup.add_zone(ZoneKind::Graveyard, None);
        setup.add_token(TokenKind::Ship, Some(P1), reserve);
        let game = manager.create_game(&setup).unwrap();
        manager.choose_race(game, P1, "terran").unwrap();
        manager.choose_race(game, P2, "orion").unwrap();
        game
    }

    #[test]
    fn validate_hooks_veto_with_their_name() {
        let manager = GamesManager::in_memory(catalog()).unwrap();
        let game = extended_game(&manager);
        let state = manager.get_state(game).unwrap();
        let ship = ship_of(&state, P1);
        let reserve = zone_of_kind(&state, ZoneKind::Reserve);
        let graveyard = zone_of_kind(&state, ZoneKind::Graveyard);

        let err = manager
            .submit_action(game, Action::player_move(P1, ship, reserve, graveyard))
            .unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Rejected(RejectReason::ExtensionVeto { extension, .. })
                if extension == "ancient_defenders"
        ));
    }

    #[test]
    fn phase_hooks_feed_actions_through_the_normal_pipeline() {
        let manager = GamesManager::in_memory(catalog()).unwrap();
        let game = extended_game(&manager);
        let state = manager.get_state(game).unwrap();
        let ship = ship_of(&state, P1);
        let reserve = zone_of_kind(&state, ZoneKind::Reserve);
        let hex = zone_of_kind(&state, ZoneKind::Hex);
        let graveyard = zone_of_kind(&state, ZoneKind::Graveyard);

        manager
            .submit_action(game, Action::player_move(P1, ship, reserve, hex))
            .unwrap();
        manager.submit_action(game, Action::end_turn(P1)).unwrap();
        let last = manager.submit_action(game, Action::end_turn(P2)).unwrap();

        // the battle hook scuttled the exposed ship, visibly in the log
        let after = manager.get_state(game).unwrap();
        assert!(after.zones[&graveyard].contains(ship));
        let narrative = manager.get_history(game, SnapshotId(0), last).unwrap();
        assert!(narrative.contains(&format!("system moved {ship}")));
    }
}
