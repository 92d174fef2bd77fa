//! Turn bookkeeping against a real board and roster.

use tower_conquest::{
    BuiltTower, Countdown, EntityId, GameState, GridBoard, HealthChangeReport, MatchRules, MatchState, PlayerId,
    RoundState, RulesError, SeatInfo, SimpleRoster, SpellCasts, SpellContext, TimerState, TowerArchetype,
    TowerTypeId, World,
};

const ARCHER: TowerTypeId = TowerTypeId::new(1);
const CANNON: TowerTypeId = TowerTypeId::new(2);

struct Table {
    board: GridBoard,
    roster: SimpleRoster,
}

impl Table {
    fn new() -> Self {
        let board = GridBoard::new(7, 7);
        let roster = SimpleRoster::new(2)
            .with_seat(
                PlayerId::new(0),
                SeatInfo {
                    current_tile: Some(board.tile(3, 0)),
                    castle_tile: Some(board.tile(3, 0)),
                    portal_tile: Some(board.tile(0, 0)),
                    gold: 50,
                    mana: 4,
                },
            )
            .with_seat(
                PlayerId::new(1),
                SeatInfo {
                    current_tile: Some(board.tile(3, 6)),
                    castle_tile: Some(board.tile(3, 6)),
                    portal_tile: Some(board.tile(6, 6)),
                    gold: 50,
                    mana: 4,
                },
            );
        Self { board, roster }
    }

    fn world(&self) -> World<'_> {
        World::new(&self.roster).with_board(&self.board)
    }
}

fn rules() -> MatchRules {
    MatchRules::new()
        .with_action_phase_time(60)
        .with_tile_movements(1, 3)
        .with_max_builds_per_turn(2)
        .with_tower(TowerArchetype::new(ARCHER, "Archer", 10))
        .with_tower(TowerArchetype::new(CANNON, "Cannon", 20))
}

fn action_phase(rules: &MatchRules) -> GameState {
    let mut state = GameState::new(2, 9);
    state.update_rules(rules).unwrap();
    state.set_match_state(MatchState::CoinFlip).unwrap();
    state.resolve_coin_flip(PlayerId::new(0)).unwrap();
    state.set_match_state(MatchState::Playing).unwrap();
    state.set_round_state(RoundState::FirstActionPhase).unwrap();
    state
}

/// Move one tile, satisfy the minimum, then let the action phase time out.
#[test]
fn test_single_tile_move_then_timeout() {
    let table = Table::new();
    let world = table.world();
    let mut state = action_phase(&rules());
    let p0 = PlayerId::new(0);

    state.handle_move_request_confirmed(&world, table.board.tile(3, 1)).unwrap();
    state.handle_move_request_finished().unwrap();

    assert!(state.has_player_moved_required_tiles(p0));
    assert_eq!(state.players_num_remaining_moves(p0), 2);

    for _ in 0..60 {
        state.tick_timer();
    }
    assert_eq!(state.round_state(), Some(RoundState::SecondActionPhase));
    assert_eq!(state.action_phase_player(), Some(PlayerId::new(1)));
}

/// Paused action time does not run down while a move resolves.
#[test]
fn test_action_time_held_during_move() {
    let table = Table::new();
    let world = table.world();
    let mut state = action_phase(&rules());

    state.advance(10.0);
    state.handle_move_request_confirmed(&world, table.board.tile(3, 2)).unwrap();
    state.advance(30.0);
    assert_eq!(state.countdown_time_remaining(), Countdown::Finite(50));

    state.handle_move_request_finished().unwrap();
    state.advance(1.0);
    assert_eq!(state.countdown_time_remaining(), Countdown::Finite(49));
}

/// Movable tiles shrink as the move quota is spent.
#[test]
fn test_movable_tiles_follow_quota() {
    let mut table = Table::new();
    let mut state = action_phase(&rules());
    let p0 = PlayerId::new(0);

    let before = state.tiles_player_can_move_to(&table.world(), p0, true).unwrap();
    assert!(before.contains(&table.board.tile(3, 3)));

    let target = table.board.tile(3, 2);
    state.handle_move_request_confirmed(&table.world(), target).unwrap();
    state.handle_move_request_finished().unwrap();
    table.roster.seat_mut(p0).unwrap().current_tile = Some(target);

    let after = state.tiles_player_can_move_to(&table.world(), p0, true).unwrap();
    assert_eq!(after.len(), 4);
    assert!(!after.contains(&table.board.tile(3, 4)));
}

/// Counters reset when the player's next action phase starts.
#[test]
fn test_counters_reset_each_action_phase() {
    let table = Table::new();
    let world = table.world();
    let mut state = action_phase(&rules());
    let p0 = PlayerId::new(0);

    state.handle_move_request_confirmed(&world, table.board.tile(3, 3)).unwrap();
    state.handle_move_request_finished().unwrap();
    assert_eq!(state.players_num_remaining_moves(p0), 0);

    state.request_end_action_phase(p0).unwrap();
    state.set_round_state(RoundState::EndRoundPhase).unwrap();
    state.set_round_state(RoundState::CollectionPhase).unwrap();
    state.set_round_state(RoundState::FirstActionPhase).unwrap();
    state.set_round_state(RoundState::SecondActionPhase).unwrap();

    assert_eq!(state.action_phase_player(), Some(p0));
    assert_eq!(state.players_num_remaining_moves(p0), 3);
}

/// Towers are counted per archetype and destroyed instances only count once.
#[test]
fn test_tower_instance_counts() {
    let table = Table::new();
    let world = table.world();
    let mut state = action_phase(&rules());
    let p0 = PlayerId::new(0);

    for (entity, tile) in [(10, table.board.tile(2, 0)), (11, table.board.tile(4, 0))] {
        state.handle_build_request_confirmed(&world, tile, ARCHER).unwrap();
        state
            .handle_build_request_finished(BuiltTower {
                entity: EntityId::new(entity),
                archetype: ARCHER,
                owner: p0,
            })
            .unwrap();
    }
    assert_eq!(state.tower_instance_count(ARCHER), 2);
    assert_eq!(state.player_tower_instance_count(p0, ARCHER), 2);
    assert_eq!(state.tower_instance_count(CANNON), 0);

    state.handle_tower_destroyed(EntityId::new(10), false).unwrap();
    assert!(state.handle_tower_destroyed(EntityId::new(10), false).is_err());
    assert_eq!(state.tower_instance_count(ARCHER), 1);
}

/// A build finish must match what was confirmed.
#[test]
fn test_build_finish_mismatch() {
    let table = Table::new();
    let world = table.world();
    let mut state = action_phase(&rules());

    state.handle_build_request_confirmed(&world, table.board.tile(2, 0), ARCHER).unwrap();
    let wrong = BuiltTower {
        entity: EntityId::new(1),
        archetype: CANNON,
        owner: PlayerId::new(0),
    };
    assert!(matches!(
        state.handle_build_request_finished(wrong),
        Err(RulesError::PendingActionMismatch)
    ));
    assert_eq!(state.tower_instance_count(CANNON), 0);
}

/// Quick effect casts leave the active player's spell quota alone.
#[test]
fn test_quick_effect_does_not_consume_quota() {
    let mut state = action_phase(&rules());
    let p0 = PlayerId::new(0);

    state.handle_quick_effect_selection_start(true).unwrap();
    assert_eq!(state.timer_state(), TimerState::QuickEffect);
    state
        .handle_spell_request_confirmed(SpellContext::QuickEffect, tower_conquest::TileId::new(5))
        .unwrap();
    state.handle_spell_request_finished(SpellContext::QuickEffect).unwrap();

    assert_eq!(state.player_num_remaining_spell_casts(p0), SpellCasts::Limited(1));
    assert_eq!(state.timer_state(), TimerState::ActionPhase);
}

/// Health report queries filter by sign, owner and death.
#[test]
fn test_health_report_filters() {
    let mut state = action_phase(&rules());
    let p0 = PlayerId::new(0);
    let p1 = PlayerId::new(1);

    state.set_latest_action_health_reports(vec![
        HealthChangeReport::new(EntityId::new(1), Some(p1), -5),
        HealthChangeReport::new(EntityId::new(2), Some(p1), -9).killed(),
        HealthChangeReport::new(EntityId::new(3), Some(p0), 4),
        HealthChangeReport::new(EntityId::new(4), None, -1),
    ])
    .unwrap();

    assert_eq!(state.damage_health_reports(false).len(), 3);
    assert_eq!(state.damage_health_reports(true).len(), 2);
    assert_eq!(state.players_damaged_health_reports(p1, true).len(), 1);
    assert_eq!(state.players_damaged_health_reports(p1, false).len(), 2);
    assert_eq!(state.healing_health_reports().len(), 1);
    assert_eq!(state.players_healing_health_reports(p1).len(), 0);

    state.set_latest_action_health_reports(Vec::new()).unwrap();
    assert!(state.latest_action_health_reports().is_empty());
}
