//! Full-round integration tests driven through the public tick interface

use lockdown::{
    Autopilot, Difficulty, Door, Grid, Key, LockdownResult, MoveIntent, Outcome, Position,
    RoundConfig, RoundLayout, RoundState, WorldPoint,
};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::BTreeSet;

fn gated_corridor() -> Grid {
    Grid::from_ascii(&[
        "#########",
        "#.......#",
        "#######.#",
        "#######.#",
        "#######.#",
        "#####...#",
        "#####.###",
        "#####...#",
        "#########",
    ])
}

fn locked_doors(round: &RoundState) -> BTreeSet<Position> {
    round.items().locked_doors().collect()
}

#[test]
fn test_capture_on_shared_tile() -> LockdownResult<()> {
    let layout = RoundLayout {
        grid: Grid::open(8, 8),
        start: Position::new(3, 3),
        exit: Position::new(7, 7),
        doors: Vec::new(),
        keys: Vec::new(),
        obstacles: Vec::new(),
        guard_spawns: vec![Position::new(3, 3)],
    };
    let mut config = RoundConfig::new(0);
    config.tile_size = 40.0;
    config.tile_margin = 5.0;
    let mut round = RoundState::from_layout(layout, config, StdRng::seed_from_u64(0))?;

    let report = round.tick(MoveIntent::none());
    assert_eq!(report.outcome, Outcome::Capture);
    assert_eq!(round.metrics_snapshot().interceptions, 1);
    assert_eq!(round.metrics_snapshot().ticks, 1);
    Ok(())
}

#[test]
fn test_locked_door_blocks_only_route() -> LockdownResult<()> {
    let layout = RoundLayout {
        grid: gated_corridor(),
        start: Position::new(1, 1),
        exit: Position::new(7, 7),
        doors: vec![Door::locked(Position::new(5, 5))],
        keys: Vec::new(),
        obstacles: Vec::new(),
        guard_spawns: Vec::new(),
    };
    let mut round = RoundState::from_layout(layout, RoundConfig::new(0), StdRng::seed_from_u64(0))?;

    // Walk the corridor by hand up to the door
    for _ in 0..48 {
        round.tick(MoveIntent::new(0.125, 0.0));
    }
    for _ in 0..32 {
        round.tick(MoveIntent::new(0.0, 0.125));
    }
    assert_eq!(round.player().position, WorldPoint::new(7.0, 5.0));
    for _ in 0..32 {
        round.tick(MoveIntent::new(-0.125, 0.0));
    }

    assert_eq!(round.player().position, WorldPoint::new(6.0, 5.0));
    assert!(round.items().is_locked_door(Position::new(5, 5)));
    assert_eq!(round.outcome(), Outcome::None);
    Ok(())
}

#[test]
fn test_key_opens_door_on_only_route() -> LockdownResult<()> {
    let layout = RoundLayout {
        grid: gated_corridor(),
        start: Position::new(1, 1),
        exit: Position::new(7, 7),
        doors: vec![Door::locked(Position::new(5, 5))],
        keys: vec![Key::new(Position::new(4, 1))],
        obstacles: Vec::new(),
        guard_spawns: Vec::new(),
    };
    let mut round = RoundState::from_layout(layout, RoundConfig::new(0), StdRng::seed_from_u64(0))?;
    let mut autopilot = Autopilot::new();

    let mut outcome = Outcome::None;
    for _ in 0..1000 {
        outcome = round.tick(autopilot.next_intent(&round)).outcome;
        if outcome.is_terminal() {
            break;
        }
    }

    assert_eq!(outcome, Outcome::Escape);
    assert!(!round.items().is_locked_door(Position::new(5, 5)));
    assert!(round.navigation().is_passable(Position::new(5, 5)));
    assert_eq!(round.items().player_keys, 0);
    Ok(())
}

#[test]
fn test_collection_is_idempotent() -> LockdownResult<()> {
    let mut round = RoundState::build(Difficulty::Easy, RoundConfig::new(21))?;
    let keys: Vec<Position> = round.items().keys.iter().map(|key| key.position).collect();
    let doors: Vec<Position> = round.items().locked_doors().collect();
    if keys.is_empty() {
        return Ok(());
    }

    assert!(round.collect_key(keys[0]));
    assert!(!round.collect_key(keys[0]));
    assert_eq!(round.items().player_keys, 1);

    assert!(round.unlock_door(doors[0]));
    assert!(!round.unlock_door(doors[0]));
    assert_eq!(round.items().player_keys, 0);
    assert!(round.navigation().is_passable(doors[0]));
    Ok(())
}

#[test]
fn test_setup_matches_build() -> LockdownResult<()> {
    let round = RoundState::build(Difficulty::Hard, RoundConfig::new(8))?;
    let setup = round.setup();
    assert_eq!(setup.start, Position::new(1, 1));
    assert_eq!(setup.exit, Position::new(18, 13));
    assert_eq!(setup.grid.rows(), 15);
    assert_eq!(setup.grid.cols(), 20);
    assert!(setup.guards.len() <= 8);
    assert_eq!(setup.doors.len(), setup.keys.len());
    assert!(setup.doors.iter().all(|door| door.locked));

    let json = serde_json::to_string(&setup)?;
    assert!(json.contains("\"exit\""));
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn keys_are_conserved_and_doors_stay_open(seed in any::<u64>()) {
        let mut round = RoundState::build(Difficulty::Easy, RoundConfig::for_testing(seed)).unwrap();
        let total = round.items().keys.len() as u32;
        let mut autopilot = Autopilot::new();
        let mut locked = locked_doors(&round);

        for _ in 0..3000 {
            let report = round.tick(autopilot.next_intent(&round));

            let unlocked = report.doors.iter().filter(|door| !door.locked).count() as u32;
            prop_assert_eq!(report.player_keys + report.keys.len() as u32 + unlocked, total);

            let now_locked = locked_doors(&round);
            prop_assert!(now_locked.is_subset(&locked), "seed={}: a door relocked", seed);
            locked = now_locked;

            if report.outcome.is_terminal() {
                break;
            }
        }
    }
}
