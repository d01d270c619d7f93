//! Property tests for maze generation and door/key placement

use lockdown::{
    reachable_cells, Cell, GenerationConfig, Generator, MazeGenerator, PlacementPlanner, Position,
};
use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn carved_mazes_are_connected(seed in any::<u64>(), rows in 3_usize..30, cols in 3_usize..30) {
        let start = Position::new(1, 1);
        let exit = Position::new(cols as i32 - 2, rows as i32 - 2);
        let mut rng = StdRng::seed_from_u64(seed);
        let grid = MazeGenerator::new().carve(rows, cols, start, exit, &mut rng).unwrap();

        prop_assert_eq!(grid.cell(exit), Cell::Open, "seed={} {}x{}", seed, rows, cols);
        let reachable = reachable_cells(&grid, start);
        prop_assert!(reachable.contains(&exit), "seed={} {}x{}: exit cut off", seed, rows, cols);
        prop_assert_eq!(reachable.len(), grid.open_count(), "seed={} {}x{}: stranded cells", seed, rows, cols);

        for pos in grid.positions() {
            if !grid.is_interior(pos) {
                prop_assert_eq!(grid.cell(pos), Cell::Wall);
            }
        }
    }

    #[test]
    fn doors_respect_spacing_and_region(seed in any::<u64>()) {
        let config = GenerationConfig::new(seed);
        let mut rng = config.create_rng();
        let grid = MazeGenerator::from_config(&config).generate(&config, &mut rng).unwrap();
        let planner = PlacementPlanner::from_config(&config);
        let placement = planner.plan(&grid, config.start(), config.exit(), &mut rng);

        prop_assert!(placement.doors.len() <= planner.door_target(grid.open_count()));
        for (i, a) in placement.doors.iter().enumerate() {
            prop_assert!(a.locked);
            prop_assert!(!placement.region.contains(a.position));
            prop_assert_eq!(grid.cell(a.position), Cell::Open);
            for b in &placement.doors[i + 1..] {
                prop_assert!(
                    a.position.manhattan_distance(b.position) >= config.min_door_spacing,
                    "seed={}: doors {:?} and {:?} too close", seed, a.position, b.position
                );
            }
        }

        prop_assert_eq!(placement.keys.len(), placement.doors.len());
        for key in &placement.keys {
            prop_assert!(key.position != config.start() && key.position != config.exit());
            prop_assert!(placement.doors.iter().all(|door| door.position != key.position));
        }
    }

    #[test]
    fn same_seed_same_maze(seed in any::<u64>()) {
        let config = GenerationConfig::for_testing(seed);
        let generator = MazeGenerator::from_config(&config);
        let a = generator.generate(&config, &mut config.create_rng()).unwrap();
        let b = generator.generate(&config, &mut config.create_rng()).unwrap();
        prop_assert_eq!(a, b);
    }
}
