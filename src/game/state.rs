//! # Round State Module
//!
//! One owned value holding everything a round mutates, advanced one tick at a time.
//!
//! [`RoundState`] is built once from a difficulty and a [`RoundConfig`], hands
//! the presentation shell a [`RoundSetup`] to draw, and then consumes one
//! [`MoveIntent`] per frame, returning a [`TickReport`] of everything that
//! changed. There is no global state: two rounds built from the same seed and
//! fed the same intents (and no obstacle freeze) produce the same reports.

use crate::config;
use crate::{
    Door, EncounterTracker, EntityId, GenerationConfig, Generator, Grid, GuardAgent, ItemLedger,
    Key, LockdownError, LockdownResult, MazeGenerator, Metrics, MetricsSnapshot, Obstacle,
    Outcome, Path, PatrolController, PatrolState, PlacementPlanner, PolicyBackend, PolicyState,
    Position, PursuitPlanner, SpawnPlanner, WorldPoint,
};
use log::{debug, info};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::path::Path as FsPath;
use std::time::{Duration, Instant};

/// How many guards hunt the player.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Guards spawned at this difficulty.
    pub fn guard_count(self) -> usize {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 4,
            Difficulty::Hard => 8,
        }
    }
}

/// Tunables for a round beyond maze generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundConfig {
    /// Maze and placement parameters, including the seed
    pub generation: GenerationConfig,
    /// Guard movement in tiles per tick
    pub guard_speed: f32,
    /// Largest player movement in tiles per tick on each axis
    pub player_speed: f32,
    /// Tile edge in pixels, used for collision boxes
    pub tile_size: f32,
    /// Collision inset per side in pixels
    pub tile_margin: f32,
    /// Wall-clock freeze after bumping into an obstacle
    pub freeze_duration_ms: u64,
    /// Cap on guards that may request a new plan in one tick, `None` for unlimited
    pub max_replans_per_tick: Option<usize>,
    /// Retargeting depth when a guard's target is unreachable
    pub max_fallback_depth: usize,
}

impl RoundConfig {
    pub fn new(seed: u64) -> Self {
        Self {
            generation: GenerationConfig::new(seed),
            guard_speed: config::GUARD_SPEED,
            player_speed: config::PLAYER_SPEED,
            tile_size: config::TILE_SIZE,
            tile_margin: config::TILE_MARGIN,
            freeze_duration_ms: config::FREEZE_DURATION_MS,
            max_replans_per_tick: None,
            max_fallback_depth: 2,
        }
    }

    /// Smaller maze for tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            generation: GenerationConfig::for_testing(seed),
            ..Self::new(seed)
        }
    }

    /// Loads a configuration from a JSON file; missing fields take defaults.
    pub fn from_json_file<P: AsRef<FsPath>>(path: P) -> LockdownResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: RoundConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> LockdownResult<()> {
        self.generation.validate()?;
        for (name, speed) in [
            ("guard_speed", self.guard_speed),
            ("player_speed", self.player_speed),
        ] {
            if !(speed > 0.0 && speed <= 1.0) {
                return Err(LockdownError::InvalidConfig(format!(
                    "{} {} outside (0, 1]",
                    name, speed
                )));
            }
        }
        if self.tile_size <= 0.0 || self.tile_margin < 0.0 || self.tile_margin * 2.0 >= self.tile_size
        {
            return Err(LockdownError::InvalidConfig(format!(
                "tile margin {} does not fit tile size {}",
                self.tile_margin, self.tile_size
            )));
        }
        Ok(())
    }
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self::new(GenerationConfig::default().seed)
    }
}

/// A fully specified maze with its items and spawn points, before any
/// simulation state exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundLayout {
    pub grid: Grid,
    pub start: Position,
    pub exit: Position,
    pub doors: Vec<Door>,
    pub keys: Vec<Key>,
    pub obstacles: Vec<Obstacle>,
    pub guard_spawns: Vec<Position>,
}

/// Player movement request for one tick, in tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub dx: f32,
    pub dy: f32,
}

impl MoveIntent {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    /// Standing still.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

/// The player's avatar.
#[derive(Debug, Clone)]
pub struct Player {
    pub position: WorldPoint,
    pub facing_left: bool,
    frozen_until: Option<Instant>,
}

impl Player {
    pub fn new(tile: Position) -> Self {
        Self {
            position: WorldPoint::from_tile(tile),
            facing_left: false,
            frozen_until: None,
        }
    }

    /// Tile under the sprite centre.
    pub fn tile(&self) -> Position {
        self.position.nearest_tile()
    }

    pub fn is_frozen(&self, now: Instant) -> bool {
        self.frozen_until.map_or(false, |until| now < until)
    }
}

/// Guard as seen by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GuardView {
    pub id: EntityId,
    pub position: WorldPoint,
    pub facing_left: bool,
    pub state: PatrolState,
}

impl From<&GuardAgent> for GuardView {
    fn from(guard: &GuardAgent) -> Self {
        Self {
            id: guard.id(),
            position: guard.position,
            facing_left: guard.facing_left,
            state: guard.state,
        }
    }
}

/// Everything the shell needs to draw a new round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSetup {
    pub grid: Grid,
    pub doors: Vec<Door>,
    pub keys: Vec<Key>,
    pub obstacles: Vec<Obstacle>,
    pub guards: Vec<GuardView>,
    pub start: Position,
    pub exit: Position,
}

/// State after one tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickReport {
    pub player: WorldPoint,
    pub player_facing_left: bool,
    pub player_frozen: bool,
    pub player_keys: u32,
    pub guards: Vec<GuardView>,
    pub doors: Vec<Door>,
    pub keys: Vec<Key>,
    pub outcome: Outcome,
}

/// A round in progress.
#[derive(Debug)]
pub struct RoundState {
    config: RoundConfig,
    grid: Grid,
    /// Canonical grid with locked doors as walls, kept in step with the ledger
    navigation: Grid,
    items: ItemLedger,
    obstacles: Vec<Obstacle>,
    guards: Vec<GuardAgent>,
    player: Player,
    start: Position,
    exit: Position,
    outcome: Outcome,
    metrics: Metrics,
    planner: PursuitPlanner,
    patrol: PatrolController,
    tracker: EncounterTracker,
    rng: StdRng,
    policy: Option<Box<dyn PolicyBackend>>,
}

impl RoundState {
    /// Generates a maze, gates it with doors and keys, and spawns guards and
    /// obstacles.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockdown::{Difficulty, Outcome, RoundConfig, RoundState};
    ///
    /// let round = RoundState::build(Difficulty::Easy, RoundConfig::new(7)).unwrap();
    /// let setup = round.setup();
    /// assert_eq!(setup.guards.len(), 2);
    /// assert_eq!(setup.doors.len(), setup.keys.len());
    /// assert_eq!(round.outcome(), Outcome::None);
    /// ```
    pub fn build(difficulty: Difficulty, config: RoundConfig) -> LockdownResult<Self> {
        config.validate()?;
        let generation = &config.generation;
        let mut rng = generation.create_rng();
        let start = generation.start();
        let exit = generation.exit();

        let maze = MazeGenerator::from_config(generation);
        let grid = maze.generate(generation, &mut rng)?;
        debug!("{} produced a {}x{} grid", maze.generator_type(), grid.rows(), grid.cols());

        let placement = PlacementPlanner::from_config(generation).plan(&grid, start, exit, &mut rng);

        let must_reach: Vec<Position> = std::iter::once(exit)
            .chain(placement.keys.iter().map(|key| key.position))
            .collect();
        let gates: Vec<Position> = placement.doors.iter().map(|door| door.position).collect();
        let spawns = SpawnPlanner::from_config(generation).plan(
            &grid,
            start,
            &placement.region,
            &placement.free_cells,
            &must_reach,
            &gates,
            difficulty.guard_count(),
            &mut rng,
        );

        info!(
            "Built {:?} round with seed {}: {} doors, {} guards, {} obstacles",
            difficulty,
            generation.seed,
            placement.doors.len(),
            spawns.guards.len(),
            spawns.obstacles.len()
        );

        let layout = RoundLayout {
            grid,
            start,
            exit,
            doors: placement.doors,
            keys: placement.keys,
            obstacles: spawns.obstacles.into_iter().map(|position| Obstacle { position }).collect(),
            guard_spawns: spawns.guards,
        };
        Self::from_layout(layout, config, rng)
    }

    /// Starts a round on a hand-made layout.
    ///
    /// Guard ids and traits are drawn from `rng`, which then drives all
    /// in-round randomness.
    pub fn from_layout(layout: RoundLayout, config: RoundConfig, mut rng: StdRng) -> LockdownResult<Self> {
        config.validate()?;
        let RoundLayout {
            grid,
            start,
            exit,
            doors,
            keys,
            obstacles,
            guard_spawns,
        } = layout;

        for (name, pos) in [("start", start), ("exit", exit)] {
            if !grid.is_passable(pos) {
                return Err(LockdownError::InvalidState(format!(
                    "{} {:?} is not an open cell",
                    name, pos
                )));
            }
        }
        if let Some(bad) = guard_spawns.iter().find(|&&pos| !grid.is_passable(pos)) {
            return Err(LockdownError::InvalidState(format!(
                "guard spawn {:?} is not an open cell",
                bad
            )));
        }

        let guards = guard_spawns
            .into_iter()
            .map(|tile| GuardAgent::spawn(tile, &mut rng))
            .collect();
        let items = ItemLedger::new(doors, keys);
        let navigation = items.navigation_grid(&grid);

        Ok(Self {
            planner: PursuitPlanner::new(config.max_fallback_depth),
            patrol: PatrolController::new(config.guard_speed),
            tracker: EncounterTracker::new(config.tile_size, config.tile_margin),
            config,
            grid,
            navigation,
            items,
            obstacles,
            guards,
            player: Player::new(start),
            start,
            exit,
            outcome: Outcome::None,
            metrics: Metrics::start(),
            rng,
            policy: None,
        })
    }

    /// Routes guard decisions through `backend` instead of the pursuit planner.
    pub fn with_policy(mut self, backend: Box<dyn PolicyBackend>) -> Self {
        info!("Guards controlled by the {} policy", backend.backend_name());
        self.policy = Some(backend);
        self
    }

    pub fn setup(&self) -> RoundSetup {
        RoundSetup {
            grid: self.grid.clone(),
            doors: self.items.doors.clone(),
            keys: self.items.keys.clone(),
            obstacles: self.obstacles.clone(),
            guards: self.guards.iter().map(GuardView::from).collect(),
            start: self.start,
            exit: self.exit,
        }
    }

    /// Advances the round by one frame using the wall clock.
    pub fn tick(&mut self, intent: MoveIntent) -> TickReport {
        self.tick_at(intent, Instant::now())
    }

    /// Advances the round by one frame as if the time were `now`.
    ///
    /// Order within a tick: player movement, guard movement, then capture and
    /// escape checks. Once the round has an outcome further ticks change nothing.
    pub fn tick_at(&mut self, intent: MoveIntent, now: Instant) -> TickReport {
        if self.outcome.is_terminal() {
            return self.report(now);
        }

        self.move_player(intent, now);
        self.move_guards();

        let player_tile = self.player.tile();
        self.metrics.record_tick(player_tile, &self.guards);

        let outcome = self.tracker.evaluate(
            self.player.position,
            self.guards.iter().map(|guard| guard.position),
            self.exit,
        );
        if outcome.is_terminal() {
            self.outcome = outcome;
            self.metrics.finish(outcome);
            info!(
                "Round over: {:?} after {} ticks at {:?}",
                outcome,
                self.metrics.ticks(),
                player_tile
            );
        }

        self.report(now)
    }

    fn move_player(&mut self, intent: MoveIntent, now: Instant) {
        if intent.is_none() || self.player.is_frozen(now) {
            return;
        }

        let speed = self.config.player_speed;
        let dx = intent.dx.clamp(-speed, speed);
        let dy = intent.dy.clamp(-speed, speed);
        if dx < 0.0 {
            self.player.facing_left = true;
        } else if dx > 0.0 {
            self.player.facing_left = false;
        }

        let max_x = (self.grid.cols() - 1) as f32;
        let max_y = (self.grid.rows() - 1) as f32;
        let proposed = WorldPoint::new(
            (self.player.position.x + dx).clamp(0.0, max_x),
            (self.player.position.y + dy).clamp(0.0, max_y),
        );
        let touched = proposed.overlapped_tiles();

        if touched.iter().any(|&tile| !self.grid.is_passable(tile)) {
            return;
        }

        if touched
            .iter()
            .any(|&tile| self.obstacles.iter().any(|obstacle| obstacle.position == tile))
        {
            let until = now + Duration::from_millis(self.config.freeze_duration_ms);
            self.player.frozen_until = Some(until);
            debug!("Player hit an obstacle near {:?}, frozen", proposed.nearest_tile());
            return;
        }

        let locked: Vec<Position> = touched
            .iter()
            .copied()
            .filter(|&tile| self.items.is_locked_door(tile))
            .collect();
        if locked.len() > self.items.player_keys as usize {
            return;
        }
        for door in locked {
            self.unlock_door(door);
        }

        self.player.position = proposed;
        self.collect_key(self.player.tile());
    }

    fn move_guards(&mut self) {
        let player_tile = self.player.tile();
        let Self {
            guards,
            navigation,
            planner,
            patrol,
            rng,
            policy,
            config,
            ..
        } = self;
        let navigation: &Grid = navigation;

        let mut replans = 0;
        for guard in guards.iter_mut() {
            if guard.state == PatrolState::NeedsPath {
                if config.max_replans_per_tick.map_or(false, |cap| replans >= cap) {
                    continue;
                }
                replans += 1;
            }

            patrol.advance(guard, navigation, |guard| match policy.as_deref_mut() {
                Some(backend) => policy_step(backend, guard.tile(), player_tile, navigation),
                None => planner.plan_path(&guard.traits(), guard.tile(), player_tile, navigation, rng),
            });
        }
    }

    /// Collects the key at `pos`; false when there is none.
    pub fn collect_key(&mut self, pos: Position) -> bool {
        self.items.collect_key(pos)
    }

    /// Spends a key on the locked door at `pos` and opens it for guards too.
    pub fn unlock_door(&mut self, pos: Position) -> bool {
        let unlocked = self.items.unlock_door(pos);
        if unlocked {
            self.items.sync_navigation(&self.grid, &mut self.navigation, pos);
        }
        unlocked
    }

    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    fn report(&self, now: Instant) -> TickReport {
        TickReport {
            player: self.player.position,
            player_facing_left: self.player.facing_left,
            player_frozen: self.player.is_frozen(now),
            player_keys: self.items.player_keys,
            guards: self.guards.iter().map(GuardView::from).collect(),
            doors: self.items.doors.clone(),
            keys: self.items.keys.clone(),
            outcome: self.outcome,
        }
    }

    pub fn config(&self) -> &RoundConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Grid the guards plan on: walls plus still-locked doors.
    pub fn navigation(&self) -> &Grid {
        &self.navigation
    }

    pub fn items(&self) -> &ItemLedger {
        &self.items
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn guards(&self) -> &[GuardAgent] {
        &self.guards
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn exit(&self) -> Position {
        self.exit
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}

/// One-step plan chosen by a policy backend; empty when it picks a blocked cell.
fn policy_step(
    backend: &mut dyn PolicyBackend,
    tile: Position,
    player_tile: Position,
    navigation: &Grid,
) -> Path {
    let state = PolicyState::encode(tile, player_tile, navigation, config::VISIBILITY_RADIUS);
    let next = tile.step(backend.choose_action(&state));
    if navigation.is_passable(next) {
        vec![tile, next]
    } else {
        Vec::new()
    }
}
