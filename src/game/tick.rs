//! Game Loop
//!
//! [`Game`] owns one session: the phase machine, the current layout, the
//! score and the RNG. The host calls [`Game::update`] once per frame with
//! its monotonic clock; the game decides whether a simulation tick is due.
//!
//! Tick order:
//!
//! 1. level check (a completed level stops the tick here)
//! 2. effect timers, bonus expiry
//! 3. enemies pick directions, player moves, enemies move
//! 4. collisions, pickups
//! 5. life loss or bonus spawn
//!
//! All timestamps inside the simulation are on the [`SimClock`], which
//! stops while the game is paused.

use std::time::Duration;

use serde::{Serialize, Deserialize};
use tracing::{debug, error, info, trace};

use crate::config::{ConfigError, GameConfig};
use crate::core::hash::{compute_state_hash, StateHash};
use crate::core::rng::DeterministicRng;
use crate::game::ai::{AiContext, AiSelector};
use crate::game::collision::{self, CollisionCause};
use crate::game::events::{AudioCue, GameEvent};
use crate::game::input::{InputFrame, InputRecording};
use crate::game::progression::Progression;
use crate::game::spawn::{build_world, expire_bonuses, maybe_spawn_bonus};
use crate::game::state::{GamePhase, World};
use crate::game::view::{BonusView, EnemyView, GameView};
use crate::storage::{HighScore, MemoryScoreStore, ScoreStore, ScoreSubmission};

/// Name submitted with a score until the host sets one.
pub const DEFAULT_PLAYER_NAME: &str = "Player";

// =============================================================================
// TICK RESULT
// =============================================================================

/// Outcome of one [`Game::update`] call.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this update
    pub events: Vec<GameEvent>,
    /// Whether a simulation tick ran
    pub ticked: bool,
    /// Whether the run ended this update
    pub game_over: bool,
    /// Whether the final score made the table (`None` without a game over
    /// or when saving failed)
    pub high_score: Option<bool>,
}

impl TickResult {
    /// Sound cues for this update's events, in event order.
    pub fn audio_cues(&self) -> impl Iterator<Item = AudioCue> + '_ {
        self.events.iter().filter_map(GameEvent::audio_cue)
    }
}

// =============================================================================
// SIMULATION CLOCK
// =============================================================================

/// Run time on the host clock minus time spent paused.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimClock {
    origin: Option<Duration>,
    paused_since: Option<Duration>,
    paused_total: Duration,
}

impl SimClock {
    /// Start counting from `host_now`.
    pub fn start(&mut self, host_now: Duration) {
        *self = Self {
            origin: Some(host_now),
            paused_since: None,
            paused_total: Duration::ZERO,
        };
    }

    /// Freeze the clock.
    pub fn pause(&mut self, host_now: Duration) {
        if self.paused_since.is_none() {
            self.paused_since = Some(host_now);
        }
    }

    /// Unfreeze the clock.
    pub fn resume(&mut self, host_now: Duration) {
        if let Some(since) = self.paused_since.take() {
            self.paused_total += host_now.saturating_sub(since);
        }
    }

    /// Check if frozen.
    pub fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    /// Simulation time at `host_now`. Zero before the first start.
    pub fn now(&self, host_now: Duration) -> Duration {
        let Some(origin) = self.origin else {
            return Duration::ZERO;
        };
        let frozen_at = self.paused_since.unwrap_or(host_now);
        frozen_at
            .saturating_sub(origin)
            .saturating_sub(self.paused_total)
    }
}

/// Deferred layout change after a completed level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingTransition {
    /// Simulation time at which the next level starts
    pub due: Duration,
}

/// How the last run ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Final score
    pub score: u32,
    /// Level reached
    pub level: u32,
    /// Run length in seconds
    pub duration_secs: u64,
    /// What took the last life
    pub cause: CollisionCause,
    /// Whether the score made the table (`None` if saving failed)
    pub high_score: Option<bool>,
}

// =============================================================================
// GAME
// =============================================================================

/// One game session.
pub struct Game<S: ScoreStore = MemoryScoreStore> {
    config: GameConfig,
    phase: GamePhase,
    rng_seed: u64,
    rng: DeterministicRng,
    world: World,
    progression: Progression,
    ai: AiSelector,
    store: S,
    player_name: String,

    tick: u32,
    clock: SimClock,
    last_tick: Duration,
    pending: Option<PendingTransition>,
    last_collision: Option<CollisionCause>,
    summary: Option<RunSummary>,
}

impl<S: ScoreStore> Game<S> {
    /// Create a session in the menu.
    pub fn new(config: GameConfig, rng_seed: u64, store: S) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = DeterministicRng::new(rng_seed);
        let progression = Progression::new(&config);
        let world = build_world(
            &config,
            progression.level(),
            progression.enemy_count(),
            config.initial_lives,
            &mut rng,
        );
        let ai = AiSelector::new(config.patrol_turn_one_in);

        Ok(Self {
            config,
            phase: GamePhase::Menu,
            rng_seed,
            rng,
            world,
            progression,
            ai,
            store,
            player_name: DEFAULT_PLAYER_NAME.to_string(),
            tick: 0,
            clock: SimClock::default(),
            last_tick: Duration::ZERO,
            pending: None,
            last_collision: None,
            summary: None,
        })
    }

    /// Advance the session to `host_now`.
    ///
    /// At most one action flag is honored per frame, in the order menu,
    /// start, pause, high scores.
    pub fn update(&mut self, host_now: Duration, input: &InputFrame) -> TickResult {
        let mut result = TickResult::default();

        if input.menu_pressed() {
            self.quit_to_menu(&mut result.events);
        } else if input.start_pressed() {
            self.start(host_now, &mut result.events);
        } else if input.pause_pressed() {
            self.toggle_pause(host_now, &mut result.events);
        } else if input.high_scores_pressed() {
            self.show_high_scores(&mut result.events);
        }

        let now = self.clock.now(host_now);

        if self.phase == GamePhase::LevelComplete {
            if let Some(pending) = self.pending {
                if now >= pending.due {
                    self.pending = None;
                    self.begin_level(now, &mut result.events);
                }
            }
        }

        if self.phase != GamePhase::Playing {
            return result;
        }

        for direction in input.pressed_directions() {
            self.world.player.body.set_direction(direction);
        }

        let interval = self
            .progression
            .effective_interval(self.world.player.is_boosted());
        if now.saturating_sub(self.last_tick) >= interval {
            self.last_tick = now;
            self.step(now, &mut result);
            result.ticked = true;
        }

        result
    }

    // =========================================================================
    // ACTIONS
    // =========================================================================

    /// Begin a fresh run. Only valid from the menu.
    pub fn start(&mut self, host_now: Duration, events: &mut Vec<GameEvent>) {
        if self.phase != GamePhase::Menu {
            trace!("start ignored in {}", self.phase.name());
            return;
        }

        self.progression = Progression::new(&self.config);
        self.ai.reset();
        self.world = build_world(
            &self.config,
            self.progression.level(),
            self.progression.enemy_count(),
            self.config.initial_lives,
            &mut self.rng,
        );
        self.tick = 0;
        self.clock.start(host_now);
        self.last_tick = Duration::ZERO;
        self.pending = None;
        self.last_collision = None;
        self.summary = None;

        info!(
            "run started: seed={}, enemies={}",
            self.rng_seed,
            self.world.enemies.len()
        );
        self.set_phase(GamePhase::Playing, events);
        events.push(GameEvent::level_started(
            self.tick,
            self.progression.level(),
            self.world.enemies.len() as u32,
        ));
    }

    /// Playing ↔ Paused.
    pub fn toggle_pause(&mut self, host_now: Duration, events: &mut Vec<GameEvent>) {
        match self.phase {
            GamePhase::Playing => {
                self.clock.pause(host_now);
                self.set_phase(GamePhase::Paused, events);
            }
            GamePhase::Paused => {
                self.clock.resume(host_now);
                self.set_phase(GamePhase::Playing, events);
            }
            other => trace!("pause ignored in {}", other.name()),
        }
    }

    /// Back to the menu from anywhere, dropping a pending level change.
    pub fn quit_to_menu(&mut self, events: &mut Vec<GameEvent>) {
        if self.phase == GamePhase::Menu {
            trace!("menu ignored in menu");
            return;
        }
        if self.pending.take().is_some() {
            debug!("pending level change cancelled");
        }
        self.set_phase(GamePhase::Menu, events);
    }

    /// Open the high-score table from the menu or after a game over.
    pub fn show_high_scores(&mut self, events: &mut Vec<GameEvent>) {
        match self.phase {
            GamePhase::Menu | GamePhase::GameOver => {
                self.set_phase(GamePhase::HighScores, events);
            }
            other => trace!("high scores ignored in {}", other.name()),
        }
    }

    fn set_phase(&mut self, to: GamePhase, events: &mut Vec<GameEvent>) {
        let from = self.phase;
        if from == to {
            return;
        }
        debug!("phase {} -> {}", from.name(), to.name());
        self.phase = to;
        events.push(GameEvent::phase_changed(self.tick, from, to));
    }

    // =========================================================================
    // SIMULATION
    // =========================================================================

    /// One simulation tick at simulation time `now`.
    fn step(&mut self, now: Duration, result: &mut TickResult) {
        self.tick += 1;

        #[cfg(feature = "debug-tracing")]
        trace!(
            "tick {} at {:?}: head={:?} score={}",
            self.tick,
            now,
            self.world.player.body.head(),
            self.progression.score()
        );

        if self.progression.is_level_complete() {
            let up = self.progression.advance();
            info!(
                "level {} complete, next level {} with {} enemies at {:?}",
                up.completed_level, up.level, up.enemy_count, up.tick_interval
            );
            result
                .events
                .push(GameEvent::level_completed(self.tick, up.completed_level, up.level));
            self.pending = Some(PendingTransition {
                due: now + self.config.level_delay(),
            });
            self.set_phase(GamePhase::LevelComplete, &mut result.events);
            return;
        }

        self.world.player.update_timers(now);
        result
            .events
            .extend(expire_bonuses(&mut self.world, now, self.tick));

        let ctx = AiContext {
            grid: self.world.grid,
            player_head: self.world.player.body.head(),
            food: self.world.food,
        };
        self.world.player.body.move_forward();
        self.move_enemies(&ctx);

        let fatal = collision::resolve(
            &mut self.world,
            &mut self.progression,
            &self.config,
            &mut self.rng,
            now,
            self.tick,
            &mut result.events,
        );

        match fatal {
            Some(cause) => self.lose_life(cause, now, result),
            None => {
                if let Some(event) =
                    maybe_spawn_bonus(&mut self.world, &self.config, &mut self.rng, now, self.tick)
                {
                    result.events.push(event);
                }
            }
        }
    }

    /// Enemies take `speed` steps each; a step that would leave the grid
    /// is skipped.
    ///
    /// Every step is its own AI decision, so a fast enemy rolls the patrol
    /// turn chance twice per tick.
    fn move_enemies(&mut self, ctx: &AiContext) {
        for enemy in &mut self.world.enemies {
            for _ in 0..enemy.speed {
                let direction = self.ai.choose_direction(enemy, ctx, &mut self.rng);
                enemy.body.set_direction(direction);
                if ctx.grid.contains(enemy.body.next_head()) {
                    enemy.body.move_forward();
                }
            }
        }
    }

    fn lose_life(&mut self, cause: CollisionCause, now: Duration, result: &mut TickResult) {
        self.last_collision = Some(cause);
        let alive = self.world.player.lose_life();
        let lives = self.world.player.lives;
        result
            .events
            .push(GameEvent::player_hit(self.tick, cause, lives));

        if alive {
            info!("hit {} at tick {}, {} lives left", cause.name(), self.tick, lives);
            self.world = build_world(
                &self.config,
                self.progression.level(),
                self.progression.enemy_count(),
                lives,
                &mut self.rng,
            );
            self.last_tick = now;
        } else {
            self.finish_run(cause, now, result);
        }
    }

    fn finish_run(&mut self, cause: CollisionCause, now: Duration, result: &mut TickResult) {
        let score = self.progression.score();
        let level = self.progression.level();
        let duration_secs = now.as_secs();

        let submission = ScoreSubmission {
            name: self.player_name.clone(),
            score,
            level,
            duration_secs,
        };
        let high_score = match self.store.submit(submission) {
            Ok(made_it) => Some(made_it),
            Err(e) => {
                error!("failed to save score {}: {}", score, e);
                None
            }
        };

        info!(
            "game over: score={}, level={}, {}s, cause={}",
            score,
            level,
            duration_secs,
            cause.name()
        );

        result
            .events
            .push(GameEvent::game_over(self.tick, score, level, duration_secs, high_score));
        result.game_over = true;
        result.high_score = high_score;
        self.summary = Some(RunSummary {
            score,
            level,
            duration_secs,
            cause,
            high_score,
        });
        self.set_phase(GamePhase::GameOver, &mut result.events);
    }

    /// Fresh layout for the level that was just reached.
    fn begin_level(&mut self, now: Duration, events: &mut Vec<GameEvent>) {
        let lives = self.world.player.lives;
        self.world = build_world(
            &self.config,
            self.progression.level(),
            self.progression.enemy_count(),
            lives,
            &mut self.rng,
        );
        self.ai.reset();
        self.last_tick = now;

        info!("level {} started", self.progression.level());
        self.set_phase(GamePhase::Playing, events);
        events.push(GameEvent::level_started(
            self.tick,
            self.progression.level(),
            self.world.enemies.len() as u32,
        ));
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Snapshot for rendering.
    pub fn view(&self, host_now: Duration) -> GameView {
        let now = self.clock.now(host_now);
        let player = &self.world.player;

        GameView {
            phase: self.phase,
            tick: self.tick,
            player: player.body.segments().iter().copied().collect(),
            direction: player.body.direction(),
            shield_active: player.is_shielded(),
            speed_boost_active: player.is_boosted(),
            enemies: self
                .world
                .enemies
                .iter()
                .map(|e| EnemyView {
                    id: e.id,
                    body: e.body.segments().iter().copied().collect(),
                    color_index: e.color_index,
                    speed: e.speed,
                })
                .collect(),
            food: self.world.food,
            bonuses: self
                .world
                .bonuses
                .iter()
                .filter(|b| b.active)
                .map(|b| BonusView {
                    position: b.position,
                    bonus_type: b.bonus_type,
                    remaining_ms: b.remaining(now).as_millis() as u64,
                })
                .collect(),
            score: self.progression.score(),
            level: self.progression.level(),
            lives: player.lives,
            level_score: self.progression.level_score(),
            level_threshold: self.progression.threshold(),
            level_progress: self.progression.progress_fraction(),
            elapsed_ms: now.as_millis() as u64,
            death_cause: self.last_collision,
        }
    }

    /// Hash of everything that affects future ticks.
    ///
    /// Times are taken on the simulation clock, so the host clock anchor is
    /// not part of the digest.
    pub fn compute_hash(&self) -> StateHash {
        compute_state_hash(self.tick, self.rng_seed, |hasher| {
            hasher.update_u8(self.phase as u8);
            self.world.hash_into(hasher);
            self.progression.hash_into(hasher);
            self.ai.hash_into(hasher);
            hasher.update_duration(self.last_tick);
            hasher.update_opt_duration(self.pending.map(|p| p.due));
            let [s0, s1] = self.rng.state();
            hasher.update_u64(s0);
            hasher.update_u64(s1);
        })
    }

    /// Current phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Ticks simulated this run.
    pub fn tick(&self) -> u32 {
        self.tick
    }

    /// Seed the session was created with.
    pub fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Current layout.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Score and level state.
    pub fn progression(&self) -> &Progression {
        &self.progression
    }

    /// Enemy behavior assignments.
    pub fn ai(&self) -> &AiSelector {
        &self.ai
    }

    /// Active configuration.
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Scheduled level change, if any.
    pub fn pending_transition(&self) -> Option<PendingTransition> {
        self.pending
    }

    /// How the last run ended.
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    /// Name submitted with the next score.
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Set the name submitted with the next score.
    pub fn set_player_name(&mut self, name: impl Into<String>) {
        self.player_name = name.into();
    }

    /// High-score table, best first.
    pub fn high_scores(&self) -> &[HighScore] {
        self.store.top()
    }

    /// Check if `score` would make the table.
    pub fn is_high_score(&self, score: u32) -> bool {
        self.store.is_high_score(score)
    }

    /// Score store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Replay a recording from a fresh session.
///
/// Returns the final session and every event it produced.
pub fn replay<S: ScoreStore>(
    config: GameConfig,
    recording: &InputRecording,
    store: S,
) -> Result<(Game<S>, Vec<GameEvent>), ConfigError> {
    let mut game = Game::new(config, recording.rng_seed, store)?;
    let mut events = Vec::new();

    for (host_now, input) in recording.frames() {
        let result = game.update(host_now, &input);
        events.extend(result.events);
    }

    Ok((game, events))
}

// =============================================================================
// TESTS
// =============================================================================
