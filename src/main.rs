//! Snake Arena
//!
//! Headless demo: plays one seeded run with a simple autopilot, saves the
//! score, then replays the recorded input and checks the state hash.
//!
//! Usage: `snake-arena [config.json] [seed or label]`

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use snake_arena::{
    VERSION,
    audio::{AudioSink, TracingAudio},
    core::{grid::{Coord, Direction}, rng::derive_seed},
    game::{
        events::GameEventData,
        state::World,
        tick::replay,
    },
    storage::format_table,
    Game, GameConfig, InputFrame, InputRecording, JsonScoreStore, MemoryScoreStore,
};

/// Host frame length (~60 Hz).
const FRAME_STEP: Duration = Duration::from_millis(16);

/// Stop the demo after this many frames even if the run is still going.
const MAX_FRAMES: u32 = 60 * 60 * 5;

const DEFAULT_SEED: u64 = 12345;

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("Snake Arena v{}", VERSION);

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => GameConfig::from_json_file(&path)
            .with_context(|| format!("loading config from {path}"))?,
        None => GameConfig::default(),
    };
    let seed = match args.next() {
        // Non-numeric seeds are hashed, so `snake-arena cfg.json daily` works.
        Some(raw) => raw.parse().unwrap_or_else(|_| derive_seed(&raw, 0)),
        None => DEFAULT_SEED,
    };

    demo_run(config, seed)
}

/// Play, save, replay, compare.
fn demo_run(config: GameConfig, seed: u64) -> Result<()> {
    info!("=== Starting Demo Run ===");
    info!("Grid: {}x{}, seed: {}", config.grid_width, config.grid_height, seed);

    let store = JsonScoreStore::open(&config.high_score_file)
        .context("opening high-score file")?;
    let mut audio = TracingAudio::new();
    audio.load()?;

    let mut game = Game::new(config.clone(), seed, store)?;
    game.set_player_name("autopilot");

    let mut recording = InputRecording::new(seed, FRAME_STEP);
    let mut total_events = 0usize;

    for frame in 0..MAX_FRAMES {
        let input = if frame == 0 {
            InputFrame::with_action(InputFrame::FLAG_START)
        } else {
            autopilot(game.world())
                .map(InputFrame::with_direction)
                .unwrap_or_default()
        };
        recording.record(frame, input);

        let result = game.update(recording.frame_time(frame), &input);
        total_events += result.events.len();

        for cue in result.audio_cues() {
            audio.play(cue);
        }
        for event in &result.events {
            match &event.data {
                GameEventData::LevelStarted { level, enemy_count } => {
                    info!("Level {} with {} enemies", level, enemy_count);
                }
                GameEventData::PlayerHit { cause, lives_left } => {
                    info!("Hit {} at tick {}, {} lives left", cause.name(), event.tick, lives_left);
                }
                GameEventData::BonusCollected { bonus_type, .. } => {
                    info!("Collected {:?} bonus", bonus_type);
                }
                _ => {}
            }
        }

        if result.game_over {
            info!("Run ended at frame {}", frame);
            break;
        }
    }

    info!("=== Run Results ===");
    let view = game.view(recording.frame_time(recording.end_frame));
    info!(
        "Score {} | level {} | lives {} | {} ticks | {:.1}s",
        view.score,
        view.level,
        view.lives,
        view.tick,
        view.elapsed_ms as f64 / 1000.0
    );
    match game.summary() {
        Some(summary) => info!(
            "Game over by {} (high score: {:?})",
            summary.cause.name(),
            summary.high_score
        ),
        None => info!("Stopped after {} frames in phase {}", MAX_FRAMES, game.phase().name()),
    }
    info!("Total events: {}, input changes: {}", total_events, recording.deltas().len());

    for line in format_table(game.high_scores()) {
        info!("{}", line);
    }

    let hash = game.compute_hash();
    info!("Final State Hash: {}", hex::encode(hash));

    // Replay into a throwaway store so the table is not written twice.
    info!("=== Verifying Determinism ===");
    let (replayed, _) = replay(config, &recording, MemoryScoreStore::new())?;
    let replay_hash = replayed.compute_hash();
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash == replay_hash {
        info!("DETERMINISM VERIFIED: Hashes match!");
    } else {
        warn!("DETERMINISM FAILURE: Hashes differ!");
    }

    Ok(())
}

/// Head for the food, avoiding any step that is immediately fatal.
fn autopilot(world: &World) -> Option<Direction> {
    let body = &world.player.body;
    let head = body.head();
    let current = body.direction();
    let (dx, dy) = head.offset_to(world.food);

    let mut order: Vec<Direction> = Vec::with_capacity(4);
    if dx > 0 {
        order.push(Direction::Right);
    } else if dx < 0 {
        order.push(Direction::Left);
    }
    if dy > 0 {
        order.push(Direction::Down);
    } else if dy < 0 {
        order.push(Direction::Up);
    }
    order.push(current);
    for dir in Direction::ALL {
        if !order.contains(&dir) {
            order.push(dir);
        }
    }

    order
        .into_iter()
        .filter(|dir| !current.is_opposite(*dir))
        .find(|dir| is_safe(world, head.step(*dir)))
}

fn is_safe(world: &World, cell: Coord) -> bool {
    world.grid.contains(cell)
        && !world.player.body.occupies(cell)
        && world.enemy_at(cell).is_none()
}
