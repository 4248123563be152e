//! Stage Hop entry point
//!
//! Headless demo: loads settings, lets the autopilot play a few runs through
//! the fixed timestep loop, and prints the leaderboard.
//!
//! Usage: `stage-hop [settings.json] [runs]`

use std::cell::Cell;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use stage_hop::consts::*;
use stage_hop::sim::{Game, GameEvent, SessionEvent, TickInput, tick};
use stage_hop::{HighScores, Settings};

/// Simulated display refresh
const FRAME_DT: f32 = 1.0 / 60.0;
/// Give up on a run that never ends
const MAX_FRAMES_PER_RUN: u32 = 60 * 60 * 5;
const HIGH_SCORES_FILE: &str = "stage_hop_scores.json";

/// Host-side loop state
struct Runner {
    game: Game,
    accumulator: f32,
    input: TickInput,
}

impl Runner {
    fn new(game: Game) -> Self {
        Self {
            game,
            accumulator: 0.0,
            input: TickInput {
                autopilot: true,
                ..Default::default()
            },
        }
    }

    /// Run simulation ticks for one frame
    fn update(&mut self, dt: f32) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.game, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.restart = false;

            for event in &self.game.events {
                match event {
                    GameEvent::Landed {
                        platform,
                        reward: Some(reward),
                        perfect,
                    } => log::debug!(
                        "Landed on platform {} for {}{}",
                        platform.0,
                        reward,
                        if *perfect { " (perfect)" } else { "" }
                    ),
                    GameEvent::RunStarted { seed } => log::info!("Run started (seed {})", seed),
                    _ => {}
                }
            }
        }
    }
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Stage Hop (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next().map(|path| Settings::load(PathBuf::from(path))) {
        Some(Ok(settings)) => settings,
        Some(Err(e)) => {
            log::error!("Invalid settings: {}", e);
            return ExitCode::FAILURE;
        }
        None => Settings::default(),
    };
    let runs: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(3);
    let seed = settings.seed.unwrap_or(0x5eed);

    let game = match Game::new(settings, seed) {
        Ok(game) => game,
        Err(e) => {
            log::error!("Invalid settings: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut runner = Runner::new(game);

    let scores_path = PathBuf::from(HIGH_SCORES_FILE);
    runner.game.high_scores = HighScores::load(&scores_path);

    let finished = Rc::new(Cell::new(0u32));
    let counter = finished.clone();
    runner.game.session.subscribe(move |event| match event {
        SessionEvent::ScoreChanged(total) => log::info!("Score: {}", total),
        SessionEvent::StateChanged(state) => {
            log::info!("Session: {:?}", state);
            if *state == stage_hop::sim::SessionState::GameOver {
                counter.set(counter.get() + 1);
            }
        }
    });

    for run in 1..=runs {
        let mut frames = 0;
        while finished.get() < run && frames < MAX_FRAMES_PER_RUN {
            runner.update(FRAME_DT);
            frames += 1;
        }
        if finished.get() < run {
            log::warn!("Run {} did not finish, stopping", run);
            break;
        }
        println!(
            "Run {}: {} points, {} platforms",
            run,
            runner.game.session.score().total,
            runner.game.world.landings
        );
        if run < runs {
            runner.input.restart = true;
        }
    }

    println!("\nHigh scores:");
    for (i, entry) in runner.game.high_scores.entries.iter().enumerate() {
        println!(
            "{:>2}. {:>6}  {:>3} platforms  x{:<3} seed {}",
            i + 1,
            entry.score,
            entry.landings,
            entry.best_multiplier,
            entry.seed
        );
    }

    if let Err(e) = runner.game.high_scores.save(&scores_path) {
        log::warn!("Could not save high scores: {}", e);
    }
    ExitCode::SUCCESS
}
