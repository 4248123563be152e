//! Game state and core simulation types
//!
//! `World` is everything a single run owns and is rebuilt from scratch on
//! restart. `Game` wraps it together with the state that survives restarts
//! (session, audio, leaderboard, settings).

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::physics::{PhysicsWorld, RigidBody};
use super::player::Player;
use super::session::{GameSession, ReloadTask};
use super::stage::StageManager;
use super::tween::Lerp;
use crate::audio::{AudioManager, AudioSink, CUE_START};
use crate::highscores::HighScores;
use crate::settings::{ConfigError, Settings};

/// Player control state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlayerState {
    /// Standing on a platform, ready to charge
    #[default]
    Idle,
    /// Input held, jump power building
    Charging,
    /// Airborne after a release
    Jumping,
}

/// A charge in progress
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeSession {
    /// Simulation time the charge started (seconds)
    pub started_at: f32,
}

impl ChargeSession {
    pub fn new(started_at: f32) -> Self {
        Self { started_at }
    }

    /// Charge duration at `now`, saturating at `max`
    pub fn duration(&self, now: f32, max: f32) -> f32 {
        (now - self.started_at).clamp(0.0, max)
    }
}

/// Stable platform identifier (allocation order)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformId(pub u32);

/// Cosmetic platform pose (what a renderer would draw)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Vertical offset from the physical position
    pub offset_y: f32,
    pub scale: Vec3,
}

impl Lerp for Pose {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        Pose {
            offset_y: self.offset_y.lerp_to(to.offset_y, t),
            scale: self.scale.lerp(to.scale, t),
        }
    }
}

/// A stage the player can land on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: PlatformId,
    /// Catalog entry this platform was built from
    pub kind: String,
    /// Center of the platform box
    pub position: Vec3,
    /// Box size (footprint on X/Z, height on Y)
    pub scale: Vec3,
    /// RGB, each channel in [0, 1]
    pub color: [f32; 3],
    pub is_current: bool,
    /// Squash animation state; never read by physics
    pub pose: Pose,
}

impl Platform {
    pub fn new(id: PlatformId, kind: &str, position: Vec3, scale: Vec3, color: [f32; 3]) -> Self {
        Self {
            id,
            kind: kind.to_string(),
            position,
            scale,
            color,
            is_current: false,
            pose: Pose {
                offset_y: 0.0,
                scale,
            },
        }
    }

    /// Height of the landing surface
    #[inline]
    pub fn top(&self) -> f32 {
        self.position.y + self.scale.y / 2.0
    }

    /// Pose the platform returns to after a squash
    pub fn rest_pose(&self) -> Pose {
        Pose {
            offset_y: 0.0,
            scale: self.scale,
        }
    }

    /// Whether a point lies over the platform footprint
    pub fn contains_xz(&self, point: Vec3) -> bool {
        let d = point - self.position;
        d.x.abs() <= self.scale.x / 2.0 && d.z.abs() <= self.scale.z / 2.0
    }
}

/// Things that happened during a tick (for hosts, UI and tests)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ChargeStarted,
    ChargeReleased { charge: f32 },
    Jumped { impulse: Vec3 },
    Landed {
        platform: PlatformId,
        reward: Option<u32>,
        perfect: bool,
    },
    PlayerDied,
    RunStarted { seed: u64 },
}

/// Everything owned by a single run
pub struct World {
    pub seed: u64,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    pub body: RigidBody,
    pub physics: PhysicsWorld,
    pub stage: StageManager,
    /// Platforms landed on this run
    pub landings: u32,
    /// Best multiplier reached this run
    pub best_multiplier: u32,
}

impl World {
    /// Build a fresh run: one current platform at the origin, the player
    /// standing on it, and the next platform already spawned
    pub fn new(settings: &Settings, seed: u64) -> Result<Self, ConfigError> {
        let stage = StageManager::new(&settings.stage, seed)?;
        let current = stage.current();
        let start = Vec3::new(current.position.x, current.top(), current.position.z);

        let physics = PhysicsWorld::new(settings.jump.gravity, settings.stage.dead_zone_y)
            .resting_on(current.id);
        let player = Player::new(settings.jump.clone(), start);

        log::info!("World built with seed {}", seed);
        Ok(Self {
            seed,
            time_ticks: 0,
            player,
            body: RigidBody::new(start),
            physics,
            stage,
            landings: 0,
            best_multiplier: 1,
        })
    }

    /// Simulation time in seconds
    pub fn time_secs(&self) -> f32 {
        self.time_ticks as f32 * crate::consts::SIM_DT
    }

    /// Kill every cosmetic interpolation in this run
    pub fn kill_tweens(&mut self) {
        self.player.kill_cosmetics();
        self.stage.kill_all_tweens();
    }
}

/// Top-level game: the current run plus everything that outlives it
pub struct Game {
    pub settings: Settings,
    pub world: World,
    pub session: GameSession,
    pub audio: AudioManager,
    pub high_scores: HighScores,
    /// Restart in flight
    pub reload: Option<ReloadTask>,
    /// Events from the last tick
    pub events: Vec<GameEvent>,
    /// The game-over of the current run has been recorded
    pub(crate) run_recorded: bool,
}

impl Game {
    /// Create a game from validated settings
    pub fn new(settings: Settings, seed: u64) -> Result<Self, ConfigError> {
        settings.validate()?;
        let world = World::new(&settings, seed)?;
        let mut audio = AudioManager::from_settings(&settings.audio);
        audio.play(CUE_START);

        Ok(Self {
            settings,
            world,
            session: GameSession::new(),
            audio,
            high_scores: HighScores::new(),
            reload: None,
            events: vec![GameEvent::RunStarted { seed }],
            run_recorded: false,
        })
    }

    pub fn is_reloading(&self) -> bool {
        self.reload.is_some()
    }
}
