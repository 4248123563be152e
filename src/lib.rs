//! Stage Hop - A charge-and-jump platform hopping arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player state machine, physics, stages, scoring)
//! - `audio`: Cue-name audio boundary and sound registry
//! - `settings`: Data-driven tuning and validation
//! - `highscores`: Best-run leaderboard

pub mod audio;
pub mod highscores;
pub mod settings;
pub mod sim;

pub use audio::{AudioManager, AudioSink};
pub use highscores::HighScores;
pub use settings::{ConfigError, Settings};

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Gravity (units/s², applied on Y)
    pub const GRAVITY: f32 = -9.81;

    /// Horizontal impulse per unit of charge
    pub const JUMP_FORCE: f32 = 2.0;
    /// Fixed vertical impulse of every jump
    pub const JUMP_UP_IMPULSE: f32 = 5.0;
    /// Charge saturates after this many seconds
    pub const MAX_CHARGE_SECS: f32 = 1.0;
    /// Charge-start is ignored for this long after a jump
    pub const JUMP_COOLDOWN_SECS: f32 = 1.0;

    /// Airborne vertical velocity below this counts as falling
    pub const FALLING_THRESHOLD: f32 = -0.01;
    /// Angular velocity magnitude above this counts as shaking
    pub const SHAKING_THRESHOLD: f32 = 0.05;

    /// Spawn distance range from the previous spawn cursor
    pub const SPAWN_MIN_DISTANCE: f32 = 1.2;
    pub const SPAWN_MAX_DISTANCE: f32 = 2.0;
    /// Platform footprint scale range (X/Z)
    pub const PLATFORM_MIN_SCALE: f32 = 0.5;
    pub const PLATFORM_MAX_SCALE: f32 = 1.0;
    /// Platform height (Y scale)
    pub const PLATFORM_HEIGHT: f32 = 0.5;

    /// Landings closer than this to the platform center are perfect
    pub const PERFECT_LANDING_RADIUS: f32 = 0.1;

    /// Anything that falls to this height hits the dead zone
    pub const DEAD_ZONE_Y: f32 = -3.0;

    /// Platform squash while charging
    pub const SQUASH_SCALE: f32 = 0.15;
    pub const SQUASH_DROP: f32 = 0.15;
    pub const SQUASH_MIN_HEIGHT: f32 = 0.4;
    pub const SQUASH_SECS: f32 = 1.0;
    pub const UNSQUASH_SECS: f32 = 0.4;

    /// Player cosmetics
    pub const PLAYER_SQUASH_SCALE: Vec3 = Vec3::new(1.5, -1.0, 1.5);
    pub const PLAYER_SQUASH_FACTOR: f32 = 0.05;
    pub const PLAYER_HEAD_DROP: f32 = -0.1;
    pub const PLAYER_RECOVER_SECS: f32 = 0.2;
    pub const SPIN_SECS: f32 = 0.6;

    /// Camera follows the player at a fixed offset
    pub const CAMERA_OFFSET: Vec3 = Vec3::new(-4.0, 6.0, -4.0);
    pub const CAMERA_FOLLOW_SECS: f32 = 1.0;

    /// Ticks a restart spends reloading before the next run starts
    pub const RELOAD_TICKS: u32 = 30;
}

/// Project a position onto the ground plane (Y = 0)
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Distance between two points ignoring the vertical axis
#[inline]
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    horizontal(a - b).length()
}
