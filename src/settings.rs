//! Game settings and tuning
//!
//! Everything that shapes a run lives here so it can be loaded from JSON.
//! Defaults match `crate::consts`.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Startup configuration problems
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("stage catalog is empty, nothing to spawn")]
    EmptyStageCatalog,

    #[error("invalid {name} range: [{min}, {max}]")]
    InvalidRange {
        name: &'static str,
        min: f32,
        max: f32,
    },

    #[error("spawn distance {spawn_max} exceeds the maximum jump distance {jump_max}")]
    UnreachableSpawn { spawn_max: f32, jump_max: f32 },

    #[error("{0} must be positive")]
    NotPositive(&'static str),

    #[error("gravity {0} must pull downward (negative)")]
    UpwardGravity(f32),

    #[error("dead zone at {dead_zone_y} is not below the platform bottoms ({bottom})")]
    DeadZoneTooHigh { dead_zone_y: f32, bottom: f32 },

    #[error(transparent)]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Jump physics tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpSettings {
    /// Horizontal impulse per unit of charge
    pub force: f32,
    /// Vertical impulse of every jump
    pub up_impulse: f32,
    pub max_charge_secs: f32,
    pub cooldown_secs: f32,
    pub falling_threshold: f32,
    pub shaking_threshold: f32,
    pub gravity: f32,
}

impl Default for JumpSettings {
    fn default() -> Self {
        Self {
            force: JUMP_FORCE,
            up_impulse: JUMP_UP_IMPULSE,
            max_charge_secs: MAX_CHARGE_SECS,
            cooldown_secs: JUMP_COOLDOWN_SECS,
            falling_threshold: FALLING_THRESHOLD,
            shaking_threshold: SHAKING_THRESHOLD,
            gravity: GRAVITY,
        }
    }
}

impl JumpSettings {
    /// Airtime of a jump that lands at its take-off height
    ///
    /// Matches the fixed-step integrator, which lands one step early
    /// compared to the continuous parabola.
    pub fn flight_time(&self, dt: f32) -> f32 {
        (2.0 * self.up_impulse / self.gravity.abs() - dt).max(0.0)
    }

    /// Horizontal distance covered by a full charge
    pub fn max_distance(&self, dt: f32) -> f32 {
        self.force * self.max_charge_secs * self.flight_time(dt)
    }

    /// Charge (seconds) needed to cover a horizontal distance
    pub fn charge_for_distance(&self, distance: f32, dt: f32) -> f32 {
        let airtime = self.flight_time(dt);
        if airtime <= 0.0 || self.force <= 0.0 {
            return 0.0;
        }
        (distance / (self.force * airtime)).clamp(0.0, self.max_charge_secs)
    }
}

/// Stage spawning and scoring tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StageSettings {
    /// Stage kinds to pick from when spawning
    pub kinds: Vec<String>,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_scale: f32,
    pub max_scale: f32,
    pub height: f32,
    pub perfect_radius: f32,
    pub dead_zone_y: f32,
}

impl Default for StageSettings {
    fn default() -> Self {
        Self {
            kinds: vec!["cube".to_string(), "cylinder".to_string()],
            min_distance: SPAWN_MIN_DISTANCE,
            max_distance: SPAWN_MAX_DISTANCE,
            min_scale: PLATFORM_MIN_SCALE,
            max_scale: PLATFORM_MAX_SCALE,
            height: PLATFORM_HEIGHT,
            perfect_radius: PERFECT_LANDING_RADIUS,
            dead_zone_y: DEAD_ZONE_Y,
        }
    }
}

/// Audio levels
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            music_volume: 0.7,
            muted: false,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Run seed (None = pick one at startup)
    pub seed: Option<u64>,
    pub jump: JumpSettings,
    pub stage: StageSettings,
    pub audio: AudioSettings,
}

impl Settings {
    /// Parse settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file
    pub fn read(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Load settings from a JSON file
    ///
    /// A missing file falls back to defaults. Anything else (unreadable file,
    /// bad JSON, tuning that fails validation) is returned to the caller.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        match Self::read(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Check that the tuning can produce a playable run
    pub fn validate(&self) -> Result<(), ConfigError> {
        let stage = &self.stage;
        if stage.kinds.is_empty() {
            return Err(ConfigError::EmptyStageCatalog);
        }
        if !(stage.min_distance > 0.0 && stage.min_distance <= stage.max_distance) {
            return Err(ConfigError::InvalidRange {
                name: "spawn distance",
                min: stage.min_distance,
                max: stage.max_distance,
            });
        }
        if !(stage.min_scale > 0.0 && stage.min_scale <= stage.max_scale) {
            return Err(ConfigError::InvalidRange {
                name: "platform scale",
                min: stage.min_scale,
                max: stage.max_scale,
            });
        }
        if stage.height <= 0.0 {
            return Err(ConfigError::NotPositive("platform height"));
        }
        if stage.perfect_radius <= 0.0 {
            return Err(ConfigError::NotPositive("perfect landing radius"));
        }
        // Platforms are centered on y = 0
        let bottom = -stage.height / 2.0;
        if stage.dead_zone_y >= bottom {
            return Err(ConfigError::DeadZoneTooHigh {
                dead_zone_y: stage.dead_zone_y,
                bottom,
            });
        }
        if self.jump.gravity >= 0.0 {
            return Err(ConfigError::UpwardGravity(self.jump.gravity));
        }
        if self.jump.max_charge_secs <= 0.0 {
            return Err(ConfigError::NotPositive("max charge"));
        }

        let jump_max = self.jump.max_distance(SIM_DT);
        if stage.max_distance > jump_max {
            return Err(ConfigError::UnreachableSpawn {
                spawn_max: stage.max_distance,
                jump_max,
            });
        }
        Ok(())
    }
}
