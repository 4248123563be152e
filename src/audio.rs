//! Audio cue boundary
//!
//! The simulation only ever fires cues by name. Playback itself belongs to
//! the host; `AudioManager` keeps the name-to-sound registry, volumes and
//! mute state, and tracks which cues are currently playing.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::settings::AudioSettings;

/// Charge hum while the jump is building
pub const CUE_ENERGY: &str = "Energy";
/// Landed on a new platform
pub const CUE_SUCCESS: &str = "Success";
/// Fell into the dead zone
pub const CUE_FALL: &str = "Fall";
/// Run started
pub const CUE_START: &str = "Start";

/// Fire-and-forget cue playback
///
/// Unknown names are silently ignored.
pub trait AudioSink {
    fn play(&mut self, name: &str);
    fn stop(&mut self, name: &str);
}

/// Sound category, each with its own volume level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundType {
    Music,
    Sfx,
    Voice,
}

/// A registered sound
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sound {
    pub name: String,
    pub kind: SoundType,
    /// Per-sound volume (0.0 - 1.0)
    pub volume: f32,
    /// Looping sounds keep playing until stopped
    pub looped: bool,
}

impl Sound {
    pub fn sfx(name: &str, looped: bool) -> Self {
        Self {
            name: name.to_string(),
            kind: SoundType::Sfx,
            volume: 1.0,
            looped,
        }
    }
}

/// Audio manager for the game
pub struct AudioManager {
    sounds: HashMap<String, Sound>,
    levels: HashMap<SoundType, f32>,
    master_volume: f32,
    muted: bool,
    playing: HashSet<String>,
}

impl Default for AudioManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioManager {
    /// Create a manager with the game's standard cues registered
    pub fn new() -> Self {
        let mut manager = Self::empty();
        manager.register(Sound::sfx(CUE_ENERGY, true));
        manager.register(Sound::sfx(CUE_SUCCESS, false));
        manager.register(Sound::sfx(CUE_FALL, false));
        manager.register(Sound {
            name: CUE_START.to_string(),
            kind: SoundType::Music,
            volume: 0.8,
            looped: false,
        });
        manager
    }

    /// Create a manager with no sounds registered
    pub fn empty() -> Self {
        let levels = [
            (SoundType::Music, 1.0),
            (SoundType::Sfx, 1.0),
            (SoundType::Voice, 1.0),
        ]
        .into_iter()
        .collect();
        Self {
            sounds: HashMap::new(),
            levels,
            master_volume: 1.0,
            muted: false,
            playing: HashSet::new(),
        }
    }

    /// Create a manager configured from settings
    pub fn from_settings(settings: &AudioSettings) -> Self {
        let mut manager = Self::new();
        manager.set_master_volume(settings.master_volume);
        manager.set_volume(SoundType::Sfx, settings.sfx_volume);
        manager.set_volume(SoundType::Music, settings.music_volume);
        manager.set_muted(settings.muted);
        manager
    }

    /// Register (or replace) a sound by name
    pub fn register(&mut self, sound: Sound) {
        self.sounds.insert(sound.name.clone(), sound);
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set a category volume (0.0 - 1.0)
    pub fn set_volume(&mut self, kind: SoundType, vol: f32) {
        self.levels.insert(kind, vol.clamp(0.0, 1.0));
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
        if muted {
            self.playing.clear();
        }
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Effective volume of a registered sound (None if unknown)
    pub fn effective_volume(&self, name: &str) -> Option<f32> {
        let sound = self.sounds.get(name)?;
        if self.muted {
            return Some(0.0);
        }
        let level = self.levels.get(&sound.kind).copied().unwrap_or(1.0);
        Some(sound.volume * level * self.master_volume)
    }

    /// Whether a looping cue is currently playing
    pub fn is_playing(&self, name: &str) -> bool {
        self.playing.contains(name)
    }

    /// Stop everything (used when a run is torn down)
    pub fn stop_all(&mut self) {
        self.playing.clear();
    }
}

impl AudioSink for AudioManager {
    fn play(&mut self, name: &str) {
        if self.muted {
            return;
        }
        let Some(sound) = self.sounds.get(name) else {
            log::trace!("Unknown audio cue: {}", name);
            return;
        };
        log::debug!("Play cue {} (vol {:.2})", name, self.effective_volume(name).unwrap_or(0.0));
        if sound.looped {
            self.playing.insert(sound.name.clone());
        }
    }

    fn stop(&mut self, name: &str) {
        if self.playing.remove(name) {
            log::debug!("Stop cue {}", name);
        }
    }
}
