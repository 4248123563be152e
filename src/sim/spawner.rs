//! Procedural platform placement
//!
//! Platforms are placed relative to a running spawn cursor, never the
//! player's position, so a sloppy landing does not drift the course.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{Platform, PlatformId};
use crate::settings::{ConfigError, StageSettings};

/// Spawn directions: the course only ever advances along +X or +Z
const DIRECTIONS: [Vec3; 2] = [Vec3::X, Vec3::Z];

/// Places each next platform
#[derive(Debug, Clone)]
pub struct StageSpawner {
    rng: Pcg32,
    cursor: Vec3,
    kinds: Vec<String>,
    min_distance: f32,
    max_distance: f32,
    min_scale: f32,
    max_scale: f32,
    height: f32,
}

impl StageSpawner {
    /// Create a spawner whose cursor starts at `origin`
    pub fn new(settings: &StageSettings, origin: Vec3, seed: u64) -> Result<Self, ConfigError> {
        if settings.kinds.is_empty() {
            return Err(ConfigError::EmptyStageCatalog);
        }
        Ok(Self {
            rng: Pcg32::seed_from_u64(seed),
            cursor: origin,
            kinds: settings.kinds.clone(),
            min_distance: settings.min_distance,
            max_distance: settings.max_distance,
            min_scale: settings.min_scale,
            max_scale: settings.max_scale,
            height: settings.height,
        })
    }

    /// Position the next platform will be offset from
    pub fn cursor(&self) -> Vec3 {
        self.cursor
    }

    /// Advance the cursor and build the next platform
    pub fn spawn_next(&mut self, id: PlatformId) -> Platform {
        let direction = DIRECTIONS[self.rng.random_range(0..DIRECTIONS.len())];
        let distance = self.random_in(self.min_distance, self.max_distance);
        self.cursor += direction * distance;

        let footprint = self.random_in(self.min_scale, self.max_scale);
        let scale = Vec3::new(footprint, self.height, footprint);
        let color = [
            self.rng.random::<f32>(),
            self.rng.random::<f32>(),
            self.rng.random::<f32>(),
        ];
        let kind_index = self.rng.random_range(0..self.kinds.len());

        log::debug!(
            "Spawned platform {} ({}) at ({:.2}, {:.2}), {:.2} away",
            id.0,
            self.kinds[kind_index],
            self.cursor.x,
            self.cursor.z,
            distance
        );
        Platform::new(id, &self.kinds[kind_index], self.cursor, scale, color)
    }

    fn random_in(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.random_range(min..=max)
        } else {
            min
        }
    }
}
