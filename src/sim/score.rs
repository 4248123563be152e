//! Landing accuracy scoring
//!
//! A landing within the perfect radius of the platform center doubles the
//! reward multiplier; anything else resets it to 1. The reward added to the
//! score is the multiplier itself.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::horizontal_distance;

/// Verdict on a single landing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Judgement {
    /// Horizontal distance from the platform center
    pub distance: f32,
    pub perfect: bool,
    /// Points to add (equals the new multiplier)
    pub reward: u32,
}

/// Scores landings and carries the perfect-streak multiplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreJudge {
    pub perfect_radius: f32,
    multiplier: u32,
}

impl ScoreJudge {
    pub fn new(perfect_radius: f32) -> Self {
        Self {
            perfect_radius,
            multiplier: 1,
        }
    }

    /// Current reward multiplier
    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    /// Judge a landing; only X/Z matter
    pub fn evaluate(&mut self, landing: Vec3, platform_center: Vec3) -> Judgement {
        let distance = horizontal_distance(landing, platform_center);
        let perfect = distance < self.perfect_radius;
        self.multiplier = if perfect {
            self.multiplier.saturating_mul(2)
        } else {
            1
        };
        Judgement {
            distance,
            perfect,
            reward: self.multiplier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::PERFECT_LANDING_RADIUS;

    #[test]
    fn test_center_landing_doubles() {
        let mut judge = ScoreJudge::new(PERFECT_LANDING_RADIUS);
        let center = Vec3::new(3.0, 0.0, 1.0);
        let j = judge.evaluate(center, center);
        assert!(j.perfect);
        assert_eq!(j.distance, 0.0);
        assert_eq!(j.reward, 2);
    }

    #[test]
    fn test_streak_compounds_then_resets() {
        let mut judge = ScoreJudge::new(PERFECT_LANDING_RADIUS);
        let center = Vec3::ZERO;
        let rewards: Vec<u32> = [0.0, 0.05, 0.02, 0.5, 0.0]
            .iter()
            .map(|dx| judge.evaluate(Vec3::new(*dx, 0.0, 0.0), center).reward)
            .collect();
        assert_eq!(rewards, vec![2, 4, 8, 1, 2]);
    }

    #[test]
    fn test_threshold_distance_resets() {
        let mut judge = ScoreJudge::new(PERFECT_LANDING_RADIUS);
        judge.evaluate(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(judge.multiplier(), 2);
        let j = judge.evaluate(Vec3::new(0.0, 0.0, PERFECT_LANDING_RADIUS), Vec3::ZERO);
        assert!(!j.perfect);
        assert_eq!(j.reward, 1);
    }

    #[test]
    fn test_vertical_offset_ignored() {
        let mut judge = ScoreJudge::new(PERFECT_LANDING_RADIUS);
        let j = judge.evaluate(Vec3::new(0.0, 0.25, 0.0), Vec3::ZERO);
        assert!(j.perfect);
    }
}
