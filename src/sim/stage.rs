//! Stage lifecycle
//!
//! Tracks the current and next platform, squashes the current one while the
//! player charges, and on a landing promotes, spawns and scores.

use glam::Vec3;

use super::score::{Judgement, ScoreJudge};
use super::session::GameSession;
use super::spawner::StageSpawner;
use super::state::{Platform, PlatformId, Pose};
use super::tween::{Ease, Tween, TweenHandle, Tweens};
use crate::audio::{AudioSink, CUE_SUCCESS};
use crate::consts::*;
use crate::settings::{ConfigError, StageSettings};

/// Owns every platform of a run
#[derive(Debug, Clone)]
pub struct StageManager {
    /// All platforms, ordered by id
    platforms: Vec<Platform>,
    current: PlatformId,
    next: PlatformId,
    next_id: u32,
    spawner: StageSpawner,
    judge: ScoreJudge,
    tweens: Tweens<PlatformId, Pose>,
    /// Running squash on the current platform
    squash: Option<TweenHandle>,
}

impl StageManager {
    /// Place the starting platform at the origin and spawn the first target
    pub fn new(settings: &StageSettings, seed: u64) -> Result<Self, ConfigError> {
        let spawner = StageSpawner::new(settings, Vec3::ZERO, seed)?;

        let mut start = Platform::new(
            PlatformId(0),
            &settings.kinds[0],
            Vec3::ZERO,
            Vec3::new(1.0, settings.height, 1.0),
            [1.0, 1.0, 1.0],
        );
        start.is_current = true;

        let mut stage = Self {
            platforms: vec![start],
            current: PlatformId(0),
            next: PlatformId(0),
            next_id: 1,
            spawner,
            judge: ScoreJudge::new(settings.perfect_radius),
            tweens: Tweens::new(),
            squash: None,
        };
        stage.spawn_stage();
        Ok(stage)
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.platforms
    }

    pub fn platform(&self, id: PlatformId) -> Option<&Platform> {
        self.platforms.iter().find(|p| p.id == id)
    }

    fn platform_mut(&mut self, id: PlatformId) -> Option<&mut Platform> {
        self.platforms.iter_mut().find(|p| p.id == id)
    }

    /// The platform the player is standing on
    pub fn current(&self) -> &Platform {
        // Current always names a platform this manager created
        &self.platforms[self.index_of(self.current)]
    }

    /// The most recently spawned platform
    pub fn next(&self) -> &Platform {
        &self.platforms[self.index_of(self.next)]
    }

    /// Jump target for the player
    pub fn next_stage_position(&self) -> Vec3 {
        self.next().position
    }

    pub fn multiplier(&self) -> u32 {
        self.judge.multiplier()
    }

    /// Whether the current platform is mid-squash or mid-recovery
    pub fn is_deforming(&self) -> bool {
        self.tweens.is_animating(self.current)
    }

    /// Whether the charge squash is still running
    pub fn is_squashing(&self) -> bool {
        self.squash.is_some_and(|h| self.tweens.is_active(h))
    }

    fn index_of(&self, id: PlatformId) -> usize {
        // Ids are allocated in order and platforms are never removed
        id.0 as usize
    }

    fn spawn_stage(&mut self) {
        let id = PlatformId(self.next_id);
        self.next_id += 1;
        let platform = self.spawner.spawn_next(id);
        self.platforms.push(platform);
        self.next = id;
    }

    /// Squash the current platform while the player charges
    pub fn on_charge_started(&mut self) {
        let current = self.current;
        let Some(platform) = self.platform(current) else { return };
        let from = platform.pose;
        let to = Pose {
            offset_y: from.offset_y - SQUASH_DROP,
            scale: Vec3::new(
                from.scale.x,
                (from.scale.y - SQUASH_SCALE).max(SQUASH_MIN_HEIGHT),
                from.scale.z,
            ),
        };
        self.squash = Some(
            self.tweens
                .start(current, Tween::new(from, to, SQUASH_SECS, Ease::OutQuad)),
        );
    }

    /// Spring the current platform back after release
    pub fn on_charge_released(&mut self) {
        let current = self.current;
        if let Some(squash) = self.squash.take() {
            self.tweens.kill(squash);
        }
        let Some(platform) = self.platform(current) else { return };
        let (from, to) = (platform.pose, platform.rest_pose());
        self.tweens
            .start(current, Tween::new(from, to, UNSQUASH_SECS, Ease::OutQuad));
    }

    /// Handle the player touching down on a platform
    ///
    /// Only a platform other than the current one counts: it becomes current,
    /// the next target spawns, and the landing is scored. Bouncing back onto
    /// the current platform does nothing.
    pub fn on_player_landed(
        &mut self,
        landed: PlatformId,
        landing: Vec3,
        session: &mut GameSession,
        audio: &mut dyn AudioSink,
    ) -> Option<Judgement> {
        if landed == self.current {
            return None;
        }
        let Some(center) = self.platform(landed).map(|p| p.position) else {
            log::warn!("Landed on unknown platform {}", landed.0);
            return None;
        };

        // Old current is abandoned: stop animating it and leave it at rest
        let previous = self.current;
        self.tweens.kill_target(previous);
        self.squash = None;
        if let Some(p) = self.platform_mut(previous) {
            p.is_current = false;
            p.pose = p.rest_pose();
        }
        if let Some(p) = self.platform_mut(landed) {
            p.is_current = true;
        }
        self.current = landed;

        self.spawn_stage();

        let judgement = self.judge.evaluate(landing, center);
        session.add_score(judgement.reward);
        audio.play(CUE_SUCCESS);
        log::debug!(
            "Landed on {} ({:.3} from center), reward {}",
            landed.0,
            judgement.distance,
            judgement.reward
        );
        Some(judgement)
    }

    /// Advance cosmetic tweens
    pub fn advance(&mut self, dt: f32) {
        let platforms = &mut self.platforms;
        self.tweens.advance(dt, |id, pose| {
            if let Some(p) = platforms.iter_mut().find(|p| p.id == id) {
                p.pose = pose;
            }
        });
    }

    /// Stop every platform animation (restart teardown)
    pub fn kill_all_tweens(&mut self) {
        self.tweens.kill_all();
        self.squash = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingAudio {
        played: Vec<String>,
    }

    impl AudioSink for RecordingAudio {
        fn play(&mut self, name: &str) {
            self.played.push(name.to_string());
        }
        fn stop(&mut self, _name: &str) {}
    }

    fn stage() -> StageManager {
        StageManager::new(&StageSettings::default(), 1234).unwrap()
    }

    fn current_count(stage: &StageManager) -> usize {
        stage.platforms().iter().filter(|p| p.is_current).count()
    }

    #[test]
    fn test_new_has_current_and_next() {
        let stage = stage();
        assert_eq!(stage.platforms().len(), 2);
        assert_eq!(stage.current().id, PlatformId(0));
        assert_eq!(stage.next().id, PlatformId(1));
        assert_eq!(current_count(&stage), 1);
        assert_eq!(stage.next_stage_position(), stage.next().position);
    }

    #[test]
    fn test_landing_on_next_promotes_spawns_and_scores() {
        let mut stage = stage();
        let mut session = GameSession::new();
        let mut audio = RecordingAudio::default();
        let target = stage.next().id;
        let center = stage.next().position;

        let judgement = stage
            .on_player_landed(target, center, &mut session, &mut audio)
            .unwrap();
        assert!(judgement.perfect);
        assert_eq!(stage.current().id, target);
        assert_eq!(stage.next().id, PlatformId(2));
        assert_eq!(current_count(&stage), 1);
        assert_eq!(session.score().total, 2);
        assert_eq!(audio.played, vec![CUE_SUCCESS.to_string()]);
    }

    #[test]
    fn test_landing_twice_is_idempotent() {
        let mut stage = stage();
        let mut session = GameSession::new();
        let mut audio = RecordingAudio::default();
        let target = stage.next().id;
        let center = stage.next().position;

        assert!(stage.on_player_landed(target, center, &mut session, &mut audio).is_some());
        assert!(stage.on_player_landed(target, center, &mut session, &mut audio).is_none());
        assert_eq!(stage.platforms().len(), 3);
        assert_eq!(session.score().total, 2);
        assert_eq!(audio.played.len(), 1);
    }

    #[test]
    fn test_bounce_on_current_is_ignored() {
        let mut stage = stage();
        let mut session = GameSession::new();
        let mut audio = RecordingAudio::default();
        let current = stage.current().id;
        assert!(stage.on_player_landed(current, Vec3::ZERO, &mut session, &mut audio).is_none());
        assert_eq!(stage.platforms().len(), 2);
        assert_eq!(session.score().total, 0);
    }

    #[test]
    fn test_two_perfect_landings_compound() {
        let mut stage = stage();
        let mut session = GameSession::new();
        let mut audio = RecordingAudio::default();

        let mut totals = Vec::new();
        for _ in 0..2 {
            let target = stage.next().id;
            let center = stage.next().position;
            stage.on_player_landed(target, center, &mut session, &mut audio);
            totals.push((stage.multiplier(), session.score().total));
        }
        assert_eq!(totals, vec![(2, 2), (4, 6)]);
    }

    #[test]
    fn test_squash_and_recover() {
        let mut stage = stage();
        let rest = stage.current().rest_pose();

        stage.on_charge_started();
        assert!(stage.is_deforming());
        assert!(stage.is_squashing());
        stage.advance(SQUASH_SECS);
        assert!(!stage.is_squashing());
        let squashed = stage.current().pose;
        assert!((squashed.offset_y + SQUASH_DROP).abs() < 1e-5);
        assert!(squashed.scale.y < rest.scale.y);
        assert!(squashed.scale.y >= SQUASH_MIN_HEIGHT);

        stage.on_charge_released();
        stage.advance(UNSQUASH_SECS);
        assert_eq!(stage.current().pose, rest);
        assert!(!stage.is_deforming());
    }

    #[test]
    fn test_squash_does_not_move_jump_target_or_surface() {
        let mut stage = stage();
        let target = stage.next_stage_position();
        let top = stage.current().top();
        stage.on_charge_started();
        stage.advance(0.5);
        assert_eq!(stage.next_stage_position(), target);
        assert_eq!(stage.current().top(), top);
    }

    #[test]
    fn test_abandoned_platform_is_not_animated() {
        let mut stage = stage();
        let mut session = GameSession::new();
        let mut audio = RecordingAudio::default();
        let start = stage.current().id;

        stage.on_charge_started();
        stage.advance(0.3);
        let target = stage.next().id;
        let center = stage.next().position;
        stage.on_player_landed(target, center, &mut session, &mut audio);

        let old = stage.platform(start).unwrap().clone();
        assert_eq!(old.pose, old.rest_pose());
        stage.advance(1.0);
        assert_eq!(stage.platform(start).unwrap().pose, old.rest_pose());
    }

    #[test]
    fn test_release_cuts_squash_short() {
        let mut stage = stage();
        stage.on_charge_started();
        stage.advance(0.3);
        let partial = stage.current().pose;
        stage.on_charge_released();
        assert!(!stage.is_squashing());
        // Recovery starts from wherever the squash got to
        stage.advance(0.01);
        assert!(stage.current().pose.offset_y > partial.offset_y);
        stage.advance(UNSQUASH_SECS);
        assert_eq!(stage.current().pose, stage.current().rest_pose());
    }

    #[test]
    fn test_kill_all_tweens_freezes_pose() {
        let mut stage = stage();
        stage.on_charge_started();
        stage.advance(0.2);
        let frozen = stage.current().pose;
        stage.kill_all_tweens();
        stage.advance(1.0);
        assert_eq!(stage.current().pose, frozen);
    }
}
