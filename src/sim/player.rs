//! Player state machine
//!
//! Idle -> Charging on a pointer press, Charging -> Jumping on release,
//! Jumping -> Idle on a confirmed landing. Game over is not a state: dying
//! disables input and the machine simply stops accepting charges.
//!
//! Per tick the host calls `begin_tick`, delivers contacts through
//! `on_contact`, then calls `update`. A contact that already changed state
//! suppresses the state handler for that tick, so a tick never performs two
//! transitions.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::physics::{Collider, Contact, PhysicsBody};
use super::session::GameSession;
use super::stage::StageManager;
use super::state::{ChargeSession, GameEvent, PlatformId, PlayerState};
use super::tween::{Ease, Tween, Tweens};
use crate::audio::{AudioSink, CUE_ENERGY, CUE_FALL};
use crate::consts::*;
use crate::horizontal;
use crate::settings::JumpSettings;

/// Collaborators the player acts on during a tick
pub struct PlayerCtx<'a> {
    pub body: &'a mut dyn PhysicsBody,
    pub stage: &'a mut StageManager,
    pub session: &'a mut GameSession,
    pub audio: &'a mut dyn AudioSink,
    pub events: &'a mut Vec<GameEvent>,
}

/// Cosmetic parts that can be tweened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlayerPart {
    Body,
    Head,
    Spin,
    Camera,
}

/// What a renderer would draw for the player
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerPose {
    pub body_scale: Vec3,
    pub head_offset: Vec3,
    /// Accumulated euler rotation (degrees)
    pub rotation: Vec3,
    /// Camera position following the player
    pub camera: Vec3,
}

/// The jump-charge-land control loop
#[derive(Debug, Clone)]
pub struct Player {
    tuning: JumpSettings,
    state: PlayerState,
    charge: Option<ChargeSession>,
    input_enabled: bool,
    /// In contact with a platform
    grounded: bool,
    /// Set at jump start, cleared once the cooldown elapses
    last_jump_time: Option<f32>,
    pointer_was_down: bool,
    dead: bool,
    /// Charge particle effect visible
    charge_effect: bool,
    transitioned: bool,
    pose: PlayerPose,
    tweens: Tweens<PlayerPart, Vec3>,
}

impl Player {
    /// A player standing (grounded) at `start`
    pub fn new(tuning: JumpSettings, start: Vec3) -> Self {
        Self {
            tuning,
            state: PlayerState::Idle,
            charge: None,
            input_enabled: true,
            grounded: true,
            last_jump_time: None,
            pointer_was_down: false,
            dead: false,
            charge_effect: false,
            transitioned: false,
            pose: PlayerPose {
                body_scale: Vec3::ONE,
                head_offset: Vec3::ZERO,
                rotation: Vec3::ZERO,
                camera: start + CAMERA_OFFSET,
            },
            tweens: Tweens::new(),
        }
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn charge(&self) -> Option<ChargeSession> {
        self.charge
    }

    pub fn is_input_enabled(&self) -> bool {
        self.input_enabled
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_dead(&self) -> bool {
        self.dead
    }

    pub fn is_charge_effect_visible(&self) -> bool {
        self.charge_effect
    }

    pub fn cooldown_active(&self) -> bool {
        self.last_jump_time.is_some()
    }

    pub fn pose(&self) -> PlayerPose {
        self.pose
    }

    /// Airborne and moving down
    pub fn is_falling(&self, body: &dyn PhysicsBody) -> bool {
        !self.grounded && body.velocity().y < self.tuning.falling_threshold
    }

    /// Still spinning from an impact
    pub fn is_shaking(&self, body: &dyn PhysicsBody) -> bool {
        body.angular_velocity().length() > self.tuning.shaking_threshold
    }

    fn is_falling_or_shaking(&self, body: &dyn PhysicsBody) -> bool {
        self.is_falling(body) || self.is_shaking(body)
    }

    /// Impulse for a jump from `from` toward `target` with the given charge
    ///
    /// Horizontal direction is normalized on the ground plane and scaled by
    /// charge; the vertical component is fixed.
    pub fn jump_impulse(&self, from: Vec3, target: Vec3, charge: f32) -> Vec3 {
        let direction = horizontal(target - from).normalize_or_zero();
        Vec3::Y * self.tuning.up_impulse + direction * charge * self.tuning.force
    }

    /// Reset per-tick bookkeeping; call before delivering contacts
    pub fn begin_tick(&mut self) {
        self.transitioned = false;
    }

    /// Poll input and state predicates for one tick
    pub fn update(&mut self, now: f32, pointer_down: bool, ctx: &mut PlayerCtx<'_>) {
        let pressed = pointer_down && !self.pointer_was_down;
        self.pointer_was_down = pointer_down;

        self.update_cooldown(now);
        if self.transitioned {
            return;
        }

        match self.state {
            PlayerState::Idle => self.handle_idle(now, pressed, ctx),
            PlayerState::Charging => {
                if !pointer_down {
                    self.release(now, ctx);
                }
            }
            PlayerState::Jumping => {
                if self.grounded && !self.is_falling_or_shaking(&*ctx.body) {
                    self.change_state(PlayerState::Idle);
                }
            }
        }
    }

    fn update_cooldown(&mut self, now: f32) {
        if let Some(jumped_at) = self.last_jump_time
            && now - jumped_at > self.tuning.cooldown_secs
        {
            self.last_jump_time = None;
        }
    }

    fn handle_idle(&mut self, now: f32, pressed: bool, ctx: &mut PlayerCtx<'_>) {
        if ctx.body.is_sleeping() {
            ctx.body.wake_up();
        }
        if ctx.session.is_game_over() || self.is_falling_or_shaking(&*ctx.body) {
            return;
        }
        if pressed && self.input_enabled && !self.cooldown_active() {
            self.start_charge(now, ctx);
        }
    }

    fn change_state(&mut self, state: PlayerState) {
        log::debug!("Player {:?} -> {:?}", self.state, state);
        self.state = state;
        self.transitioned = true;
    }

    fn start_charge(&mut self, now: f32, ctx: &mut PlayerCtx<'_>) {
        self.change_state(PlayerState::Charging);
        self.charge = Some(ChargeSession::new(now));
        self.charge_effect = true;
        ctx.audio.play(CUE_ENERGY);
        ctx.events.push(GameEvent::ChargeStarted);

        let duration = self.tuning.max_charge_secs;
        let squashed = Vec3::ONE + PLAYER_SQUASH_SCALE * PLAYER_SQUASH_FACTOR;
        self.tweens.start(
            PlayerPart::Body,
            Tween::new(self.pose.body_scale, squashed, duration, Ease::InOutSine),
        );
        self.tweens.start(
            PlayerPart::Head,
            Tween::new(
                self.pose.head_offset,
                Vec3::Y * PLAYER_HEAD_DROP,
                duration,
                Ease::InOutSine,
            ),
        );
    }

    fn release(&mut self, now: f32, ctx: &mut PlayerCtx<'_>) {
        self.change_state(PlayerState::Jumping);
        self.input_enabled = false;

        // Squash recovers quickly no matter how far it got
        self.tweens.start(
            PlayerPart::Body,
            Tween::new(self.pose.body_scale, Vec3::ONE, PLAYER_RECOVER_SECS, Ease::OutQuad),
        );
        self.tweens.start(
            PlayerPart::Head,
            Tween::new(self.pose.head_offset, Vec3::ZERO, PLAYER_RECOVER_SECS, Ease::OutQuad),
        );

        let charge = self
            .charge
            .take()
            .map(|c| c.duration(now, self.tuning.max_charge_secs))
            .unwrap_or(0.0);
        self.charge_effect = false;

        let from = ctx.body.position();
        let target = ctx.stage.next_stage_position();
        let impulse = self.jump_impulse(from, target, charge);
        ctx.body.apply_impulse(impulse);
        self.spin(impulse);

        ctx.events.push(GameEvent::ChargeReleased { charge });
        ctx.events.push(GameEvent::Jumped { impulse });
        ctx.audio.stop(CUE_ENERGY);
        self.last_jump_time = Some(now);
        log::debug!("Jump: charge {:.3}s, impulse {:?}", charge, impulse);
    }

    /// Full turn around the axis perpendicular to the dominant direction
    fn spin(&mut self, impulse: Vec3) {
        let direction = horizontal(impulse).normalize_or_zero();
        let turn = if (direction.x - 1.0).abs() < 0.3 {
            Vec3::new(0.0, 0.0, -360.0)
        } else {
            Vec3::new(360.0, 0.0, 0.0)
        };
        let from = self.pose.rotation;
        self.tweens
            .start(PlayerPart::Spin, Tween::new(from, from + turn, SPIN_SECS, Ease::Linear));
    }

    /// Physics contact callback
    pub fn on_contact(&mut self, contact: Contact, ctx: &mut PlayerCtx<'_>) {
        match contact {
            Contact::Began(Collider::Stage(id)) => self.handle_landing(id, ctx),
            Contact::Ended(Collider::Stage(_)) => self.grounded = false,
            Contact::Began(Collider::DeadZone) => self.die(ctx),
            Contact::Ended(Collider::DeadZone) => {}
        }
    }

    fn handle_landing(&mut self, platform: PlatformId, ctx: &mut PlayerCtx<'_>) {
        if self.dead {
            return;
        }
        ctx.body.sleep();
        self.input_enabled = true;
        self.grounded = true;

        if self.state == PlayerState::Jumping {
            self.change_state(PlayerState::Idle);
        }

        let position = ctx.body.position();
        let judgement = ctx
            .stage
            .on_player_landed(platform, position, ctx.session, ctx.audio);
        ctx.events.push(GameEvent::Landed {
            platform,
            reward: judgement.map(|j| j.reward),
            perfect: judgement.is_some_and(|j| j.perfect),
        });

        self.tweens.start(
            PlayerPart::Camera,
            Tween::new(
                self.pose.camera,
                position + CAMERA_OFFSET,
                CAMERA_FOLLOW_SECS,
                Ease::OutQuad,
            ),
        );
    }

    fn die(&mut self, ctx: &mut PlayerCtx<'_>) {
        if self.dead {
            return;
        }
        self.dead = true;
        self.input_enabled = false;
        self.charge_effect = false;
        ctx.audio.stop(CUE_ENERGY);
        ctx.audio.play(CUE_FALL);
        ctx.session.end_game();
        ctx.events.push(GameEvent::PlayerDied);
        log::info!("Player fell into the dead zone");
    }

    /// Advance cosmetic tweens
    pub fn advance_cosmetics(&mut self, dt: f32) {
        let pose = &mut self.pose;
        self.tweens.advance(dt, |part, value| match part {
            PlayerPart::Body => pose.body_scale = value,
            PlayerPart::Head => pose.head_offset = value,
            PlayerPart::Spin => pose.rotation = value,
            PlayerPart::Camera => pose.camera = value,
        });
    }

    /// Stop every player and camera animation
    pub fn kill_cosmetics(&mut self) {
        self.tweens.kill_all();
    }
}
