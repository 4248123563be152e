//! Deterministic simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Collaborators passed per call, no globals
//! - No rendering or platform dependencies

pub mod physics;
pub mod player;
pub mod score;
pub mod session;
pub mod spawner;
pub mod stage;
pub mod state;
pub mod tick;
pub mod tween;

pub use physics::{Collider, Contact, PhysicsBody, PhysicsWorld, RigidBody};
pub use player::{Player, PlayerCtx, PlayerPose};
pub use score::{Judgement, ScoreJudge};
pub use session::{GameSession, ReloadTask, ScoreState, SessionEvent, SessionState, Subscription};
pub use spawner::StageSpawner;
pub use stage::StageManager;
pub use state::{
    ChargeSession, Game, GameEvent, Platform, PlatformId, PlayerState, Pose, World,
};
pub use tick::{TickInput, autopilot_pointer, next_seed, tick};
pub use tween::{Ease, Lerp, Tween, TweenHandle, Tweens};
