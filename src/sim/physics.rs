//! Rigid-body physics for the player
//!
//! The state machine only talks to the `PhysicsBody` trait, so tests can swap
//! in a fake. `PhysicsWorld` is the built-in integrator: gravity, resting and
//! landing contacts on platform tops, and a dead-zone floor.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::{Platform, PlatformId};

/// Angular velocity decay rate (1/s)
const ANGULAR_DAMPING: f32 = 5.0;
/// Spin picked up per unit of landing offset from the platform center (rad/s)
const IMPACT_SPIN: f32 = 2.5;
/// How far below a platform top a resting body may sink before it counts as
/// having left the surface
const CONTACT_SLOP: f32 = 0.01;

/// Capabilities the player needs from its physics body
pub trait PhysicsBody {
    fn position(&self) -> Vec3;
    fn velocity(&self) -> Vec3;
    fn angular_velocity(&self) -> Vec3;
    fn is_sleeping(&self) -> bool;
    /// Stop simulating and zero linear motion
    ///
    /// Residual spin is kept and decays once the body is awake again.
    fn sleep(&mut self);
    fn wake_up(&mut self);
    /// Instant change in momentum (wakes the body)
    fn apply_impulse(&mut self, impulse: Vec3);
}

/// A simulated rigid body (point mass with a spin rate)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RigidBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub angular_velocity: Vec3,
    pub mass: f32,
    pub sleeping: bool,
}

impl RigidBody {
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            mass: 1.0,
            sleeping: false,
        }
    }
}

impl PhysicsBody for RigidBody {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    fn sleep(&mut self) {
        self.sleeping = true;
        self.velocity = Vec3::ZERO;
    }

    fn wake_up(&mut self) {
        self.sleeping = false;
    }

    fn apply_impulse(&mut self, impulse: Vec3) {
        self.sleeping = false;
        self.velocity += impulse / self.mass;
    }
}

/// What the body can touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Collider {
    Stage(PlatformId),
    DeadZone,
}

/// Contact transitions reported by a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    Began(Collider),
    Ended(Collider),
}

/// Fixed-step integrator and contact tracker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsWorld {
    pub gravity: f32,
    pub dead_zone_y: f32,
    touching: Option<Collider>,
}

impl PhysicsWorld {
    pub fn new(gravity: f32, dead_zone_y: f32) -> Self {
        Self {
            gravity,
            dead_zone_y,
            touching: None,
        }
    }

    /// Start with the body already resting on a platform
    pub fn resting_on(mut self, platform: PlatformId) -> Self {
        self.touching = Some(Collider::Stage(platform));
        self
    }

    /// Collider currently in contact with the body
    pub fn touching(&self) -> Option<Collider> {
        self.touching
    }

    /// Advance the body by one fixed step and report contact changes
    ///
    /// Semi-implicit Euler: velocity first, then position. A body lands when
    /// it crosses a platform top moving downward while over its footprint.
    pub fn step(&mut self, body: &mut RigidBody, platforms: &[Platform], dt: f32) -> Vec<Contact> {
        let mut contacts = Vec::new();
        if body.sleeping {
            return contacts;
        }

        let prev = body.position;
        body.velocity.y += self.gravity * dt;
        body.position += body.velocity * dt;
        body.angular_velocity *= (1.0 - ANGULAR_DAMPING * dt).max(0.0);

        // Resting contact: hold the body on the surface, or report separation
        if let Some(Collider::Stage(id)) = self.touching {
            let support = platforms.iter().find(|p| p.id == id);
            match support {
                Some(p)
                    if p.contains_xz(body.position)
                        && body.velocity.y <= 0.0
                        && body.position.y <= p.top() + CONTACT_SLOP =>
                {
                    body.position.y = p.top();
                    body.velocity = Vec3::ZERO;
                    return contacts;
                }
                _ => {
                    self.touching = None;
                    contacts.push(Contact::Ended(Collider::Stage(id)));
                }
            }
        }

        if self.touching.is_none() && body.velocity.y < 0.0 {
            let landed = platforms.iter().find(|p| {
                let top = p.top();
                prev.y >= top - CONTACT_SLOP && body.position.y <= top && p.contains_xz(body.position)
            });
            if let Some(p) = landed {
                body.position.y = p.top();
                body.velocity.y = 0.0;
                // Off-center landings wobble, tipping toward the near edge
                let offset = crate::horizontal(body.position - p.position);
                body.angular_velocity += Vec3::Y.cross(offset) * IMPACT_SPIN;
                self.touching = Some(Collider::Stage(p.id));
                contacts.push(Contact::Began(Collider::Stage(p.id)));
                return contacts;
            }
        }

        if body.position.y <= self.dead_zone_y {
            body.position.y = self.dead_zone_y;
            body.velocity = Vec3::ZERO;
            if self.touching != Some(Collider::DeadZone) {
                self.touching = Some(Collider::DeadZone);
                contacts.push(Contact::Began(Collider::DeadZone));
            }
        }

        contacts
    }
}
