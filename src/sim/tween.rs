//! Cosmetic interpolation
//!
//! Tweens are owned by whoever owns the thing being animated. Each one is
//! keyed by a `TweenHandle`; killing a handle removes the tween before it can
//! write another value, so an abandoned tween never touches its target again.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Values that can be interpolated
pub trait Lerp: Copy {
    fn lerp_to(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp_to(self, to: Self, t: f32) -> Self {
        self.lerp(to, t)
    }
}

/// Easing curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ease {
    #[default]
    Linear,
    InOutSine,
    OutQuad,
}

impl Ease {
    /// Map linear progress (0-1) onto the curve
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::InOutSine => -((std::f32::consts::PI * t).cos() - 1.0) / 2.0,
            Ease::OutQuad => 1.0 - (1.0 - t) * (1.0 - t),
        }
    }
}

/// Cancellation handle for a running tween
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TweenHandle(u32);

/// A single interpolation from one value to another
#[derive(Debug, Clone)]
pub struct Tween<T: Lerp> {
    pub from: T,
    pub to: T,
    pub duration: f32,
    pub elapsed: f32,
    pub ease: Ease,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, duration: f32, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
            ease,
        }
    }

    /// Current value
    pub fn sample(&self) -> T {
        if self.elapsed >= self.duration {
            return self.to;
        }
        let t = self.ease.apply(self.elapsed / self.duration);
        self.from.lerp_to(self.to, t)
    }

    /// Advance by dt and return the new value
    pub fn advance(&mut self, dt: f32) -> T {
        self.elapsed = (self.elapsed + dt).min(self.duration.max(0.0));
        self.sample()
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

/// A set of running tweens, each aimed at a target key
#[derive(Debug, Clone)]
pub struct Tweens<K, T: Lerp> {
    next_handle: u32,
    active: Vec<(TweenHandle, K, Tween<T>)>,
}

impl<K, T: Lerp> Default for Tweens<K, T> {
    fn default() -> Self {
        Self {
            next_handle: 1,
            active: Vec::new(),
        }
    }
}

impl<K: Copy + PartialEq, T: Lerp> Tweens<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween on a target
    ///
    /// Any tween already running on the same target is killed first so two
    /// tweens never fight over one value.
    pub fn start(&mut self, target: K, tween: Tween<T>) -> TweenHandle {
        self.kill_target(target);
        let handle = TweenHandle(self.next_handle);
        self.next_handle += 1;
        self.active.push((handle, target, tween));
        handle
    }

    /// Kill a tween by handle (no-op if already finished or killed)
    pub fn kill(&mut self, handle: TweenHandle) {
        self.active.retain(|(h, _, _)| *h != handle);
    }

    /// Kill every tween aimed at a target
    pub fn kill_target(&mut self, target: K) {
        self.active.retain(|(_, k, _)| *k != target);
    }

    /// Kill everything
    pub fn kill_all(&mut self) {
        self.active.clear();
    }

    pub fn is_active(&self, handle: TweenHandle) -> bool {
        self.active.iter().any(|(h, _, _)| *h == handle)
    }

    pub fn is_animating(&self, target: K) -> bool {
        self.active.iter().any(|(_, k, _)| *k == target)
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Advance every tween and hand each new value to `apply`
    ///
    /// Finished tweens write their final value once and are dropped.
    pub fn advance(&mut self, dt: f32, mut apply: impl FnMut(K, T)) {
        for (_, target, tween) in self.active.iter_mut() {
            apply(*target, tween.advance(dt));
        }
        self.active.retain(|(_, _, tween)| !tween.is_finished());
    }
}
