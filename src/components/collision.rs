//! Pairwise AABB overlap measurement.
//!
//! A [`Collision`] is computed fresh for every pair query and never stored.
//! Both vectors are measured from the point of view of the object that asked:
//!
//! - `delta` is `other.position - this.position` (center to center);
//! - `intersect` is `|delta| - (half_this + half_other)` per axis, so it is
//!   negative on an axis exactly when the boxes overlap on that axis, and its
//!   magnitude is the penetration depth.

use glam::Vec2;

use crate::components::boxcollider::BoxCollider;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub delta: Vec2,
    pub intersect: Vec2,
}

impl Collision {
    pub fn new(delta: Vec2, intersect: Vec2) -> Self {
        Self { delta, intersect }
    }

    /// Measure the overlap of `other` as seen from `this`.
    pub fn between(
        this_position: Vec2,
        this_collider: &BoxCollider,
        other_position: Vec2,
        other_collider: &BoxCollider,
    ) -> Self {
        let delta = other_position - this_position;
        let intersect = delta.abs() - (this_collider.half_size() + other_collider.half_size());
        Self { delta, intersect }
    }

    /// True when the boxes overlap on both axes.
    pub fn check(&self) -> bool {
        self.intersect.x < 0.0 && self.intersect.y < 0.0
    }

    /// Alias of [`check`](Self::check).
    pub fn intersects(&self) -> bool {
        self.check()
    }
}
