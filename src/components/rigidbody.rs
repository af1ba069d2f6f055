//! Kinematic body component for objects that move.
//!
//! The [`RigidBody`] component stores velocity, a per-body gravity and the
//! body's [`ContactState`]. Objects without a `RigidBody` are static: they
//! never move and are only ever collided against.
//!
//! The `frozen` flag disables integration for the body, which the editor
//! uses so objects stay where they are placed.

use bevy_ecs::prelude::Component;
use glam::Vec2;

/// Downward acceleration applied to bodies that do not override it, in world
/// units per second squared (Y grows downward).
pub const DEFAULT_GRAVITY: f32 = 980.0;

/// What the body touched during the last collision resolution.
///
/// Transitions (see [`resolve_collision`](crate::systems::collision::resolve_collision)):
/// - a side or top-corner hit moves to `SideContact`, which is sticky;
/// - the next vertical resolution consumes `SideContact` back to `Airborne`
///   before deciding whether to correct;
/// - a vertical correction against something below moves to `Grounded`,
///   against something above to `Airborne`;
/// - integration turns `Grounded` into `Airborne` at the start of every step,
///   so a body is only grounded while it keeps landing. `SideContact` survives
///   integration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContactState {
    #[default]
    Airborne,
    Grounded,
    SideContact,
}

/// Kinematic body storing velocity and gravity.
#[derive(Component, Clone, Debug)]
pub struct RigidBody {
    /// Current velocity in world units per second.
    pub velocity: Vec2,
    /// Per-body gravity, applied every step while not frozen.
    pub gravity: Vec2,
    pub contact: ContactState,
    /// When true, the movement system skips this body.
    pub frozen: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self::new()
    }
}

impl RigidBody {
    /// Create a body at rest under the default gravity.
    pub fn new() -> Self {
        Self::with_gravity(Vec2::new(0.0, DEFAULT_GRAVITY))
    }

    pub fn with_gravity(gravity: Vec2) -> Self {
        Self {
            velocity: Vec2::ZERO,
            gravity,
            contact: ContactState::Airborne,
            frozen: false,
        }
    }

    /// Builder for the initial velocity.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Accumulate an instantaneous change of velocity.
    pub fn apply_force(&mut self, force: Vec2) {
        self.velocity += force;
    }

    /// Advance velocity by one step of `dt` seconds and return the displacement.
    pub fn integrate(&mut self, dt: f32) -> Vec2 {
        if self.contact == ContactState::Grounded {
            self.contact = ContactState::Airborne;
        }
        self.velocity += self.gravity * dt;
        self.velocity * dt
    }

    pub fn is_grounded(&self) -> bool {
        self.contact == ContactState::Grounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-5;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn new_body_uses_default_gravity() {
        let rb = RigidBody::new();
        assert_eq!(rb.velocity, Vec2::ZERO);
        assert!(approx_eq(rb.gravity.y, DEFAULT_GRAVITY));
        assert_eq!(rb.contact, ContactState::Airborne);
        assert!(!rb.frozen);
    }

    #[test]
    fn apply_force_accumulates_velocity() {
        let mut rb = RigidBody::with_gravity(Vec2::ZERO);
        rb.apply_force(Vec2::new(3.0, -2.0));
        rb.apply_force(Vec2::new(1.0, 1.0));
        assert_eq!(rb.velocity, Vec2::new(4.0, -1.0));
    }

    #[test]
    fn integrate_returns_displacement_and_updates_velocity() {
        let mut rb = RigidBody::with_gravity(Vec2::new(0.0, 10.0)).with_velocity(Vec2::new(2.0, 0.0));
        let moved = rb.integrate(0.5);
        assert!(approx_eq(rb.velocity.y, 5.0));
        assert!(approx_eq(moved.x, 1.0));
        assert!(approx_eq(moved.y, 2.5));
    }

    #[test]
    fn integrate_drops_grounded_but_keeps_side_contact() {
        let mut rb = RigidBody::new();
        rb.contact = ContactState::Grounded;
        rb.integrate(0.01);
        assert_eq!(rb.contact, ContactState::Airborne);

        rb.contact = ContactState::SideContact;
        rb.integrate(0.01);
        assert_eq!(rb.contact, ContactState::SideContact);
    }
}
