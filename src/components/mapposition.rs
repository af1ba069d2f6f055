use bevy_ecs::prelude::Component;
use glam::Vec2;

/// World-space position of an object's *center*.
///
/// Every box in the game uses a center origin: a collider of size `s` at
/// position `p` spans `p - s/2 .. p + s/2`. Collision deltas are measured
/// center to center. Y grows downward.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct MapPosition {
    pub pos: Vec2,
}

impl MapPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self { pos: Vec2::new(x, y) }
    }

    pub fn from_vec(pos: Vec2) -> Self {
        Self { pos }
    }

    /// Move by `delta` in world units.
    pub fn translate(&mut self, delta: Vec2) {
        self.pos += delta;
    }
}
