use bevy_ecs::prelude::Component;
use glam::Vec2;

/// Axis-aligned box centered on the entity's [`MapPosition`].
///
/// [`MapPosition`]: crate::components::mapposition::MapPosition
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct BoxCollider {
    pub size: Vec2,
}

impl BoxCollider {
    /// Create a collider with the given size. Negative extents are clamped to zero.
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            size: Vec2::new(width.max(0.0), height.max(0.0)),
        }
    }

    pub fn half_size(&self) -> Vec2 {
        self.size * 0.5
    }

    /// Returns (min, max) corners of the box for a given center position.
    pub fn aabb(&self, position: Vec2) -> (Vec2, Vec2) {
        let half = self.half_size();
        (position - half, position + half)
    }

    /// Returns (x, y, width, height) with (x, y) the top-left corner.
    pub fn bounds(&self, position: Vec2) -> (f32, f32, f32, f32) {
        let (min, _) = self.aabb(position);
        (min.x, min.y, self.size.x, self.size.y)
    }

    /// Strict AABB overlap test; touching edges do not overlap.
    pub fn overlaps(&self, position: Vec2, other: &Self, other_position: Vec2) -> bool {
        let (min_a, max_a) = self.aabb(position);
        let (min_b, max_b) = other.aabb(other_position);
        min_a.x < max_b.x && max_a.x > min_b.x && min_a.y < max_b.y && max_a.y > min_b.y
    }

    /// Point containment in world space, edges inclusive.
    pub fn contains_point(&self, position: Vec2, point: Vec2) -> bool {
        let (min, max) = self.aabb(position);
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aabb_is_centered_on_position() {
        let c = BoxCollider::new(10.0, 4.0);
        let (min, max) = c.aabb(Vec2::new(5.0, 5.0));
        assert_eq!(min, Vec2::new(0.0, 3.0));
        assert_eq!(max, Vec2::new(10.0, 7.0));
        assert_eq!(c.bounds(Vec2::new(5.0, 5.0)), (0.0, 3.0, 10.0, 4.0));
    }

    #[test]
    fn negative_size_is_clamped() {
        let c = BoxCollider::new(-3.0, 2.0);
        assert_eq!(c.size, Vec2::new(0.0, 2.0));
    }

    #[test]
    fn touching_boxes_do_not_overlap() {
        let a = BoxCollider::new(10.0, 10.0);
        assert!(!a.overlaps(Vec2::ZERO, &a, Vec2::new(10.0, 0.0)));
        assert!(a.overlaps(Vec2::ZERO, &a, Vec2::new(9.9, 0.0)));
    }

    #[test]
    fn contains_point_includes_edges() {
        let c = BoxCollider::new(2.0, 2.0);
        assert!(c.contains_point(Vec2::ZERO, Vec2::new(1.0, -1.0)));
        assert!(!c.contains_point(Vec2::ZERO, Vec2::new(1.1, 0.0)));
    }
}
