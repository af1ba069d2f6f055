//! Collision notification payload.
//!
//! Every collidable object in a [`Map`](crate::map::Map) owns an onCollide
//! [`EventSource`](crate::events::source::EventSource) carrying a
//! [`CollisionEvent`]. Solid groups fire it before positional correction;
//! trigger groups fire it instead of any correction.
//!
//! The payload carries the kind of the other object so subscribers can react
//! (death, power-up pickup) without reading the map, which is mutably
//! borrowed while groups resolve.

use bevy_ecs::prelude::Entity;

use crate::components::collision::Collision;
use crate::components::objectkind::ObjectKind;

/// Fired on the primary's onCollide source for each overlapping member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// The object whose onCollide source is firing.
    pub primary: Entity,
    /// The member it overlaps.
    pub other: Entity,
    /// Kind of `other`.
    pub other_kind: ObjectKind,
    /// The overlap that produced this event, measured before correction.
    pub collision: Collision,
    /// False for trigger-only groups.
    pub solid: bool,
}
