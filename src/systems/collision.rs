//! Collision resolution.
//!
//! Two layers live here:
//!
//! - [`resolve_collision`] pushes one moving box out of one other box and
//!   adjusts its velocity. It tells landings, wall bumps and ceiling bumps
//!   apart with fixed thresholds on the overlap instead of a swept test.
//! - [`CollisionGroup`] and [`IntersectionGroup`] batch a primary object
//!   against an ordered list of members stored in a [`World`]. Solid groups
//!   notify and correct; intersection groups only notify.
//!
//! Members are tested in insertion order, every member every tick, with no
//! early exit and no spatial partitioning.

use bevy_ecs::prelude::{Entity, World};
use glam::Vec2;
use log::{debug, warn};
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::components::boxcollider::BoxCollider;
use crate::components::collision::Collision;
use crate::components::mapposition::MapPosition;
use crate::components::objectkind::ObjectKind;
use crate::components::rigidbody::{ContactState, RigidBody};
use crate::events::collision::CollisionEvent;
use crate::events::source::EventSource;

/// Lower bound of the "standing on support" window for `delta.y`.
pub const SUPPORT_DELTA_MIN: f32 = 30.0;
/// Upper bound of the "standing on support" window for `delta.y`.
///
/// Together with [`SUPPORT_DELTA_MIN`] this window is empty, so the support
/// test only ever passes through its zero-vertical-velocity alternative.
pub const SUPPORT_DELTA_MAX: f32 = -20.0;
/// `intersect.x - intersect.y` above this counts as a side hit while supported.
pub const SIDE_MARGIN: f32 = -10.0;
/// `intersect.x - intersect.y` above this counts as a side hit in the air.
pub const TOP_MARGIN: f32 = 10.0;
/// After a side contact, vertical correction is skipped at or above this
/// vertical speed.
pub const LATCH_FALL_SPEED: f32 = 40.0;

/// Per-object onCollide sources, keyed by entity.
pub type CollideSources = FxHashMap<Entity, EventSource<CollisionEvent>>;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CollisionError {
    /// A group was resolved before its primary was set.
    #[error("collision group resolved without a primary object")]
    PrimaryUnset,
    /// The primary lacks a position or a collider.
    #[error("primary entity {0:?} has no position or collider")]
    MissingComponents(Entity),
}

/// The mutable physical state [`resolve_collision`] works on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub contact: ContactState,
}

impl BodyState {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            contact: ContactState::Airborne,
        }
    }

    /// Read from the world. Objects without a [`RigidBody`] read as static.
    fn read(world: &World, entity: Entity) -> Option<Self> {
        let position = world.get::<MapPosition>(entity)?.pos;
        let (velocity, contact) = world
            .get::<RigidBody>(entity)
            .map_or((Vec2::ZERO, ContactState::Airborne), |body| (body.velocity, body.contact));
        Some(Self {
            position,
            velocity,
            contact,
        })
    }

    fn write(&self, world: &mut World, entity: Entity) {
        if let Some(mut position) = world.get_mut::<MapPosition>(entity) {
            position.pos = self.position;
        }
        if let Some(mut body) = world.get_mut::<RigidBody>(entity) {
            body.velocity = self.velocity;
            body.contact = self.contact;
        }
    }
}

/// Which branch of [`resolve_collision`] handled a collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Pushed out along X while supported; horizontal velocity zeroed.
    Side,
    /// Pushed out along X from the air; only rightward velocity zeroed.
    Corner,
    /// A side contact was consumed and the body was falling too fast to
    /// correct vertically.
    Skipped,
    /// Pushed up onto the other box.
    Landed,
    /// Pushed down from under the other box.
    Ceiling,
}

fn axis_sign(delta: f32) -> f32 {
    if delta > 0.0 { 1.0 } else { -1.0 }
}

#[allow(clippy::impossible_comparisons)]
fn in_support_window(delta_y: f32) -> bool {
    delta_y > SUPPORT_DELTA_MIN && delta_y < SUPPORT_DELTA_MAX
}

/// Push `body` out of the box described by `collision` and adjust its velocity.
///
/// The branch order and thresholds are fixed:
///
/// 1. supported (`delta.y` in the support window, or no vertical velocity)
///    and `intersect.x - intersect.y > -10`: correct along X, zero X velocity;
/// 2. `intersect.x - intersect.y > 10`: correct along X, zero X velocity only
///    when moving right;
/// 3. a pending side contact is consumed; at `velocity.y >= 40` nothing else
///    happens;
/// 4. otherwise correct along Y, landing when the other box is below.
///
/// Corrections move by the penetration depth away from the other box.
/// The caller is responsible for firing onCollide first.
pub fn resolve_collision(body: &mut BodyState, collision: &Collision) -> Resolution {
    let delta = collision.delta;
    let intersect = collision.intersect;
    let spread = intersect.x - intersect.y;

    let supported = in_support_window(delta.y) || body.velocity.y == 0.0;
    if supported && spread > SIDE_MARGIN {
        body.position.x += intersect.x * axis_sign(delta.x);
        if body.velocity.x != 0.0 {
            body.velocity.x = 0.0;
        }
        body.contact = ContactState::SideContact;
        return Resolution::Side;
    }

    if spread > TOP_MARGIN {
        body.position.x += intersect.x * axis_sign(delta.x);
        if body.velocity.x > 0.0 {
            body.velocity.x = 0.0;
        }
        body.contact = ContactState::SideContact;
        return Resolution::Corner;
    }

    if body.contact == ContactState::SideContact {
        body.contact = ContactState::Airborne;
        if body.velocity.y >= LATCH_FALL_SPEED {
            return Resolution::Skipped;
        }
    }

    let outcome;
    let correction;
    if delta.y > 0.0 {
        correction = intersect.y;
        body.contact = ContactState::Grounded;
        outcome = Resolution::Landed;
    } else {
        correction = -intersect.y;
        body.velocity.y = 0.0;
        body.contact = ContactState::Airborne;
        outcome = Resolution::Ceiling;
    }
    if body.velocity.y > 0.0 {
        body.velocity.y = 0.0;
    }
    body.position.y += correction;
    outcome
}

fn read_shape(world: &World, entity: Entity) -> Option<(Vec2, BoxCollider)> {
    let position = world.get::<MapPosition>(entity)?.pos;
    let collider = *world.get::<BoxCollider>(entity)?;
    Some((position, collider))
}

fn kind_of(world: &World, entity: Entity) -> ObjectKind {
    world.get::<ObjectKind>(entity).copied().unwrap_or(ObjectKind::Decoration)
}

/// Ordered members plus one primary, shared by both group kinds.
#[derive(Debug, Clone, Default)]
struct Membership {
    primary: Option<Entity>,
    members: Vec<Entity>,
}

impl Membership {
    fn add(&mut self, entity: Entity) -> bool {
        if self.members.contains(&entity) {
            return false;
        }
        self.members.push(entity);
        true
    }

    fn remove(&mut self, entity: Entity) -> bool {
        let before = self.members.len();
        self.members.retain(|member| *member != entity);
        if self.primary == Some(entity) {
            self.primary = None;
        }
        before != self.members.len()
    }

    fn primary_shape(&self, world: &World) -> Result<(Entity, Vec2, BoxCollider), CollisionError> {
        let primary = self.primary.ok_or(CollisionError::PrimaryUnset)?;
        let (position, collider) =
            read_shape(world, primary).ok_or(CollisionError::MissingComponents(primary))?;
        Ok((primary, position, collider))
    }
}

macro_rules! group_membership_api {
    ($group:ident) => {
        impl $group {
            pub fn new() -> Self {
                Self::default()
            }

            pub fn with_primary(mut self, primary: Entity) -> Self {
                self.membership.primary = Some(primary);
                self
            }

            pub fn set_primary(&mut self, primary: Entity) {
                self.membership.primary = Some(primary);
            }

            pub fn clear_primary(&mut self) {
                self.membership.primary = None;
            }

            pub fn primary(&self) -> Option<Entity> {
                self.membership.primary
            }

            /// Append a member. Returns false if it was already a member.
            pub fn add(&mut self, entity: Entity) -> bool {
                self.membership.add(entity)
            }

            /// Remove a member; also unsets the primary if it is `entity`.
            pub fn remove(&mut self, entity: Entity) -> bool {
                self.membership.remove(entity)
            }

            pub fn contains(&self, entity: Entity) -> bool {
                self.membership.members.contains(&entity)
            }

            /// Members in resolution order.
            pub fn members(&self) -> &[Entity] {
                &self.membership.members
            }

            pub fn len(&self) -> usize {
                self.membership.members.len()
            }

            pub fn is_empty(&self) -> bool {
                self.membership.members.is_empty()
            }
        }
    };
}

/// Solid many-vs-one resolution: the primary is pushed out of every
/// overlapping member.
#[derive(Debug, Clone, Default)]
pub struct CollisionGroup {
    membership: Membership,
}

group_membership_api!(CollisionGroup);

impl CollisionGroup {
    /// Resolve the primary against every member in insertion order.
    ///
    /// For each overlapping member the primary's onCollide source fires first,
    /// then the primary is corrected. The primary is re-read before every
    /// test, so earlier corrections affect later overlaps. Returns the number
    /// of members that overlapped.
    pub fn resolve(&self, world: &mut World, sources: &CollideSources) -> Result<usize, CollisionError> {
        let (primary, _, _) = self.membership.primary_shape(world)?;
        let mut hits = 0;
        for &member in &self.membership.members {
            if member == primary {
                continue;
            }
            let Some((other_position, other_collider)) = read_shape(world, member) else {
                warn!("CollisionGroup: member {:?} has no position or collider, skipping", member);
                continue;
            };
            let (_, position, collider) = self.membership.primary_shape(world)?;
            let collision = Collision::between(position, &collider, other_position, &other_collider);
            if !collision.check() {
                continue;
            }
            hits += 1;

            if let Some(source) = sources.get(&primary) {
                source.fire(&CollisionEvent {
                    primary,
                    other: member,
                    other_kind: kind_of(world, member),
                    collision,
                    solid: true,
                });
            }

            let Some(mut state) = BodyState::read(world, primary) else {
                return Err(CollisionError::MissingComponents(primary));
            };
            let outcome = resolve_collision(&mut state, &collision);
            debug!(
                "CollisionGroup: {:?} vs {:?} -> {:?} (intersect {:?})",
                primary, member, outcome, collision.intersect
            );
            state.write(world, primary);
        }
        Ok(hits)
    }
}

/// Trigger many-vs-one test: overlapping members only notify the primary.
#[derive(Debug, Clone, Default)]
pub struct IntersectionGroup {
    membership: Membership,
}

group_membership_api!(IntersectionGroup);

impl IntersectionGroup {
    /// Fire the primary's onCollide source for every overlapping member, in
    /// insertion order. Never moves anything. Returns the number of overlaps.
    pub fn resolve(&self, world: &World, sources: &CollideSources) -> Result<usize, CollisionError> {
        let (primary, position, collider) = self.membership.primary_shape(world)?;
        let mut hits = 0;
        for &member in &self.membership.members {
            if member == primary {
                continue;
            }
            let Some((other_position, other_collider)) = read_shape(world, member) else {
                warn!("IntersectionGroup: member {:?} has no position or collider, skipping", member);
                continue;
            };
            let collision = Collision::between(position, &collider, other_position, &other_collider);
            if !collision.check() {
                continue;
            }
            hits += 1;
            if let Some(source) = sources.get(&primary) {
                source.fire(&CollisionEvent {
                    primary,
                    other: member,
                    other_kind: kind_of(world, member),
                    collision,
                    solid: false,
                });
            }
        }
        Ok(hits)
    }
}
