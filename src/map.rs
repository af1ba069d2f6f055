//! The map: owner of every body in a level.
//!
//! A [`Map`] stores its objects as entities in a private bevy_ecs [`World`]
//! and owns the groups that resolve them:
//!
//! - one [`CollisionGroup`] whose primary (the player) is pushed out of every
//!   solid object;
//! - any number of [`IntersectionGroup`]s for trigger volumes, resolved after
//!   the collision group in the order they were added.
//!
//! Each object has an onCollide [`EventSource`] kept beside the world, and
//! the map fires [`Map::object_added`] after an insertion and
//! [`Map::object_removing`] before a removal. Handlers of all these sources
//! run while the map is mutably borrowed, so they must not reach back into
//! the map; record what happened and act on it after the call returns.

use bevy_ecs::prelude::*;
use glam::Vec2;
use log::{debug, info};

use crate::components::boxcollider::BoxCollider;
use crate::components::label::Label;
use crate::components::mapposition::MapPosition;
use crate::components::objectkind::ObjectKind;
use crate::components::rigidbody::{DEFAULT_GRAVITY, RigidBody};
use crate::components::sprite::Sprite;
use crate::events::collision::CollisionEvent;
use crate::events::source::EventSource;
use crate::resources::assetstore::AssetStore;
use crate::resources::rendertarget::{DrawCommand, RenderTarget};
use crate::resources::worldtime::WorldTime;
use crate::systems::collision::{CollideSources, CollisionError, CollisionGroup, IntersectionGroup};
use crate::systems::movement::movement_system;
use crate::systems::time::update_world_time;

/// Handle to an interaction group owned by a [`Map`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(u32);

/// Physical parameters for an object that moves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodySpec {
    pub velocity: Vec2,
    pub gravity: Vec2,
}

/// Everything needed to add an object to a map.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSpec {
    pub kind: ObjectKind,
    /// Center position.
    pub position: Vec2,
    pub size: Vec2,
    /// Solid objects join the map's collision group.
    pub can_collide: bool,
    /// Texture id; `None` makes the object invisible.
    pub texture: Option<String>,
    pub tint: [u8; 4],
    /// Present for moving objects.
    pub body: Option<BodySpec>,
    pub label: Option<String>,
}

impl ObjectSpec {
    /// A static, non-solid object drawn with its kind's default texture.
    pub fn new(kind: ObjectKind, position: Vec2, size: Vec2) -> Self {
        Self {
            kind,
            position,
            size,
            can_collide: false,
            texture: Some(kind.texture_key().to_string()),
            tint: [255, 255, 255, 255],
            body: None,
            label: None,
        }
    }

    pub fn solid(mut self) -> Self {
        self.can_collide = true;
        self
    }

    pub fn with_texture(mut self, texture: Option<String>) -> Self {
        self.texture = texture;
        self
    }

    pub fn with_tint(mut self, tint: [u8; 4]) -> Self {
        self.tint = tint;
        self
    }

    /// Make the object a moving body under `gravity`.
    pub fn moving(mut self, gravity: Vec2) -> Self {
        let velocity = self.body.map_or(Vec2::ZERO, |body| body.velocity);
        self.body = Some(BodySpec { velocity, gravity });
        self
    }

    /// Set the initial velocity, making the object a moving body if it was not.
    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        let gravity = self
            .body
            .map_or(Vec2::new(0.0, DEFAULT_GRAVITY), |body| body.gravity);
        self.body = Some(BodySpec { velocity, gravity });
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// State of an object as reported by [`Map::object_added`] and
/// [`Map::object_removing`].
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSnapshot {
    pub entity: Entity,
    pub kind: ObjectKind,
    pub position: Vec2,
    pub size: Vec2,
    pub can_collide: bool,
}

/// Overlap counts from one [`Map::resolve`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    pub contacts: usize,
    pub triggers: usize,
}

pub struct Map {
    world: World,
    schedule: Schedule,
    objects: Vec<Entity>,
    drawables: Vec<Entity>,
    collision_group: CollisionGroup,
    interaction_groups: Vec<(GroupId, IntersectionGroup)>,
    next_group_id: u32,
    collide_sources: CollideSources,
    /// Fired after an object has been added.
    pub object_added: EventSource<ObjectSnapshot>,
    /// Fired before an object is removed, while it can still be inspected.
    pub object_removing: EventSource<ObjectSnapshot>,
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

impl Map {
    pub fn new() -> Self {
        let mut world = World::new();
        world.insert_resource(WorldTime::default());
        let mut schedule = Schedule::default();
        schedule.add_systems(movement_system);
        Self {
            world,
            schedule,
            objects: Vec::new(),
            drawables: Vec::new(),
            collision_group: CollisionGroup::new(),
            interaction_groups: Vec::new(),
            next_group_id: 0,
            collide_sources: CollideSources::default(),
            object_added: EventSource::new(),
            object_removing: EventSource::new(),
        }
    }

    /// Add an object and fire [`object_added`](Self::object_added).
    ///
    /// Solid objects are appended to the collision group; objects with a
    /// texture are registered as drawables.
    pub fn add_object(&mut self, spec: ObjectSpec) -> Entity {
        let mut entity = self.world.spawn((
            MapPosition::from_vec(spec.position),
            BoxCollider::new(spec.size.x, spec.size.y),
            spec.kind,
        ));
        if let Some(texture) = &spec.texture {
            entity.insert(Sprite::new(texture.clone()).with_tint(spec.tint));
        }
        if let Some(body) = spec.body {
            entity.insert(RigidBody::with_gravity(body.gravity).with_velocity(body.velocity));
        }
        if let Some(label) = &spec.label {
            entity.insert(Label(label.clone()));
        }
        let entity = entity.id();

        self.objects.push(entity);
        if spec.texture.is_some() {
            self.drawables.push(entity);
        }
        if spec.can_collide {
            self.collision_group.add(entity);
        }
        self.collide_sources.insert(entity, EventSource::new());
        debug!("Map: added {} {:?} at {:?}", spec.kind, entity, spec.position);

        if let Some(snapshot) = self.snapshot(entity) {
            self.object_added.fire(&snapshot);
        }
        entity
    }

    /// Remove an object. Returns false if it is not part of this map.
    ///
    /// [`object_removing`](Self::object_removing) fires first. The object
    /// then leaves every group and the drawable list, its onCollide source
    /// is dropped, and the entity is despawned.
    pub fn remove_object(&mut self, entity: Entity) -> bool {
        let Some(snapshot) = self.snapshot(entity) else {
            return false;
        };
        self.object_removing.fire(&snapshot);

        self.objects.retain(|e| *e != entity);
        self.drawables.retain(|e| *e != entity);
        self.collision_group.remove(entity);
        for (_, group) in &mut self.interaction_groups {
            group.remove(entity);
        }
        self.collide_sources.remove(&entity);
        self.world.despawn(entity);
        debug!("Map: removed {} {:?}", snapshot.kind, entity);
        true
    }

    /// Make `entity` the primary of the collision group.
    pub fn set_primary(&mut self, entity: Entity) {
        self.collision_group.set_primary(entity);
    }

    pub fn primary(&self) -> Option<Entity> {
        self.collision_group.primary()
    }

    /// Take ownership of an interaction group. Groups resolve in the order
    /// they were added.
    pub fn add_interaction_group(&mut self, group: IntersectionGroup) -> GroupId {
        let id = GroupId(self.next_group_id);
        self.next_group_id += 1;
        self.interaction_groups.push((id, group));
        id
    }

    /// Remove and return a group; dropping it destroys it.
    pub fn remove_interaction_group(&mut self, id: GroupId) -> Option<IntersectionGroup> {
        let index = self.interaction_groups.iter().position(|(gid, _)| *gid == id)?;
        Some(self.interaction_groups.remove(index).1)
    }

    pub fn interaction_group(&self, id: GroupId) -> Option<&IntersectionGroup> {
        self.interaction_groups
            .iter()
            .find(|(gid, _)| *gid == id)
            .map(|(_, group)| group)
    }

    pub fn interaction_group_mut(&mut self, id: GroupId) -> Option<&mut IntersectionGroup> {
        self.interaction_groups
            .iter_mut()
            .find(|(gid, _)| *gid == id)
            .map(|(_, group)| group)
    }

    pub fn interaction_group_count(&self) -> usize {
        self.interaction_groups.len()
    }

    pub fn collision_group(&self) -> &CollisionGroup {
        &self.collision_group
    }

    /// The onCollide source of `entity`.
    pub fn on_collide(&self, entity: Entity) -> Option<&EventSource<CollisionEvent>> {
        self.collide_sources.get(&entity)
    }

    /// Integrate every moving body over `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        update_world_time(&mut self.world, dt);
        self.schedule.run(&mut self.world);
    }

    /// Resolve the collision group, then every interaction group in order.
    pub fn resolve(&mut self) -> Result<ResolveStats, CollisionError> {
        let contacts = self.collision_group.resolve(&mut self.world, &self.collide_sources)?;
        let mut triggers = 0;
        for (_, group) in &self.interaction_groups {
            triggers += group.resolve(&self.world, &self.collide_sources)?;
        }
        Ok(ResolveStats { contacts, triggers })
    }

    /// Draw every registered drawable in registration order. Texture keys are
    /// resolved through `textures`; keys that are not loaded draw untextured.
    pub fn draw(&self, target: &mut dyn RenderTarget, textures: &AssetStore<Vec<u8>>) {
        for &entity in &self.drawables {
            let (Some(sprite), Some(position), Some(collider)) = (
                self.world.get::<Sprite>(entity),
                self.world.get::<MapPosition>(entity),
                self.world.get::<BoxCollider>(entity),
            ) else {
                continue;
            };
            let texture = match textures.get(&sprite.tex_key) {
                Ok(bytes) => Some(bytes.as_slice()),
                Err(err) => {
                    debug!("{}; drawing untextured", err);
                    None
                }
            };
            let (origin, _) = collider.aabb(position.pos);
            target.draw_rect(
                &DrawCommand {
                    tex_key: sprite.tex_key.clone(),
                    origin,
                    size: collider.size,
                    tint: sprite.tint,
                },
                texture,
            );
        }
    }

    /// The topmost (most recently added) object containing `point`.
    pub fn object_at(&self, point: Vec2) -> Option<Entity> {
        self.objects.iter().rev().copied().find(|&entity| {
            match (
                self.world.get::<MapPosition>(entity),
                self.world.get::<BoxCollider>(entity),
            ) {
                (Some(position), Some(collider)) => collider.contains_point(position.pos, point),
                _ => false,
            }
        })
    }

    /// Teleport an object. Returns false if it has no position.
    pub fn move_object(&mut self, entity: Entity, position: Vec2) -> bool {
        match self.world.get_mut::<MapPosition>(entity) {
            Some(mut current) => {
                current.pos = position;
                true
            }
            None => false,
        }
    }

    pub fn position(&self, entity: Entity) -> Option<Vec2> {
        self.world.get::<MapPosition>(entity).map(|p| p.pos)
    }

    pub fn kind(&self, entity: Entity) -> Option<ObjectKind> {
        self.world.get::<ObjectKind>(entity).copied()
    }

    pub fn body(&self, entity: Entity) -> Option<&RigidBody> {
        self.world.get::<RigidBody>(entity)
    }

    pub fn body_mut(&mut self, entity: Entity) -> Option<Mut<'_, RigidBody>> {
        self.world.get_mut::<RigidBody>(entity)
    }

    /// Freeze or release every moving body.
    pub fn set_frozen(&mut self, frozen: bool) {
        for &entity in &self.objects {
            if let Some(mut body) = self.world.get_mut::<RigidBody>(entity) {
                body.frozen = frozen;
            }
        }
        info!("Map: bodies {}", if frozen { "frozen" } else { "released" });
    }

    /// Current state of an object, or `None` if it is not part of this map.
    pub fn snapshot(&self, entity: Entity) -> Option<ObjectSnapshot> {
        if !self.objects.contains(&entity) {
            return None;
        }
        Some(ObjectSnapshot {
            entity,
            kind: self.kind(entity)?,
            position: self.position(entity)?,
            size: self.world.get::<BoxCollider>(entity)?.size,
            can_collide: self.collision_group.contains(entity),
        })
    }

    /// An [`ObjectSpec`] that would recreate `entity` at its current position.
    pub fn object_spec(&self, entity: Entity) -> Option<ObjectSpec> {
        let snapshot = self.snapshot(entity)?;
        let sprite = self.world.get::<Sprite>(entity);
        Some(ObjectSpec {
            kind: snapshot.kind,
            position: snapshot.position,
            size: snapshot.size,
            can_collide: snapshot.can_collide,
            texture: sprite.map(|s| s.tex_key.clone()),
            tint: sprite.map_or([255, 255, 255, 255], |s| s.tint),
            body: self.body(entity).map(|body| BodySpec {
                velocity: body.velocity,
                gravity: body.gravity,
            }),
            label: self.world.get::<Label>(entity).map(|l| l.0.clone()),
        })
    }

    /// Objects in insertion order.
    pub fn objects(&self) -> &[Entity] {
        &self.objects
    }

    /// Registered drawables in draw order.
    pub fn drawables(&self) -> &[Entity] {
        &self.drawables
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Simulated time so far.
    pub fn elapsed(&self) -> f32 {
        self.world.resource::<WorldTime>().elapsed
    }
}
