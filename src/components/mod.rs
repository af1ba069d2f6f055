//! Components and widget state.
//!
//! ECS components are attached to map objects stored in the map's
//! [`World`](bevy_ecs::world::World). Each one covers one capability, and an
//! object is whatever set of capabilities it carries: a platform has a
//! position, a collider, a kind and a sprite; the player also carries a
//! rigid body.
//!
//! Submodules overview:
//! - [`boxcollider`] – center-origin axis-aligned box
//! - [`collision`] – per-pair overlap measurement (`delta`, `intersect`)
//! - [`label`] – author-given object name
//! - [`mapposition`] – world-space center position
//! - [`menu`] – menu/button widget state (not an ECS component)
//! - [`objectkind`] – gameplay role tag (platform, power-up, ...)
//! - [`rigidbody`] – velocity, gravity and contact state
//! - [`sprite`] – drawable capability

pub mod boxcollider;
pub mod collision;
pub mod label;
pub mod mapposition;
pub mod menu;
pub mod objectkind;
pub mod rigidbody;
pub mod sprite;
