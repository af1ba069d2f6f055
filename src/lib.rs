//! Ledgehop library.
//!
//! This module exposes the game's signal core, map objects, collision
//! resolution, level format and screens for use in integration tests and by
//! the `ledgehop` binary.

pub mod components;
pub mod events;
pub mod game;
pub mod level;
pub mod map;
pub mod resources;
pub mod states;
pub mod systems;
