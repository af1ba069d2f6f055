//! Game systems.
//!
//! Submodules overview
//! - [`collision`] – collision heuristic, collision and intersection groups
//! - [`gamestate`] – apply pending state transitions
//! - [`input`] – apply raw platform input to [`crate::resources::input::InputState`] and fire input events
//! - [`menu`] – drive a menu from input events
//! - [`movement`] – integrate positions from rigid body velocities and time
//! - [`time`] – update simulation time and delta

pub mod collision;
pub mod gamestate;
pub mod input;
pub mod menu;
pub mod movement;
pub mod time;
