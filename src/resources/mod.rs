//! Long-lived data shared by the game and its screens.
//!
//! Overview
//! - `assetstore` – assets loaded from disk, keyed by string IDs
//! - `gameconfig` – INI-backed settings (window, physics, paths)
//! - `gamestate` – authoritative and pending high-level game state
//! - `input` – per-frame state of the logical input actions
//! - `rendertarget` – drawing backend abstraction
//! - `worldtime` – simulation time and delta of a map
pub mod assetstore;
pub mod gameconfig;
pub mod gamestate;
pub mod input;
pub mod rendertarget;
pub mod worldtime;
