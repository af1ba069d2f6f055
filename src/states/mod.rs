//! Screens of the game, one per [`GameStates`](crate::resources::gamestate::GameStates) value.
//!
//! Every screen follows the same lifecycle, driven by
//! [`Game`](crate::game::Game):
//!
//! - `enter` connects to the [`InputEvents`] it needs and keeps the
//!   connections in a [`ConnectionSet`](crate::events::connections::ConnectionSet);
//! - `update` runs once per tick while the screen is current;
//! - dropping the screen (or `suspend` for the running screen) disconnects.
//!
//! Input callbacks never touch the game directly. They write to state the
//! screen shares with them, or request a transition through
//! [`NextGameState`], and the screen acts on it in `update`.
//!
//! Submodules overview:
//! - [`mainmenu`] – Play / Editor / Quit
//! - [`cutscene`] – level title card
//! - [`running`] – the platformer itself
//! - [`paused`] – suspends the running screen
//! - [`gameover`] – result screen
//! - [`editor`] – level editor

pub mod cutscene;
pub mod editor;
pub mod gameover;
pub mod mainmenu;
pub mod paused;
pub mod running;

use glam::Vec2;

use crate::components::objectkind::ObjectKind;
use crate::events::input::InputEvents;
use crate::level::LevelFile;
use crate::resources::assetstore::{AssetError, AssetStore};
use crate::resources::gameconfig::GameConfig;
use crate::resources::gamestate::NextGameState;

/// Progress of the current play-through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub score: u32,
    pub lives: u32,
    pub deaths: u32,
    pub won: bool,
}

impl Session {
    pub fn new(lives: u32) -> Self {
        Self {
            lives,
            ..Self::default()
        }
    }

    pub fn reset(&mut self, lives: u32) {
        *self = Self::new(lives);
    }
}

/// Everything a screen may use while entering or updating.
pub struct ScreenContext<'a> {
    pub events: &'a InputEvents,
    pub config: &'a GameConfig,
    pub next: &'a NextGameState,
    pub session: &'a mut Session,
    /// The level played and edited. The editor replaces it on save.
    pub level: &'a mut LevelFile,
    pub textures: &'a mut AssetStore<Vec<u8>>,
}

/// Load the texture of every object in `level`, plus the default textures of
/// `kinds`, skipping keys that are already loaded. Texture `key` is read from
/// `<key>.png` under the store's root.
pub(crate) fn preload_textures(
    level: &LevelFile,
    kinds: &[ObjectKind],
    textures: &mut AssetStore<Vec<u8>>,
) -> Result<(), AssetError> {
    let mut keys: Vec<String> = std::iter::once(&level.player)
        .chain(&level.objects)
        .map(|desc| desc.texture.clone().unwrap_or_else(|| desc.kind.texture_key().to_string()))
        .chain(kinds.iter().map(|kind| kind.texture_key().to_string()))
        .collect();
    keys.sort();
    keys.dedup();
    for key in keys {
        if !textures.contains(&key) {
            textures.load(&key, format!("{key}.png"))?;
        }
    }
    Ok(())
}

/// Where menus are drawn.
pub(crate) const MENU_ORIGIN: Vec2 = Vec2::new(640.0, 300.0);
pub(crate) const MENU_ITEM_SIZE: Vec2 = Vec2::new(240.0, 40.0);
pub(crate) const MENU_SPACING: f32 = 56.0;
