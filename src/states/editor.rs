//! Level editor screen.
//!
//! The editor works on a frozen [`Map`] built from the current level:
//!
//! - SecondaryLeft/SecondaryRight cycle the palette of object kinds;
//! - a left click on empty space places the selected kind, snapped to the grid;
//! - a left drag on an object moves it, snapped to the grid;
//! - a right click removes the object under the cursor (never the player);
//! - Action2 saves the level, Back returns to the main menu.
//!
//! Mouse callbacks edit the map directly through the shared [`EditorState`].
//! The map's `object_added`/`object_removing` sources keep the
//! unsaved-changes flag.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bevy_ecs::prelude::Entity;
use glam::Vec2;
use log::{debug, info};

use crate::components::objectkind::ObjectKind;
use crate::events::connections::ConnectionSet;
use crate::events::input::{InputAction, InputEvents};
use crate::game::GameError;
use crate::level::{build_map, level_from_map, save_level_to_path};
use crate::map::{Map, ObjectSpec};
use crate::resources::assetstore::AssetStore;
use crate::resources::gamestate::{GameStates, NextGameState};
use crate::resources::rendertarget::RenderTarget;
use crate::states::{ScreenContext, preload_textures};

/// Center of the grid cell containing `point`.
pub fn snap_to_grid(point: Vec2, grid: f32) -> Vec2 {
    ((point / grid).floor() + Vec2::splat(0.5)) * grid
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Drag {
    entity: Entity,
    /// Object center minus the cursor position at grab time.
    offset: Vec2,
}

pub struct EditorState {
    pub map: Map,
    pub palette_index: usize,
    pub grid: f32,
    pub cursor: Vec2,
    drag: Option<Drag>,
}

impl EditorState {
    pub fn selected_kind(&self) -> ObjectKind {
        ObjectKind::PALETTE[self.palette_index % ObjectKind::PALETTE.len()]
    }

    fn cycle_palette(&mut self, step: isize) {
        let len = ObjectKind::PALETTE.len() as isize;
        self.palette_index = (self.palette_index as isize + step).rem_euclid(len) as usize;
        debug!("Editor palette: {}", self.selected_kind());
    }

    fn press(&mut self, point: Vec2) {
        if let Some(entity) = self.map.object_at(point) {
            if let Some(position) = self.map.position(entity) {
                self.drag = Some(Drag {
                    entity,
                    offset: position - point,
                });
            }
            return;
        }
        let kind = self.selected_kind();
        let position = snap_to_grid(point, self.grid);
        let mut spec = ObjectSpec::new(kind, position, Vec2::splat(self.grid));
        if kind == ObjectKind::Platform {
            spec = spec.solid();
        }
        let entity = self.map.add_object(spec);
        info!("Editor: placed {} {:?} at {:?}", kind, entity, position);
    }

    fn move_to(&mut self, point: Vec2) -> bool {
        self.cursor = point;
        let Some(drag) = self.drag else {
            return false;
        };
        let target = snap_to_grid(point + drag.offset, self.grid);
        if self.map.position(drag.entity) == Some(target) {
            return false;
        }
        self.map.move_object(drag.entity, target)
    }

    fn release(&mut self) {
        self.drag = None;
    }

    fn remove_at(&mut self, point: Vec2) {
        let Some(entity) = self.map.object_at(point) else {
            return;
        };
        if Some(entity) == self.map.primary() {
            debug!("Editor: the player cannot be removed");
            return;
        }
        self.map.remove_object(entity);
    }
}

pub struct EditorScreen {
    state: Rc<RefCell<EditorState>>,
    dirty: Rc<Cell<bool>>,
    save_requested: Rc<Cell<bool>>,
    _map_connections: ConnectionSet,
    _input_connections: ConnectionSet,
}

impl EditorScreen {
    pub fn enter(ctx: &mut ScreenContext<'_>) -> Result<Self, GameError> {
        preload_textures(ctx.level, ObjectKind::PALETTE, ctx.textures)?;
        let mut map = build_map(ctx.level, ctx.config)?;
        map.set_frozen(true);

        let dirty = Rc::new(Cell::new(false));
        let mut map_connections = ConnectionSet::new();
        let flag = Rc::clone(&dirty);
        map_connections.push(map.object_added.connect(move |_| flag.set(true)));
        let flag = Rc::clone(&dirty);
        map_connections.push(map.object_removing.connect(move |_| flag.set(true)));

        let state = Rc::new(RefCell::new(EditorState {
            map,
            palette_index: 0,
            grid: ctx.config.grid,
            cursor: Vec2::ZERO,
            drag: None,
        }));
        let save_requested = Rc::new(Cell::new(false));
        let input_connections = Self::connect_input(ctx.events, ctx.next, &state, &dirty, &save_requested);

        info!("Editor opened on '{}'", ctx.level.name);
        Ok(Self {
            state,
            dirty,
            save_requested,
            _map_connections: map_connections,
            _input_connections: input_connections,
        })
    }

    fn connect_input(
        events: &InputEvents,
        next: &NextGameState,
        state: &Rc<RefCell<EditorState>>,
        dirty: &Rc<Cell<bool>>,
        save_requested: &Rc<Cell<bool>>,
    ) -> ConnectionSet {
        let mut connections = ConnectionSet::new();

        let keys = Rc::clone(state);
        let save = Rc::clone(save_requested);
        let next = next.clone();
        connections.push(events.key_pressed.connect(move |action: &InputAction| match action {
            InputAction::SecondaryDirectionLeft => keys.borrow_mut().cycle_palette(-1),
            InputAction::SecondaryDirectionRight => keys.borrow_mut().cycle_palette(1),
            InputAction::Action2 => save.set(true),
            InputAction::Back => next.set(GameStates::MainMenu),
            _ => {}
        }));

        let press = Rc::clone(state);
        connections.push(events.mouse_left_down.connect(move |point: &Vec2| {
            press.borrow_mut().press(*point);
        }));

        let drag = Rc::clone(state);
        let moved = Rc::clone(dirty);
        connections.push(events.mouse_moved.connect(move |point: &Vec2| {
            if drag.borrow_mut().move_to(*point) {
                moved.set(true);
            }
        }));

        let release = Rc::clone(state);
        connections.push(events.mouse_left_up.connect(move |_| release.borrow_mut().release()));

        let remove = Rc::clone(state);
        connections.push(events.mouse_right_down.connect(move |point: &Vec2| {
            remove.borrow_mut().remove_at(*point);
        }));

        connections
    }

    pub fn update(&mut self, ctx: &mut ScreenContext<'_>) -> Result<(), GameError> {
        if self.save_requested.replace(false) {
            self.save(ctx)?;
        }
        Ok(())
    }

    /// Write the edited level to the configured output and make it the
    /// current level.
    pub fn save(&mut self, ctx: &mut ScreenContext<'_>) -> Result<(), GameError> {
        let level = level_from_map(&self.state.borrow().map, &ctx.level.name, ctx.level.kill_y, ctx.config)?;
        save_level_to_path(&level, &ctx.config.editor_output)?;
        *ctx.level = level;
        self.dirty.set(false);
        info!("Editor: saved to {:?}", ctx.config.editor_output);
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    pub fn state(&self) -> std::cell::Ref<'_, EditorState> {
        self.state.borrow()
    }

    pub fn draw(&self, target: &mut dyn RenderTarget, textures: &AssetStore<Vec<u8>>) {
        let state = self.state.borrow();
        state.map.draw(target, textures);
        let marker = if self.is_dirty() { "*" } else { "" };
        target.draw_text(
            &format!("Palette: {}{}", state.selected_kind(), marker),
            Vec2::new(16.0, 16.0),
            false,
        );
    }
}
