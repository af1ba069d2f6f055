use std::cell::Cell;
use std::rc::Rc;

use glam::Vec2;

use crate::events::connections::ConnectionSet;
use crate::resources::gamestate::GameStates;
use crate::resources::rendertarget::RenderTarget;
use crate::states::{MENU_ORIGIN, ScreenContext};

/// Title card shown before a level. Any key skips it.
pub struct CutsceneScreen {
    title: String,
    remaining: f32,
    skipped: Rc<Cell<bool>>,
    _connections: ConnectionSet,
}

impl CutsceneScreen {
    pub fn enter(ctx: &mut ScreenContext<'_>) -> Self {
        let skipped = Rc::new(Cell::new(false));
        let flag = Rc::clone(&skipped);
        let connections = ConnectionSet::new().with(ctx.events.key_pressed.connect(move |_| flag.set(true)));
        Self {
            title: ctx.level.name.clone(),
            remaining: ctx.config.cutscene_seconds,
            skipped,
            _connections: connections,
        }
    }

    pub fn update(&mut self, ctx: &mut ScreenContext<'_>, dt: f32) {
        self.remaining -= dt;
        if self.skipped.get() || self.remaining <= 0.0 {
            ctx.next.set(GameStates::Running);
        }
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    pub fn draw(&self, target: &mut dyn RenderTarget) {
        target.draw_text(&self.title, MENU_ORIGIN - Vec2::new(0.0, 80.0), false);
    }
}
