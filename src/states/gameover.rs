use glam::Vec2;

use crate::events::connections::ConnectionSet;
use crate::events::input::InputAction;
use crate::resources::gamestate::GameStates;
use crate::resources::rendertarget::RenderTarget;
use crate::states::{MENU_ORIGIN, MENU_SPACING, ScreenContext};

/// Result screen. Action1 returns to the main menu, Back quits.
pub struct GameOverScreen {
    won: bool,
    score: u32,
    _connections: ConnectionSet,
}

impl GameOverScreen {
    pub fn enter(ctx: &mut ScreenContext<'_>) -> Self {
        let next = ctx.next.clone();
        let connections = ConnectionSet::new().with(ctx.events.key_pressed.connect(move |action: &InputAction| {
            match action {
                InputAction::Action1 => next.set(GameStates::MainMenu),
                InputAction::Back => next.set(GameStates::Quitting),
                _ => {}
            }
        }));
        Self {
            won: ctx.session.won,
            score: ctx.session.score,
            _connections: connections,
        }
    }

    pub fn won(&self) -> bool {
        self.won
    }

    pub fn draw(&self, target: &mut dyn RenderTarget) {
        let headline = if self.won { "Level complete!" } else { "Game over" };
        target.draw_text(headline, MENU_ORIGIN, false);
        target.draw_text(
            &format!("Score: {}", self.score),
            MENU_ORIGIN + Vec2::new(0.0, MENU_SPACING),
            false,
        );
    }
}
