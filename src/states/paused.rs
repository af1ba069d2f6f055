use std::cell::RefCell;
use std::rc::Rc;

use crate::components::menu::Menu;
use crate::events::connections::ConnectionSet;
use crate::events::input::InputAction;
use crate::resources::gamestate::GameStates;
use crate::resources::rendertarget::RenderTarget;
use crate::states::{MENU_ITEM_SIZE, MENU_ORIGIN, MENU_SPACING, ScreenContext};
use crate::systems::menu::attach_menu;

/// Pause menu drawn over the suspended running screen.
pub struct PausedScreen {
    menu: Rc<RefCell<Menu>>,
    _connections: ConnectionSet,
}

impl PausedScreen {
    pub fn enter(ctx: &mut ScreenContext<'_>) -> Self {
        let menu = Rc::new(RefCell::new(Menu::new(
            &[("resume", "Resume"), ("menu", "Main menu")],
            MENU_ORIGIN,
            MENU_ITEM_SIZE,
            MENU_SPACING,
        )));
        let mut connections = attach_menu(Rc::clone(&menu), ctx.events);

        let next = ctx.next.clone();
        connections.push(menu.borrow().activated.connect(move |id: &String| {
            if id == "resume" {
                next.set(GameStates::Running);
            } else {
                next.set(GameStates::MainMenu);
            }
        }));

        let next = ctx.next.clone();
        connections.push(ctx.events.key_pressed.connect(move |action: &InputAction| {
            if *action == InputAction::Back {
                next.set(GameStates::Running);
            }
        }));

        Self {
            menu,
            _connections: connections,
        }
    }

    pub fn draw(&self, target: &mut dyn RenderTarget) {
        self.menu.borrow().draw(target);
    }
}
