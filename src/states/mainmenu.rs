use std::cell::RefCell;
use std::rc::Rc;

use log::info;

use crate::components::menu::Menu;
use crate::events::connections::ConnectionSet;
use crate::events::input::InputAction;
use crate::resources::gamestate::GameStates;
use crate::resources::rendertarget::RenderTarget;
use crate::states::{MENU_ITEM_SIZE, MENU_ORIGIN, MENU_SPACING, ScreenContext};
use crate::systems::menu::attach_menu;

/// Title screen with Play, Editor and Quit.
pub struct MainMenuScreen {
    menu: Rc<RefCell<Menu>>,
    _connections: ConnectionSet,
}

impl MainMenuScreen {
    pub fn enter(ctx: &mut ScreenContext<'_>) -> Self {
        let menu = Rc::new(RefCell::new(Menu::new(
            &[("play", "Play"), ("editor", "Editor"), ("quit", "Quit")],
            MENU_ORIGIN,
            MENU_ITEM_SIZE,
            MENU_SPACING,
        )));
        let mut connections = attach_menu(Rc::clone(&menu), ctx.events);

        let next = ctx.next.clone();
        connections.push(menu.borrow().activated.connect(move |id: &String| {
            let target = match id.as_str() {
                "play" => GameStates::Cutscene,
                "editor" => GameStates::Editor,
                _ => GameStates::Quitting,
            };
            next.set(target);
        }));

        let next = ctx.next.clone();
        connections.push(ctx.events.key_pressed.connect(move |action: &InputAction| {
            if *action == InputAction::Back {
                next.set(GameStates::Quitting);
            }
        }));

        info!("Main menu ready ({} subscriptions)", connections.len());
        Self {
            menu,
            _connections: connections,
        }
    }

    pub fn selected(&self) -> Option<String> {
        self.menu.borrow().selected_id().map(str::to_owned)
    }

    pub fn draw(&self, target: &mut dyn RenderTarget) {
        self.menu.borrow().draw(target);
    }
}
