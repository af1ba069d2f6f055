//! Menu input wiring.
//!
//! [`attach_menu`] subscribes a [`Menu`] to the input context:
//! - up/down actions move the keyboard selection;
//! - Action1/Action2 activate the selected item;
//! - mouse movement updates the hover;
//! - a left click on an item selects and activates it.
//!
//! Activation fires [`Menu::activated`] with the item id. The menu is not
//! borrowed while that source fires, so handlers may inspect or change it.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use log::debug;

use crate::components::menu::Menu;
use crate::events::connections::ConnectionSet;
use crate::events::input::{InputAction, InputEvents};

/// Fire `activated` for the item at `index`, or for the current selection.
fn activate(menu: &RefCell<Menu>, index: Option<usize>) {
    let (id, activated) = {
        let mut menu = menu.borrow_mut();
        if let Some(index) = index {
            menu.selected_index = index;
        }
        let Some(id) = menu.selected_id().map(str::to_owned) else {
            return;
        };
        (id, menu.activated.clone())
    };
    debug!("menu: activated '{}'", id);
    activated.fire(&id);
}

/// Connect `menu` to `events`. Dropping the returned set detaches the menu.
pub fn attach_menu(menu: Rc<RefCell<Menu>>, events: &InputEvents) -> ConnectionSet {
    let mut connections = ConnectionSet::new();

    let keys = Rc::clone(&menu);
    connections.push(events.key_pressed.connect(move |action: &InputAction| {
        if let Some(step) = action.vertical() {
            keys.borrow_mut().move_selection(step);
            return;
        }
        if matches!(action, InputAction::Action1 | InputAction::Action2) {
            activate(&keys, None);
        }
    }));

    let hover = Rc::clone(&menu);
    connections.push(events.mouse_moved.connect(move |point: &Vec2| {
        hover.borrow_mut().hover(*point);
    }));

    let click = Rc::clone(&menu);
    connections.push(events.mouse_left_down.connect(move |point: &Vec2| {
        let index = click.borrow().item_at(*point);
        if index.is_some() {
            activate(&click, index);
        }
    }));

    connections
}
