//! Menu widget state.
//!
//! A [`Menu`] is a vertical list of buttons with a keyboard selection and a
//! mouse hover. Input wiring lives in [`crate::systems::menu`]; this module
//! only holds state and the [`Menu::activated`] source fired with the id of
//! the chosen item.

use glam::Vec2;

use crate::components::boxcollider::BoxCollider;
use crate::events::source::EventSource;
use crate::resources::rendertarget::RenderTarget;

#[derive(Clone, Debug)]
pub struct MenuItem {
    pub id: String,
    pub label: String,
    /// Center of the button.
    pub position: Vec2,
    pub enabled: bool,
}

#[derive(Debug)]
pub struct Menu {
    pub items: Vec<MenuItem>,
    pub selected_index: usize,
    /// Item currently under the mouse, if any.
    pub hovered: Option<usize>,
    pub item_size: Vec2,
    pub origin: Vec2,
    pub item_spacing: f32,
    /// Fired with the item id when an item is activated.
    pub activated: EventSource<String>,
}

impl Menu {
    pub fn new(labels: &[(&str, &str)], origin: Vec2, item_size: Vec2, item_spacing: f32) -> Self {
        let items = labels
            .iter()
            .enumerate()
            .map(|(i, (id, label))| MenuItem {
                id: id.to_string(),
                label: label.to_string(),
                position: Vec2::new(origin.x, origin.y + i as f32 * item_spacing),
                enabled: true,
            })
            .collect();
        Self {
            items,
            selected_index: 0,
            hovered: None,
            item_size,
            origin,
            item_spacing,
            activated: EventSource::new(),
        }
    }

    pub fn with_disabled(mut self, id: &str) -> Self {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.enabled = false;
        }
        self
    }

    /// Move the keyboard selection by `step` items, wrapping and skipping
    /// disabled items.
    pub fn move_selection(&mut self, step: i32) {
        let count = self.items.len() as i32;
        if count == 0 {
            return;
        }
        let mut index = self.selected_index as i32;
        for _ in 0..count {
            index = (index + step).rem_euclid(count);
            if self.items[index as usize].enabled {
                self.selected_index = index as usize;
                return;
            }
        }
    }

    /// Index of the enabled item whose button contains `point`.
    pub fn item_at(&self, point: Vec2) -> Option<usize> {
        let button = BoxCollider::new(self.item_size.x, self.item_size.y);
        self.items
            .iter()
            .position(|item| item.enabled && button.contains_point(item.position, point))
    }

    /// Update the hover from a mouse position. Hovering an item also selects
    /// it. Returns true when the hovered item changed.
    pub fn hover(&mut self, point: Vec2) -> bool {
        let hovered = self.item_at(point);
        let changed = hovered != self.hovered;
        self.hovered = hovered;
        if let Some(index) = hovered {
            self.selected_index = index;
        }
        changed
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.items
            .get(self.selected_index)
            .filter(|item| item.enabled)
            .map(|item| item.id.as_str())
    }

    pub fn is_hovered(&self, id: &str) -> bool {
        self.hovered
            .and_then(|index| self.items.get(index))
            .is_some_and(|item| item.id == id)
    }

    /// Draw item labels, highlighting the selection.
    pub fn draw(&self, target: &mut dyn RenderTarget) {
        for (index, item) in self.items.iter().enumerate() {
            target.draw_text(&item.label, item.position, index == self.selected_index);
        }
    }
}
