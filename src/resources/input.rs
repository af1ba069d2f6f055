//! Per-frame keyboard and mouse input resource.
//!
//! Captures the subset of input state the game cares about. Defaults use WASD
//! for primary movement and arrow keys for secondary directions; Escape,
//! Space and Enter map to back, action 1 and action 2.
use bevy_ecs::prelude::*;
use glam::Vec2;

use crate::events::input::{InputAction, Key};

/// Boolean key state with an associated keyboard binding.
#[derive(Debug, Clone, Copy)]
pub struct BoolState {
    /// Whether the key is currently held.
    pub active: bool,
    /// Whether the key went down this frame.
    pub just_pressed: bool,
    /// Whether the key went up this frame.
    pub just_released: bool,

    /// The key bound to this action.
    pub key_binding: Key,
}

impl BoolState {
    pub fn bound_to(key_binding: Key) -> Self {
        Self {
            active: false,
            just_pressed: false,
            just_released: false,
            key_binding,
        }
    }
}

/// Resource capturing the current input state relevant to gameplay.
#[derive(Resource, Debug, Clone)]
pub struct InputState {
    pub maindirection_up: BoolState,
    pub maindirection_left: BoolState,
    pub maindirection_down: BoolState,
    pub maindirection_right: BoolState,
    // Arrow keys
    pub secondarydirection_up: BoolState,
    pub secondarydirection_down: BoolState,
    pub secondarydirection_left: BoolState,
    pub secondarydirection_right: BoolState,
    // Action keys
    pub action_back: BoolState,
    pub action_1: BoolState,
    pub action_2: BoolState,
    /// Last known mouse position in world coordinates.
    pub mouse_position: Vec2,
    pub mouse_left: bool,
    pub mouse_right: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            maindirection_up: BoolState::bound_to(Key::W),
            maindirection_left: BoolState::bound_to(Key::A),
            maindirection_down: BoolState::bound_to(Key::S),
            maindirection_right: BoolState::bound_to(Key::D),
            secondarydirection_up: BoolState::bound_to(Key::Up),
            secondarydirection_down: BoolState::bound_to(Key::Down),
            secondarydirection_left: BoolState::bound_to(Key::Left),
            secondarydirection_right: BoolState::bound_to(Key::Right),
            action_back: BoolState::bound_to(Key::Escape),
            action_1: BoolState::bound_to(Key::Space),
            action_2: BoolState::bound_to(Key::Enter),
            mouse_position: Vec2::ZERO,
            mouse_left: false,
            mouse_right: false,
        }
    }
}

impl InputState {
    const ACTIONS: [InputAction; 11] = [
        InputAction::MainDirectionUp,
        InputAction::MainDirectionLeft,
        InputAction::MainDirectionDown,
        InputAction::MainDirectionRight,
        InputAction::SecondaryDirectionUp,
        InputAction::SecondaryDirectionDown,
        InputAction::SecondaryDirectionLeft,
        InputAction::SecondaryDirectionRight,
        InputAction::Back,
        InputAction::Action1,
        InputAction::Action2,
    ];

    pub fn state(&self, action: InputAction) -> &BoolState {
        match action {
            InputAction::MainDirectionUp => &self.maindirection_up,
            InputAction::MainDirectionLeft => &self.maindirection_left,
            InputAction::MainDirectionDown => &self.maindirection_down,
            InputAction::MainDirectionRight => &self.maindirection_right,
            InputAction::SecondaryDirectionUp => &self.secondarydirection_up,
            InputAction::SecondaryDirectionDown => &self.secondarydirection_down,
            InputAction::SecondaryDirectionLeft => &self.secondarydirection_left,
            InputAction::SecondaryDirectionRight => &self.secondarydirection_right,
            InputAction::Back => &self.action_back,
            InputAction::Action1 => &self.action_1,
            InputAction::Action2 => &self.action_2,
        }
    }

    pub fn state_mut(&mut self, action: InputAction) -> &mut BoolState {
        match action {
            InputAction::MainDirectionUp => &mut self.maindirection_up,
            InputAction::MainDirectionLeft => &mut self.maindirection_left,
            InputAction::MainDirectionDown => &mut self.maindirection_down,
            InputAction::MainDirectionRight => &mut self.maindirection_right,
            InputAction::SecondaryDirectionUp => &mut self.secondarydirection_up,
            InputAction::SecondaryDirectionDown => &mut self.secondarydirection_down,
            InputAction::SecondaryDirectionLeft => &mut self.secondarydirection_left,
            InputAction::SecondaryDirectionRight => &mut self.secondarydirection_right,
            InputAction::Back => &mut self.action_back,
            InputAction::Action1 => &mut self.action_1,
            InputAction::Action2 => &mut self.action_2,
        }
    }

    /// The action bound to `key`, if any.
    pub fn action_for(&self, key: Key) -> Option<InputAction> {
        if key == Key::Unbound {
            return None;
        }
        Self::ACTIONS
            .into_iter()
            .find(|action| self.state(*action).key_binding == key)
    }

    pub fn is_held(&self, action: InputAction) -> bool {
        self.state(action).active
    }

    /// Clear the one-frame edge flags.
    pub fn clear_edges(&mut self) {
        for action in Self::ACTIONS {
            let state = self.state_mut(action);
            state.just_pressed = false;
            state.just_released = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings() {
        let input = InputState::default();
        assert_eq!(input.action_for(Key::W), Some(InputAction::MainDirectionUp));
        assert_eq!(input.action_for(Key::Left), Some(InputAction::SecondaryDirectionLeft));
        assert_eq!(input.action_for(Key::Space), Some(InputAction::Action1));
        assert_eq!(input.action_for(Key::Unbound), None);
    }
}
