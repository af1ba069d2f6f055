//! Input actions and the input dispatch context.
//!
//! [`InputAction`] abstracts physical keys into gameplay-meaningful actions.
//! [`InputEvents`] is the set of [`EventSource`]s every screen and widget
//! subscribes to. It is constructed once by [`Game`](crate::game::Game) and
//! passed by reference to whoever needs to subscribe; there is no global
//! instance.
//!
//! [`RawInput`] is the platform-level event a windowing backend produces. The
//! [`update_input_state`](crate::systems::input::update_input_state) system
//! turns raw input into [`InputState`](crate::resources::input::InputState)
//! updates and fires the matching sources here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::events::source::EventSource;

/// Enumeration of logical input actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputAction {
    /// Primary direction: up (default: W key).
    MainDirectionUp,
    /// Primary direction: down (default: S key).
    MainDirectionDown,
    /// Primary direction: left (default: A key).
    MainDirectionLeft,
    /// Primary direction: right (default: D key).
    MainDirectionRight,
    /// Secondary direction: up (default: Up arrow).
    SecondaryDirectionUp,
    /// Secondary direction: down (default: Down arrow).
    SecondaryDirectionDown,
    /// Secondary direction: left (default: Left arrow).
    SecondaryDirectionLeft,
    /// Secondary direction: right (default: Right arrow).
    SecondaryDirectionRight,
    /// Back/cancel action (default: Escape).
    Back,
    /// Primary action button (default: Space).
    Action1,
    /// Secondary action button (default: Enter).
    Action2,
}

impl InputAction {
    /// Horizontal direction for movement actions, `None` for everything else.
    pub fn horizontal(self) -> Option<f32> {
        match self {
            Self::MainDirectionLeft | Self::SecondaryDirectionLeft => Some(-1.0),
            Self::MainDirectionRight | Self::SecondaryDirectionRight => Some(1.0),
            _ => None,
        }
    }

    /// Vertical menu direction: `-1` for up, `1` for down.
    pub fn vertical(self) -> Option<i32> {
        match self {
            Self::MainDirectionUp | Self::SecondaryDirectionUp => Some(-1),
            Self::MainDirectionDown | Self::SecondaryDirectionDown => Some(1),
            _ => None,
        }
    }
}

/// Physical keys the game understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Escape,
    Space,
    Enter,
    /// Placeholder binding that no key event ever matches.
    Unbound,
}

/// Mouse buttons reported by the platform layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
}

/// One platform input event, in world coordinates for the mouse.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RawInput {
    KeyDown(Key),
    KeyUp(Key),
    MouseMoved { x: f32, y: f32 },
    MouseDown { button: MouseButton, x: f32, y: f32 },
    MouseUp { button: MouseButton, x: f32, y: f32 },
}

/// Input dispatch context: one [`EventSource`] per kind of input.
#[derive(Debug, Default)]
pub struct InputEvents {
    pub key_pressed: EventSource<InputAction>,
    pub key_released: EventSource<InputAction>,
    pub mouse_moved: EventSource<Vec2>,
    pub mouse_left_down: EventSource<Vec2>,
    pub mouse_left_up: EventSource<Vec2>,
    pub mouse_right_down: EventSource<Vec2>,
    pub mouse_right_up: EventSource<Vec2>,
}

impl InputEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total subscribers across all sources. Useful to check that a screen
    /// cleaned up after itself.
    pub fn subscriber_count(&self) -> usize {
        self.key_pressed.len()
            + self.key_released.len()
            + self.mouse_moved.len()
            + self.mouse_left_down.len()
            + self.mouse_left_up.len()
            + self.mouse_right_down.len()
            + self.mouse_right_up.len()
    }
}
