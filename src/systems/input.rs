//! Input systems.
//!
//! [`update_input_state`] consumes one frame of [`RawInput`] from the
//! platform layer, writes the results into
//! [`InputState`](crate::resources::input::InputState) and fires the matching
//! sources on [`InputEvents`]. Key repeat is filtered: holding a key fires
//! `key_pressed` once.
use glam::Vec2;
use log::debug;

use crate::events::input::{InputEvents, MouseButton, RawInput};
use crate::resources::input::InputState;

/// Apply one frame of raw input.
///
/// Edge flags from the previous frame are cleared first. Events fire in the
/// order the raw input arrived.
pub fn update_input_state(input: &mut InputState, frame: &[RawInput], events: &InputEvents) {
    input.clear_edges();

    for raw in frame {
        match *raw {
            RawInput::KeyDown(key) => {
                let Some(action) = input.action_for(key) else {
                    continue;
                };
                let state = input.state_mut(action);
                if state.active {
                    continue;
                }
                state.active = true;
                state.just_pressed = true;
                debug!("input: {:?} pressed ({:?})", action, key);
                events.key_pressed.fire(&action);
            }
            RawInput::KeyUp(key) => {
                let Some(action) = input.action_for(key) else {
                    continue;
                };
                let state = input.state_mut(action);
                if !state.active {
                    continue;
                }
                state.active = false;
                state.just_released = true;
                debug!("input: {:?} released ({:?})", action, key);
                events.key_released.fire(&action);
            }
            RawInput::MouseMoved { x, y } => {
                input.mouse_position = Vec2::new(x, y);
                events.mouse_moved.fire(&input.mouse_position);
            }
            RawInput::MouseDown { button, x, y } => {
                let point = Vec2::new(x, y);
                input.mouse_position = point;
                match button {
                    MouseButton::Left => {
                        input.mouse_left = true;
                        events.mouse_left_down.fire(&point);
                    }
                    MouseButton::Right => {
                        input.mouse_right = true;
                        events.mouse_right_down.fire(&point);
                    }
                }
            }
            RawInput::MouseUp { button, x, y } => {
                let point = Vec2::new(x, y);
                input.mouse_position = point;
                match button {
                    MouseButton::Left => {
                        input.mouse_left = false;
                        events.mouse_left_up.fire(&point);
                    }
                    MouseButton::Right => {
                        input.mouse_right = false;
                        events.mouse_right_up.fire(&point);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::input::{InputAction, Key};
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn key_down_fires_once_and_sets_edges() {
        let events = InputEvents::new();
        let mut input = InputState::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _c = events.key_pressed.connect(move |a: &InputAction| sink.borrow_mut().push(*a));

        update_input_state(
            &mut input,
            &[RawInput::KeyDown(Key::Space), RawInput::KeyDown(Key::Space)],
            &events,
        );
        assert_eq!(*seen.borrow(), vec![InputAction::Action1]);
        assert!(input.action_1.active);
        assert!(input.action_1.just_pressed);

        update_input_state(&mut input, &[], &events);
        assert!(input.action_1.active);
        assert!(!input.action_1.just_pressed);

        update_input_state(&mut input, &[RawInput::KeyUp(Key::Space)], &events);
        assert!(!input.action_1.active);
        assert!(input.action_1.just_released);
    }

    #[test]
    fn unbound_keys_and_stray_releases_are_ignored() {
        let events = InputEvents::new();
        let mut input = InputState::default();
        let count = Rc::new(RefCell::new(0));
        let sink = count.clone();
        let _c = events.key_released.connect(move |_| *sink.borrow_mut() += 1);
        update_input_state(&mut input, &[RawInput::KeyUp(Key::A), RawInput::KeyDown(Key::Unbound)], &events);
        assert_eq!(*count.borrow(), 0);
    }

    #[test]
    fn mouse_events_carry_world_position() {
        let events = InputEvents::new();
        let mut input = InputState::default();
        let clicks = Rc::new(RefCell::new(Vec::new()));
        let sink = clicks.clone();
        let _c = events.mouse_right_down.connect(move |p: &Vec2| sink.borrow_mut().push(*p));
        update_input_state(
            &mut input,
            &[
                RawInput::MouseMoved { x: 1.0, y: 2.0 },
                RawInput::MouseDown {
                    button: MouseButton::Right,
                    x: 5.0,
                    y: 6.0,
                },
            ],
            &events,
        );
        assert_eq!(*clicks.borrow(), vec![Vec2::new(5.0, 6.0)]);
        assert_eq!(input.mouse_position, Vec2::new(5.0, 6.0));
        assert!(input.mouse_right);
    }
}
