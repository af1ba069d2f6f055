use log::info;

use crate::events::gamestate::GameStateChangedEvent;
use crate::resources::gamestate::{GameState, GameStates, NextGameState, NextGameStates};

/// Apply a pending transition request, if any.
///
/// Returns the transition so the caller can run exit/enter hooks and notify
/// subscribers. A request for the current state is dropped.
pub fn apply_pending_state(state: &mut GameState, next: &NextGameState) -> Option<GameStateChangedEvent> {
    let NextGameStates::Pending(to) = next.take() else {
        return None;
    };
    let from = state.get();
    if from == to {
        return None;
    }
    state.set(to);
    info!("Game state: {:?} -> {:?}", from, to);
    Some(GameStateChangedEvent { from, to })
}

pub fn state_is_running(state: &GameState) -> bool {
    matches!(state.get(), GameStates::Running)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_request_is_applied_once() {
        let mut state = GameState::new();
        let next = NextGameState::new();
        next.set(GameStates::MainMenu);
        let change = apply_pending_state(&mut state, &next);
        assert_eq!(
            change,
            Some(GameStateChangedEvent {
                from: GameStates::None,
                to: GameStates::MainMenu
            })
        );
        assert_eq!(state.get(), GameStates::MainMenu);
        assert_eq!(apply_pending_state(&mut state, &next), None);
    }

    #[test]
    fn request_for_current_state_is_dropped() {
        let mut state = GameState::new();
        state.set(GameStates::Running);
        let next = NextGameState::new();
        next.set(GameStates::Running);
        assert_eq!(apply_pending_state(&mut state, &next), None);
        assert!(state_is_running(&state));
        assert_eq!(next.get(), NextGameStates::Unchanged);
    }
}
