//! Game state transition notification.
//!
//! Screens request a change of the high-level [`GameStates`] by writing
//! [`NextGameState`](crate::resources::gamestate::NextGameState).
//! [`apply_pending_state`](crate::systems::gamestate::apply_pending_state)
//! performs the transition and then fires a [`GameStateChangedEvent`] on
//! [`Game::state_changed`](crate::game::Game::state_changed).

use crate::resources::gamestate::GameStates;

/// Payload describing a completed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameStateChangedEvent {
    pub from: GameStates,
    pub to: GameStates,
}
