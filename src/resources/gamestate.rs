//! High-level game state.
//!
//! [`GameState`] is the authoritative current state. [`NextGameState`] is a
//! pending transition request that screens set from inside event callbacks;
//! [`apply_pending_state`](crate::systems::gamestate::apply_pending_state)
//! consumes it once per tick.

use std::cell::Cell;
use std::rc::Rc;

/// Discrete high-level states the game can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GameStates {
    /// Before the first transition has been applied.
    #[default]
    None,
    MainMenu,
    Cutscene,
    Running,
    Paused,
    GameOver,
    Editor,
    Quitting,
}

impl GameStates {
    /// Parse a state name as accepted on the command line.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "menu" | "mainmenu" | "main_menu" => Some(Self::MainMenu),
            "cutscene" => Some(Self::Cutscene),
            "running" | "play" => Some(Self::Running),
            "editor" => Some(Self::Editor),
            _ => None,
        }
    }
}

/// Representation of a requested next state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum NextGameStates {
    #[default]
    Unchanged,
    Pending(GameStates),
}

/// Authoritative current game state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct GameState {
    current: GameStates,
}

impl GameState {
    /// Create a new state initialized to [`GameStates::None`].
    pub fn new() -> Self {
        GameState {
            current: GameStates::None,
        }
    }

    pub fn get(&self) -> GameStates {
        self.current
    }

    /// Update the current state immediately, without running any hooks.
    pub fn set(&mut self, state: GameStates) {
        self.current = state;
    }
}

/// Shared handle to a transition request.
///
/// Clones refer to the same request, so a callback can hold one and set it
/// while the game holds another. The last request before the next tick wins.
#[derive(Debug, Clone, Default)]
pub struct NextGameState {
    next: Rc<Cell<NextGameStates>>,
}

impl NextGameState {
    /// Create a new value initialized to [`NextGameStates::Unchanged`].
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> NextGameStates {
        self.next.get()
    }

    /// Request a transition to `next`.
    pub fn set(&self, next: GameStates) {
        self.next.set(NextGameStates::Pending(next));
    }

    /// Take the pending request, leaving [`NextGameStates::Unchanged`].
    pub fn take(&self) -> NextGameStates {
        self.next.replace(NextGameStates::Unchanged)
    }

    /// Reset to [`NextGameStates::Unchanged`].
    pub fn reset(&self) {
        self.next.set(NextGameStates::Unchanged);
    }
}
