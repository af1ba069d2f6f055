//! Event types and the signal core they are built on.
//!
//! Everything interactive in the game is wired through
//! [`source::EventSource`]: input, collision notifications, map lifecycle
//! notifications, menu activation and state transitions.
//!
//! Submodules:
//! - [`source`] – the generic signal/slot mechanism and its connection token
//! - [`connections`] – bulk/scoped ownership of connections
//! - [`collision`] – payload of onCollide notifications
//! - [`gamestate`] – payload fired after a state transition
//! - [`input`] – logical input actions, raw platform input, and the input dispatch context
pub mod collision;
pub mod connections;
pub mod gamestate;
pub mod input;
pub mod source;
