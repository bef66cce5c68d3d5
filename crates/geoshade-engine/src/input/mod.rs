//! Input subsystem.
//!
//! Public API is platform-agnostic. The runtime translates winit events into
//! `InputEvent`s (see `platform`) and feeds them to `InputState`, which keeps
//! held state and records per-frame transitions in an `InputFrame`.

mod frame;
mod state;
mod types;

pub mod platform;

pub use frame::InputFrame;
pub use state::InputState;
pub use types::{InputEvent, Key, KeyState, MouseButton, MouseButtonState};
