//! Input state tracking: keyboard hold/press queries and capture-aware mouse look.

pub mod keyboard;
pub mod mouse;

pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::MouseState;
