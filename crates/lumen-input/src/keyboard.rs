//! Frame-coherent keyboard state tracker.
//!
//! [`KeyboardState`] accumulates winit [`KeyEvent`]s during a frame and
//! answers two questions for any key: is it held right now, and did it
//! transition to pressed this frame. Held state drives camera movement and
//! exposure ramping; the press edge drives one-shot toggles.
//!
//! Physical key codes are used throughout so that WASD movement works
//! identically regardless of the user's keyboard layout.

use std::collections::HashSet;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Minimal description of a key event, decoupled from winit for tests.
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    /// The physical key involved.
    pub key: PhysicalKey,
    /// Whether the key was pressed or released.
    pub state: ElementState,
    /// Whether this is an OS auto-repeat event.
    pub repeat: bool,
}

/// Tracks per-frame keyboard state using physical (scan-code) keys.
///
/// Forward every [`KeyEvent`] to [`process_event`](Self::process_event),
/// query with [`is_held`](Self::is_held) / [`just_pressed`](Self::just_pressed),
/// and call [`clear_transients`](Self::clear_transients) once per frame after
/// the update step.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    held: HashSet<KeyCode>,
    just_pressed: HashSet<KeyCode>,
}

impl KeyboardState {
    /// Creates a new `KeyboardState` with no keys held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Processes a winit [`KeyEvent`], updating internal state.
    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    /// Processes a [`RawKeyEvent`]. Auto-repeat events are ignored so a held
    /// key produces exactly one press edge.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        if event.repeat {
            return;
        }
        let PhysicalKey::Code(code) = event.key else {
            return;
        };
        match event.state {
            ElementState::Pressed => {
                self.held.insert(code);
                self.just_pressed.insert(code);
            }
            ElementState::Released => {
                self.held.remove(&code);
            }
        }
    }

    /// Returns `true` while the key is held down.
    #[must_use]
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held.contains(&code)
    }

    /// Returns `true` only during the frame the key transitioned to pressed.
    #[must_use]
    pub fn just_pressed(&self, code: KeyCode) -> bool {
        self.just_pressed.contains(&code)
    }

    /// Clears the `just_pressed` set. Call at end of frame.
    pub fn clear_transients(&mut self) {
        self.just_pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(code: KeyCode, state: ElementState, repeat: bool) -> RawKeyEvent {
        RawKeyEvent {
            key: PhysicalKey::Code(code),
            state,
            repeat,
        }
    }

    #[test]
    fn test_initial_state_no_keys_held() {
        let kb = KeyboardState::new();
        for code in [KeyCode::KeyW, KeyCode::KeyB, KeyCode::KeyH, KeyCode::KeyQ] {
            assert!(!kb.is_held(code));
            assert!(!kb.just_pressed(code));
        }
    }

    #[test]
    fn test_press_sets_held_and_edge() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyW, ElementState::Pressed, false));
        assert!(kb.is_held(KeyCode::KeyW));
        assert!(kb.just_pressed(KeyCode::KeyW));
    }

    #[test]
    fn test_release_clears_held() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyB, ElementState::Pressed, false));
        kb.process_raw(raw(KeyCode::KeyB, ElementState::Released, false));
        assert!(!kb.is_held(KeyCode::KeyB));
    }

    #[test]
    fn test_press_edge_lasts_one_frame() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyH, ElementState::Pressed, false));
        assert!(kb.just_pressed(KeyCode::KeyH));
        kb.clear_transients();
        assert!(!kb.just_pressed(KeyCode::KeyH));
        assert!(kb.is_held(KeyCode::KeyH));
    }

    #[test]
    fn test_repeat_events_produce_no_second_edge() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyG, ElementState::Pressed, false));
        kb.clear_transients();
        kb.process_raw(raw(KeyCode::KeyG, ElementState::Pressed, true));
        assert!(!kb.just_pressed(KeyCode::KeyG));
        assert!(kb.is_held(KeyCode::KeyG));
    }

    #[test]
    fn test_multiple_keys_tracked_independently() {
        let mut kb = KeyboardState::new();
        kb.process_raw(raw(KeyCode::KeyW, ElementState::Pressed, false));
        kb.process_raw(raw(KeyCode::KeyD, ElementState::Pressed, false));
        kb.process_raw(raw(KeyCode::KeyW, ElementState::Released, false));
        assert!(!kb.is_held(KeyCode::KeyW));
        assert!(kb.is_held(KeyCode::KeyD));
        assert!(kb.just_pressed(KeyCode::KeyD));
    }
}
