//! Capture-aware mouse look and scroll tracking.
//!
//! [`MouseState`] accumulates look deltas for the fly camera. While the
//! cursor is captured, raw `DeviceEvent::MouseMotion` deltas are used; when
//! it is free (overlay open), motion is ignored so the camera stays put.

use glam::Vec2;
use winit::event::MouseScrollDelta;
use winit::window::{CursorGrabMode, Window};

/// Accumulated mouse state for one frame.
#[derive(Debug, Clone)]
pub struct MouseState {
    look_delta: Vec2,
    scroll: f32,
    captured: bool,
}

impl Default for MouseState {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseState {
    /// Creates a new `MouseState` with the cursor uncaptured.
    #[must_use]
    pub fn new() -> Self {
        Self {
            look_delta: Vec2::ZERO,
            scroll: 0.0,
            captured: false,
        }
    }

    /// Process a `DeviceEvent::MouseMotion` raw delta. Only accumulated while
    /// the cursor is captured.
    pub fn on_raw_motion(&mut self, dx: f64, dy: f64) {
        if self.captured {
            self.look_delta += Vec2::new(dx as f32, dy as f32);
        }
    }

    /// Process a `MouseWheel` event.
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_x, y) => {
                self.scroll += y;
            }
            MouseScrollDelta::PixelDelta(pos) => {
                // ~40 pixels per line
                self.scroll += (pos.y / 40.0) as f32;
            }
        }
    }

    /// Set cursor capture state, applying grab mode and visibility to the
    /// window. Locked grab is preferred; Confined is the fallback on
    /// platforms that cannot lock.
    pub fn set_captured(&mut self, window: &Window, captured: bool) {
        self.captured = captured;
        if captured {
            if window.set_cursor_grab(CursorGrabMode::Locked).is_err() {
                let _ = window.set_cursor_grab(CursorGrabMode::Confined);
            }
            window.set_cursor_visible(false);
        } else {
            let _ = window.set_cursor_grab(CursorGrabMode::None);
            window.set_cursor_visible(true);
        }
    }

    /// Set the captured flag without a window reference.
    pub fn set_captured_flag(&mut self, captured: bool) {
        self.captured = captured;
    }

    /// Look delta accumulated this frame, in device units.
    #[must_use]
    pub fn look_delta(&self) -> Vec2 {
        self.look_delta
    }

    /// Scroll wheel delta accumulated this frame (positive = scroll up).
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Whether the cursor is currently captured for FPS-style look.
    #[must_use]
    pub fn is_captured(&self) -> bool {
        self.captured
    }

    /// Clears per-frame transients: look delta and scroll.
    pub fn clear_transients(&mut self) {
        self.look_delta = Vec2::ZERO;
        self.scroll = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_ignored_while_uncaptured() {
        let mut ms = MouseState::new();
        ms.on_raw_motion(10.0, -5.0);
        assert_eq!(ms.look_delta(), Vec2::ZERO);
    }

    #[test]
    fn test_motion_accumulates_while_captured() {
        let mut ms = MouseState::new();
        ms.set_captured_flag(true);
        ms.on_raw_motion(10.0, -5.0);
        ms.on_raw_motion(2.0, 1.0);
        assert_eq!(ms.look_delta(), Vec2::new(12.0, -4.0));
    }

    #[test]
    fn test_scroll_accumulates_within_frame() {
        let mut ms = MouseState::new();
        ms.on_scroll(MouseScrollDelta::LineDelta(0.0, 1.0));
        ms.on_scroll(MouseScrollDelta::LineDelta(0.0, 0.5));
        assert!((ms.scroll() - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_transients_reset_each_frame() {
        let mut ms = MouseState::new();
        ms.set_captured_flag(true);
        ms.on_raw_motion(50.0, 50.0);
        ms.on_scroll(MouseScrollDelta::LineDelta(0.0, 2.0));
        ms.clear_transients();
        assert_eq!(ms.look_delta(), Vec2::ZERO);
        assert!(ms.scroll().abs() < f32::EPSILON);
    }

    #[test]
    fn test_pixel_delta_normalized_to_lines() {
        let mut ms = MouseState::new();
        ms.on_scroll(MouseScrollDelta::PixelDelta(
            winit::dpi::PhysicalPosition::new(0.0, 80.0),
        ));
        assert!((ms.scroll() - 2.0).abs() < 1e-6);
    }
}
