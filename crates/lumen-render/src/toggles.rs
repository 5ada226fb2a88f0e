//! Runtime post-processing toggles with edge-triggered key handling.
//!
//! Toggle keys are polled as held/released each frame; [`EdgeTrigger`]
//! guarantees exactly one flip per physical press no matter how many frames
//! the key stays down. Exposure adjustment is continuous: it ramps every
//! frame while its key is held.

/// Exposure change per frame while an adjustment key is held.
pub const EXPOSURE_STEP: f32 = 0.001;

/// The five boolean effect toggles plus the continuous exposure value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToggleState {
    /// Additive blur of the bright pass in the composite.
    pub bloom: bool,
    /// Exponential tone mapping; off passes HDR color through raw.
    pub hdr: bool,
    /// Gamma 2.2 encoding in the composite.
    pub gamma: bool,
    /// Grayscale conversion, applied last.
    pub grayscale: bool,
    /// Blinn-Phong (halfway vector) specular instead of Phong reflection.
    pub blinn: bool,
    /// Tone-mapping exposure, >= 0, unbounded above.
    pub exposure: f32,
}

impl Default for ToggleState {
    fn default() -> Self {
        Self {
            bloom: true,
            hdr: false,
            gamma: false,
            grayscale: false,
            blinn: false,
            exposure: 0.77,
        }
    }
}

/// Rising-edge detector over a held/released key signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeTrigger {
    was_held: bool,
}

impl EdgeTrigger {
    /// Feed the current held state; returns `true` only on the frame the
    /// signal transitions from released to held.
    pub fn update(&mut self, held: bool) -> bool {
        let rising = held && !self.was_held;
        self.was_held = held;
        rising
    }
}

/// Per-frame held states of the toggle and exposure keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToggleInput {
    pub bloom_held: bool,
    pub hdr_held: bool,
    pub gamma_held: bool,
    pub grayscale_held: bool,
    pub blinn_held: bool,
    pub exposure_down_held: bool,
    pub exposure_up_held: bool,
}

/// Owns one edge trigger per boolean toggle and applies the continuous
/// exposure ramp. Call [`update`](Self::update) once per frame.
#[derive(Debug, Clone, Default)]
pub struct PostFxController {
    bloom: EdgeTrigger,
    hdr: EdgeTrigger,
    gamma: EdgeTrigger,
    grayscale: EdgeTrigger,
    blinn: EdgeTrigger,
}

impl PostFxController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one frame of key input to the toggle state.
    pub fn update(&mut self, toggles: &mut ToggleState, input: &ToggleInput) {
        if self.bloom.update(input.bloom_held) {
            toggles.bloom = !toggles.bloom;
            log::info!("bloom {}", on_off(toggles.bloom));
        }
        if self.hdr.update(input.hdr_held) {
            toggles.hdr = !toggles.hdr;
            log::info!("hdr {}", on_off(toggles.hdr));
        }
        if self.gamma.update(input.gamma_held) {
            toggles.gamma = !toggles.gamma;
            log::info!("gamma {}", on_off(toggles.gamma));
        }
        if self.grayscale.update(input.grayscale_held) {
            toggles.grayscale = !toggles.grayscale;
            log::info!("grayscale {}", on_off(toggles.grayscale));
        }
        if self.blinn.update(input.blinn_held) {
            toggles.blinn = !toggles.blinn;
            log::info!("blinn {}", on_off(toggles.blinn));
        }
        if input.exposure_down_held {
            toggles.exposure = (toggles.exposure - EXPOSURE_STEP).max(0.0);
        }
        if input.exposure_up_held {
            toggles.exposure += EXPOSURE_STEP;
        }
    }
}

fn on_off(state: bool) -> &'static str {
    if state { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state() {
        let toggles = ToggleState::default();
        assert!(toggles.bloom);
        assert!(!toggles.hdr);
        assert!(!toggles.gamma);
        assert!(!toggles.grayscale);
        assert!(!toggles.blinn);
        assert!((toggles.exposure - 0.77).abs() < f32::EPSILON);
    }

    #[test]
    fn test_held_key_flips_exactly_once() {
        let mut controller = PostFxController::new();
        let mut toggles = ToggleState::default();
        let input = ToggleInput {
            hdr_held: true,
            ..Default::default()
        };
        // Held across many frames: one flip.
        for _ in 0..100 {
            controller.update(&mut toggles, &input);
        }
        assert!(toggles.hdr);
    }

    #[test]
    fn test_release_and_press_flips_again() {
        let mut controller = PostFxController::new();
        let mut toggles = ToggleState::default();
        let held = ToggleInput {
            bloom_held: true,
            ..Default::default()
        };
        let released = ToggleInput::default();

        controller.update(&mut toggles, &held);
        assert!(!toggles.bloom, "first press flips bloom off");
        controller.update(&mut toggles, &released);
        controller.update(&mut toggles, &held);
        assert!(toggles.bloom, "second press flips it back on");
    }

    #[test]
    fn test_independent_toggles_flip_together() {
        let mut controller = PostFxController::new();
        let mut toggles = ToggleState::default();
        let input = ToggleInput {
            gamma_held: true,
            grayscale_held: true,
            blinn_held: true,
            ..Default::default()
        };
        controller.update(&mut toggles, &input);
        assert!(toggles.gamma);
        assert!(toggles.grayscale);
        assert!(toggles.blinn);
        // Unrelated toggles untouched.
        assert!(toggles.bloom);
        assert!(!toggles.hdr);
    }

    #[test]
    fn test_exposure_ramps_while_held() {
        let mut controller = PostFxController::new();
        let mut toggles = ToggleState::default();
        let input = ToggleInput {
            exposure_up_held: true,
            ..Default::default()
        };
        for _ in 0..10 {
            controller.update(&mut toggles, &input);
        }
        assert!((toggles.exposure - 0.78).abs() < 1e-5);
    }

    #[test]
    fn test_exposure_floor_at_zero() {
        let mut controller = PostFxController::new();
        let mut toggles = ToggleState {
            exposure: 0.002,
            ..Default::default()
        };
        let input = ToggleInput {
            exposure_down_held: true,
            ..Default::default()
        };
        for _ in 0..10 {
            controller.update(&mut toggles, &input);
        }
        assert_eq!(toggles.exposure, 0.0);
    }

    #[test]
    fn test_exposure_unbounded_above() {
        let mut controller = PostFxController::new();
        let mut toggles = ToggleState {
            exposure: 10_000.0,
            ..Default::default()
        };
        let input = ToggleInput {
            exposure_up_held: true,
            ..Default::default()
        };
        controller.update(&mut toggles, &input);
        assert!(toggles.exposure > 10_000.0);
    }

    #[test]
    fn test_edge_trigger_sequence() {
        let mut trigger = EdgeTrigger::default();
        assert!(trigger.update(true));
        assert!(!trigger.update(true));
        assert!(!trigger.update(false));
        assert!(trigger.update(true));
    }
}
