//! Free-flying yaw/pitch camera.
//!
//! WASD translation, mouse look, scroll zoom. Orientation is stored as
//! yaw/pitch in degrees and converted to basis vectors on change, so the
//! camera never rolls.

use glam::{Mat4, Vec3};

/// Translation directions for keyboard movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

/// A fly camera with yaw/pitch orientation.
#[derive(Debug, Clone)]
pub struct FlyCamera {
    position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    world_up: Vec3,
    yaw: f32,
    pitch: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Mouse look sensitivity in degrees per device unit.
    pub sensitivity: f32,
    /// Vertical field of view in degrees, adjusted by scroll.
    pub zoom: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0))
    }
}

impl FlyCamera {
    const PITCH_LIMIT: f32 = 89.0;
    const ZOOM_MIN: f32 = 1.0;
    const ZOOM_MAX: f32 = 45.0;

    /// Create a camera at `position` looking down −Z.
    #[must_use]
    pub fn new(position: Vec3) -> Self {
        let mut camera = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            world_up: Vec3::Y,
            yaw: -90.0,
            pitch: 0.0,
            speed: 2.5,
            sensitivity: 0.1,
            zoom: 45.0,
        };
        camera.update_vectors();
        camera
    }

    /// Restore a camera from a saved position and front vector.
    #[must_use]
    pub fn from_pose(position: Vec3, front: Vec3) -> Self {
        let front = front.normalize_or(Vec3::NEG_Z);
        let mut camera = Self::new(position);
        camera.yaw = front.z.atan2(front.x).to_degrees();
        camera.pitch = front
            .y
            .clamp(-1.0, 1.0)
            .asin()
            .to_degrees()
            .clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        camera.update_vectors();
        camera
    }

    /// World-space position.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Normalized look direction.
    #[must_use]
    pub fn front(&self) -> Vec3 {
        self.front
    }

    /// Right-handed view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    /// Translate along the camera basis. `dt` is the frame delta in seconds.
    pub fn process_movement(&mut self, direction: MoveDirection, dt: f32) {
        let velocity = self.speed * dt;
        match direction {
            MoveDirection::Forward => self.position += self.front * velocity,
            MoveDirection::Backward => self.position -= self.front * velocity,
            MoveDirection::Left => self.position -= self.right * velocity,
            MoveDirection::Right => self.position += self.right * velocity,
        }
    }

    /// Apply a mouse look delta in device units. Positive `dy` looks down
    /// (screen coordinates grow downward); pitch is clamped to ±89° so the
    /// view never flips over the pole.
    pub fn process_look(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity)
            .clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
        self.update_vectors();
    }

    /// Apply a scroll delta to the zoom (vertical FOV), clamped to [1°, 45°].
    pub fn process_scroll(&mut self, dy: f32) {
        self.zoom = (self.zoom - dy).clamp(Self::ZOOM_MIN, Self::ZOOM_MAX);
    }

    fn update_vectors(&mut self) {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        self.front = Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pose() {
        let camera = FlyCamera::default();
        assert_eq!(camera.position(), Vec3::new(0.0, 0.0, 3.0));
        assert!((camera.front() - Vec3::NEG_Z).length() < 1e-6);
        assert!((camera.zoom - 45.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_forward_movement_follows_front() {
        let mut camera = FlyCamera::default();
        camera.process_movement(MoveDirection::Forward, 1.0);
        // Default front is -Z, speed 2.5.
        assert!((camera.position() - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-5);
    }

    #[test]
    fn test_strafe_is_perpendicular_to_front() {
        let mut camera = FlyCamera::default();
        camera.process_movement(MoveDirection::Right, 1.0);
        assert!((camera.position().x - 2.5).abs() < 1e-5);
        assert!((camera.position().z - 3.0).abs() < 1e-5);
    }

    #[test]
    fn test_pitch_clamped_at_89_degrees() {
        let mut camera = FlyCamera::default();
        // Huge upward look (negative dy looks up).
        camera.process_look(0.0, -100000.0);
        assert!(camera.front().y < 1.0);
        assert!(camera.front().y > 0.999);
        // The front vector stays unit length at the clamp.
        assert!((camera.front().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = FlyCamera::default();
        camera.process_scroll(1000.0);
        assert!((camera.zoom - 1.0).abs() < f32::EPSILON);
        camera.process_scroll(-1000.0);
        assert!((camera.zoom - 45.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_pose_restore_roundtrip() {
        let mut camera = FlyCamera::default();
        camera.process_look(123.0, -45.0);
        camera.process_movement(MoveDirection::Forward, 2.0);

        let restored = FlyCamera::from_pose(camera.position(), camera.front());
        assert!((restored.position() - camera.position()).length() < 1e-5);
        assert!((restored.front() - camera.front()).length() < 1e-4);
    }

    #[test]
    fn test_view_matrix_looks_along_front() {
        let camera = FlyCamera::default();
        let view = camera.view_matrix();
        // A point straight ahead of the camera maps to the -Z axis in view
        // space.
        let p = view.transform_point3(Vec3::new(0.0, 0.0, 0.0));
        assert!((p - Vec3::new(0.0, 0.0, -3.0)).length() < 1e-5);
    }
}
