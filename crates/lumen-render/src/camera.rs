//! Camera uniform and reverse-Z projection.
//!
//! Depth uses reverse-Z: the near plane maps to 1.0 and the far plane to
//! 0.0, which spends floating-point precision on distant geometry. The depth
//! attachment clears to 0.0 and tests GreaterEqual to match.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// Near clip plane distance.
pub const NEAR_PLANE: f32 = 0.1;

/// Far clip plane distance.
pub const FAR_PLANE: f32 = 500.0;

/// Build a reverse-Z right-handed perspective projection.
///
/// `fov_y_deg` is the vertical field of view in degrees (the camera's zoom).
pub fn reverse_z_perspective(fov_y_deg: f32, aspect_ratio: f32) -> Mat4 {
    // Swapping near/far in perspective_rh produces the reverse-Z mapping.
    Mat4::perspective_rh(fov_y_deg.to_radians(), aspect_ratio, FAR_PLANE, NEAR_PLANE)
}

/// Per-frame camera data, 80 bytes, std140-compatible.
///
/// Bound at `@group(0) @binding(0)`, visible to vertex and fragment stages
/// (the fragment needs the camera position for specular).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    /// Combined projection * view matrix.
    pub view_proj: [[f32; 4]; 4],
    /// xyz = camera position (world space), w = padding.
    pub position_pad: [f32; 4],
}

impl CameraUniform {
    /// Pack a view matrix and camera position with the standard projection.
    pub fn new(view: Mat4, position: Vec3, fov_y_deg: f32, aspect_ratio: f32) -> Self {
        let view_proj = reverse_z_perspective(fov_y_deg, aspect_ratio) * view;
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            position_pad: [position.x, position.y, position.z, 0.0],
        }
    }

    /// Identity view-projection at the origin, used before the first frame.
    pub fn identity() -> Self {
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            position_pad: [0.0; 4],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_uniform_size_and_offsets() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 80);
        assert_eq!(std::mem::offset_of!(CameraUniform, view_proj), 0);
        assert_eq!(std::mem::offset_of!(CameraUniform, position_pad), 64);
    }

    #[test]
    fn test_reverse_z_near_maps_to_one() {
        let proj = reverse_z_perspective(45.0, 800.0 / 600.0);
        let p = proj * Vec4::new(0.0, 0.0, -NEAR_PLANE, 1.0);
        let ndc_z = p.z / p.w;
        assert!((ndc_z - 1.0).abs() < 1e-5, "near plane depth {ndc_z}");
    }

    #[test]
    fn test_reverse_z_far_maps_to_zero() {
        let proj = reverse_z_perspective(45.0, 800.0 / 600.0);
        let p = proj * Vec4::new(0.0, 0.0, -FAR_PLANE, 1.0);
        let ndc_z = p.z / p.w;
        assert!(ndc_z.abs() < 1e-5, "far plane depth {ndc_z}");
    }

    #[test]
    fn test_depth_decreases_with_distance() {
        let proj = reverse_z_perspective(45.0, 1.0);
        let near = proj * Vec4::new(0.0, 0.0, -1.0, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert!(near.z / near.w > far.z / far.w);
    }

    #[test]
    fn test_uniform_packs_position() {
        let u = CameraUniform::new(Mat4::IDENTITY, Vec3::new(1.0, 2.0, 3.0), 45.0, 1.0);
        assert_eq!(u.position_pad, [1.0, 2.0, 3.0, 0.0]);
    }
}
