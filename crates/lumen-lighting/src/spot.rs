//! Spotlight: a cone light that follows the camera like a head lamp.
//!
//! Cutoff angles are stored as cosines so the shader compares them directly
//! against `dot(light_dir, spot_dir)` without a per-fragment `acos`.

use bytemuck::{Pod, Zeroable};

/// CPU-side spotlight descriptor.
#[derive(Clone, Debug)]
pub struct SpotLight {
    /// Position in world space (typically the camera position).
    pub position: glam::Vec3,
    /// Direction the cone points (typically the camera front vector).
    pub direction: glam::Vec3,
    /// Cosine of the inner cutoff angle (full intensity inside).
    pub cutoff_cos: f32,
    /// Cosine of the outer cutoff angle (zero intensity outside).
    pub outer_cutoff_cos: f32,
    /// Ambient contribution, linear RGB.
    pub ambient: glam::Vec3,
    /// Diffuse contribution, linear RGB.
    pub diffuse: glam::Vec3,
    /// Specular contribution, linear RGB.
    pub specular: glam::Vec3,
    /// Constant attenuation term.
    pub constant: f32,
    /// Linear attenuation term.
    pub linear: f32,
    /// Quadratic attenuation term.
    pub quadratic: f32,
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: glam::Vec3::ZERO,
            direction: glam::Vec3::NEG_Z,
            cutoff_cos: 12.5_f32.to_radians().cos(),
            outer_cutoff_cos: 17.0_f32.to_radians().cos(),
            ambient: glam::Vec3::splat(0.2),
            diffuse: glam::Vec3::ONE,
            specular: glam::Vec3::ONE,
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

impl SpotLight {
    /// Move the cone to follow a camera pose.
    pub fn follow(&mut self, position: glam::Vec3, direction: glam::Vec3) {
        self.position = position;
        self.direction = direction;
    }

    /// Build the GPU-side uniform from this light's properties.
    pub fn to_uniform(&self) -> SpotLightUniform {
        SpotLightUniform {
            position_cutoff: [
                self.position.x,
                self.position.y,
                self.position.z,
                self.cutoff_cos,
            ],
            direction_outer_cutoff: [
                self.direction.x,
                self.direction.y,
                self.direction.z,
                self.outer_cutoff_cos,
            ],
            ambient_pad: [self.ambient.x, self.ambient.y, self.ambient.z, 0.0],
            diffuse_pad: [self.diffuse.x, self.diffuse.y, self.diffuse.z, 0.0],
            specular_pad: [self.specular.x, self.specular.y, self.specular.z, 0.0],
            attenuation_pad: [self.constant, self.linear, self.quadratic, 0.0],
        }
    }
}

/// GPU-side representation, 96 bytes, std140-compatible (six vec4<f32>).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct SpotLightUniform {
    /// xyz = position (world space), w = cos(inner cutoff).
    pub position_cutoff: [f32; 4],
    /// xyz = direction, w = cos(outer cutoff).
    pub direction_outer_cutoff: [f32; 4],
    /// xyz = ambient color, w = padding.
    pub ambient_pad: [f32; 4],
    /// xyz = diffuse color, w = padding.
    pub diffuse_pad: [f32; 4],
    /// xyz = specular color, w = padding.
    pub specular_pad: [f32; 4],
    /// x = constant, y = linear, z = quadratic, w = padding.
    pub attenuation_pad: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_struct_size_and_offsets() {
        assert_eq!(std::mem::size_of::<SpotLightUniform>(), 96);
        assert_eq!(std::mem::offset_of!(SpotLightUniform, position_cutoff), 0);
        assert_eq!(
            std::mem::offset_of!(SpotLightUniform, direction_outer_cutoff),
            16
        );
        assert_eq!(std::mem::offset_of!(SpotLightUniform, attenuation_pad), 80);
    }

    #[test]
    fn test_inner_cutoff_cos_exceeds_outer() {
        // Smaller angle means larger cosine; the soft edge interpolates
        // between the two.
        let light = SpotLight::default();
        assert!(light.cutoff_cos > light.outer_cutoff_cos);
        assert!(light.cutoff_cos < 1.0);
        assert!(light.outer_cutoff_cos > 0.0);
    }

    #[test]
    fn test_follow_updates_pose() {
        let mut light = SpotLight::default();
        let pos = glam::Vec3::new(1.0, 2.0, 3.0);
        let dir = glam::Vec3::new(0.0, -1.0, 0.0);
        light.follow(pos, dir);
        let u = light.to_uniform();
        assert_eq!(&u.position_cutoff[..3], &[1.0, 2.0, 3.0]);
        assert_eq!(&u.direction_outer_cutoff[..3], &[0.0, -1.0, 0.0]);
    }

    #[test]
    fn test_to_uniform_keeps_cutoffs_in_w() {
        let light = SpotLight::default();
        let u = light.to_uniform();
        assert!((u.position_cutoff[3] - 12.5_f32.to_radians().cos()).abs() < 1e-6);
        assert!((u.direction_outer_cutoff[3] - 17.0_f32.to_radians().cos()).abs() < 1e-6);
        assert_eq!(u.attenuation_pad, [1.0, 0.09, 0.032, 0.0]);
    }
}
