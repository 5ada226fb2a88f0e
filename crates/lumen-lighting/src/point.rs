//! Point light: localized light source with quadratic distance attenuation.
//!
//! The shader binds a fixed-size array of [`MAX_POINT_LIGHTS`] point lights;
//! the lit pipeline uploads every registered light each frame (no culling,
//! the set is small and static).

use bytemuck::{Pod, Zeroable};

/// Number of point-light slots in the lights uniform buffer.
pub const MAX_POINT_LIGHTS: usize = 18;

/// CPU-side point light descriptor.
#[derive(Clone, Debug)]
pub struct PointLight {
    /// Position in world space.
    pub position: glam::Vec3,
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

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: glam::Vec3::ZERO,
            ambient: glam::Vec3::splat(0.05),
            diffuse: glam::Vec3::splat(0.8),
            specular: glam::Vec3::ONE,
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

impl PointLight {
    /// Compute attenuation at a given distance:
    /// `1 / (constant + linear*d + quadratic*d^2)`.
    pub fn attenuation_at(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }

    /// Build the GPU-side uniform from this light's properties.
    pub fn to_uniform(&self) -> PointLightUniform {
        PointLightUniform {
            position_constant: [
                self.position.x,
                self.position.y,
                self.position.z,
                self.constant,
            ],
            ambient_linear: [self.ambient.x, self.ambient.y, self.ambient.z, self.linear],
            diffuse_quadratic: [
                self.diffuse.x,
                self.diffuse.y,
                self.diffuse.z,
                self.quadratic,
            ],
            specular_pad: [self.specular.x, self.specular.y, self.specular.z, 0.0],
        }
    }
}

/// Per-light GPU data, 64 bytes, std140-compatible. Attenuation terms ride
/// in the w channels to avoid padding waste.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PointLightUniform {
    /// xyz = position (world space), w = constant attenuation.
    pub position_constant: [f32; 4],
    /// xyz = ambient color, w = linear attenuation.
    pub ambient_linear: [f32; 4],
    /// xyz = diffuse color, w = quadratic attenuation.
    pub diffuse_quadratic: [f32; 4],
    /// xyz = specular color, w = padding.
    pub specular_pad: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gpu_struct_size_and_offsets() {
        assert_eq!(std::mem::size_of::<PointLightUniform>(), 64);
        assert_eq!(std::mem::offset_of!(PointLightUniform, position_constant), 0);
        assert_eq!(std::mem::offset_of!(PointLightUniform, ambient_linear), 16);
        assert_eq!(std::mem::offset_of!(PointLightUniform, diffuse_quadratic), 32);
        assert_eq!(std::mem::offset_of!(PointLightUniform, specular_pad), 48);
    }

    #[test]
    fn test_attenuation_at_zero_is_inverse_constant() {
        let light = PointLight::default();
        let atten = light.attenuation_at(0.0);
        assert!(
            (atten - 1.0).abs() < 1e-6,
            "attenuation at d=0 should be 1/constant, got {atten}"
        );
    }

    #[test]
    fn test_attenuation_decreases_with_distance() {
        let light = PointLight::default();
        let near = light.attenuation_at(1.0);
        let far = light.attenuation_at(10.0);
        assert!(near > far, "attenuation must fall off: {near} vs {far}");
        assert!(far > 0.0);
    }

    #[test]
    fn test_to_uniform_packs_attenuation_in_w() {
        let light = PointLight {
            position: glam::Vec3::new(-14.0, 213.0, 55.0),
            ..PointLight::default()
        };
        let u = light.to_uniform();
        assert_eq!(u.position_constant, [-14.0, 213.0, 55.0, 1.0]);
        assert!((u.ambient_linear[3] - 0.09).abs() < 1e-6);
        assert!((u.diffuse_quadratic[3] - 0.032).abs() < 1e-6);
        assert_eq!(u.specular_pad[3], 0.0);
    }

    #[test]
    fn test_light_array_fits_uniform_limits() {
        // Whole point-light block must stay well under the 64 KiB uniform
        // buffer binding limit.
        let bytes = MAX_POINT_LIGHTS * std::mem::size_of::<PointLightUniform>();
        assert_eq!(bytes, 1152);
        assert!(bytes < 65536);
    }
}
