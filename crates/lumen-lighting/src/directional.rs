//! Directional light: a single infinitely-distant light source.
//!
//! [`DirectionalLight`] describes the CPU-side light properties;
//! [`DirectionalLightUniform`] is the GPU-side representation written into
//! the lights uniform buffer each frame.

use bytemuck::{Pod, Zeroable};

/// CPU-side directional light description.
#[derive(Clone, Debug)]
pub struct DirectionalLight {
    /// Direction the light travels, pointing FROM the light. Normalized in
    /// the shader, so callers may pass unnormalized vectors.
    pub direction: glam::Vec3,
    /// Ambient contribution, linear RGB.
    pub ambient: glam::Vec3,
    /// Diffuse contribution, linear RGB.
    pub diffuse: glam::Vec3,
    /// Specular contribution, linear RGB.
    pub specular: glam::Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: glam::Vec3::new(0.0, -1.0, 0.0),
            ambient: glam::Vec3::splat(0.05),
            diffuse: glam::Vec3::splat(0.4),
            specular: glam::Vec3::splat(0.5),
        }
    }
}

impl DirectionalLight {
    /// Build the GPU-side uniform from this light's properties.
    pub fn to_uniform(&self) -> DirectionalLightUniform {
        DirectionalLightUniform {
            direction_pad: [self.direction.x, self.direction.y, self.direction.z, 0.0],
            ambient_pad: [self.ambient.x, self.ambient.y, self.ambient.z, 0.0],
            diffuse_pad: [self.diffuse.x, self.diffuse.y, self.diffuse.z, 0.0],
            specular_pad: [self.specular.x, self.specular.y, self.specular.z, 0.0],
        }
    }
}

/// GPU-side representation, 64 bytes, std140-compatible (four vec4<f32>).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct DirectionalLightUniform {
    /// xyz = direction, w = padding.
    pub direction_pad: [f32; 4],
    /// xyz = ambient color, w = padding.
    pub ambient_pad: [f32; 4],
    /// xyz = diffuse color, w = padding.
    pub diffuse_pad: [f32; 4],
    /// xyz = specular color, w = padding.
    pub specular_pad: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_buffer_layout_matches_shader() {
        assert_eq!(std::mem::size_of::<DirectionalLightUniform>(), 64);
        assert_eq!(
            std::mem::offset_of!(DirectionalLightUniform, direction_pad),
            0
        );
        assert_eq!(std::mem::offset_of!(DirectionalLightUniform, ambient_pad), 16);
        assert_eq!(std::mem::offset_of!(DirectionalLightUniform, diffuse_pad), 32);
        assert_eq!(
            std::mem::offset_of!(DirectionalLightUniform, specular_pad),
            48
        );
    }

    #[test]
    fn test_to_uniform_packs_correctly() {
        let light = DirectionalLight {
            direction: glam::Vec3::new(-0.7, -1.0, -0.4),
            ambient: glam::Vec3::splat(0.09),
            diffuse: glam::Vec3::splat(0.4),
            specular: glam::Vec3::splat(0.5),
        };
        let u = light.to_uniform();
        assert_eq!(u.direction_pad, [-0.7, -1.0, -0.4, 0.0]);
        assert_eq!(u.ambient_pad, [0.09, 0.09, 0.09, 0.0]);
        assert_eq!(u.diffuse_pad, [0.4, 0.4, 0.4, 0.0]);
        assert_eq!(u.specular_pad, [0.5, 0.5, 0.5, 0.0]);
    }
}
