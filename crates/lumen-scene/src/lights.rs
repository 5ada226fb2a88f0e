//! The registered light set: one directional light, 18 bullet point lights
//! tracing an arc across the sky, and a camera-following spotlight.

use glam::Vec3;
use lumen_lighting::{DirectionalLight, PointLight, SpotLight};

/// World positions of the tracer-bullet point lights.
pub const BULLET_LIGHT_POSITIONS: [[f32; 3]; 18] = [
    [-14.0, 213.0, 55.0],
    [-13.0, 207.0, 53.0],
    [-18.0, 205.0, 54.0],
    [-21.0, 190.0, 59.0],
    [-10.0, 178.0, 55.0],
    [0.0, 164.0, 52.0],
    [11.0, 150.0, 50.0],
    [23.0, 139.0, 48.5],
    [28.0, 125.0, 48.2],
    [36.0, 115.0, 49.57],
    [48.0, 101.0, 52.2],
    [54.0, 91.0, 46.1],
    [62.0, 79.0, 45.3],
    [70.0, 62.0, 43.0],
    [68.0, 52.0, 47.0],
    [73.0, 43.0, 49.0],
    [77.0, 33.0, 52.0],
    [81.0, 22.0, 54.0],
];

/// Uniform scale of the emissive bullet cubes.
pub const BULLET_SCALE: f32 = 0.45;

/// Brightness multiplier applied to the bullet base color so the cubes clear
/// the bloom luminance threshold.
pub const BULLET_EMISSIVE_INTENSITY: f32 = 5.0;

/// The scene's single directional light.
pub fn scene_directional_light() -> DirectionalLight {
    DirectionalLight {
        direction: Vec3::new(-0.7, -1.0, -0.4),
        ambient: Vec3::splat(0.09),
        diffuse: Vec3::splat(0.4),
        specular: Vec3::splat(0.5),
    }
}

/// One point light per bullet position. All share the same tracer color;
/// diffuse and specular are pre-scaled so the lights read as glowing embers
/// rather than area floodlights.
pub fn scene_point_lights() -> Vec<PointLight> {
    let ambient = Vec3::new(1.0, 0.05, 0.01);
    let diffuse = Vec3::new(1.0, 0.05, 0.01) * 0.05;
    let specular = Vec3::new(5.5, 3.7, 1.0) * 0.01;
    BULLET_LIGHT_POSITIONS
        .iter()
        .map(|&p| PointLight {
            position: Vec3::from_array(p),
            ambient,
            diffuse,
            specular,
            ..PointLight::default()
        })
        .collect()
}

/// The camera-following spotlight, warm white with a soft edge.
pub fn scene_spotlight() -> SpotLight {
    SpotLight {
        ambient: Vec3::splat(0.2),
        diffuse: Vec3::new(1.0, 0.894, 0.627),
        specular: Vec3::new(1.0, 0.894, 0.627),
        ..SpotLight::default()
    }
}
