//! Declarative scene entries.
//!
//! The scene is a flat list of [`SceneEntry`] values consumed by a generic
//! draw-all step. Each entry names a procedural mesh, a static transform,
//! and an optional list of time-driven spins composed onto it, so adding an
//! object is a data edit rather than a new draw block.

use glam::{Mat4, Quat, Vec3};

/// Which procedural mesh an entry is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeshKind {
    /// Ground plane, unit size before scaling.
    Plane,
    /// Unit cube centered on the origin.
    Cube,
    /// Unit UV sphere.
    Sphere,
}

/// Static placement of an entry.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    /// World-space translation.
    pub translation: Vec3,
    /// Static orientation, applied after translation.
    pub rotation: Quat,
    /// Uniform scale.
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: 1.0,
        }
    }
}

/// A continuous rotation composed onto the static transform.
#[derive(Debug, Clone, Copy)]
pub struct Spin {
    /// Rotation axis in the entry's local frame.
    pub axis: Vec3,
    /// Angular speed in degrees per second.
    pub degrees_per_sec: f32,
}

/// One drawable object in the scene.
#[derive(Debug, Clone)]
pub struct SceneEntry {
    /// Stable name, used in diagnostics.
    pub name: &'static str,
    /// Procedural mesh to draw.
    pub mesh: MeshKind,
    /// Static placement.
    pub transform: Transform,
    /// Time-driven spins, applied in order after the static rotation.
    pub spins: Vec<Spin>,
}

impl SceneEntry {
    /// Model matrix at elapsed time `t` seconds:
    /// `T * R_static * spin_0(t) * spin_1(t) * ... * S`.
    pub fn model_matrix(&self, t: f32) -> Mat4 {
        let mut rotation = self.transform.rotation;
        for spin in &self.spins {
            let angle = (spin.degrees_per_sec * t).to_radians();
            rotation *= Quat::from_axis_angle(spin.axis.normalize(), angle);
        }
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.transform.scale),
            rotation,
            self.transform.translation,
        )
    }
}

/// The fixed scene: terrain, two jets, a missile, a gun emplacement, and a
/// spinning moon. Transforms are hand-placed world values.
pub fn scene_entries() -> Vec<SceneEntry> {
    vec![
        SceneEntry {
            name: "terrain",
            mesh: MeshKind::Plane,
            transform: Transform {
                translation: Vec3::new(0.0, -20.0, 0.0),
                rotation: Quat::from_axis_angle(Vec3::NEG_X, 90.0_f32.to_radians()),
                scale: 1.0,
            },
            spins: Vec::new(),
        },
        SceneEntry {
            name: "jet-high",
            mesh: MeshKind::Cube,
            transform: Transform {
                translation: Vec3::new(-18.0, 180.0, -241.0),
                rotation: Quat::from_rotation_z(-35.0 * std::f32::consts::PI / 160.0),
                scale: 4.5,
            },
            spins: Vec::new(),
        },
        SceneEntry {
            name: "missile",
            mesh: MeshKind::Cube,
            transform: Transform {
                translation: Vec3::new(-20.0, 181.5, -80.0),
                rotation: Quat::from_rotation_z(-90.0_f32.to_radians())
                    * Quat::from_rotation_x(90.0_f32.to_radians()),
                scale: 0.07,
            },
            spins: Vec::new(),
        },
        SceneEntry {
            name: "jet-low",
            mesh: MeshKind::Cube,
            transform: Transform {
                translation: Vec3::new(-10.0, 180.0, 55.0),
                rotation: Quat::from_rotation_z(-35.0 * std::f32::consts::PI / 160.0),
                scale: 4.3,
            },
            spins: Vec::new(),
        },
        SceneEntry {
            name: "gun-emplacement",
            mesh: MeshKind::Cube,
            transform: Transform {
                translation: Vec3::new(115.0, -14.0, 34.0),
                rotation: Quat::from_rotation_y(-90.0_f32.to_radians())
                    * Quat::from_rotation_x(180.0_f32.to_radians()),
                scale: 0.65,
            },
            spins: Vec::new(),
        },
        SceneEntry {
            name: "moon",
            mesh: MeshKind::Sphere,
            transform: Transform {
                translation: Vec3::new(-57.0, 300.0, 28.0),
                rotation: Quat::from_rotation_x(90.0_f32.to_radians()),
                scale: 4.0,
            },
            spins: vec![
                Spin {
                    axis: Vec3::Y,
                    degrees_per_sec: 20.0,
                },
                Spin {
                    axis: Vec3::X,
                    degrees_per_sec: 40.0,
                },
            ],
        },
    ]
}
