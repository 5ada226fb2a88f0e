//! Scene description: declarative entry list, registered lights, fly camera.

pub mod entry;
pub mod fly;
pub mod lights;

pub use entry::{MeshKind, SceneEntry, Spin, Transform, scene_entries};
pub use fly::{FlyCamera, MoveDirection};
pub use lights::{
    BULLET_EMISSIVE_INTENSITY, BULLET_LIGHT_POSITIONS, BULLET_SCALE, scene_directional_light,
    scene_point_lights, scene_spotlight,
};
