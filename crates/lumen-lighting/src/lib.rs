//! Light types and their GPU uniform representations.
//!
//! Three light kinds feed the lit pipeline: one directional light, a fixed
//! array of point lights, and one camera-following spotlight. Each has a
//! CPU-side struct and a std140-compatible POD uniform built via
//! `to_uniform()`.

mod directional;
mod point;
mod spot;

pub use directional::{DirectionalLight, DirectionalLightUniform};
pub use point::{MAX_POINT_LIGHTS, PointLight, PointLightUniform};
pub use spot::{SpotLight, SpotLightUniform};
