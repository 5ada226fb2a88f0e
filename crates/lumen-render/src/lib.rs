//! GPU rendering core: device context, HDR capture targets, and the
//! bloom/tonemap post-processing chain.
//!
//! The per-frame flow is owned by [`PostFxPipeline`]: a multisampled HDR
//! capture pass invokes a caller-supplied scene closure, the bright-pass
//! attachment is blurred by ping-ponging a separable Gaussian, and a final
//! composite pass tone-maps onto the swapchain.

pub mod blur;
pub mod camera;
pub mod composite;
pub mod emissive;
pub mod gpu;
pub mod lit;
pub mod mesh;
pub mod post;
pub mod skybox;
pub mod targets;
pub mod texture;
pub mod toggles;

pub use blur::{BlurPipeline, BlurSource, final_blur_index};
pub use camera::{CameraUniform, FAR_PLANE, NEAR_PLANE, reverse_z_perspective};
pub use composite::{CompositeParams, CompositePipeline, GAMMA};
pub use emissive::{BulletInstance, EmissivePipeline};
pub use gpu::{RenderContext, RenderContextError, SurfaceError, init_render_context_blocking};
pub use lit::{LightsUniform, LitPipeline, ModelUniform, SHININESS};
pub use mesh::{MeshBuffer, Vertex, cube_mesh, plane_mesh, uv_sphere_mesh};
pub use post::PostFxPipeline;
pub use skybox::SkyboxPipeline;
pub use targets::{COLOR_ATTACHMENT_COUNT, FrameTargets, TargetError};
pub use texture::Material;
pub use toggles::{EXPOSURE_STEP, EdgeTrigger, PostFxController, ToggleInput, ToggleState};
