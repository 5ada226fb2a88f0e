//! Frame orchestration: capture, blur, composite.
//!
//! [`PostFxPipeline`] owns the offscreen targets and both post passes and
//! encodes a whole frame onto one command encoder. The caller supplies the
//! scene drawing as a closure over the capture render pass, so this module
//! never needs to know what geometry the scene contains.

use crate::blur::{BlurPipeline, BlurSource};
use crate::composite::{CompositeParams, CompositePipeline};
use crate::targets::{FrameTargets, TargetError};
use crate::toggles::ToggleState;

/// Owns the full post-processing chain for one window surface.
pub struct PostFxPipeline {
    targets: FrameTargets,
    blur: BlurPipeline,
    composite: CompositePipeline,
    blur_iterations: u32,
    scene_bg: wgpu::BindGroup,
    bright_bg: wgpu::BindGroup,
    blur_bgs: [wgpu::BindGroup; 2],
}

impl PostFxPipeline {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
        blur_iterations: u32,
    ) -> Result<Self, TargetError> {
        let targets = FrameTargets::new(device, width, height, sample_count)?;
        let blur = BlurPipeline::new(device, &targets);
        let composite = CompositePipeline::new(device, surface_format);
        let (scene_bg, bright_bg, blur_bgs) = create_composite_inputs(device, &composite, &targets);
        Ok(Self {
            targets,
            blur,
            composite,
            blur_iterations,
            scene_bg,
            bright_bg,
            blur_bgs,
        })
    }

    pub fn targets(&self) -> &FrameTargets {
        &self.targets
    }

    pub fn blur_iterations(&self) -> u32 {
        self.blur_iterations
    }

    /// Upload this frame's composite parameters.
    pub fn update_params(&self, queue: &wgpu::Queue, toggles: &ToggleState) {
        self.composite
            .update_params(queue, CompositeParams::from_toggles(toggles));
    }

    /// Rebuild every size-dependent resource. No-op at the current size.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Result<(), TargetError> {
        if width == self.targets.width() && height == self.targets.height() {
            return Ok(());
        }
        self.targets.resize(device, width, height)?;
        self.blur.rebuild(device, &self.targets);
        let (scene_bg, bright_bg, blur_bgs) =
            create_composite_inputs(device, &self.composite, &self.targets);
        self.scene_bg = scene_bg;
        self.bright_bg = bright_bg;
        self.blur_bgs = blur_bgs;
        Ok(())
    }

    /// Encode one frame: capture pass (scene drawn by `scene_fn`), the blur
    /// chain, then the composite onto `surface_view`.
    pub fn render_frame<F>(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        clear_color: wgpu::Color,
        scene_fn: F,
    ) where
        F: FnOnce(&mut wgpu::RenderPass),
    {
        {
            let color_attachments = self.targets.capture_color_attachments(clear_color);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("capture"),
                color_attachments: &color_attachments,
                depth_stencil_attachment: Some(self.targets.depth_attachment()),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            scene_fn(&mut pass);
        }

        // Zero iterations hands the unblurred bright pass to the composite.
        let blur_bg = match self.blur.run(encoder, &self.targets, self.blur_iterations) {
            BlurSource::Ping(index) => &self.blur_bgs[index],
            BlurSource::Bright => &self.bright_bg,
        };
        self.composite
            .run(encoder, surface_view, &self.scene_bg, blur_bg);
    }
}

fn create_composite_inputs(
    device: &wgpu::Device,
    composite: &CompositePipeline,
    targets: &FrameTargets,
) -> (wgpu::BindGroup, wgpu::BindGroup, [wgpu::BindGroup; 2]) {
    let scene_bg =
        composite.create_input_bind_group(device, targets.scene_view(), "composite-scene-input");
    let bright_bg =
        composite.create_input_bind_group(device, targets.bright_view(), "composite-bright-input");
    let blur_bgs = [
        composite.create_input_bind_group(device, targets.ping_view(0), "composite-blur-input-0"),
        composite.create_input_bind_group(device, targets.ping_view(1), "composite-blur-input-1"),
    ];
    (scene_bg, bright_bg, blur_bgs)
}
