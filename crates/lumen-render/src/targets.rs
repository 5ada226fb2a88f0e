//! Offscreen render targets for the HDR capture and blur chain.
//!
//! [`FrameTargets`] owns the multisampled capture target (three color
//! attachments plus depth) and the single-sample ping-pong pair used by the
//! blur. Each multisampled color attachment resolves into a single-sample
//! texture of the same format; only resolved textures are ever sampled.

/// HDR color format for the scene and bright-pass attachments.
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// LDR format for the auxiliary attachment (frame capture / readback).
pub const AUX_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Depth format, reverse-Z (clear 0.0, GreaterEqual).
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Number of color attachments in the capture pass.
pub const COLOR_ATTACHMENT_COUNT: usize = 3;

/// Error type for render target construction.
#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    /// The requested target configuration cannot be built.
    #[error("incomplete render target: {reason} ({width}x{height}, {samples} samples)")]
    Incomplete {
        reason: &'static str,
        width: u32,
        height: u32,
        samples: u32,
    },
}

struct ColorTarget {
    msaa_view: wgpu::TextureView,
    resolved: wgpu::Texture,
    resolved_view: wgpu::TextureView,
}

/// The capture target and blur ping-pong pair.
pub struct FrameTargets {
    scene: ColorTarget,
    bright: ColorTarget,
    aux: ColorTarget,
    depth_view: wgpu::TextureView,
    ping: [wgpu::Texture; 2],
    ping_views: [wgpu::TextureView; 2],
    width: u32,
    height: u32,
    sample_count: u32,
}

impl FrameTargets {
    /// Build all targets at the given size.
    ///
    /// `sample_count` must be a multisample count (2, 4, or 8) and the
    /// dimensions must be non-zero, otherwise the set is incomplete.
    pub fn new(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Result<Self, TargetError> {
        if width == 0 || height == 0 {
            return Err(TargetError::Incomplete {
                reason: "zero-sized target",
                width,
                height,
                samples: sample_count,
            });
        }
        if !matches!(sample_count, 2 | 4 | 8) {
            return Err(TargetError::Incomplete {
                reason: "unsupported sample count",
                width,
                height,
                samples: sample_count,
            });
        }

        let scene = create_color_target(device, "scene", HDR_FORMAT, width, height, sample_count);
        let bright = create_color_target(device, "bright", HDR_FORMAT, width, height, sample_count);
        let aux = create_color_target(device, "aux", AUX_FORMAT, width, height, sample_count);

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("capture-depth"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        let make_ping = |i: usize| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(&format!("blur-ping-{i}")),
                size: extent(width, height),
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: HDR_FORMAT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
        };
        let ping = [make_ping(0), make_ping(1)];
        let ping_views = [
            ping[0].create_view(&wgpu::TextureViewDescriptor::default()),
            ping[1].create_view(&wgpu::TextureViewDescriptor::default()),
        ];

        log::debug!("Frame targets built: {width}x{height}, {sample_count} samples");

        Ok(Self {
            scene,
            bright,
            aux,
            depth_view,
            ping,
            ping_views,
            width,
            height,
            sample_count,
        })
    }

    /// Rebuild all targets at a new size. No-op if dimensions are unchanged.
    pub fn resize(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> Result<(), TargetError> {
        if self.width == width && self.height == height {
            return Ok(());
        }
        *self = Self::new(device, width, height, self.sample_count)?;
        Ok(())
    }

    /// The three color attachments of the capture pass, in attachment order
    /// (scene, bright, aux), each resolving into its single-sample texture.
    pub fn capture_color_attachments(
        &self,
        clear_color: wgpu::Color,
    ) -> [Option<wgpu::RenderPassColorAttachment<'_>>; COLOR_ATTACHMENT_COUNT] {
        fn attach(
            target: &ColorTarget,
            clear: wgpu::Color,
        ) -> Option<wgpu::RenderPassColorAttachment<'_>> {
            Some(wgpu::RenderPassColorAttachment {
                view: &target.msaa_view,
                resolve_target: Some(&target.resolved_view),
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })
        }
        [
            attach(&self.scene, clear_color),
            attach(&self.bright, wgpu::Color::BLACK),
            attach(&self.aux, wgpu::Color::BLACK),
        ]
    }

    /// The depth attachment of the capture pass. Clears to 0.0 for reverse-Z.
    pub fn depth_attachment(&self) -> wgpu::RenderPassDepthStencilAttachment<'_> {
        wgpu::RenderPassDepthStencilAttachment {
            view: &self.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(0.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }
    }

    /// Resolved single-sample scene color, sampled by the composite.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.scene.resolved_view
    }

    /// Resolved single-sample bright-pass color, input to the first blur.
    pub fn bright_view(&self) -> &wgpu::TextureView {
        &self.bright.resolved_view
    }

    /// Resolved auxiliary LDR texture, for frame capture.
    pub fn aux_texture(&self) -> &wgpu::Texture {
        &self.aux.resolved
    }

    /// Blur ping-pong texture view by index.
    pub fn ping_view(&self, index: usize) -> &wgpu::TextureView {
        &self.ping_views[index]
    }

    /// Blur ping-pong texture by index.
    pub fn ping_texture(&self, index: usize) -> &wgpu::Texture {
        &self.ping[index]
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

fn create_color_target(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    sample_count: u32,
) -> ColorTarget {
    let msaa = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&format!("capture-{label}-msaa")),
        size: extent(width, height),
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let resolved = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(&format!("capture-{label}-resolved")),
        size: extent(width, height),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let msaa_view = msaa.create_view(&wgpu::TextureViewDescriptor::default());
    let resolved_view = resolved.create_view(&wgpu::TextureViewDescriptor::default());
    ColorTarget {
        msaa_view,
        resolved,
        resolved_view,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_device() -> Option<wgpu::Device> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });
            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    force_fallback_adapter: false,
                    compatible_surface: None,
                })
                .await
                .ok()?;
            let (device, _queue) = adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()?;
            Some(device)
        })
    }

    #[test]
    fn test_construction_at_default_size() {
        let Some(device) = create_test_device() else {
            return;
        };
        let targets = FrameTargets::new(&device, 800, 600, 4).unwrap();
        assert_eq!(targets.width(), 800);
        assert_eq!(targets.height(), 600);
        assert_eq!(targets.sample_count(), 4);
    }

    #[test]
    fn test_capture_pass_has_three_color_attachments_plus_depth() {
        let Some(device) = create_test_device() else {
            return;
        };
        let targets = FrameTargets::new(&device, 800, 600, 4).unwrap();
        let attachments = targets.capture_color_attachments(wgpu::Color::BLACK);
        assert_eq!(attachments.len(), COLOR_ATTACHMENT_COUNT);
        assert!(attachments.iter().all(|a| a.is_some()));
        for a in attachments.iter().flatten() {
            assert!(a.resolve_target.is_some());
        }
        let depth = targets.depth_attachment();
        let depth_ops = depth.depth_ops.unwrap();
        assert_eq!(depth_ops.load, wgpu::LoadOp::Clear(0.0));
    }

    #[test]
    fn test_capture_clear_color_only_reaches_scene_attachment() {
        let Some(device) = create_test_device() else {
            return;
        };
        let targets = FrameTargets::new(&device, 64, 64, 4).unwrap();
        let clear = wgpu::Color {
            r: 0.1,
            g: 0.2,
            b: 0.3,
            a: 1.0,
        };
        let attachments = targets.capture_color_attachments(clear);
        let loads: Vec<_> = attachments
            .iter()
            .flatten()
            .map(|a| a.ops.load)
            .collect();
        assert_eq!(loads[0], wgpu::LoadOp::Clear(clear));
        assert_eq!(loads[1], wgpu::LoadOp::Clear(wgpu::Color::BLACK));
        assert_eq!(loads[2], wgpu::LoadOp::Clear(wgpu::Color::BLACK));
    }

    #[test]
    fn test_attachment_formats() {
        let Some(device) = create_test_device() else {
            return;
        };
        let targets = FrameTargets::new(&device, 64, 64, 4).unwrap();
        assert_eq!(targets.scene.resolved.format(), HDR_FORMAT);
        assert_eq!(targets.bright.resolved.format(), HDR_FORMAT);
        assert_eq!(targets.aux_texture().format(), AUX_FORMAT);
        assert_eq!(targets.ping_texture(0).format(), HDR_FORMAT);
        assert_eq!(targets.ping_texture(1).format(), HDR_FORMAT);
    }

    #[test]
    fn test_zero_size_is_incomplete() {
        let Some(device) = create_test_device() else {
            return;
        };
        let result = FrameTargets::new(&device, 0, 600, 4);
        assert!(matches!(result, Err(TargetError::Incomplete { .. })));
    }

    #[test]
    fn test_bad_sample_count_is_incomplete() {
        let Some(device) = create_test_device() else {
            return;
        };
        for samples in [0, 1, 3, 16] {
            let result = FrameTargets::new(&device, 800, 600, samples);
            assert!(
                matches!(result, Err(TargetError::Incomplete { .. })),
                "sample count {samples} should be rejected"
            );
        }
    }

    #[test]
    fn test_resize_rebuilds_targets() {
        let Some(device) = create_test_device() else {
            return;
        };
        let mut targets = FrameTargets::new(&device, 800, 600, 4).unwrap();
        targets.resize(&device, 1280, 720).unwrap();
        assert_eq!((targets.width(), targets.height()), (1280, 720));
        assert_eq!(targets.sample_count(), 4);
    }

    #[test]
    fn test_resize_same_size_is_noop() {
        let Some(device) = create_test_device() else {
            return;
        };
        let mut targets = FrameTargets::new(&device, 800, 600, 4).unwrap();
        targets.resize(&device, 800, 600).unwrap();
        assert_eq!((targets.width(), targets.height()), (800, 600));
    }

    #[test]
    fn test_error_message_names_configuration() {
        let err = TargetError::Incomplete {
            reason: "unsupported sample count",
            width: 800,
            height: 600,
            samples: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("800x600"));
        assert!(msg.contains("3 samples"));
    }
}
