//! Separable Gaussian blur over the bright-pass texture.
//!
//! The blur ping-pongs between the two single-sample HDR textures owned by
//! [`FrameTargets`]: iteration 0 reads the resolved bright pass, every later
//! iteration reads the texture the previous one wrote, alternating blur
//! direction each time (horizontal first). With zero iterations the bright
//! pass is left untouched and the composite receives no blur input.

use bytemuck::{Pod, Zeroable};

use crate::targets::{FrameTargets, HDR_FORMAT};

/// 9-tap Gaussian weights (center + 4 mirrored taps), normalized.
pub const GAUSSIAN_WEIGHTS: [f32; 5] = [
    0.227_027_03,
    0.194_594_6,
    0.121_621_62,
    0.054_054_055,
    0.016_216_216,
];

/// Where a blur iteration reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlurSource {
    /// The resolved bright-pass attachment (first iteration only).
    Bright,
    /// One of the two ping-pong textures.
    Ping(usize),
}

/// Ping-pong index an iteration reads from.
pub fn blur_read_source(iteration: u32) -> BlurSource {
    if iteration == 0 {
        BlurSource::Bright
    } else {
        BlurSource::Ping((iteration % 2) as usize)
    }
}

/// Ping-pong index an iteration writes to.
pub fn blur_write_index(iteration: u32) -> usize {
    ((iteration + 1) % 2) as usize
}

/// Whether an iteration blurs horizontally (even) or vertically (odd).
pub fn blur_is_horizontal(iteration: u32) -> bool {
    iteration % 2 == 0
}

/// Ping-pong index holding the final blurred image after `iterations`
/// passes, or `None` when no blur ran.
pub fn final_blur_index(iterations: u32) -> Option<usize> {
    if iterations == 0 {
        None
    } else {
        Some((iterations % 2) as usize)
    }
}

// Padded with scalars on both sides; a vec3 pad in WGSL aligns to 16 and
// would grow the shader struct to 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct BlurDirection {
    horizontal: u32,
    _pad: [u32; 3],
}

const BLUR_SHADER_SOURCE: &str = r#"
struct BlurDirection {
    horizontal: u32,
    _pad0: u32,
    _pad1: u32,
    _pad2: u32,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0) var<uniform> direction: BlurDirection;
@group(1) @binding(0) var input_tex: texture_2d<f32>;
@group(1) @binding(1) var input_sampler: sampler;

@vertex
fn vs_fullscreen(@builtin(vertex_index) idx: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

@fragment
fn fs_blur(in: VertexOutput) -> @location(0) vec4<f32> {
    var weights = array<f32, 5>(0.2270270270, 0.1945945946, 0.1216216216, 0.0540540541, 0.0162162162);
    let texel = 1.0 / vec2<f32>(textureDimensions(input_tex));
    var step = vec2<f32>(texel.x, 0.0);
    if (direction.horizontal == 0u) {
        step = vec2<f32>(0.0, texel.y);
    }
    var result = textureSample(input_tex, input_sampler, in.uv).rgb * weights[0];
    for (var i = 1; i < 5; i++) {
        let offset = step * f32(i);
        result += textureSample(input_tex, input_sampler, in.uv + offset).rgb * weights[i];
        result += textureSample(input_tex, input_sampler, in.uv - offset).rgb * weights[i];
    }
    return vec4<f32>(result, 1.0);
}
"#;

/// The separable blur: one render pipeline, two pre-built direction bind
/// groups, and per-source texture bind groups rebuilt on resize.
pub struct BlurPipeline {
    pipeline: wgpu::RenderPipeline,
    texture_bgl: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    horizontal_bg: wgpu::BindGroup,
    vertical_bg: wgpu::BindGroup,
    bright_bg: wgpu::BindGroup,
    ping_bgs: [wgpu::BindGroup; 2],
}

impl BlurPipeline {
    pub fn new(device: &wgpu::Device, targets: &FrameTargets) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("blur-shader"),
            source: wgpu::ShaderSource::Wgsl(BLUR_SHADER_SOURCE.into()),
        });

        let direction_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blur-direction-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(16),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("blur-texture-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("blur-layout"),
            bind_group_layouts: &[&direction_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("blur"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_fullscreen"),
                buffers: &[],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_blur"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: HDR_FORMAT,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("blur-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        // Both direction uniforms are uploaded once; per-iteration direction
        // switching is a bind group swap, not a buffer write.
        let make_direction_bg = |horizontal: u32, label: &str| {
            use wgpu::util::DeviceExt;
            let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&[BlurDirection {
                    horizontal,
                    _pad: [0; 3],
                }]),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: &direction_bgl,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })
        };
        let horizontal_bg = make_direction_bg(1, "blur-horizontal");
        let vertical_bg = make_direction_bg(0, "blur-vertical");

        let (bright_bg, ping_bgs) =
            create_source_bind_groups(device, &texture_bgl, &sampler, targets);

        Self {
            pipeline,
            texture_bgl,
            sampler,
            horizontal_bg,
            vertical_bg,
            bright_bg,
            ping_bgs,
        }
    }

    /// Rebuild the texture bind groups after the targets were recreated.
    pub fn rebuild(&mut self, device: &wgpu::Device, targets: &FrameTargets) {
        let (bright_bg, ping_bgs) =
            create_source_bind_groups(device, &self.texture_bgl, &self.sampler, targets);
        self.bright_bg = bright_bg;
        self.ping_bgs = ping_bgs;
    }

    /// Encode `iterations` blur passes over the bright-pass texture and
    /// return where the blurred image ended up. Zero iterations encode
    /// nothing and hand the unblurred bright pass back.
    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        targets: &FrameTargets,
        iterations: u32,
    ) -> BlurSource {
        for i in 0..iterations {
            let source_bg = match blur_read_source(i) {
                BlurSource::Bright => &self.bright_bg,
                BlurSource::Ping(index) => &self.ping_bgs[index],
            };
            let direction_bg = if blur_is_horizontal(i) {
                &self.horizontal_bg
            } else {
                &self.vertical_bg
            };
            let target_view = targets.ping_view(blur_write_index(i));

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("blur"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, direction_bg, &[]);
            pass.set_bind_group(1, source_bg, &[]);
            pass.draw(0..3, 0..1);
        }
        match final_blur_index(iterations) {
            Some(index) => BlurSource::Ping(index),
            None => BlurSource::Bright,
        }
    }
}

fn create_source_bind_groups(
    device: &wgpu::Device,
    texture_bgl: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    targets: &FrameTargets,
) -> (wgpu::BindGroup, [wgpu::BindGroup; 2]) {
    let make = |view: &wgpu::TextureView, label: &str| {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        })
    };
    (
        make(targets.bright_view(), "blur-src-bright"),
        [
            make(targets.ping_view(0), "blur-src-ping-0"),
            make(targets.ping_view(1), "blur-src-ping-1"),
        ],
    )
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
    fn test_direction_uniform_is_sixteen_bytes() {
        assert_eq!(std::mem::size_of::<BlurDirection>(), 16);
    }

    #[test]
    fn test_pipeline_creation_passes_validation() {
        let Some(device) = create_test_device() else {
            return;
        };
        let targets = FrameTargets::new(&device, 64, 64, 4).unwrap();
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
        let _blur = BlurPipeline::new(&device, &targets);
        let error = pollster::block_on(scope.pop());
        assert!(error.is_none(), "blur pipeline failed validation: {error:?}");
    }

    #[test]
    fn test_zero_iterations_leaves_no_blur() {
        assert_eq!(final_blur_index(0), None);
    }

    #[test]
    fn test_default_iteration_count_lands_on_ping_zero() {
        assert_eq!(final_blur_index(12), Some(0));
    }

    #[test]
    fn test_odd_iterations_land_on_ping_one() {
        assert_eq!(final_blur_index(1), Some(1));
        assert_eq!(final_blur_index(7), Some(1));
    }

    #[test]
    fn test_first_iteration_reads_bright_horizontally() {
        assert_eq!(blur_read_source(0), BlurSource::Bright);
        assert!(blur_is_horizontal(0));
    }

    #[test]
    fn test_direction_alternates() {
        assert!(!blur_is_horizontal(1));
        assert!(blur_is_horizontal(2));
        assert!(!blur_is_horizontal(3));
    }

    #[test]
    fn test_each_iteration_reads_previous_write() {
        for i in 1..16 {
            let BlurSource::Ping(read) = blur_read_source(i) else {
                panic!("iteration {i} must read a ping texture");
            };
            assert_eq!(
                read,
                blur_write_index(i - 1),
                "iteration {i} must read what iteration {} wrote",
                i - 1
            );
        }
    }

    #[test]
    fn test_read_and_write_never_alias() {
        for i in 1..16 {
            let BlurSource::Ping(read) = blur_read_source(i) else {
                unreachable!();
            };
            assert_ne!(read, blur_write_index(i), "iteration {i} aliases");
        }
    }

    #[test]
    fn test_final_index_matches_last_write() {
        for n in 1..16 {
            assert_eq!(final_blur_index(n), Some(blur_write_index(n - 1)));
        }
    }

    #[test]
    fn test_gaussian_weights_sum_to_approximately_one() {
        let sum = GAUSSIAN_WEIGHTS[0] + 2.0 * GAUSSIAN_WEIGHTS[1..].iter().sum::<f32>();
        assert!((sum - 1.0).abs() < 0.01, "weights sum to {sum}");
    }

    #[test]
    fn test_weights_decrease_from_center() {
        for pair in GAUSSIAN_WEIGHTS.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }
}
