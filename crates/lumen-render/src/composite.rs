//! Final composite: bloom add, exponential tone map, gamma, grayscale.
//!
//! A single fullscreen pass reads the resolved scene color and the blurred
//! bright pass and writes the swapchain. Every effect is a uniform flag so
//! toggling never rebuilds pipelines. The math, in order:
//!
//! 1. `color = scene + blur` when bloom is on, else `scene`
//! 2. `mapped = 1 - exp(-color * exposure)` when hdr is on, else `color`
//! 3. `mapped = pow(mapped, 1/2.2)` when gamma is on
//! 4. grayscale replaces the channels with their 0.299/0.587/0.114 dot
//!
//! With every toggle off the pass is an identity copy of the scene color
//! (up to output-format clamping).

use bytemuck::{Pod, Zeroable};

use crate::toggles::ToggleState;

/// Display gamma applied by the gamma toggle.
pub const GAMMA: f32 = 2.2;

/// Composite uniform, 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CompositeParams {
    pub exposure: f32,
    pub bloom: u32,
    pub hdr: u32,
    pub gamma: u32,
    pub grayscale: u32,
    pub _pad: [u32; 3],
}

impl CompositeParams {
    /// Pack the toggle state for upload.
    pub fn from_toggles(toggles: &ToggleState) -> Self {
        Self {
            exposure: toggles.exposure,
            bloom: toggles.bloom as u32,
            hdr: toggles.hdr as u32,
            gamma: toggles.gamma as u32,
            grayscale: toggles.grayscale as u32,
            _pad: [0; 3],
        }
    }
}

const COMPOSITE_SHADER_SOURCE: &str = r#"
struct CompositeParams {
    exposure: f32,
    bloom: u32,
    hdr: u32,
    gamma: u32,
    grayscale: u32,
};

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

@group(0) @binding(0) var<uniform> params: CompositeParams;
@group(1) @binding(0) var scene_tex: texture_2d<f32>;
@group(1) @binding(1) var scene_sampler: sampler;
@group(2) @binding(0) var blur_tex: texture_2d<f32>;
@group(2) @binding(1) var blur_sampler: sampler;

@vertex
fn vs_fullscreen(@builtin(vertex_index) idx: u32) -> VertexOutput {
    let uv = vec2<f32>(f32((idx << 1u) & 2u), f32(idx & 2u));
    var out: VertexOutput;
    out.position = vec4<f32>(uv * 2.0 - 1.0, 0.0, 1.0);
    out.uv = vec2<f32>(uv.x, 1.0 - uv.y);
    return out;
}

@fragment
fn fs_composite(in: VertexOutput) -> @location(0) vec4<f32> {
    var color = textureSample(scene_tex, scene_sampler, in.uv).rgb;
    let blur = textureSample(blur_tex, blur_sampler, in.uv).rgb;
    if (params.bloom == 1u) {
        color += blur;
    }
    var mapped = color;
    if (params.hdr == 1u) {
        mapped = vec3<f32>(1.0) - exp(-color * params.exposure);
    }
    if (params.gamma == 1u) {
        mapped = pow(mapped, vec3<f32>(1.0 / 2.2));
    }
    if (params.grayscale == 1u) {
        let g = dot(mapped, vec3<f32>(0.299, 0.587, 0.114));
        mapped = vec3<f32>(g);
    }
    return vec4<f32>(mapped, 1.0);
}
"#;

/// The composite pass: one pipeline, a params uniform, and a shared texture
/// bind group layout for the scene and blur inputs.
pub struct CompositePipeline {
    pipeline: wgpu::RenderPipeline,
    texture_bgl: wgpu::BindGroupLayout,
    params_buffer: wgpu::Buffer,
    params_bg: wgpu::BindGroup,
    sampler: wgpu::Sampler,
}

impl CompositePipeline {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("composite-shader"),
            source: wgpu::ShaderSource::Wgsl(COMPOSITE_SHADER_SOURCE.into()),
        });

        let params_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("composite-params-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(32),
                },
                count: None,
            }],
        });

        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("composite-texture-bgl"),
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
            label: Some("composite-layout"),
            bind_group_layouts: &[&params_bgl, &texture_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("composite"),
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
                entry_point: Some("fs_composite"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        use wgpu::util::DeviceExt;
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("composite-params"),
            contents: bytemuck::cast_slice(&[CompositeParams::from_toggles(
                &ToggleState::default(),
            )]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let params_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("composite-params-bg"),
            layout: &params_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: params_buffer.as_entire_binding(),
            }],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("composite-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            pipeline,
            texture_bgl,
            params_buffer,
            params_bg,
            sampler,
        }
    }

    /// Create a texture input bind group for the scene or blur slot.
    pub fn create_input_bind_group(
        &self,
        device: &wgpu::Device,
        view: &wgpu::TextureView,
        label: &str,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout: &self.texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        })
    }

    /// Upload the composite uniform. Must happen before the frame's encoder
    /// is submitted; `write_buffer` lands before any pass in it.
    pub fn update_params(&self, queue: &wgpu::Queue, params: CompositeParams) {
        queue.write_buffer(&self.params_buffer, 0, bytemuck::cast_slice(&[params]));
    }

    /// Encode the composite pass onto `surface_view`.
    pub fn run(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &wgpu::TextureView,
        scene_bg: &wgpu::BindGroup,
        blur_bg: &wgpu::BindGroup,
    ) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("composite"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: surface_view,
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
        pass.set_bind_group(0, &self.params_bg, &[]);
        pass.set_bind_group(1, scene_bg, &[]);
        pass.set_bind_group(2, blur_bg, &[]);
        pass.draw(0..3, 0..1);
    }
}
