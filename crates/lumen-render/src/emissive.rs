//! Unlit emissive pass for the tracer bullets.
//!
//! Bullets are small instanced cubes drawn at full emissive intensity so
//! they exceed the bright-pass threshold and feed the bloom chain. They
//! share the capture pass with the lit scene and write all three
//! attachments.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::camera::CameraUniform;
use crate::mesh::Vertex;
use crate::targets::{AUX_FORMAT, DEPTH_FORMAT, HDR_FORMAT};

/// One bullet instance: world position packed with uniform scale, plus
/// HDR emissive color.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct BulletInstance {
    pub position_scale: [f32; 4],
    pub color: [f32; 4],
}

impl BulletInstance {
    pub fn new(position: [f32; 3], scale: f32, color: [f32; 4]) -> Self {
        Self {
            position_scale: [position[0], position[1], position[2], scale],
            color,
        }
    }

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
            3 => Float32x4,
            4 => Float32x4,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<BulletInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

const EMISSIVE_SHADER_SOURCE: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    position: vec4<f32>,
};

struct Params {
    threshold_pad: vec4<f32>,
};

@group(0) @binding(0) var<uniform> camera: Camera;
@group(0) @binding(1) var<uniform> params: Params;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) position_scale: vec4<f32>,
    @location(4) color: vec4<f32>,
) -> VertexOutput {
    var out: VertexOutput;
    let world = position * position_scale.w + position_scale.xyz;
    out.clip_position = camera.view_proj * vec4<f32>(world, 1.0);
    out.color = color;
    return out;
}

struct FragmentOutput {
    @location(0) scene: vec4<f32>,
    @location(1) bright: vec4<f32>,
    @location(2) aux: vec4<f32>,
};

@fragment
fn fs_main(in: VertexOutput) -> FragmentOutput {
    var out: FragmentOutput;
    out.scene = vec4<f32>(in.color.rgb, 1.0);
    let luminance = dot(in.color.rgb, vec3<f32>(0.2126, 0.7152, 0.0722));
    if (luminance > params.threshold_pad.x) {
        out.bright = vec4<f32>(in.color.rgb, 1.0);
    } else {
        out.bright = vec4<f32>(0.0, 0.0, 0.0, 1.0);
    }
    out.aux = vec4<f32>(in.color.rgb, 1.0);
    return out;
}
"#;

/// Instanced unlit pipeline targeting the HDR capture attachments.
pub struct EmissivePipeline {
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    frame_bg: wgpu::BindGroup,
}

impl EmissivePipeline {
    pub fn new(device: &wgpu::Device, sample_count: u32, bloom_threshold: f32) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("emissive-shader"),
            source: wgpu::ShaderSource::Wgsl(EMISSIVE_SHADER_SOURCE.into()),
        });

        let frame_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("emissive-frame-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(
                            std::mem::size_of::<CameraUniform>() as u64,
                        ),
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: std::num::NonZeroU64::new(16),
                    },
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("emissive-layout"),
            bind_group_layouts: &[&frame_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("emissive"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout(), BulletInstance::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::GreaterEqual,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                ..Default::default()
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[
                    Some(wgpu::ColorTargetState {
                        format: HDR_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    }),
                    Some(wgpu::ColorTargetState {
                        format: HDR_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    }),
                    Some(wgpu::ColorTargetState {
                        format: AUX_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    }),
                ],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multiview_mask: None,
            cache: None,
        });

        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("emissive-camera"),
            contents: bytemuck::cast_slice(&[CameraUniform::identity()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("emissive-params"),
            contents: bytemuck::cast_slice(&[bloom_threshold, 0.0, 0.0, 0.0]),
            usage: wgpu::BufferUsages::UNIFORM,
        });
        let frame_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("emissive-frame-bg"),
            layout: &frame_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        Self {
            pipeline,
            camera_buffer,
            frame_bg,
        }
    }

    /// Upload instances once; bullet positions are static.
    pub fn create_instance_buffer(
        device: &wgpu::Device,
        instances: &[BulletInstance],
    ) -> wgpu::Buffer {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bullet-instances"),
            contents: bytemuck::cast_slice(instances),
            usage: wgpu::BufferUsages::VERTEX,
        })
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, camera: CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera]));
    }

    /// Bind the pipeline and instance buffer at vertex slot 1. The caller
    /// binds the cube mesh and issues the instanced draw.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>, instances: &wgpu::Buffer) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.frame_bg, &[]);
        pass.set_vertex_buffer(1, instances.slice(..));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_size_and_packing() {
        assert_eq!(std::mem::size_of::<BulletInstance>(), 32);
        let inst = BulletInstance::new([1.0, 2.0, 3.0], 0.45, [5.0, 0.0, 0.0, 1.0]);
        assert_eq!(inst.position_scale, [1.0, 2.0, 3.0, 0.45]);
        assert_eq!(inst.color[0], 5.0);
    }

    #[test]
    fn test_emissive_red_clears_default_threshold() {
        let color = [5.0, 0.0, 0.0];
        let luminance = 0.2126 * color[0] + 0.7152 * color[1] + 0.0722 * color[2];
        assert!(luminance > 1.0);
    }
}
