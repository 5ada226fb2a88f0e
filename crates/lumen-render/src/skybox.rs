//! Cubemap skybox drawn at the far plane of the capture pass.
//!
//! The skybox samples a six-face cubemap with a rotation-only camera so it
//! never translates with the viewer. It writes the scene and auxiliary
//! attachments but always black to the bright pass, so the sky does not
//! bloom. A face that fails to decode is replaced with a solid color
//! rather than aborting startup.

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use wgpu::util::DeviceExt;

use crate::targets::{AUX_FORMAT, DEPTH_FORMAT, HDR_FORMAT};

/// Face order expected on disk and uploaded as cubemap layers
/// +X, -X, +Y, -Y, +Z, -Z.
pub const FACE_NAMES: [&str; 6] = ["right", "left", "up", "down", "front", "back"];

const FALLBACK_FACE_COLOR: [u8; 4] = [24, 28, 40, 255];

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct SkyVertex {
    position: [f32; 3],
}

fn cube_positions() -> Vec<SkyVertex> {
    // 12 triangles, wound to face inward.
    const P: [[f32; 3]; 36] = [
        [-1.0, 1.0, -1.0], [-1.0, -1.0, -1.0], [1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0],
        [-1.0, -1.0, 1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0],
        [-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [-1.0, -1.0, 1.0],
        [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0],
        [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0],
        [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0],
        [1.0, 1.0, 1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0],
        [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0],
        [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0],
        [-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, -1.0],
        [1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [1.0, -1.0, 1.0],
    ];
    P.iter().map(|&position| SkyVertex { position }).collect()
}

const SKYBOX_SHADER_SOURCE: &str = r#"
struct Camera {
    rot_view_proj: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> camera: Camera;
@group(1) @binding(0) var sky_tex: texture_cube<f32>;
@group(1) @binding(1) var sky_sampler: sampler;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) direction: vec3<f32>,
};

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> VertexOutput {
    var out: VertexOutput;
    let clip = camera.rot_view_proj * vec4<f32>(position, 1.0);
    // Reverse-Z: pin depth to the far plane at z = 0.
    out.clip_position = vec4<f32>(clip.x, clip.y, 0.0, clip.w);
    out.direction = position;
    return out;
}

struct FragmentOutput {
    @location(0) scene: vec4<f32>,
    @location(1) bright: vec4<f32>,
    @location(2) aux: vec4<f32>,
};

@fragment
fn fs_main(in: VertexOutput) -> FragmentOutput {
    let color = textureSample(sky_tex, sky_sampler, normalize(in.direction));
    var out: FragmentOutput;
    out.scene = vec4<f32>(color.rgb, 1.0);
    out.bright = vec4<f32>(0.0, 0.0, 0.0, 1.0);
    out.aux = vec4<f32>(color.rgb, 1.0);
    return out;
}
"#;

pub struct SkyboxPipeline {
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bg: wgpu::BindGroup,
    texture_bg: wgpu::BindGroup,
    vertices: wgpu::Buffer,
}

impl SkyboxPipeline {
    /// Build the skybox from six face images in `dir`, named
    /// `right.jpg`, `left.jpg`, and so on.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        sample_count: u32,
        dir: &Path,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("skybox-shader"),
            source: wgpu::ShaderSource::Wgsl(SKYBOX_SHADER_SOURCE.into()),
        });

        let camera_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skybox-camera-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: std::num::NonZeroU64::new(64),
                },
                count: None,
            }],
        });
        let texture_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("skybox-texture-bgl"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::Cube,
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
            label: Some("skybox-layout"),
            bind_group_layouts: &[&camera_bgl, &texture_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("skybox"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<SkyVertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
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
            label: Some("skybox-camera"),
            contents: bytemuck::cast_slice(&[Mat4::IDENTITY.to_cols_array_2d()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox-camera-bg"),
            layout: &camera_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        let cubemap_view = load_cubemap(device, queue, dir);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("skybox-sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let texture_bg = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("skybox-texture-bg"),
            layout: &texture_bgl,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&cubemap_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox-vertices"),
            contents: bytemuck::cast_slice(&cube_positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            pipeline,
            camera_buffer,
            camera_bg,
            texture_bg,
            vertices,
        }
    }

    /// Upload the rotation-only camera; translation is stripped so the sky
    /// stays centered on the viewer.
    pub fn update_camera(&self, queue: &wgpu::Queue, view: Mat4, projection: Mat4) {
        let rot_view = Mat4::from_mat3(Mat3::from_mat4(view));
        let rot_view_proj = (projection * rot_view).to_cols_array_2d();
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[rot_view_proj]));
    }

    /// Draw the sky. Call last in the capture pass; the depth test discards
    /// fragments behind already-drawn geometry.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.camera_bg, &[]);
        pass.set_bind_group(1, &self.texture_bg, &[]);
        pass.set_vertex_buffer(0, self.vertices.slice(..));
        pass.draw(0..36, 0..1);
    }
}

/// Decode the six faces and upload them as cubemap layers. Faces that fail
/// to decode, or that mismatch the first decoded face's size, are replaced
/// by a solid fallback color.
fn load_cubemap(device: &wgpu::Device, queue: &wgpu::Queue, dir: &Path) -> wgpu::TextureView {
    let mut faces: [Option<image::RgbaImage>; 6] = [const { None }; 6];
    for (slot, name) in faces.iter_mut().zip(FACE_NAMES) {
        let path = dir.join(format!("{name}.jpg"));
        match image::open(&path) {
            Ok(img) => *slot = Some(img.to_rgba8()),
            Err(err) => {
                log::warn!("skybox face {} failed to load: {err}", path.display());
            }
        }
    }

    let (width, height) = faces
        .iter()
        .flatten()
        .next()
        .map(|img| img.dimensions())
        .unwrap_or((1, 1));

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("skybox-cubemap"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 6,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    let fallback: Vec<u8> = FALLBACK_FACE_COLOR
        .iter()
        .copied()
        .cycle()
        .take((width * height * 4) as usize)
        .collect();

    for (layer, face) in faces.iter().enumerate() {
        let pixels = match face {
            Some(img) if img.dimensions() == (width, height) => img.as_raw(),
            Some(img) => {
                log::warn!(
                    "skybox face {} is {:?}, expected {width}x{height}; using fallback",
                    FACE_NAMES[layer],
                    img.dimensions()
                );
                &fallback
            }
            None => &fallback,
        };
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d {
                    x: 0,
                    y: 0,
                    z: layer as u32,
                },
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(width * 4),
                rows_per_image: Some(height),
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
    }

    texture.create_view(&wgpu::TextureViewDescriptor {
        label: Some("skybox-cubemap-view"),
        dimension: Some(wgpu::TextureViewDimension::Cube),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_has_36_positions_on_unit_extent() {
        let positions = cube_positions();
        assert_eq!(positions.len(), 36);
        for v in &positions {
            for c in v.position {
                assert_eq!(c.abs(), 1.0);
            }
        }
    }

    #[test]
    fn test_face_order_matches_cubemap_layers() {
        assert_eq!(FACE_NAMES, ["right", "left", "up", "down", "front", "back"]);
    }

    #[test]
    fn test_rotation_only_view_ignores_translation() {
        let view_a = Mat4::look_at_rh(glam::Vec3::ZERO, glam::Vec3::Z, glam::Vec3::Y);
        let view_b = Mat4::from_translation(glam::Vec3::new(100.0, -5.0, 42.0)) * view_a;
        let rot_a = Mat4::from_mat3(Mat3::from_mat4(view_a));
        let rot_b = Mat4::from_mat3(Mat3::from_mat4(view_b));
        assert!(rot_a.abs_diff_eq(rot_b, 1e-6));
    }
}
