//! Lit scene pipeline: Phong/Blinn-Phong shading into the three-attachment
//! HDR capture target.
//!
//! One directional light, one camera spotlight, and the fixed point-light
//! array shade every surface. The fragment writes scene color, the
//! bright-pass extraction, and the auxiliary LDR copy in a single pass.

use bytemuck::{Pod, Zeroable};
use lumen_lighting::{
    DirectionalLight, DirectionalLightUniform, MAX_POINT_LIGHTS, PointLight, PointLightUniform,
    SpotLight, SpotLightUniform,
};
use wgpu::util::DeviceExt;

use crate::camera::CameraUniform;
use crate::mesh::Vertex;
use crate::targets::{AUX_FORMAT, DEPTH_FORMAT, HDR_FORMAT};

/// Specular exponent shared by every material.
pub const SHININESS: f32 = 16.0;

/// Whole lights block, 1328 bytes, uploaded once per frame.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightsUniform {
    pub directional: DirectionalLightUniform,
    pub spot: SpotLightUniform,
    pub points: [PointLightUniform; MAX_POINT_LIGHTS],
    /// x = blinn flag (0/1), y = shininess, z = active point count,
    /// w = bright-pass luminance threshold.
    pub params: [f32; 4],
}

impl LightsUniform {
    /// Pack the registered light set with the current shading flags.
    pub fn new(
        directional: &DirectionalLight,
        spot: &SpotLight,
        points: &[PointLight],
        blinn: bool,
        bloom_threshold: f32,
    ) -> Self {
        let mut point_uniforms = [PointLightUniform::zeroed(); MAX_POINT_LIGHTS];
        let count = points.len().min(MAX_POINT_LIGHTS);
        for (slot, light) in point_uniforms.iter_mut().zip(&points[..count]) {
            *slot = light.to_uniform();
        }
        Self {
            directional: directional.to_uniform(),
            spot: spot.to_uniform(),
            points: point_uniforms,
            params: [
                if blinn { 1.0 } else { 0.0 },
                SHININESS,
                count as f32,
                bloom_threshold,
            ],
        }
    }
}

/// Per-object model matrix, group 3.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
}

const LIT_SHADER_SOURCE: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    position: vec4<f32>,
};

struct DirLight {
    direction: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
};

struct SpotLight {
    position_cutoff: vec4<f32>,
    direction_outer: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    attenuation: vec4<f32>,
};

struct PointLight {
    position_constant: vec4<f32>,
    ambient_linear: vec4<f32>,
    diffuse_quadratic: vec4<f32>,
    specular_pad: vec4<f32>,
};

struct Lights {
    dir: DirLight,
    spot: SpotLight,
    points: array<PointLight, 18>,
    params: vec4<f32>,
};

struct Model {
    model: mat4x4<f32>,
};

@group(0) @binding(0) var<uniform> camera: Camera;
@group(1) @binding(0) var<uniform> lights: Lights;
@group(2) @binding(0) var material_tex: texture_2d<f32>;
@group(2) @binding(1) var material_sampler: sampler;
@group(3) @binding(0) var<uniform> object: Model;

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
) -> VertexOutput {
    var out: VertexOutput;
    let world = object.model * vec4<f32>(position, 1.0);
    out.world_pos = world.xyz;
    out.clip_position = camera.view_proj * world;
    out.normal = normalize((object.model * vec4<f32>(normal, 0.0)).xyz);
    out.uv = uv;
    return out;
}

fn specular_factor(light_dir: vec3<f32>, normal: vec3<f32>, view_dir: vec3<f32>) -> f32 {
    let shininess = lights.params.y;
    if (lights.params.x > 0.5) {
        let halfway = normalize(light_dir + view_dir);
        return pow(max(dot(normal, halfway), 0.0), shininess);
    }
    let reflect_dir = reflect(-light_dir, normal);
    return pow(max(dot(view_dir, reflect_dir), 0.0), shininess);
}

fn shade_directional(normal: vec3<f32>, view_dir: vec3<f32>, albedo: vec3<f32>) -> vec3<f32> {
    let light_dir = normalize(-lights.dir.direction.xyz);
    let diff = max(dot(normal, light_dir), 0.0);
    let spec = specular_factor(light_dir, normal, view_dir);
    return lights.dir.ambient.rgb * albedo
        + lights.dir.diffuse.rgb * diff * albedo
        + lights.dir.specular.rgb * spec;
}

fn shade_point(light: PointLight, frag_pos: vec3<f32>, normal: vec3<f32>, view_dir: vec3<f32>, albedo: vec3<f32>) -> vec3<f32> {
    let to_light = light.position_constant.xyz - frag_pos;
    let distance = length(to_light);
    let light_dir = to_light / max(distance, 1e-4);
    let diff = max(dot(normal, light_dir), 0.0);
    let spec = specular_factor(light_dir, normal, view_dir);
    let attenuation = 1.0 / (light.position_constant.w
        + light.ambient_linear.w * distance
        + light.diffuse_quadratic.w * distance * distance);
    return (light.ambient_linear.rgb * albedo
        + light.diffuse_quadratic.rgb * diff * albedo
        + light.specular_pad.rgb * spec) * attenuation;
}

fn shade_spot(frag_pos: vec3<f32>, normal: vec3<f32>, view_dir: vec3<f32>, albedo: vec3<f32>) -> vec3<f32> {
    let to_light = lights.spot.position_cutoff.xyz - frag_pos;
    let distance = length(to_light);
    let light_dir = to_light / max(distance, 1e-4);
    let diff = max(dot(normal, light_dir), 0.0);
    let spec = specular_factor(light_dir, normal, view_dir);
    let attenuation = 1.0 / (lights.spot.attenuation.x
        + lights.spot.attenuation.y * distance
        + lights.spot.attenuation.z * distance * distance);
    let theta = dot(light_dir, normalize(-lights.spot.direction_outer.xyz));
    let cutoff = lights.spot.position_cutoff.w;
    let outer = lights.spot.direction_outer.w;
    let intensity = clamp((theta - outer) / (cutoff - outer), 0.0, 1.0);
    return (lights.spot.ambient.rgb * albedo
        + (lights.spot.diffuse.rgb * diff * albedo
           + lights.spot.specular.rgb * spec) * intensity) * attenuation;
}

struct FragmentOutput {
    @location(0) scene: vec4<f32>,
    @location(1) bright: vec4<f32>,
    @location(2) aux: vec4<f32>,
};

@fragment
fn fs_main(in: VertexOutput) -> FragmentOutput {
    let albedo = textureSample(material_tex, material_sampler, in.uv).rgb;
    let normal = normalize(in.normal);
    let view_dir = normalize(camera.position.xyz - in.world_pos);

    var color = shade_directional(normal, view_dir, albedo);
    let count = i32(lights.params.z);
    for (var i = 0; i < count; i++) {
        color += shade_point(lights.points[i], in.world_pos, normal, view_dir, albedo);
    }
    color += shade_spot(in.world_pos, normal, view_dir, albedo);

    var out: FragmentOutput;
    out.scene = vec4<f32>(color, 1.0);
    let luminance = dot(color, vec3<f32>(0.2126, 0.7152, 0.0722));
    if (luminance > lights.params.w) {
        out.bright = vec4<f32>(color, 1.0);
    } else {
        out.bright = vec4<f32>(0.0, 0.0, 0.0, 1.0);
    }
    out.aux = vec4<f32>(color, 1.0);
    return out;
}
"#;

/// The lit scene pipeline and its per-frame uniform buffers.
pub struct LitPipeline {
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    camera_bg: wgpu::BindGroup,
    lights_buffer: wgpu::Buffer,
    lights_bg: wgpu::BindGroup,
    model_bgl: wgpu::BindGroupLayout,
    material_bgl: wgpu::BindGroupLayout,
}

impl LitPipeline {
    pub fn new(device: &wgpu::Device, sample_count: u32) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("lit-shader"),
            source: wgpu::ShaderSource::Wgsl(LIT_SHADER_SOURCE.into()),
        });

        let camera_bgl = uniform_bgl(
            device,
            "lit-camera-bgl",
            std::mem::size_of::<CameraUniform>() as u64,
            wgpu::ShaderStages::VERTEX_FRAGMENT,
        );
        let lights_bgl = uniform_bgl(
            device,
            "lit-lights-bgl",
            std::mem::size_of::<LightsUniform>() as u64,
            wgpu::ShaderStages::FRAGMENT,
        );
        let material_bgl = crate::texture::Material::bind_group_layout(device);
        let model_bgl = uniform_bgl(
            device,
            "lit-model-bgl",
            std::mem::size_of::<ModelUniform>() as u64,
            wgpu::ShaderStages::VERTEX,
        );

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lit-layout"),
            bind_group_layouts: &[&camera_bgl, &lights_bgl, &material_bgl, &model_bgl],
            immediate_size: 0,
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lit"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
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
            label: Some("lit-camera"),
            contents: bytemuck::cast_slice(&[CameraUniform::identity()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let camera_bg = uniform_bg(device, "lit-camera-bg", &camera_bgl, &camera_buffer);

        let lights_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("lit-lights"),
            contents: bytemuck::cast_slice(&[LightsUniform::zeroed()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let lights_bg = uniform_bg(device, "lit-lights-bg", &lights_bgl, &lights_buffer);

        Self {
            pipeline,
            camera_buffer,
            camera_bg,
            lights_buffer,
            lights_bg,
            model_bgl,
            material_bgl,
        }
    }

    /// Layout for material bind groups (group 2).
    pub fn material_layout(&self) -> &wgpu::BindGroupLayout {
        &self.material_bgl
    }

    /// Create a per-object model uniform buffer and its bind group.
    pub fn create_model(&self, device: &wgpu::Device, label: &str) -> (wgpu::Buffer, wgpu::BindGroup) {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::cast_slice(&[ModelUniform {
                model: glam::Mat4::IDENTITY.to_cols_array_2d(),
            }]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let bind_group = uniform_bg(device, label, &self.model_bgl, &buffer);
        (buffer, bind_group)
    }

    /// Upload the camera uniform for this frame.
    pub fn update_camera(&self, queue: &wgpu::Queue, camera: CameraUniform) {
        queue.write_buffer(&self.camera_buffer, 0, bytemuck::cast_slice(&[camera]));
    }

    /// Upload the lights uniform for this frame.
    pub fn update_lights(&self, queue: &wgpu::Queue, lights: LightsUniform) {
        queue.write_buffer(&self.lights_buffer, 0, bytemuck::cast_slice(&[lights]));
    }

    /// Bind the pipeline and the frame-level groups (camera, lights).
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.camera_bg, &[]);
        pass.set_bind_group(1, &self.lights_bg, &[]);
    }
}

fn uniform_bgl(
    device: &wgpu::Device,
    label: &str,
    min_size: u64,
    visibility: wgpu::ShaderStages,
) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: std::num::NonZeroU64::new(min_size),
            },
            count: None,
        }],
    })
}

fn uniform_bg(
    device: &wgpu::Device,
    label: &str,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: buffer.as_entire_binding(),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use lumen_lighting::PointLight;

    #[test]
    fn test_lights_uniform_layout() {
        assert_eq!(std::mem::size_of::<LightsUniform>(), 1328);
        assert_eq!(std::mem::offset_of!(LightsUniform, directional), 0);
        assert_eq!(std::mem::offset_of!(LightsUniform, spot), 64);
        assert_eq!(std::mem::offset_of!(LightsUniform, points), 160);
        assert_eq!(std::mem::offset_of!(LightsUniform, params), 1312);
    }

    #[test]
    fn test_model_uniform_size() {
        assert_eq!(std::mem::size_of::<ModelUniform>(), 64);
    }

    #[test]
    fn test_lights_params_packing() {
        let points: Vec<PointLight> = (0..18)
            .map(|i| PointLight {
                position: Vec3::new(i as f32, 0.0, 0.0),
                ..PointLight::default()
            })
            .collect();
        let u = LightsUniform::new(
            &DirectionalLight::default(),
            &SpotLight::default(),
            &points,
            true,
            1.0,
        );
        assert_eq!(u.params, [1.0, SHININESS, 18.0, 1.0]);
        assert_eq!(u.points[17].position_constant[0], 17.0);
    }

    #[test]
    fn test_excess_lights_truncated() {
        let points: Vec<PointLight> = (0..30).map(|_| PointLight::default()).collect();
        let u = LightsUniform::new(
            &DirectionalLight::default(),
            &SpotLight::default(),
            &points,
            false,
            1.0,
        );
        assert_eq!(u.params[2], MAX_POINT_LIGHTS as f32);
        assert_eq!(u.params[0], 0.0);
    }

    #[test]
    fn test_lights_block_fits_uniform_binding_limit() {
        assert!(std::mem::size_of::<LightsUniform>() <= 65536);
    }
}
