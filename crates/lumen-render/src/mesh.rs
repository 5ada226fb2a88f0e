//! Procedural meshes and GPU mesh buffers.
//!
//! The scene draws three primitive shapes: a ground plane, a unit cube, and
//! a UV sphere. Vertices carry position, normal, and texture coordinates.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Standard vertex: position, normal, uv. 32 bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

impl Vertex {
    /// Vertex buffer layout matching the lit and emissive shaders.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        use wgpu::{VertexAttribute, VertexFormat};
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: 12,
                    shader_location: 1,
                    format: VertexFormat::Float32x3,
                },
                VertexAttribute {
                    offset: 24,
                    shader_location: 2,
                    format: VertexFormat::Float32x2,
                },
            ],
        }
    }
}

/// CPU-side mesh data before upload.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// A mesh uploaded to the GPU, ready to bind and draw.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffer {
    /// Upload mesh data to the GPU.
    pub fn upload(device: &wgpu::Device, label: &str, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: data.indices.len() as u32,
        }
    }

    /// Bind vertex and index buffers to a render pass.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
    }

    /// Draw the whole mesh with `instances` instances.
    pub fn draw_instanced(&self, render_pass: &mut wgpu::RenderPass, instances: u32) {
        render_pass.draw_indexed(0..self.index_count, 0, 0..instances);
    }

    /// Draw the whole mesh once.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        self.draw_instanced(render_pass, 1);
    }
}

/// A flat quad in the XY plane (rotated into place by the entry transform),
/// `half_extent` world units from center to edge, normal +Z, uv tiled
/// `uv_tiles` times across the surface.
pub fn plane_mesh(half_extent: f32, uv_tiles: f32) -> MeshData {
    let h = half_extent;
    let t = uv_tiles;
    MeshData {
        vertices: vec![
            Vertex {
                position: [-h, -h, 0.0],
                normal: [0.0, 0.0, 1.0],
                uv: [0.0, t],
            },
            Vertex {
                position: [h, -h, 0.0],
                normal: [0.0, 0.0, 1.0],
                uv: [t, t],
            },
            Vertex {
                position: [h, h, 0.0],
                normal: [0.0, 0.0, 1.0],
                uv: [t, 0.0],
            },
            Vertex {
                position: [-h, h, 0.0],
                normal: [0.0, 0.0, 1.0],
                uv: [0.0, 0.0],
            },
        ],
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// A unit cube centered on the origin with per-face normals.
pub fn cube_mesh() -> MeshData {
    // Six faces, four vertices each: (normal, four corners).
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        (
            [0.0, 0.0, 1.0],
            [
                [-0.5, -0.5, 0.5],
                [0.5, -0.5, 0.5],
                [0.5, 0.5, 0.5],
                [-0.5, 0.5, 0.5],
            ],
        ),
        (
            [0.0, 0.0, -1.0],
            [
                [0.5, -0.5, -0.5],
                [-0.5, -0.5, -0.5],
                [-0.5, 0.5, -0.5],
                [0.5, 0.5, -0.5],
            ],
        ),
        (
            [1.0, 0.0, 0.0],
            [
                [0.5, -0.5, 0.5],
                [0.5, -0.5, -0.5],
                [0.5, 0.5, -0.5],
                [0.5, 0.5, 0.5],
            ],
        ),
        (
            [-1.0, 0.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [-0.5, -0.5, 0.5],
                [-0.5, 0.5, 0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        (
            [0.0, 1.0, 0.0],
            [
                [-0.5, 0.5, 0.5],
                [0.5, 0.5, 0.5],
                [0.5, 0.5, -0.5],
                [-0.5, 0.5, -0.5],
            ],
        ),
        (
            [0.0, -1.0, 0.0],
            [
                [-0.5, -0.5, -0.5],
                [0.5, -0.5, -0.5],
                [0.5, -0.5, 0.5],
                [-0.5, -0.5, 0.5],
            ],
        ),
    ];

    let mut data = MeshData::default();
    for (normal, corners) in faces {
        let base = data.vertices.len() as u32;
        let uvs = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];
        for (corner, uv) in corners.iter().zip(uvs) {
            data.vertices.push(Vertex {
                position: *corner,
                normal,
                uv,
            });
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    data
}

/// A unit-radius UV sphere with `stacks` latitude bands and `sectors`
/// longitude bands.
pub fn uv_sphere_mesh(stacks: u32, sectors: u32) -> MeshData {
    let mut data = MeshData::default();
    for i in 0..=stacks {
        let v = i as f32 / stacks as f32;
        let phi = v * std::f32::consts::PI;
        for j in 0..=sectors {
            let u = j as f32 / sectors as f32;
            let theta = u * std::f32::consts::TAU;
            let (phi_sin, phi_cos) = phi.sin_cos();
            let (theta_sin, theta_cos) = theta.sin_cos();
            let p = [phi_sin * theta_cos, phi_cos, phi_sin * theta_sin];
            data.vertices.push(Vertex {
                position: p,
                normal: p,
                uv: [u, v],
            });
        }
    }
    let ring = sectors + 1;
    for i in 0..stacks {
        for j in 0..sectors {
            let a = i * ring + j;
            let b = a + ring;
            data.indices
                .extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_stride_matches_layout() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 32);
        assert_eq!(layout.attributes.len(), 3);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[2].offset, 24);
    }

    #[test]
    fn test_plane_mesh_geometry() {
        let plane = plane_mesh(250.0, 25.0);
        assert_eq!(plane.vertices.len(), 4);
        assert_eq!(plane.indices.len(), 6);
        for v in &plane.vertices {
            assert_eq!(v.normal, [0.0, 0.0, 1.0]);
            assert_eq!(v.position[2], 0.0);
        }
    }

    #[test]
    fn test_cube_mesh_geometry() {
        let cube = cube_mesh();
        assert_eq!(cube.vertices.len(), 24);
        assert_eq!(cube.indices.len(), 36);
        // Every vertex sits on the unit cube shell.
        for v in &cube.vertices {
            let max = v
                .position
                .iter()
                .map(|c| c.abs())
                .fold(0.0_f32, f32::max);
            assert!((max - 0.5).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cube_normals_are_axis_aligned_unit() {
        let cube = cube_mesh();
        for v in &cube.vertices {
            let len: f32 = v.normal.iter().map(|c| c * c).sum::<f32>().sqrt();
            assert!((len - 1.0).abs() < 1e-6);
            assert_eq!(v.normal.iter().filter(|&&c| c != 0.0).count(), 1);
        }
    }

    #[test]
    fn test_sphere_vertices_on_unit_shell() {
        let sphere = uv_sphere_mesh(16, 32);
        assert_eq!(sphere.vertices.len(), (16 + 1) * (32 + 1));
        assert_eq!(sphere.indices.len(), (16 * 32 * 6) as usize);
        for v in &sphere.vertices {
            let len: f32 = v.position.iter().map(|c| c * c).sum::<f32>().sqrt();
            assert!((len - 1.0).abs() < 1e-5, "vertex off shell: {len}");
        }
    }

    #[test]
    fn test_sphere_indices_in_range() {
        let sphere = uv_sphere_mesh(8, 12);
        let count = sphere.vertices.len() as u32;
        assert!(sphere.indices.iter().all(|&i| i < count));
    }
}
