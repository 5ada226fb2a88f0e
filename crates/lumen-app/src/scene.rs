//! Scene renderer: owns the draw pipelines, meshes, materials, and the
//! per-object GPU state for the declarative entry list.

use std::path::Path;

use lumen_lighting::{DirectionalLight, PointLight, SpotLight};
use lumen_render::{
    BulletInstance, CameraUniform, EmissivePipeline, LightsUniform, LitPipeline, Material,
    MeshBuffer, ModelUniform, SkyboxPipeline, ToggleState, cube_mesh, plane_mesh,
    reverse_z_perspective, uv_sphere_mesh,
};
use lumen_scene::{
    BULLET_EMISSIVE_INTENSITY, BULLET_LIGHT_POSITIONS, BULLET_SCALE, FlyCamera, MeshKind,
    SceneEntry, scene_directional_light, scene_entries, scene_point_lights, scene_spotlight,
};

struct SceneObject {
    entry: SceneEntry,
    material: Material,
    model_buffer: wgpu::Buffer,
    model_bg: wgpu::BindGroup,
}

/// Everything drawn inside the capture pass.
pub struct SceneRenderer {
    lit: LitPipeline,
    emissive: EmissivePipeline,
    skybox: SkyboxPipeline,
    plane: MeshBuffer,
    cube: MeshBuffer,
    sphere: MeshBuffer,
    objects: Vec<SceneObject>,
    bullet_instances: wgpu::Buffer,
    bullet_count: u32,
    directional: DirectionalLight,
    spot: SpotLight,
    points: Vec<PointLight>,
    bloom_threshold: f32,
}

impl SceneRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        sample_count: u32,
        bloom_threshold: f32,
        assets_dir: &Path,
    ) -> Self {
        let lit = LitPipeline::new(device, sample_count);
        let emissive = EmissivePipeline::new(device, sample_count, bloom_threshold);
        let skybox = SkyboxPipeline::new(device, queue, sample_count, &assets_dir.join("skybox"));

        let plane = MeshBuffer::upload(device, "terrain-plane", &plane_mesh(256.0, 32.0));
        let cube = MeshBuffer::upload(device, "unit-cube", &cube_mesh());
        let sphere = MeshBuffer::upload(device, "unit-sphere", &uv_sphere_mesh(24, 48));

        let material_layout = lit.material_layout();
        let objects = scene_entries()
            .into_iter()
            .map(|entry| {
                let material = entry_material(device, queue, material_layout, &entry);
                let (model_buffer, model_bg) = lit.create_model(device, entry.name);
                SceneObject {
                    entry,
                    material,
                    model_buffer,
                    model_bg,
                }
            })
            .collect();

        let bullet_color = [BULLET_EMISSIVE_INTENSITY, 0.0, 0.0, 1.0];
        let bullets: Vec<BulletInstance> = BULLET_LIGHT_POSITIONS
            .iter()
            .map(|&position| BulletInstance::new(position, BULLET_SCALE, bullet_color))
            .collect();
        let bullet_instances = EmissivePipeline::create_instance_buffer(device, &bullets);

        Self {
            lit,
            emissive,
            skybox,
            plane,
            cube,
            sphere,
            objects,
            bullet_instances,
            bullet_count: bullets.len() as u32,
            directional: scene_directional_light(),
            spot: scene_spotlight(),
            points: scene_point_lights(),
            bloom_threshold,
        }
    }

    /// Upload all per-frame uniforms: cameras, lights, and model matrices.
    pub fn update(
        &mut self,
        queue: &wgpu::Queue,
        camera: &FlyCamera,
        aspect: f32,
        toggles: &ToggleState,
        t: f32,
    ) {
        let view = camera.view_matrix();
        let camera_uniform = CameraUniform::new(view, camera.position(), camera.zoom, aspect);
        self.lit.update_camera(queue, camera_uniform);
        self.emissive.update_camera(queue, camera_uniform);
        self.skybox
            .update_camera(queue, view, reverse_z_perspective(camera.zoom, aspect));

        self.spot.follow(camera.position(), camera.front());
        let lights = LightsUniform::new(
            &self.directional,
            &self.spot,
            &self.points,
            toggles.blinn,
            self.bloom_threshold,
        );
        self.lit.update_lights(queue, lights);

        for object in &self.objects {
            let model = ModelUniform {
                model: object.entry.model_matrix(t).to_cols_array_2d(),
            };
            queue.write_buffer(&object.model_buffer, 0, bytemuck::bytes_of(&model));
        }
    }

    /// Record every scene draw into the capture pass.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        self.lit.bind(pass);
        for object in &self.objects {
            pass.set_bind_group(2, &object.material.bind_group, &[]);
            pass.set_bind_group(3, &object.model_bg, &[]);
            let mesh = self.mesh_for(object.entry.mesh);
            mesh.bind(pass);
            mesh.draw(pass);
        }

        self.emissive.bind(pass, &self.bullet_instances);
        self.cube.bind(pass);
        self.cube.draw_instanced(pass, self.bullet_count);

        // Last: the depth test rejects sky fragments behind geometry.
        self.skybox.draw(pass);
    }

    fn mesh_for(&self, kind: MeshKind) -> &MeshBuffer {
        match kind {
            MeshKind::Plane => &self.plane,
            MeshKind::Cube => &self.cube,
            MeshKind::Sphere => &self.sphere,
        }
    }
}

fn entry_material(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    entry: &SceneEntry,
) -> Material {
    match entry.mesh {
        MeshKind::Plane => Material::checkerboard(
            device,
            queue,
            layout,
            entry.name,
            64,
            [60, 92, 48, 255],
            [38, 60, 32, 255],
        ),
        _ => Material::solid(device, queue, layout, entry.name, entry_color(entry.name)),
    }
}

fn entry_color(name: &str) -> [u8; 4] {
    match name {
        "jet-high" | "jet-low" => [150, 150, 158, 255],
        "missile" => [128, 36, 30, 255],
        "gun-emplacement" => [86, 88, 78, 255],
        "moon" => [205, 202, 190, 255],
        _ => [128, 128, 128, 255],
    }
}
