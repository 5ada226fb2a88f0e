//! Material textures for the lit pipeline.
//!
//! A [`Material`] is a diffuse texture plus sampler bound as one group.
//! Scene surfaces use procedural pixels (solid colors and checkerboards);
//! there is no asset pipeline.

/// A diffuse texture and sampler bound at group 2 of the lit pipeline.
pub struct Material {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub bind_group: wgpu::BindGroup,
}

impl Material {
    /// Bind group layout shared by every material: texture at binding 0,
    /// sampler at binding 1, fragment-visible.
    pub fn bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material-bgl"),
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
        })
    }

    /// Create a material from raw RGBA8 pixels.
    pub fn from_pixels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Self {
        debug_assert_eq!(pixels.len(), (width * height * 4) as usize);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
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

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(label),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&sampler),
                },
            ],
        });

        Self {
            texture,
            view,
            sampler,
            bind_group,
        }
    }

    /// A 1x1 solid-color material. `rgba` is sRGB-encoded.
    pub fn solid(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        rgba: [u8; 4],
    ) -> Self {
        Self::from_pixels(device, queue, layout, label, 1, 1, &rgba)
    }

    /// A two-tone checkerboard, `cells` cells per side.
    pub fn checkerboard(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
        label: &str,
        cells: u32,
        a: [u8; 4],
        b: [u8; 4],
    ) -> Self {
        let pixels = checkerboard_pixels(cells, a, b);
        Self::from_pixels(device, queue, layout, label, cells, cells, &pixels)
    }
}

fn checkerboard_pixels(cells: u32, a: [u8; 4], b: [u8; 4]) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((cells * cells * 4) as usize);
    for y in 0..cells {
        for x in 0..cells {
            let color = if (x + y) % 2 == 0 { a } else { b };
            pixels.extend_from_slice(&color);
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard_alternates() {
        let a = [255, 0, 0, 255];
        let b = [0, 255, 0, 255];
        let pixels = checkerboard_pixels(4, a, b);
        assert_eq!(pixels.len(), 4 * 4 * 4);
        assert_eq!(&pixels[0..4], &a);
        assert_eq!(&pixels[4..8], &b);
        // Row 1 starts with the opposite color.
        assert_eq!(&pixels[16..20], &b);
    }

    #[test]
    fn test_checkerboard_byte_length() {
        let pixels = checkerboard_pixels(8, [0; 4], [255; 4]);
        assert_eq!(pixels.len(), 8 * 8 * 4);
    }
}
