//! Texture resources owned by the preview engine.
//!
//! All textures are read with `textureLoad` and interpolated in the shader,
//! which keeps GPU results bit-compatible with the CPU reference.

use glint_core::curves::{CURVE_LUT_SIZE, CurveLut};
use glint_core::{SourceImage, TiledCubeLut};

/// Uploaded source image. Immutable until the next `load_image`.
pub struct SourceTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub width: u32,
    pub height: u32,
}

impl SourceTexture {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, image: &SourceImage) -> Self {
        let texture = create_rgba8_texture(
            device,
            queue,
            "glint_source_texture",
            image.width,
            image.height,
            image.as_bytes(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            width: image.width,
            height: image.height,
        }
    }
}

/// Render target sized to the source.
pub struct OutputTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub format: wgpu::TextureFormat,
}

impl OutputTexture {
    pub fn new(device: &wgpu::Device, width: u32, height: u32, format: wgpu::TextureFormat) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glint_output_texture"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            format,
        }
    }
}

/// 256×1 `Rgba32Float` tone-curve table, one channel per color component.
pub struct CurveTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    identity: bool,
}

impl CurveTexture {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("glint_curve_lut"),
            size: extent(CURVE_LUT_SIZE as u32, 1),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let mut curve = Self {
            texture,
            view,
            identity: false,
        };
        curve.write(queue, &CurveLut::identity());
        curve
    }

    /// Rewrite the table in place.
    pub fn write(&mut self, queue: &wgpu::Queue, lut: &CurveLut) {
        let texels = lut.to_texels();
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&texels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(CURVE_LUT_SIZE as u32 * 16),
                rows_per_image: None,
            },
            extent(CURVE_LUT_SIZE as u32, 1),
        );
        self.identity = lut.is_identity();
    }

    /// Reset to `lut[x] = x`, skipping the upload when already identity.
    pub fn reset(&mut self, queue: &wgpu::Queue) {
        if !self.identity {
            self.write(queue, &CurveLut::identity());
        }
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }
}

/// External tiled-cube LUT texture.
pub struct CubeTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub levels: u32,
    pub tiles: u32,
}

impl CubeTexture {
    pub fn upload(device: &wgpu::Device, queue: &wgpu::Queue, lut: &TiledCubeLut) -> Self {
        let texture = create_rgba8_texture(
            device,
            queue,
            "glint_cube_lut",
            lut.width(),
            lut.width(),
            bytemuck::cast_slice(lut.texels()),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            levels: lut.levels(),
            tiles: lut.tiles(),
        }
    }

    /// 1×1 stand-in bound while no LUT is loaded. Never sampled.
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let texture = create_rgba8_texture(
            device,
            queue,
            "glint_cube_placeholder",
            1,
            1,
            &[0, 0, 0, 255],
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            texture,
            view,
            levels: 0,
            tiles: 0,
        }
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

fn create_rgba8_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    width: u32,
    height: u32,
    bytes: &[u8],
) -> wgpu::Texture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: extent(width, height),
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
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
        bytes,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * 4),
            rows_per_image: Some(height),
        },
        extent(width, height),
    );

    texture
}

/// Layout entry for a non-filterable 2-D texture read with `textureLoad`.
pub(crate) fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: false },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}
