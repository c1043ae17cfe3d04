//! GPU-to-CPU readback of the output surface.

use glint_core::SourceImage;

use crate::EngineError;

/// Copy `texture` into a mapped staging buffer and return tightly packed
/// RGBA8 pixels. Blocks until the copy completes.
///
/// Rows are padded to `COPY_BYTES_PER_ROW_ALIGNMENT` for the copy and
/// stripped afterwards. `Bgra8Unorm` output is swizzled back to RGBA.
pub fn read_texture_rgba8(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> Result<SourceImage, EngineError> {
    let unpadded = width * 4;
    let padded = unpadded.div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
        * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("glint_output_staging"),
        size: u64::from(padded) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("glint_output_readback_encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(height),
            },
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = staging.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .map_err(|e| EngineError::Readback(e.to_string()))?;
    rx.recv()
        .map_err(|e| EngineError::Readback(e.to_string()))?
        .map_err(|e| EngineError::Readback(e.to_string()))?;

    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    {
        let data = slice.get_mapped_range();
        for row in data.chunks(padded as usize) {
            let row: &[[u8; 4]] = bytemuck::cast_slice(&row[..unpadded as usize]);
            pixels.extend_from_slice(row);
        }
    }
    staging.unmap();

    if format == wgpu::TextureFormat::Bgra8Unorm {
        for px in &mut pixels {
            px.swap(0, 2);
        }
    }

    Ok(SourceImage {
        width,
        height,
        pixels,
    })
}
