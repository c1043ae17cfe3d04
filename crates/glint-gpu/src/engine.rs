//! Host engine: owns the device, the preview program and its textures.

use std::num::NonZeroU64;
use std::path::PathBuf;

use glint_core::curves::build_curve_lut;
use glint_core::{Look, SourceImage, StageInputs, TiledCubeLut};
use parking_lot::Mutex;

use crate::config::{EngineConfig, is_supported_output};
use crate::error::{EngineError, LutLoadError};
use crate::readback::read_texture_rgba8;
use crate::textures::{CubeTexture, CurveTexture, OutputTexture, SourceTexture, texture_entry};
use crate::uniforms::{LookUniforms, TextureState};

/// WGSL source of the preview program.
pub const PREVIEW_SHADER: &str = include_str!("../shaders/preview.wgsl");

/// Real-time look preview on a single still image.
///
/// Every [`render`](Self::render) is a complete redraw from the look passed
/// in; the engine keeps no edit history and does no diffing.
pub struct PreviewEngine {
    device: wgpu::Device,
    queue: wgpu::Queue,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    curve: CurveTexture,
    /// External LUT slot. Filled asynchronously by `load_lut`.
    cube: Mutex<Option<CubeTexture>>,
    cube_placeholder: CubeTexture,
    source: Option<SourceTexture>,
    output: Option<OutputTexture>,
    output_format: wgpu::TextureFormat,
}

impl PreviewEngine {
    /// Pick an adapter, open a device and compile the preview program.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: config.backends,
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: config.power_preference,
            force_fallback_adapter: false,
            compatible_surface: None,
        }))
        .map_err(|source| EngineError::NoAdapter {
            backends: format!("{:?}", config.backends),
            source,
        })?;

        let info = adapter.get_info();
        tracing::info!(
            adapter = %info.name,
            backend = ?info.backend,
            driver = %info.driver,
            "selected GPU adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some(config.label.as_str()),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            ..Default::default()
        }))
        .map_err(|source| EngineError::Device {
            adapter: format!("{} ({:?}, driver {})", info.name, info.backend, info.driver),
            source,
        })?;

        Self::from_device(device, queue, &config)
    }

    /// Build the engine on an existing device.
    pub fn from_device(
        device: wgpu::Device,
        queue: wgpu::Queue,
        config: &EngineConfig,
    ) -> Result<Self, EngineError> {
        if !is_supported_output(config.output_format) {
            return Err(EngineError::UnsupportedFormat(config.output_format));
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let (pipeline, bind_group_layout) = create_preview_pipeline(&device, config.output_format);
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(EngineError::ShaderValidation(err.to_string()));
        }

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("glint_look_uniform"),
            size: std::mem::size_of::<LookUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let curve = CurveTexture::new(&device, &queue);
        let cube_placeholder = CubeTexture::placeholder(&device, &queue);

        Ok(Self {
            device,
            queue,
            pipeline,
            bind_group_layout,
            uniform_buffer,
            curve,
            cube: Mutex::new(None),
            cube_placeholder,
            source: None,
            output: None,
            output_format: config.output_format,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn has_image(&self) -> bool {
        self.source.is_some()
    }

    pub fn has_lut(&self) -> bool {
        self.cube.lock().is_some()
    }

    /// Output surface size, once an image is loaded.
    pub fn output_size(&self) -> Option<(u32, u32)> {
        self.source.as_ref().map(|s| (s.width, s.height))
    }

    /// The output surface, for callers that present or copy it themselves.
    pub fn output_texture(&self) -> Option<&wgpu::Texture> {
        self.output.as_ref().map(|o| &o.texture)
    }

    /// Upload a new source image and resize the output surface to match it.
    ///
    /// An image the device cannot hold is rejected before any texture is
    /// touched, so the previously loaded image stays current.
    pub fn load_image(&mut self, image: &SourceImage) -> Result<(), EngineError> {
        let (width, height) = (image.width, image.height);
        if width == 0 || height == 0 || image.pixel_count() != width as usize * height as usize {
            return Err(EngineError::MalformedImage {
                width,
                height,
                pixels: image.pixel_count(),
            });
        }
        let max = self.device.limits().max_texture_dimension_2d;
        if width > max || height > max {
            tracing::warn!(width, height, max, "image exceeds texture limit; keeping previous");
            return Err(EngineError::ImageTooLarge { width, height, max });
        }

        self.source = Some(SourceTexture::upload(&self.device, &self.queue, image));
        self.output = Some(OutputTexture::new(
            &self.device,
            image.width,
            image.height,
            self.output_format,
        ));
        tracing::info!(
            width = image.width,
            height = image.height,
            "source image loaded"
        );
        Ok(())
    }

    /// Draw `look` into the output surface. A no-op until an image is loaded.
    pub fn render(&mut self, look: &Look) {
        if self.source.is_none() {
            tracing::debug!("render skipped: no image loaded");
            return;
        }

        if look.tone_curve.has_data() {
            self.curve
                .write(&self.queue, &build_curve_lut(&look.tone_curve));
        } else {
            self.curve.reset(&self.queue);
        }

        let (Some(source), Some(output)) = (&self.source, &self.output) else {
            return;
        };

        let cube = self.cube.lock();
        let textures = TextureState {
            curve_active: !self.curve.is_identity(),
            cube: cube.as_ref().map(|c| (c.levels, c.tiles)),
        };
        let uniforms = LookUniforms::new(&StageInputs::from_look(look), textures);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let cube_view = &cube.as_ref().unwrap_or(&self.cube_placeholder).view;
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("glint_preview_bind_group"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: self.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&source.view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&self.curve.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(cube_view),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("glint_preview_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("glint_preview_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &output.view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.draw(0..3, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Fetch and decode a tiled-cube LUT from a path or `file://` URL.
    ///
    /// Failure is logged and leaves the previous LUT (or none) in place.
    pub async fn load_lut(&self, url: &str) {
        match fetch_lut(url).await {
            Ok(lut) => {
                self.set_lut(&lut);
                tracing::info!(url, levels = lut.levels(), "external LUT loaded");
            }
            Err(err) => {
                tracing::warn!(url, error = %err, "failed to load external LUT; keeping previous");
            }
        }
    }

    /// Install an already-decoded LUT.
    pub fn set_lut(&self, lut: &TiledCubeLut) {
        let texture = CubeTexture::upload(&self.device, &self.queue, lut);
        *self.cube.lock() = Some(texture);
    }

    pub fn clear_lut(&self) {
        *self.cube.lock() = None;
    }

    /// Read the output surface back to the CPU. Blocks until complete.
    pub fn read_output(&self) -> Result<SourceImage, EngineError> {
        let (Some(source), Some(output)) = (&self.source, &self.output) else {
            return Err(EngineError::NoImage);
        };
        read_texture_rgba8(
            &self.device,
            &self.queue,
            &output.texture,
            output.format,
            source.width,
            source.height,
        )
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

fn create_preview_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
) -> (wgpu::RenderPipeline, wgpu::BindGroupLayout) {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("glint_preview_shader"),
        source: wgpu::ShaderSource::Wgsl(PREVIEW_SHADER.into()),
    });

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("glint_preview_layout"),
        entries: &[
            // binding 0: look uniforms
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(std::mem::size_of::<LookUniforms>() as u64),
                },
                count: None,
            },
            // bindings 1-3: source, curve LUT, cube LUT
            texture_entry(1),
            texture_entry(2),
            texture_entry(3),
        ],
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("glint_preview_pipeline_layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("glint_preview_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    (pipeline, bind_group_layout)
}

/// Resolve a LUT location to a local path. Remote schemes are not fetched here.
pub(crate) fn resolve_lut_path(url: &str) -> Result<PathBuf, LutLoadError> {
    if let Some(rest) = url.strip_prefix("file://") {
        let decoded = urlencoding::decode(rest).map_err(|e| LutLoadError::BadUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        return Ok(PathBuf::from(decoded.into_owned()));
    }
    if let Some((scheme, _)) = url.split_once("://") {
        return Err(LutLoadError::UnsupportedScheme(scheme.to_string()));
    }
    if url.trim().is_empty() {
        return Err(LutLoadError::BadUrl {
            url: url.to_string(),
            reason: "empty".to_string(),
        });
    }
    Ok(PathBuf::from(url))
}

/// Read and decode a tiled-cube LUT from a path or `file://` URL.
pub async fn fetch_lut(url: &str) -> Result<TiledCubeLut, LutLoadError> {
    let path = resolve_lut_path(url)?;
    let bytes = tokio::fs::read(&path).await?;
    let rgba = image::load_from_memory(&bytes)?.to_rgba8();
    let (width, height) = rgba.dimensions();
    let texels = rgba.pixels().map(|p| p.0).collect();
    Ok(TiledCubeLut::from_rgba8(width, height, texels)?)
}
