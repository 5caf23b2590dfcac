//! wgpu renderer for the heart field.
//!
//! Draws the edge list as a line list and the live buffer as instanced
//! camera-facing quads, both in the group's model space.

mod shaders;

use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::animator::{Frame, FrameSink};
use crate::config::VisualConfig;
use crate::edges::{EdgeList, LineVertex};
use crate::error::{GpuError, RenderError};

pub use shaders::{LINE_SHADER, POINT_SHADER};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct Uniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    color: [f32; 4],
    point_size: f32,
    line_opacity: f32,
    _padding: [f32; 2],
}

impl Uniforms {
    /// `srgb_target` is true when the surface encodes to sRGB on write, in
    /// which case the shader has to output linear values.
    fn new(frame: &Frame<'_>, visuals: &VisualConfig, srgb_target: bool) -> Self {
        let [r, g, b] = target_rgb(visuals.color, srgb_target);
        Self {
            view: frame.view.to_cols_array_2d(),
            proj: frame.projection.to_cols_array_2d(),
            model: frame.model.to_cols_array_2d(),
            color: [r, g, b, 1.0],
            point_size: visuals.point_size,
            line_opacity: visuals.line_opacity,
            _padding: [0.0; 2],
        }
    }
}

/// Decodes one sRGB channel to linear.
fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn target_rgb([r, g, b]: [f32; 3], srgb_target: bool) -> [f32; 3] {
    if srgb_target {
        [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b)]
    } else {
        [r, g, b]
    }
}

struct DepthTarget {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

/// Window-backed [`FrameSink`].
pub struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    point_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    point_buffer: wgpu::Buffer,
    point_capacity: usize,
    line_buffer: Option<wgpu::Buffer>,
    line_vertex_count: u32,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    depth: DepthTarget,
    visuals: VisualConfig,
    srgb_target: bool,
    released: bool,
}

impl GpuState {
    pub async fn new(
        window: Arc<Window>,
        point_count: usize,
        visuals: VisualConfig,
    ) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Heart Field Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoAdapter)?;

        // A see-through background needs a compositing alpha mode.
        let alpha_mode = if visuals.background[3] < 1.0 {
            surface_caps
                .alpha_modes
                .iter()
                .copied()
                .find(|m| {
                    matches!(
                        m,
                        wgpu::CompositeAlphaMode::PreMultiplied
                            | wgpu::CompositeAlphaMode::PostMultiplied
                    )
                })
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        } else {
            wgpu::CompositeAlphaMode::Auto
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth = create_depth_target(&device, &config);

        let point_buffer = create_point_buffer(&device, point_count);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<Uniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Heart Field Pipeline Layout"),
            bind_group_layouts: &[&uniform_bind_group_layout],
            push_constant_ranges: &[],
        });

        let point_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            config.format,
            PipelineKind::Points,
        );
        let line_pipeline = create_pipeline(
            &device,
            &pipeline_layout,
            config.format,
            PipelineKind::Lines,
        );

        log::debug!(
            "GPU ready: {}x{} {:?}, {} points",
            config.width,
            config.height,
            config.format,
            point_count
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            point_pipeline,
            line_pipeline,
            point_buffer,
            point_capacity: point_count,
            line_buffer: None,
            line_vertex_count: 0,
            uniform_buffer,
            uniform_bind_group,
            depth,
            srgb_target: surface_format.is_srgb(),
            visuals,
            released: false,
        })
    }

    fn upload_points(&mut self, live: &[f32]) {
        let count = live.len() / 3;
        if count > self.point_capacity {
            self.point_buffer.destroy();
            self.point_buffer = create_point_buffer(&self.device, count);
            self.point_capacity = count;
        }
        if !live.is_empty() {
            self.queue
                .write_buffer(&self.point_buffer, 0, bytemuck::cast_slice(live));
        }
    }
}

impl FrameSink for GpuState {
    fn resize(&mut self, width: u32, height: u32) {
        if self.released || width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth.texture.destroy();
        self.depth = create_depth_target(&self.device, &self.config);
    }

    fn update_edges(&mut self, edges: &EdgeList) {
        if self.released {
            return;
        }
        if let Some(old) = self.line_buffer.take() {
            old.destroy();
        }
        let vertices: Vec<LineVertex> = edges.vertices();
        self.line_vertex_count = vertices.len() as u32;
        // Zero-sized vertex buffers are not allowed.
        if !vertices.is_empty() {
            self.line_buffer = Some(self.device.create_buffer_init(
                &wgpu::util::BufferInitDescriptor {
                    label: Some("Edge Buffer"),
                    contents: bytemuck::cast_slice(&vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                },
            ));
        }
    }

    fn draw(&mut self, frame: &Frame<'_>) -> Result<(), RenderError> {
        if self.released {
            return Err(RenderError::Fatal("renderer already released".into()));
        }

        self.upload_points(frame.live);
        let uniforms = Uniforms::new(frame, &self.visuals, self.srgb_target);
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                return Err(RenderError::SurfaceLost)
            }
            Err(wgpu::SurfaceError::Timeout) => {
                return Err(RenderError::Skipped("surface timeout".into()))
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(RenderError::Fatal("out of GPU memory".into()))
            }
            Err(wgpu::SurfaceError::Other) => {
                return Err(RenderError::Skipped("surface unavailable".into()))
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let [bg_r, bg_g, bg_b, a] = self.visuals.background;
        let [r, g, b] = target_rgb([bg_r, bg_g, bg_b], self.srgb_target);
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Heart Field Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);

            if let Some(line_buffer) = &self.line_buffer {
                render_pass.set_pipeline(&self.line_pipeline);
                render_pass.set_vertex_buffer(0, line_buffer.slice(..));
                render_pass.draw(0..self.line_vertex_count, 0..1);
            }

            let point_count = frame.point_count() as u32;
            if point_count > 0 {
                render_pass.set_pipeline(&self.point_pipeline);
                render_pass.set_vertex_buffer(0, self.point_buffer.slice(..));
                render_pass.draw(0..6, 0..point_count);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(buffer) = self.line_buffer.take() {
            buffer.destroy();
        }
        self.line_vertex_count = 0;
        self.point_buffer.destroy();
        self.uniform_buffer.destroy();
        self.depth.texture.destroy();
        log::debug!("GPU resources released");
    }
}

#[derive(Clone, Copy)]
enum PipelineKind {
    Points,
    Lines,
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    kind: PipelineKind,
) -> wgpu::RenderPipeline {
    const POINT_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
    const LINE_ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32];

    let (label, source, buffer, topology, depth_write) = match kind {
        PipelineKind::Points => (
            "Point Pipeline",
            POINT_SHADER,
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 3) as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &POINT_ATTRIBUTES,
            },
            wgpu::PrimitiveTopology::TriangleList,
            true,
        ),
        PipelineKind::Lines => (
            "Line Pipeline",
            LINE_SHADER,
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<LineVertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &LINE_ATTRIBUTES,
            },
            wgpu::PrimitiveTopology::LineList,
            false,
        ),
    };

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[buffer],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: depth_write,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_point_buffer(device: &wgpu::Device, point_count: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Point Buffer"),
        size: (point_count.max(1) * 3 * std::mem::size_of::<f32>()) as wgpu::BufferAddress,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_depth_target(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> DepthTarget {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    DepthTarget { texture, view }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_layout() {
        // 3 × mat4 + vec4 + 2 scalars + 2 pad, a multiple of 16 bytes.
        assert_eq!(std::mem::size_of::<Uniforms>(), 224);
        assert_eq!(std::mem::size_of::<Uniforms>() % 16, 0);
    }

    fn linear_to_srgb(c: f32) -> f32 {
        if c <= 0.003_130_8 {
            c * 12.92
        } else {
            1.055 * c.powf(1.0 / 2.4) - 0.055
        }
    }

    fn to_bytes(rgb: [f32; 3]) -> [u8; 3] {
        rgb.map(|c| (c * 255.0).round() as u8)
    }

    #[test]
    fn test_default_color_survives_srgb_surface() {
        // The surface re-encodes what the shader writes, so the uniform
        // must hold linear values that encode back to #ff2d3f.
        let linear = target_rgb(VisualConfig::default().color, true);
        assert!(linear[1] < 0.03 && linear[2] < 0.06);
        assert_eq!(to_bytes(linear.map(linear_to_srgb)), [0xff, 0x2d, 0x3f]);
    }

    #[test]
    fn test_color_passes_through_on_linear_surface() {
        let color = VisualConfig::default().color;
        assert_eq!(target_rgb(color, false), color);
        assert_eq!(to_bytes(color), [0xff, 0x2d, 0x3f]);
    }

    #[test]
    fn test_srgb_decode_endpoints() {
        assert_eq!(srgb_to_linear(0.0), 0.0);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!((srgb_to_linear(0.5) - 0.214_041).abs() < 1e-5);
    }

    #[test]
    fn test_line_vertex_stride() {
        assert_eq!(std::mem::size_of::<LineVertex>(), 16);
    }
}
