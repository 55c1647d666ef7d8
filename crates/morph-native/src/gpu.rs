use std::time::{Duration, Instant};

use wgpu::util::DeviceExt;

use morph_core::{Camera, MorphEngine, ParticleBuffer, POINT_SIZE};

const PARTICLE_OPACITY: f32 = 0.8;

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
    params: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceData {
    pos: [f32; 3],
    color: [f32; 3],
}

impl InstanceData {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![1 => Float32x3, 2 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBS,
        }
    }
}

// Two triangles spanning [-0.5, 0.5]^2; the shader scales them to sprite size.
const SPRITE_CORNERS: [[f32; 2]; 6] = [
    [-0.5, -0.5],
    [0.5, -0.5],
    [0.5, 0.5],
    [-0.5, -0.5],
    [0.5, 0.5],
    [-0.5, 0.5],
];
const CORNER_ATTRIBS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

fn corner_layout() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<[f32; 2]>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &CORNER_ATTRIBS,
    }
}

/// Sprites add light: overlapping particles brighten instead of occluding.
const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    },
};

struct SurfaceContext<'w> {
    surface: wgpu::Surface<'w>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
}

async fn acquire_surface(window: &winit::window::Window) -> anyhow::Result<SurfaceContext<'_>> {
    let size = window.inner_size();
    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(window)?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .ok_or_else(|| anyhow::anyhow!("No GPU adapter"))?;
    log::info!("[gpu] adapter: {}", adapter.get_info().name);
    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("morph-device"),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            },
            None,
        )
        .await?;

    let caps = surface.get_capabilities(&adapter);
    let format = caps
        .formats
        .first()
        .copied()
        .ok_or_else(|| anyhow::anyhow!("Surface reports no formats"))?;
    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu::PresentMode::Fifo,
        alpha_mode: caps.alpha_modes.first().copied().unwrap_or_default(),
        desired_maximum_frame_latency: 2,
        view_formats: vec![],
    };
    surface.configure(&device, &config);
    Ok(SurfaceContext {
        surface,
        device,
        queue,
        config,
    })
}

fn sprite_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    uniforms_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("particles"),
        source: wgpu::ShaderSource::Wgsl(morph_core::PARTICLES_WGSL.into()),
    });
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("particles-layout"),
        bind_group_layouts: &[uniforms_layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("particles-pipeline"),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[corner_layout(), InstanceData::layout()],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(ADDITIVE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: Default::default(),
        depth_stencil: None,
        multisample: Default::default(),
        cache: None,
        multiview: None,
    })
}

fn instances_from(buffer: &ParticleBuffer, out: &mut Vec<InstanceData>) {
    out.clear();
    out.extend(
        buffer
            .positions
            .iter()
            .zip(&buffer.colors)
            .map(|(p, c)| InstanceData {
                pos: p.to_array(),
                color: c.to_array(),
            }),
    );
}

pub struct GpuState<'w> {
    pub window: &'w winit::window::Window,
    ctx: SurfaceContext<'w>,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    corner_vb: wgpu::Buffer,
    instance_vb: wgpu::Buffer,
    instances: Vec<InstanceData>,
    camera: Camera,
    last_frame: Instant,
}

impl<'w> GpuState<'w> {
    pub async fn new(window: &'w winit::window::Window, particle_count: usize) -> anyhow::Result<Self> {
        let ctx = acquire_surface(window).await?;
        let device = &ctx.device;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniforms"),
            size: std::mem::size_of::<Uniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let uniforms_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniforms-layout"),
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
            label: Some("uniforms"),
            layout: &uniforms_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let pipeline = sprite_pipeline(device, ctx.config.format, &uniforms_layout);

        let corner_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sprite-corners"),
            contents: bytemuck::cast_slice(&SPRITE_CORNERS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        // Particle count is fixed for the engine's lifetime, so one allocation suffices.
        let instance_vb = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("particles"),
            size: (std::mem::size_of::<InstanceData>() * particle_count.max(1)) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let size = window.inner_size();
        let mut camera = Camera::default();
        camera.set_viewport(size.width, size.height);

        Ok(Self {
            window,
            ctx,
            pipeline,
            uniform_buffer,
            uniform_bind_group,
            corner_vb,
            instance_vb,
            instances: Vec::with_capacity(particle_count),
            camera,
            last_frame: Instant::now(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.ctx.config.width = new_size.width;
        self.ctx.config.height = new_size.height;
        self.camera.set_viewport(new_size.width, new_size.height);
        self.ctx.surface.configure(&self.ctx.device, &self.ctx.config);
    }

    /// Time since the previous call; the first call measures from creation.
    pub fn frame_dt(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now - self.last_frame;
        self.last_frame = now;
        dt
    }

    fn write_uniforms(&self, engine: &MorphEngine) {
        let uniforms = Uniforms {
            view: self.camera.view_matrix().to_cols_array_2d(),
            proj: self.camera.projection_matrix().to_cols_array_2d(),
            model: engine.model_matrix().to_cols_array_2d(),
            params: [POINT_SIZE, PARTICLE_OPACITY, 0.0, 0.0],
        };
        self.ctx
            .queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    /// Upload whatever the engine changed and draw one frame.
    pub fn render(&mut self, engine: &mut MorphEngine) -> Result<(), wgpu::SurfaceError> {
        let frame = self.ctx.surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());

        self.write_uniforms(engine);
        if engine.take_changes().any() {
            instances_from(engine.buffer(), &mut self.instances);
            self.ctx
                .queue
                .write_buffer(&self.instance_vb, 0, bytemuck::cast_slice(&self.instances));
        }

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("particles"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                ..Default::default()
            });
            if !self.instances.is_empty() {
                pass.set_pipeline(&self.pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, self.corner_vb.slice(..));
                pass.set_vertex_buffer(1, self.instance_vb.slice(..));
                pass.draw(0..SPRITE_CORNERS.len() as u32, 0..self.instances.len() as u32);
            }
        }
        self.ctx.queue.submit(Some(encoder.finish()));
        frame.present();
        Ok(())
    }
}
