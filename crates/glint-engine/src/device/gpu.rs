use anyhow::{Context, Result};
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use super::surface::{self, SurfaceErrorAction};
use super::{DepthStencilTarget, GpuInit};

/// An acquired surface texture plus the encoder recording into it.
///
/// Hand it back through [`Gpu::submit`] promptly; while it lives no further
/// surface texture can be acquired.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// Owns wgpu core objects, the surface configuration and the surface's
/// depth/stencil attachment.
///
/// This type is the low-level rendering context:
/// - creates and stores Adapter/Device/Queue
/// - creates and configures the Surface (swapchain)
/// - keeps a depth/stencil texture matching the surface size
/// - acquires frames and provides an encoder + view for rendering
pub struct Gpu<'w> {
    /// Surface bound to the window.
    ///
    /// The window must outlive the `Gpu`; `'w` enforces it.
    surface: wgpu::Surface<'w>,

    adapter: wgpu::Adapter,
    device: wgpu::Device,
    queue: wgpu::Queue,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    /// Current drawable size in physical pixels.
    size: PhysicalSize<u32>,

    depth: DepthStencilTarget,
}

impl<'w> Gpu<'w> {
    /// Creates a GPU context bound to a window.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(window: &'w Window, init: GpuInit) -> Result<Self> {
        let size = window.inner_size();
        anyhow::ensure!(size.width > 0 && size.height > 0, "window has zero size");

        let GpuInit {
            prefer_srgb,
            present_mode,
            alpha_mode,
            required_features,
            required_limits,
            desired_maximum_frame_latency,
        } = init;

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .context("failed to create wgpu surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("glint device"),
                required_features,
                required_limits,
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let format = surface::choose_surface_format(&surface_caps, prefer_srgb)
            .context("no supported surface formats")?;
        let alpha_mode = surface::choose_alpha_mode(&surface_caps, alpha_mode);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency,
        };
        surface.configure(&device, &config);

        let depth = DepthStencilTarget::new(&device, size.width, size.height, "glint surface depth");

        log::debug!(
            "surface configured: {}x{} {:?} {:?}",
            size.width,
            size.height,
            format,
            present_mode
        );

        Ok(Self {
            surface,
            adapter,
            device,
            queue,
            config,
            size,
            depth,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// Returns the current drawable size (physical pixels).
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Depth/stencil attachment matching the surface.
    pub fn depth_view(&self) -> &wgpu::TextureView {
        self.depth.view()
    }

    /// Reconfigures the surface and its depth/stencil target after a resize.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let configured = surface::apply_resize(
            &self.surface,
            &self.device,
            &mut self.config,
            &mut self.size,
            new_size,
        );

        if configured && self.depth.size() != (new_size.width, new_size.height) {
            self.depth = DepthStencilTarget::new(
                &self.device,
                new_size.width,
                new_size.height,
                "glint surface depth",
            );
        }
    }

    /// Acquires the next surface texture and creates an encoder.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("glint frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands for the given frame and presents it.
    pub fn submit(&self, frame: GpuFrame) {
        let GpuFrame { surface_texture, view, encoder } = frame;
        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }

    /// Converts a `SurfaceError` into a higher-level action.
    pub fn handle_surface_error(&mut self, err: SurfaceError) -> SurfaceErrorAction {
        surface::map_surface_error(&self.surface, &self.device, &self.config, self.size, err)
    }
}
