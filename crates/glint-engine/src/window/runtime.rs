use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::input::platform::winit::translate_window_event;
use crate::input::InputState;
use crate::render::{FrameStatus, Renderer, RendererConfig, WgpuBackend, WindowRenderer};
use crate::time::FrameClock;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    /// Initial drawable size in physical pixels.
    pub width: u32,
    pub height: u32,
    pub resizable: bool,
    /// Frame-rate cap; `0` disables pacing.
    pub target_fps: u32,
    pub renderer: RendererConfig,
    pub gpu: GpuInit,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "glint".to_string(),
            width: 1280,
            height: 720,
            resizable: true,
            target_fps: 60,
            renderer: RendererConfig::default(),
            gpu: GpuInit::default(),
        }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window and drives `app` until it exits or the window closes.
    ///
    /// Start-up failures (event loop, window, GPU, renderer, `App::on_start`)
    /// are logged and returned.
    pub fn run<A>(config: RuntimeConfig, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    input: InputState,
    clock: FrameClock,

    window: Window,

    #[borrows(window)]
    #[covariant]
    renderer: WindowRenderer<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    app: A,

    window: Option<WindowEntry>,
    started: bool,
    exit_requested: bool,
    error: Option<anyhow::Error>,
}

fn create_renderer<'w>(
    window: &'w Window,
    gpu_init: GpuInit,
    config: RendererConfig,
) -> Result<WindowRenderer<'w>> {
    let gpu = pollster::block_on(Gpu::new(window, gpu_init)).context("GPU initialization failed")?;
    let size = window.inner_size();
    Renderer::new(WgpuBackend::new(gpu), config, size.width, size.height)
        .context("failed to create renderer")
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, app: A) -> Self {
        Self {
            config,
            app,
            window: None,
            started: false,
            exit_requested: false,
            error: None,
        }
    }

    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        self.exit_requested = true;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error = Some(err);
        self.request_exit(event_loop);
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEntry> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(PhysicalSize::new(self.config.width, self.config.height))
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.config.gpu.clone();
        let renderer_config = self.config.renderer.clone();

        let entry = WindowEntryTryBuilder {
            input: InputState::default(),
            clock: FrameClock::with_target_fps(self.config.target_fps),
            window,
            renderer_builder: |w| create_renderer(w, gpu_init, renderer_config),
        }
        .try_build()?;

        Ok(entry)
    }

    /// Lets the app release its resources, then drops renderer and window.
    fn destroy_window_entry(&mut self) {
        if let Some(mut entry) = self.window.take() {
            if self.started {
                let app = &mut self.app;
                entry.with_renderer_mut(|renderer| app.on_exit(renderer));
            }
            log::debug!("window closed");
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, window) = (&mut self.app, &mut self.window);
        let Some(entry) = window.as_mut() else { return };

        let (control, status) = entry.with_mut(|fields| {
            let height = fields.window.inner_size().height as f32;
            fields.input.begin_frame(height);
            fields.renderer.begin_frame();

            let control = {
                let mut ctx = FrameCtx {
                    window: WindowCtx {
                        id: fields.window.id(),
                        window: fields.window,
                    },
                    renderer: &mut *fields.renderer,
                    input: &*fields.input,
                    clock: &mut *fields.clock,
                };
                app.on_frame(&mut ctx)
            };

            fields.window.pre_present_notify();
            let status = fields.renderer.end_frame();
            fields.clock.end_frame();

            (control, status)
        });

        if status == FrameStatus::Fatal {
            self.fail(event_loop, anyhow::anyhow!("presentation surface lost"));
            self.destroy_window_entry();
            return;
        }

        if control == AppControl::Exit {
            self.destroy_window_entry();
            self.request_exit(event_loop);
        }
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exit_requested {
            return;
        }

        let mut entry = match self.create_window_entry(event_loop) {
            Ok(entry) => entry,
            Err(e) => {
                self.fail(event_loop, e.context("failed to create initial window"));
                return;
            }
        };

        if !self.started {
            let app = &mut self.app;
            if let Err(e) = entry.with_renderer_mut(|renderer| app.on_start(renderer)) {
                self.fail(event_loop, e.context("application start-up failed"));
                return;
            }
            self.started = true;
        }

        entry.with_window(|w| w.request_redraw());
        self.window = Some(entry);
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw; pacing is the frame clock's job.
        if let Some(entry) = &self.window {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let (app, window) = (&mut self.app, &mut self.window);
        let Some(entry) = window.as_mut() else {
            return;
        };

        entry.with_input_mut(|input| translate_window_event(&event, |ev| input.apply_event(ev)));

        if app.on_window_event(&event) == AppControl::Exit {
            self.destroy_window_entry();
            self.request_exit(event_loop);
            return;
        }

        // Runtime-managed window lifecycle / resize / redraw handling.
        match &event {
            WindowEvent::CloseRequested => {
                self.destroy_window_entry();
                self.request_exit(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                entry.with_renderer_mut(|r| r.on_window_resize(new_size.width, new_size.height));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let new_size = entry.with_window(|w| w.inner_size());
                entry.with_renderer_mut(|r| r.on_window_resize(new_size.width, new_size.height));
                entry.with_window(|w| w.request_redraw());
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.destroy_window_entry();
    }
}
