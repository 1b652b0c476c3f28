//! Flow control and application event loop.
//!
//! A "flow" is the application logic driven by the window: it is loaded once,
//! told about every resize, updated at a fixed rate and asked to render whenever
//! the window can present. All drawing goes through the
//! [`FixedFunction`](crate::immediate::FixedFunction) recorder; the loop uploads
//! whatever frame the flow presented.
//!
//! # Lifecycle Flow
//!
//! 1. The window and GPU context are created on `resumed`
//! 2. `on_load` runs once, followed by `on_resize` with the initial size
//! 3. Window and device events are folded into the polled input state
//! 4. On each redraw the fixed-rate clock decides how many `on_update` ticks are due
//! 5. `on_render` records a frame and presents it
//! 6. The frame is drawn by the GPU context
//!
//! Returning [`Out::Exit`] from `on_update` stops the loop after the current tick.

use std::sync::Arc;

use instant::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{
    clock::TickClock,
    config::Config,
    context::Context,
    immediate::FixedFunction,
    input::{InputSnapshot, InputTracker},
};

/// What the loop should do after an update tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Out {
    #[default]
    Continue,
    Exit,
}

/// Lifecycle hooks of a window-driven scene.
///
/// `gl` is the immediate-mode recorder that stands in for a fixed-function
/// graphics context. It persists across calls, so capabilities enabled in
/// `on_load` stay enabled until a flow disables them.
pub trait GraphicsFlow {
    /// One-time setup of global graphics state.
    fn on_load(&mut self, gl: &mut FixedFunction);

    /// Called with the initial size and on every size change. `height` may be 0.
    fn on_resize(&mut self, gl: &mut FixedFunction, width: u32, height: u32);

    /// Fixed-rate update with the polled input of this tick.
    fn on_update(&mut self, gl: &mut FixedFunction, input: &InputSnapshot, dt: Duration) -> Out;

    /// Records a frame and presents it with `gl.swap_buffers()`.
    fn on_render(&mut self, gl: &mut FixedFunction);
}

/// Window-bound state that only exists after `resumed`.
#[derive(Debug)]
pub struct AppState {
    pub(crate) ctx: Context,
    is_surface_configured: bool,
}

impl AppState {
    fn resize(&mut self, width: u32, height: u32) {
        self.is_surface_configured = self.ctx.resize(width, height);
    }

    fn render(&mut self, gl: &mut FixedFunction) {
        let Some(frame) = gl.take_presented() else {
            return;
        };
        // Rendering requires the surface to be configured
        if !self.is_surface_configured {
            return;
        }
        match self.ctx.render(&frame) {
            Ok(()) => (),
            // Reconfigure the surface if it's lost or outdated
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let size = self.ctx.window().inner_size();
                self.resize(size.width, size.height);
            }
            Err(e) => log::error!("Unable to render {}", e),
        }
    }
}

pub struct App<F: GraphicsFlow> {
    config: Config,
    async_runtime: tokio::runtime::Runtime,
    state: Option<AppState>,
    flow: F,
    gl: FixedFunction,
    input: InputTracker,
    clock: TickClock,
    last_time: Instant,
}

impl<F: GraphicsFlow> App<F> {
    pub fn new(config: Config, flow: F) -> anyhow::Result<Self> {
        let async_runtime = tokio::runtime::Runtime::new()?;
        let clock = TickClock::new(config.updates_per_second, config.max_ticks_per_frame);
        Ok(Self {
            config,
            async_runtime,
            state: None,
            flow,
            gl: FixedFunction::new(),
            input: InputTracker::new(),
            clock,
            last_time: Instant::now(),
        })
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        let window_attributes = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));
        let window = Arc::new(event_loop.create_window(window_attributes)?);
        self.input.set_scale_factor(window.scale_factor());

        let ctx = self
            .async_runtime
            .block_on(Context::new(window.clone(), &self.config))?;
        log::info!("context ready: {:?}", ctx);
        let mut state = AppState {
            ctx,
            is_surface_configured: false,
        };

        let size = window.inner_size();
        state.resize(size.width, size.height);
        self.flow.on_load(&mut self.gl);
        self.flow.on_resize(&mut self.gl, size.width, size.height);

        self.state = Some(state);
        self.last_time = Instant::now();
        window.request_redraw();
        Ok(())
    }

    /// Runs the due update ticks, then lets the flow render.
    fn frame(&mut self, event_loop: &ActiveEventLoop) {
        let elapsed = self.last_time.elapsed();
        self.last_time = Instant::now();

        let dt = self.clock.step();
        for _ in 0..self.clock.advance(elapsed) {
            let input = self.input.snapshot();
            if self.flow.on_update(&mut self.gl, &input, dt) == Out::Exit {
                log::info!("exit requested");
                event_loop.exit();
                return;
            }
        }

        self.flow.on_render(&mut self.gl);
        if let Some(state) = &mut self.state {
            state.render(&mut self.gl);
            // invoke main render loop
            state.ctx.window().request_redraw();
        }
    }
}

impl<F: GraphicsFlow> ApplicationHandler for App<F> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            log::error!("App initialization failed: {:#}", e);
            event_loop.exit();
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        self.input.handle_device_event(&event);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.state.is_none() {
            return;
        }
        self.input.handle_window_event(&event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(state) = &mut self.state {
                    state.resize(size.width, size.height);
                }
                self.flow.on_resize(&mut self.gl, size.width, size.height);
            }
            WindowEvent::RedrawRequested => self.frame(event_loop),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        event_loop.set_control_flow(ControlFlow::Poll);
    }
}

/// Opens the window and drives `flow` until it exits or the window closes.
pub fn run<F: GraphicsFlow>(config: Config, flow: F) -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, flow)?;

    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recording {
        calls: Vec<&'static str>,
    }

    impl GraphicsFlow for Recording {
        fn on_load(&mut self, _: &mut FixedFunction) {
            self.calls.push("load");
        }

        fn on_resize(&mut self, _: &mut FixedFunction, _: u32, _: u32) {
            self.calls.push("resize");
        }

        fn on_update(&mut self, _: &mut FixedFunction, _: &InputSnapshot, _: Duration) -> Out {
            self.calls.push("update");
            Out::Continue
        }

        fn on_render(&mut self, gl: &mut FixedFunction) {
            self.calls.push("render");
            gl.swap_buffers();
        }
    }

    #[test]
    fn app_starts_without_a_window() {
        let app = App::new(Config::default(), Recording::default()).unwrap();
        assert!(app.state.is_none());
        assert!(app.flow.calls.is_empty());
        assert_eq!(app.clock.step(), Duration::from_secs_f64(1.0 / 60.0));
    }

    #[test]
    fn out_defaults_to_continue() {
        assert_eq!(Out::default(), Out::Continue);
    }
}
