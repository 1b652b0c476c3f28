use std::{iter, sync::Arc};

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    config::Config,
    data_structures::texture::Texture,
    immediate::frame::Frame,
    pipelines::{RenderTarget, Renderer},
};

/// Sample counts tried, in order, when the requested one is unsupported.
const SAMPLE_COUNT_FALLBACKS: [u32; 2] = [4, 1];

/// GPU state bound to the window: surface, device, render targets, renderer.
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: Texture,
    pub(crate) msaa_texture: Option<Texture>,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub renderer: Renderer,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("width", &self.config.width)
            .field("height", &self.config.height)
            .field("format", &self.config.format)
            .field("sample_count", &self.renderer.sample_count())
            .finish()
    }
}

impl Context {
    pub async fn new(window: Arc<Window>, settings: &Config) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("wgpu setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("cannot create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter can present to this window")?;
        log::info!("adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("orbit-lights device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .context("cannot open the graphics device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shader outputs colours as given, like fixed-function GL into a
        // linear framebuffer, so prefer a non-sRGB surface.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface reports no texture formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        let sample_count = supported_sample_count(&adapter, surface_format, settings.sample_count);
        let renderer = Renderer::new(&device, surface_format, sample_count);

        let depth_texture = Texture::create_depth_texture(
            &device,
            [config.width, config.height],
            sample_count,
            "depth_texture",
        );
        let msaa_texture = (sample_count > 1).then(|| {
            Texture::create_msaa_texture(
                &device,
                [config.width, config.height],
                sample_count,
                surface_format,
            )
        });

        Ok(Self {
            window,
            depth_texture,
            msaa_texture,
            surface,
            device,
            queue,
            config,
            renderer,
        })
    }

    /// Reconfigures the surface and recreates the size-dependent targets.
    /// Zero sizes (minimised windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        let sample_count = self.renderer.sample_count();
        self.depth_texture =
            Texture::create_depth_texture(&self.device, [width, height], sample_count, "depth_texture");
        if sample_count > 1 {
            self.msaa_texture = Some(Texture::create_msaa_texture(
                &self.device,
                [width, height],
                sample_count,
                self.config.format,
            ));
        }
        true
    }

    /// Draws `frame` into the next surface texture and presents it.
    pub fn render(&self, frame: &Frame) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        let target = match &self.msaa_texture {
            Some(msaa) => RenderTarget {
                colour: &msaa.view,
                resolve: Some(&view),
                depth: &self.depth_texture.view,
                size: [self.config.width, self.config.height],
            },
            None => RenderTarget {
                colour: &view,
                resolve: None,
                depth: &self.depth_texture.view,
                size: [self.config.width, self.config.height],
            },
        };
        self.renderer
            .encode(&self.device, &self.queue, &mut encoder, target, frame);

        self.queue.submit(iter::once(encoder.finish()));
        self.window.pre_present_notify();
        output.present();
        Ok(())
    }

    pub fn window(&self) -> &Window {
        &self.window
    }
}

/// Highest of `requested`, 4 and 1 that both the colour format and the depth
/// format support on this adapter.
pub fn supported_sample_count(
    adapter: &wgpu::Adapter,
    color_format: wgpu::TextureFormat,
    requested: u32,
) -> u32 {
    let color = adapter.get_texture_format_features(color_format);
    let depth = adapter.get_texture_format_features(Texture::DEPTH_FORMAT);
    let chosen = iter::once(requested.max(1))
        .chain(SAMPLE_COUNT_FALLBACKS)
        .find(|count| supports_sample_count(&color, &depth, *count))
        .unwrap_or(1);
    if chosen != requested {
        log::warn!(
            "{}x multisampling is not supported, using {}x",
            requested,
            chosen
        );
    }
    chosen
}

/// Multisampled colour targets are resolved into the single-sampled surface
/// view, so the colour format must also support resolving.
fn supports_sample_count(
    color: &wgpu::TextureFormatFeatures,
    depth: &wgpu::TextureFormatFeatures,
    count: u32,
) -> bool {
    count == 1
        || (color.flags.sample_count_supported(count)
            && color
                .flags
                .contains(wgpu::TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE)
            && depth.flags.sample_count_supported(count))
}
