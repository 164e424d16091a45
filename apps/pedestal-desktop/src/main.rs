use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use pedestal_assets::{Catalog, display_pose, placeholder_slab};
use pedestal_director::{DirectorConfig, IdleAnimationDirector};
use pedestal_input::{CursorHint, DragTracker, InteractionEvent};
use pedestal_loader::{LoadOutcome, ModelLoader};
use pedestal_render_wgpu::{GpuRenderer, OrbitCamera, Viewport};
use pedestal_scene::{SceneEvent, ViewerScene};
use pedestal_tools::{FrameTimer, ViewerInspector};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorIcon, Window, WindowId};

#[derive(Parser)]
#[command(name = "pedestal-desktop", about = "Interactive pedestal model viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Catalog manifest listing the display models
    #[arg(long, default_value = "demos/catalog.yaml")]
    catalog: String,

    /// Show a single model file, bypassing the catalog
    #[arg(long)]
    model: Option<PathBuf>,
}

/// Everything one viewer instance owns. Nothing here is shared: two
/// viewers on one machine would each hold their own scene, director,
/// camera, and loader.
struct ViewerState {
    scene: ViewerScene,
    director: IdleAnimationDirector,
    camera: OrbitCamera,
    viewport: Viewport,
    loader: ModelLoader,
    tracker: DragTracker,
    catalog: Option<Catalog>,
    catalog_index: usize,
    show_overlay: bool,
    frame_timer: FrameTimer,
    last_frame: Instant,
    load_status: String,
}

impl ViewerState {
    fn new(catalog: Option<Catalog>) -> Self {
        let mut state = Self {
            scene: ViewerScene::new(),
            director: IdleAnimationDirector::new(display_pose(), DirectorConfig::default()),
            camera: OrbitCamera::default(),
            viewport: Viewport::default(),
            loader: ModelLoader::new(),
            tracker: DragTracker::new(),
            catalog,
            catalog_index: 0,
            show_overlay: true,
            frame_timer: FrameTimer::default(),
            last_frame: Instant::now(),
            load_status: String::new(),
        };

        if state.catalog.is_some() {
            state.request_entry(0);
        } else {
            // No catalog: stage the built-in slab through the same
            // normalize/finish pipeline real imports go through.
            let mut slab = placeholder_slab();
            slab.normalize();
            slab.apply_display_finish();
            state.scene.insert("placeholder", slab, display_pose());
            state.director.reanchor();
            state.load_status = "no catalog; showing built-in placeholder".to_string();
        }
        state
    }

    fn request_entry(&mut self, index: usize) {
        let Some(catalog) = &self.catalog else {
            return;
        };
        let Some(entry) = catalog.entry(index) else {
            return;
        };
        self.catalog_index = index;
        let label = entry.label.clone();
        let path = entry.path.clone();
        match self.loader.begin_load(&label, path) {
            Ok(generation) => {
                self.load_status = format!("loading {label}");
                tracing::debug!(generation, label = %label, "load requested");
            }
            Err(e) => tracing::error!("load request failed: {e}"),
        }
    }

    fn request_next(&mut self) {
        if let Some(catalog) = &self.catalog {
            self.request_entry(catalog.next_index(self.catalog_index));
        }
    }

    fn request_prev(&mut self) {
        if let Some(catalog) = &self.catalog {
            self.request_entry(catalog.prev_index(self.catalog_index));
        }
    }

    /// One frame of viewer logic: loader poll, interaction events, swap
    /// slides, camera coast, director choreography.
    fn update(&mut self, dt: f32) {
        if let Some(outcome) = self.loader.poll() {
            match outcome {
                LoadOutcome::Ready { label, model } => {
                    self.scene.insert(label, model, display_pose());
                    self.director.reanchor();
                }
                LoadOutcome::Failed { label, message } => {
                    self.scene.report_load_failure(format!("{label}: {message}"));
                }
            }
        }

        for event in self.tracker.drain_events() {
            match event {
                InteractionEvent::Started => self.director.on_interaction_start(),
                InteractionEvent::Ended => self.director.on_interaction_end(),
            }
        }

        self.scene.update(dt);
        self.camera.advance(dt);
        self.director.advance(dt);
        self.scene.apply_pose(self.director.pose());

        for event in self.scene.drain_events() {
            match event {
                SceneEvent::ModelReady { id, label } => {
                    self.load_status = format!("{label} ready");
                    tracing::info!(%id, label = %label, "model ready");
                }
                SceneEvent::ModelRemoved { id } => {
                    tracing::debug!(%id, "model left the scene");
                }
                SceneEvent::LoadFailed { message } => {
                    self.load_status = format!("load failed: {message}");
                }
            }
        }
    }

    fn on_pointer_delta(&mut self, delta: Vec2) {
        if let Some(drag) = self.tracker.on_move(delta) {
            self.camera.apply_drag(drag);
        }
    }

    /// Ordered teardown: director first so no tween can fire again, then
    /// the loader so an in-flight load cannot rejoin the scene.
    fn teardown(&mut self) {
        self.director.teardown();
        self.loader.shutdown();
        tracing::info!("viewer torn down");
    }

    fn draw_ui(&mut self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }

        let summary = ViewerInspector::summary(&self.scene, &self.director);
        let mut goto: Option<usize> = None;

        egui::SidePanel::left("viewer")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Pedestal");
                ui.separator();
                ui.label(format!(
                    "Model: {}",
                    summary.model.as_deref().unwrap_or("<loading>")
                ));
                ui.label(format!("State: {:?}", summary.state));
                ui.label(format!(
                    "Meshes: {}  Vertices: {}",
                    summary.mesh_count, summary.vertex_count
                ));
                if summary.swapping {
                    ui.label("swap in progress");
                }
                ui.separator();

                if let Some(catalog) = &self.catalog {
                    ui.horizontal(|ui| {
                        if ui.button("\u{2039} Prev").clicked() {
                            goto = Some(catalog.prev_index(self.catalog_index));
                        }
                        ui.label(format!("{} / {}", self.catalog_index + 1, catalog.len()));
                        if ui.button("Next \u{203a}").clicked() {
                            goto = Some(catalog.next_index(self.catalog_index));
                        }
                    });
                    ui.separator();
                }

                ui.label(format!(
                    "Frame: {:.1} ms (worst {:.1})",
                    self.frame_timer.average_ms(),
                    self.frame_timer.worst_ms()
                ));
                if !self.load_status.is_empty() {
                    ui.label(&self.load_status);
                }

                ui.separator();
                ui.small("F1: overlay | drag: orbit | \u{2190}/\u{2192}: model");
            });

        if let Some(index) = goto {
            self.request_entry(index);
        }
    }
}

struct GpuApp {
    state: ViewerState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<GpuRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(catalog: Option<Catalog>) -> Self {
        Self {
            state: ViewerState::new(catalog),
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn apply_cursor_hint(&self) {
        if let Some(window) = &self.window {
            window.set_cursor(match self.state.tracker.cursor_hint() {
                CursorHint::Grab => CursorIcon::Grab,
                CursorHint::Grabbing => CursorIcon::Grabbing,
            });
        }
    }

    /// Director, loader, then GPU resources, then the loop itself.
    fn shut_down(&mut self, event_loop: &ActiveEventLoop) {
        self.state.teardown();
        self.renderer = None;
        self.egui_renderer = None;
        self.egui_winit = None;
        self.surface = None;
        self.queue = None;
        self.device = None;
        self.config = None;
        self.window = None;
        event_loop.exit();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Pedestal")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("pedestal_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

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
        surface.configure(&device, &config);

        self.state.viewport.resize(size.width, size.height);

        let renderer = GpuRenderer::new(&device, surface_format, size.width, size.height);

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        window.set_cursor(CursorIcon::Grab);

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // A release (or focus loss) must always reach the tracker, even
        // when the pointer ends up over the overlay, so every drag that
        // started also ends.
        match &event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Released,
                ..
            }
            | WindowEvent::Focused(false) => {
                self.state.tracker.on_release();
                self.apply_cursor_hint();
            }
            _ => {}
        }

        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.shut_down(event_loop);
            }
            WindowEvent::Resized(new_size) => {
                if !self.state.viewport.resize(new_size.width, new_size.height) {
                    return;
                }
                if let (Some(surface), Some(device), Some(config)) =
                    (&self.surface, &self.device, &mut self.config)
                {
                    config.width = new_size.width;
                    config.height = new_size.height;
                    surface.configure(device, config);
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(device, config.width, config.height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match key {
                KeyCode::F1 => self.state.show_overlay = !self.state.show_overlay,
                KeyCode::ArrowRight => self.state.request_next(),
                KeyCode::ArrowLeft => self.state.request_prev(),
                KeyCode::Escape => self.shut_down(event_loop),
                _ => {}
            },
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } => {
                self.state.tracker.on_press();
                self.apply_cursor_hint();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                // Clamp so a stalled frame cannot teleport animations.
                let dt = (now - self.state.last_frame).as_secs_f32().min(0.1);
                self.state.last_frame = now;
                self.state.frame_timer.record(Duration::from_secs_f32(dt));
                self.state.update(dt);

                let (Some(surface), Some(device), Some(queue)) =
                    (&self.surface, &self.device, &self.queue)
                else {
                    return;
                };

                let output = match surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(config) = &self.config {
                            surface.configure(device, config);
                        }
                        return;
                    }
                    Err(e) => {
                        tracing::error!("surface error: {e}");
                        return;
                    }
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                if let Some(renderer) = &mut self.renderer {
                    renderer.render(
                        device,
                        queue,
                        &view,
                        &self.state.camera,
                        &self.state.viewport,
                        &self.state.scene,
                    );
                }

                let raw_input = self
                    .egui_winit
                    .as_mut()
                    .unwrap()
                    .take_egui_input(self.window.as_ref().unwrap());
                let full_output = self.egui_ctx.run(raw_input, |ctx| {
                    self.state.draw_ui(ctx);
                });

                self.egui_winit.as_mut().unwrap().handle_platform_output(
                    self.window.as_ref().unwrap(),
                    full_output.platform_output,
                );

                let paint_jobs = self
                    .egui_ctx
                    .tessellate(full_output.shapes, full_output.pixels_per_point);

                let screen_descriptor = egui_wgpu::ScreenDescriptor {
                    size_in_pixels: [
                        self.config.as_ref().unwrap().width,
                        self.config.as_ref().unwrap().height,
                    ],
                    pixels_per_point: full_output.pixels_per_point,
                };

                {
                    let egui_renderer = self.egui_renderer.as_mut().unwrap();
                    for (id, image_delta) in &full_output.textures_delta.set {
                        egui_renderer.update_texture(device, queue, *id, image_delta);
                    }
                    let mut encoder =
                        device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                            label: Some("egui_encoder"),
                        });
                    egui_renderer.update_buffers(
                        device,
                        queue,
                        &mut encoder,
                        &paint_jobs,
                        &screen_descriptor,
                    );
                    {
                        let mut pass = encoder
                            .begin_render_pass(&wgpu::RenderPassDescriptor {
                                label: Some("egui_pass"),
                                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                                    view: &view,
                                    resolve_target: None,
                                    ops: wgpu::Operations {
                                        load: wgpu::LoadOp::Load,
                                        store: wgpu::StoreOp::Store,
                                    },
                                })],
                                depth_stencil_attachment: None,
                                ..Default::default()
                            })
                            .forget_lifetime();
                        egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
                    }
                    queue.submit(std::iter::once(encoder.finish()));
                    for id in &full_output.textures_delta.free {
                        egui_renderer.free_texture(id);
                    }
                }

                output.present();
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state
                .on_pointer_delta(Vec2::new(delta.0 as f32, delta.1 as f32));
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("pedestal-desktop starting");

    let catalog = if let Some(model) = cli.model {
        Some(Catalog::single(model))
    } else {
        match Catalog::load(&cli.catalog) {
            Ok(catalog) => Some(catalog),
            Err(e) => {
                tracing::error!(
                    "catalog {} unavailable ({e}); showing built-in placeholder",
                    cli.catalog
                );
                None
            }
        }
    };

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(catalog);
    event_loop.run_app(&mut app)?;

    Ok(())
}
