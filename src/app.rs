//! Window and event loop glue around [`Viewer`].

use std::{sync::Arc, time::Instant};

use cgmath::Vector3;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{
    config::ViewerConfig,
    error::ViewerError,
    gfx::rendering::RenderEngine,
    memory::{self, MemoryObjectRegistrar},
    ui::{workshop_overlay, UiManager},
    viewer::Viewer,
};

/// Native host for the workshop viewer
pub struct ViewerApp {
    config: ViewerConfig,
    registrars: Vec<MemoryObjectRegistrar>,
}

struct AppState {
    viewer: Viewer,
    window: Option<Arc<Window>>,
    render_engine: Option<RenderEngine>,
    ui_manager: Option<UiManager>,
    vsync: bool,
    fatal: Option<ViewerError>,
}

impl ViewerApp {
    /// Creates the app with the built-in memory object registrars
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            registrars: memory::registrars(),
        }
    }

    /// Adds a memory object registrar; call before [`ViewerApp::run`]
    pub fn register_memory(&mut self, registrar: MemoryObjectRegistrar) -> &mut Self {
        self.registrars.push(registrar);
        self
    }

    /// Opens the window and runs until it closes
    pub fn run(self) -> Result<(), ViewerError> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let vsync = self.config.vsync;
        let mut state = AppState {
            viewer: Viewer::new(self.config, self.registrars),
            window: None,
            render_engine: None,
            ui_manager: None,
            vsync,
            fatal: None,
        };
        event_loop.run_app(&mut state)?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: ViewerError) {
        log::error!("{err}");
        self.fatal = Some(err);
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key_code: KeyCode) {
        match key_code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::KeyT => {
                self.viewer.add_test_cube(Vector3::new(0.0, 5.0, 0.0));
            }
            KeyCode::KeyM => self.viewer.add_debug_model(),
            KeyCode::KeyF => {
                if !self.viewer.frame_focus() {
                    log::warn!("Nothing to frame");
                }
            }
            KeyCode::KeyV => {
                if let Some(render_engine) = self.render_engine.as_mut() {
                    self.vsync = !self.vsync;
                    render_engine.set_vsync(self.vsync);
                    log::info!("VSync {}", if self.vsync { "on" } else { "off" });
                }
            }
            _ => {}
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        self.viewer.update(now);

        let (Some(render_engine), Some(window)) = (self.render_engine.as_mut(), self.window.as_ref())
        else {
            return;
        };
        render_engine.prepare_scene(&mut self.viewer.scene);

        let viewer = &self.viewer;
        let ui_manager = self.ui_manager.as_mut();
        let result = render_engine.render_frame(
            &viewer.scene,
            Some(
                |device: &wgpu::Device,
                 queue: &wgpu::Queue,
                 encoder: &mut wgpu::CommandEncoder,
                 view: &wgpu::TextureView| {
                    if let Some(ui_manager) = ui_manager {
                        ui_manager.build(window, |ui| workshop_overlay(ui, viewer));
                        ui_manager.render(device, queue, encoder, view);
                    }
                },
            ),
        );

        match result {
            Ok(true) => {
                let triangles = self.viewer.scene.triangle_count();
                self.viewer.record_frame(now, triangles);
            }
            Ok(false) => {}
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory, closing");
                event_loop.exit();
            }
            Err(err) => log::warn!("Dropped frame: {err}"),
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let config = self.viewer.config();
        let (width, height) = config.window_size;
        let attributes = Window::default_attributes()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(width, height));
        let vsync = self.vsync;
        let shadow_map_size = config.lighting.shadow_map_size;

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };
        self.window = Some(window.clone());

        let PhysicalSize { width, height } = window.inner_size();
        let renderer = pollster::block_on(RenderEngine::new(
            window.clone(),
            width,
            height,
            vsync,
            shadow_map_size,
        ));
        let renderer = match renderer {
            Ok(renderer) => renderer,
            Err(err) => {
                self.viewer.renderer_failed(&err);
                return self.fail(event_loop, err.into());
            }
        };

        self.viewer.renderer_ready(width, height);
        self.viewer
            .scene
            .camera_manager
            .camera
            .resize_projection(width, height);

        let mut ui_manager = UiManager::new(
            renderer.device(),
            renderer.queue(),
            renderer.surface_format(),
            &window,
        );
        ui_manager.resize(width, height);

        self.ui_manager = Some(ui_manager);
        self.render_engine = Some(renderer);
        self.viewer.start(Instant::now());
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // Handle UI input first
        if let Some(ui_manager) = self.ui_manager.as_mut() {
            if ui_manager.handle_window_event(&window, window_id, &event) {
                self.viewer.scene.camera_manager.controller.release_buttons();
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, key_code),
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if width == 0 || height == 0 {
                    return;
                }
                self.viewer
                    .scene
                    .camera_manager
                    .camera
                    .resize_projection(width, height);
                if let Some(render_engine) = self.render_engine.as_mut() {
                    render_engine.resize(width, height);
                }
                if let Some(ui_manager) = self.ui_manager.as_mut() {
                    ui_manager.resize(width, height);
                }
            }
            WindowEvent::Focused(false) => {
                self.viewer.scene.camera_manager.controller.release_buttons();
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            other => {
                self.viewer.scene.camera_manager.process_window_event(&other);
            }
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        // Check if UI wants to capture input before processing camera events
        if self.ui_manager.as_ref().is_some_and(UiManager::wants_mouse) {
            return;
        }

        self.viewer.scene.camera_manager.process_device_event(&event);
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.viewer.shutdown();
        self.ui_manager = None;
        self.render_engine = None;
        self.window = None;
        log::info!("Viewer shut down");
    }
}
