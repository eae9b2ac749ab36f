//! Dear ImGui glue for the workshop overlay
//!
//! [`UiManager`] owns the imgui context together with its winit platform and
//! wgpu renderer. Each frame the app feeds it window events, builds the
//! overlay with [`UiManager::build`] and records it on top of the lit scene
//! with [`UiManager::render`].

use std::time::Instant;

use imgui::{Context, FontConfig, FontSource, MouseCursor};
use imgui_wgpu::{Renderer, RendererConfig};
use imgui_winit_support::{HiDpiMode, WinitPlatform};
use wgpu::{CommandEncoder, Device, Queue, TextureFormat, TextureView};
use winit::{
    event::{Event, WindowEvent},
    window::{Window, WindowId},
};

const FONT_SIZE: f32 = 18.0;

pub struct UiManager {
    context: Context,
    platform: WinitPlatform,
    renderer: Renderer,
    last_frame: Instant,
    cursor: Option<MouseCursor>,
}

impl UiManager {
    /// Attaches imgui to `window`, drawing into targets of `target_format`
    ///
    /// DPI is locked to 1.0; the display size follows the physical surface.
    pub fn new(device: &Device, queue: &Queue, target_format: TextureFormat, window: &Window) -> Self {
        let mut context = Context::create();
        context.set_ini_filename(None);

        let mut platform = WinitPlatform::new(&mut context);
        platform.attach_window(context.io_mut(), window, HiDpiMode::Locked(1.0));

        context.fonts().add_font(&[FontSource::DefaultFontData {
            config: Some(FontConfig {
                oversample_h: 1,
                pixel_snap_h: true,
                size_pixels: FONT_SIZE,
                ..Default::default()
            }),
        }]);

        // On an sRGB target imgui's colours are linearised first, so the hex
        // colours used by the panels come out as written
        let base_config = if target_format.is_srgb() {
            RendererConfig::new_srgb()
        } else {
            RendererConfig::new()
        };
        let config = RendererConfig {
            texture_format: target_format,
            ..base_config
        };
        let renderer = Renderer::new(&mut context, device, queue, config);

        Self {
            context,
            platform,
            renderer,
            last_frame: Instant::now(),
            cursor: None,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.io_mut().display_size = [width as f32, height as f32];
    }

    /// True while a panel is hovered or a widget has keyboard focus
    pub fn wants_input(&self) -> bool {
        let io = self.context.io();
        io.want_capture_mouse || io.want_capture_keyboard
    }

    /// Whether the overlay wants the mouse; raw motion is dropped meanwhile
    pub fn wants_mouse(&self) -> bool {
        self.context.io().want_capture_mouse
    }

    /// Forwards pointer, keyboard and focus events to imgui
    ///
    /// Returns true when the overlay captured the event, in which case it
    /// must not reach the hotkeys or the camera.
    pub fn handle_window_event(&mut self, window: &Window, window_id: WindowId, event: &WindowEvent) -> bool {
        let relevant = matches!(
            event,
            WindowEvent::CursorMoved { .. }
                | WindowEvent::MouseInput { .. }
                | WindowEvent::MouseWheel { .. }
                | WindowEvent::KeyboardInput { .. }
                | WindowEvent::Focused(_)
        );
        if !relevant {
            return false;
        }

        let wrapped: Event<()> = Event::WindowEvent {
            window_id,
            event: event.clone(),
        };
        self.platform
            .handle_event(self.context.io_mut(), window, &wrapped);
        self.wants_input()
    }

    /// Starts a new imgui frame and lets `draw` fill it
    pub fn build<F>(&mut self, window: &Window, draw: F)
    where
        F: FnOnce(&imgui::Ui),
    {
        let now = Instant::now();
        self.context.io_mut().update_delta_time(now - self.last_frame);
        self.last_frame = now;

        if let Err(err) = self.platform.prepare_frame(self.context.io_mut(), window) {
            log::warn!("Failed to prepare UI frame: {err}");
        }

        let ui = self.context.frame();
        draw(ui);

        let cursor = ui.mouse_cursor();
        if cursor != self.cursor {
            self.cursor = cursor;
            self.platform.prepare_render(ui, window);
        }
    }

    /// Records the frame from the last [`UiManager::build`] over `target`
    ///
    /// The target is loaded, not cleared, so the scene stays underneath.
    pub fn render(&mut self, device: &Device, queue: &Queue, encoder: &mut CommandEncoder, target: &TextureView) {
        let draw_data = self.context.render();
        let [width, height] = draw_data.display_size;
        if width <= 0.0 || height <= 0.0 {
            return;
        }

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Overlay Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if let Err(err) = self.renderer.render(draw_data, queue, device, &mut pass) {
            log::error!("Failed to render UI: {err:?}");
        }
    }
}
