//! WGPU-based rendering engine
//!
//! Provides the frame pipeline for the viewer: a depth-only shadow pass from
//! the directional light, the lit main pass, and an optional UI overlay pass.

use std::sync::Arc;

use cgmath::{Matrix4, SquareMatrix};
use wgpu::{Device, TextureFormat};

use crate::{
    error::RenderError,
    gfx::{
        resources::{
            global_bindings::{shadow_bind_group_layout, GlobalBindings, GlobalUBO, GlobalUBOContent},
            material::material_bind_group_layout,
            texture_resource::TextureResource,
        },
        scene::{
            object::{object_bind_group_layout, DrawObject},
            scene::Scene,
        },
    },
    wgpu_utils::{BindGroupBuilder, BindGroupLayoutWithDesc},
};

use super::pipeline_manager::{PipelineConfig, PipelineManager};
use super::shadow_cache::{ShadowCache, ShadowState};

const SHADOW_PIPELINE: &str = "Shadow";
const PBR_PIPELINE: &str = "PBR";

/// Core rendering engine managing GPU resources and draw calls
///
/// The RenderEngine handles all low-level graphics operations including:
/// - Surface and device management
/// - Pipeline creation and management
/// - Depth buffer handling
/// - Cached shadow mapping
/// - UI overlay rendering
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    supports_immediate: bool,
    depth_texture: TextureResource,
    format: TextureFormat,
    pipeline_manager: PipelineManager,
    global_ubo: GlobalUBO,
    global_bindings: GlobalBindings,

    object_layout: BindGroupLayoutWithDesc,
    material_layout: BindGroupLayoutWithDesc,

    // Shadow mapping resources
    shadow_map: TextureResource,
    shadow_bind_group: wgpu::BindGroup,
    shadow_cache: ShadowCache,
    /// Set by `prepare_scene` while the shadow map is stale
    shadow_pending: Option<ShadowState>,
    light_view_proj: Matrix4<f32>,
}

impl RenderEngine {
    /// Creates a new render engine for the given window
    ///
    /// # Arguments
    /// * `window` - Window surface target for rendering
    /// * `width`, `height` - Initial surface size in pixels
    /// * `vsync` - Present in sync with the display
    /// * `shadow_map_size` - Shadow map resolution in texels
    ///
    /// # Errors
    /// Fails when no surface, adapter or device is available, which is the
    /// "GPU rendering not supported" case for the viewer.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        vsync: bool,
        shadow_map_size: u32,
    ) -> Result<RenderEngine, RenderError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let info = adapter.get_info();
        log::info!("Using {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);
        // Colours are linear in the shaders; let the surface encode sRGB
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .unwrap_or(TextureFormat::Bgra8UnormSrgb);
        let supports_immediate = surface_capabilities
            .present_modes
            .contains(&wgpu::PresentMode::Immediate);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: present_mode(vsync, supports_immediate),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        // Create depth texture for main rendering
        let depth_texture =
            TextureResource::create_depth_texture(&device, &config, "depth_texture");
        let shadow_map = TextureResource::create_shadow_map(&device, shadow_map_size);

        let global_ubo = GlobalUBO::new(&device);
        let global_bindings = GlobalBindings::new(&device, &global_ubo);
        let object_layout = object_bind_group_layout(&device);
        let material_layout = material_bind_group_layout(&device);
        let shadow_layout = shadow_bind_group_layout(&device);

        let shadow_bind_group = BindGroupBuilder::new(&shadow_layout)
            .texture(&shadow_map.view)
            .sampler(&shadow_map.sampler)
            .create(&device, "Shadow Bind Group");

        // Wrap device and queue in Arc for pipeline manager
        let device_handle: Arc<Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("default", include_str!("pbr.wgsl"));
        pipeline_manager.load_shader("shadow", include_str!("shadow_pass.wgsl"));

        // Shadow depth pass - no culling so thin geometry still casts
        pipeline_manager.register_pipeline(
            SHADOW_PIPELINE,
            PipelineConfig::default()
                .with_label("SHADOW")
                .with_shader("shadow")
                .with_vertex_only()
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_depth_bias(2, 2.0)
                .with_cull_mode(None)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    object_layout.layout.clone(),
                ])
                .with_color_targets(vec![]), // No color targets - depth only
        );

        pipeline_manager.register_pipeline(
            PBR_PIPELINE,
            PipelineConfig::default()
                .with_label("PBR")
                .with_shader("default")
                .with_depth_stencil(TextureResource::DEPTH_FORMAT)
                .with_bind_group_layouts(vec![
                    global_bindings.bind_group_layout().clone(),
                    object_layout.layout.clone(),
                    material_layout.layout.clone(),
                    shadow_layout.layout.clone(),
                ])
                .with_color_targets(vec![Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })]),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for error in errors {
                log::error!("{error}");
            }
        }
        log::debug!("{:?}", pipeline_manager.get_stats());

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            supports_immediate,
            depth_texture,
            format,
            pipeline_manager,
            global_ubo,
            global_bindings,
            object_layout,
            material_layout,
            shadow_map,
            shadow_bind_group,
            shadow_cache: ShadowCache::new(),
            shadow_pending: None,
            light_view_proj: Matrix4::identity(),
        })
    }

    /// Uploads new objects and materials and refreshes per-frame uniforms
    ///
    /// GPU resources are created lazily the first time an object or material
    /// is seen; later calls only write uniforms whose content changed.
    pub fn prepare_scene(&mut self, scene: &mut Scene) {
        for object in scene.objects.iter_mut() {
            object.init_gpu_resources(&self.device, &self.object_layout);
            object.update_transform(&self.queue);
        }
        scene
            .material_manager
            .update_all_gpu_resources(&self.device, &self.queue, &self.material_layout);

        let lighting = scene.lighting();
        let shadow_light = lighting.directional.filter(|light| light.cast_shadow);

        let state = ShadowState::new(scene.revision(), shadow_light.as_ref());
        self.shadow_pending = None;
        if self.shadow_cache.needs_update(&state) {
            self.light_view_proj = shadow_light
                .map(|light| light.view_proj(&scene.shadow_caster_bounds()))
                .unwrap_or_else(Matrix4::identity);
            self.shadow_pending = Some(state);
        }

        let content =
            GlobalUBOContent::new(&scene.camera_manager.camera, &lighting, self.light_view_proj);
        self.global_ubo.update_content(&self.queue, content);
    }

    /// Renders a frame with optional UI overlay
    ///
    /// Call [`RenderEngine::prepare_scene`] first. Returns `Ok(false)` when
    /// the surface had to be reconfigured and no frame was presented.
    pub fn render_frame<F>(&mut self, scene: &Scene, ui_callback: Option<F>) -> Result<bool, wgpu::SurfaceError>
    where
        F: FnOnce(&wgpu::Device, &wgpu::Queue, &mut wgpu::CommandEncoder, &wgpu::TextureView),
    {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(false);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame");
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        // PASS 1: Shadow map, only when the cache is stale
        let shadow_state = self.shadow_pending.take();
        if shadow_state.is_some() {
            let mut shadow_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Shadow Depth Pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(shadow_pipeline) = self.pipeline_manager.get_pipeline(SHADOW_PIPELINE) {
                shadow_pass.set_pipeline(shadow_pipeline);
                shadow_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);

                for object in scene.objects.iter().filter(|o| o.visible && o.cast_shadow) {
                    if let Some(object_bind_group) = object.get_bind_group() {
                        shadow_pass.set_bind_group(1, object_bind_group, &[]);
                        for mesh in &object.meshes {
                            shadow_pass.draw_mesh(mesh);
                        }
                    }
                }
            }
        }

        // PASS 2: Main rendering with shadows
        {
            let [r, g, b] = scene.background;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            if let Some(pipeline) = self.pipeline_manager.get_pipeline(PBR_PIPELINE) {
                render_pass.set_pipeline(pipeline);
                render_pass.set_bind_group(0, self.global_bindings.bind_group(), &[]);
                render_pass.set_bind_group(3, &self.shadow_bind_group, &[]);

                for object in scene.objects.iter().filter(|o| o.visible) {
                    let Some(object_bind_group) = object.get_bind_group() else {
                        continue;
                    };
                    render_pass.set_bind_group(1, object_bind_group, &[]);

                    for mesh in &object.meshes {
                        let material = scene.get_material_for_mesh(mesh);
                        if let Some(material_bind_group) = material.get_bind_group() {
                            render_pass.set_bind_group(2, material_bind_group, &[]);
                            render_pass.draw_mesh(mesh);
                        } else {
                            log::trace!(
                                "Skipping mesh of '{}' - material '{}' has no GPU resources",
                                object.name,
                                material.name
                            );
                        }
                    }
                }
            }
        }

        // PASS 3: UI overlay (if provided)
        if let Some(ui_callback) = ui_callback {
            ui_callback(
                &self.device,
                &self.queue,
                &mut encoder,
                &surface_texture_view,
            );
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        if let Some(state) = shadow_state {
            self.shadow_cache.mark_rendered(state);
        }
        Ok(true)
    }

    /// Resizes the render engine surface and recreates depth buffer
    ///
    /// Zero-sized requests (minimised windows) are ignored. Shadow map size
    /// remains unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture =
            TextureResource::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Returns the surface texture format
    ///
    /// Used for creating compatible render targets and UI systems.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Set VSync (vertical synchronization) state
    ///
    /// Falls back to FIFO when the surface cannot present immediately.
    pub fn set_vsync(&mut self, enable: bool) {
        self.config.present_mode = present_mode(enable, self.supports_immediate);
        self.surface.configure(&self.device, &self.config);
    }
}

fn present_mode(vsync: bool, supports_immediate: bool) -> wgpu::PresentMode {
    if vsync || !supports_immediate {
        wgpu::PresentMode::Fifo // VSync enabled
    } else {
        wgpu::PresentMode::Immediate // VSync disabled, immediate presentation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_mode_selection() {
        assert_eq!(present_mode(true, true), wgpu::PresentMode::Fifo);
        assert_eq!(present_mode(false, true), wgpu::PresentMode::Immediate);
        assert_eq!(present_mode(false, false), wgpu::PresentMode::Fifo);
    }
}
