//! Render pipeline management system for wgpu
//!
//! Provides pipeline creation and caching with lazy pipeline creation.

use std::{collections::HashMap, sync::Arc};
use wgpu::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Configuration for creating a render pipeline
///
/// Defines all parameters needed to create a wgpu render pipeline,
/// including shaders, bind group layouts, and render state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub shader: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub primitive_topology: PrimitiveTopology,
    pub cull_mode: Option<Face>,
    pub depth_format: Option<TextureFormat>,
    pub depth_bias: DepthBiasState,
    pub multisample: MultisampleState,
    pub color_targets: Vec<Option<ColorTargetState>>,
    pub vertex_only: bool, // for shadow pass
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Default Pipeline".to_string(),
            shader: "shader.wgsl".to_string(),
            bind_group_layouts: Vec::new(),
            primitive_topology: PrimitiveTopology::TriangleList,
            cull_mode: Some(Face::Back),
            depth_format: None,
            depth_bias: DepthBiasState::default(),
            multisample: MultisampleState::default(),
            color_targets: vec![Some(ColorTargetState {
                format: TextureFormat::Bgra8UnormSrgb,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            })],
            vertex_only: false,
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    pub fn with_vertex_only(mut self) -> Self {
        self.vertex_only = true;
        self
    }

    /// Sets the shader for this pipeline (builder pattern)
    pub fn with_shader(mut self, shader: &str) -> Self {
        self.shader = shader.to_string();
        self
    }

    /// Sets all bind group layouts at once (builder pattern)
    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    /// Enables depth testing and writing against a buffer of `format`
    pub fn with_depth_stencil(mut self, format: TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    /// Slope-scaled depth bias, used by the shadow pass against acne
    pub fn with_depth_bias(mut self, constant: i32, slope_scale: f32) -> Self {
        self.depth_bias = DepthBiasState {
            constant,
            slope_scale,
            clamp: 0.0,
        };
        self
    }

    /// Sets color targets for this pipeline (builder pattern)
    pub fn with_color_targets(mut self, targets: Vec<Option<ColorTargetState>>) -> Self {
        self.color_targets = targets;
        self
    }
}

/// Manages render pipelines with caching and lazy creation
///
/// - Lazy pipeline creation (only created when first requested)
/// - Shader modules shared between pipelines by name
pub struct PipelineManager {
    device: Arc<Device>,
    pipelines: HashMap<String, RenderPipeline>,
    pipeline_configs: HashMap<String, PipelineConfig>,
    shader_modules: HashMap<String, ShaderModule>,
    pending_pipelines: Vec<String>,
}

impl PipelineManager {
    pub fn new(device: Arc<Device>) -> Self {
        Self {
            device,
            pipelines: HashMap::new(),
            pipeline_configs: HashMap::new(),
            shader_modules: HashMap::new(),
            pending_pipelines: Vec::new(),
        }
    }

    /// Registers a pipeline configuration without creating it
    ///
    /// Pipelines are created lazily when first requested via `get_pipeline()`.
    pub fn register_pipeline(&mut self, name: &str, config: PipelineConfig) {
        self.pipeline_configs.insert(name.to_string(), config);
        self.pipelines.remove(name);
        self.pending_pipelines.push(name.to_string());
    }

    /// Compiles a WGSL shader module under `name`
    pub fn load_shader(&mut self, name: &str, source: &str) {
        let shader_module = self.device.create_shader_module(ShaderModuleDescriptor {
            label: Some(name),
            source: ShaderSource::Wgsl(source.into()),
        });

        self.shader_modules.insert(name.to_string(), shader_module);
    }

    /// Gets or creates a pipeline (lazy loading)
    ///
    /// Returns None if the config is not registered or creation failed.
    pub fn get_pipeline(&mut self, name: &str) -> Option<&RenderPipeline> {
        if !self.pipelines.contains_key(name) {
            let config = self.pipeline_configs.get(name)?.clone();
            match self.create_pipeline_from_config(name, &config) {
                Ok(pipeline) => {
                    self.pipelines.insert(name.to_string(), pipeline);
                    self.pending_pipelines.retain(|n| n != name);
                }
                Err(e) => {
                    log::error!("Failed to create pipeline '{}': {}", name, e);
                    return None;
                }
            }
        }

        self.pipelines.get(name)
    }

    /// Creates all pending pipelines immediately
    ///
    /// # Returns
    /// Result with vector of error messages if any pipelines failed to create
    pub fn create_all_pipelines(&mut self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let pending = std::mem::take(&mut self.pending_pipelines);

        for name in pending {
            if let Some(config) = self.pipeline_configs.get(&name).cloned() {
                match self.create_pipeline_from_config(&name, &config) {
                    Ok(pipeline) => {
                        self.pipelines.insert(name, pipeline);
                    }
                    Err(e) => {
                        errors.push(format!("Pipeline '{}': {}", name, e));
                        self.pending_pipelines.push(name);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Creates a render pipeline from configuration
    fn create_pipeline_from_config(
        &self,
        name: &str,
        config: &PipelineConfig,
    ) -> Result<RenderPipeline, String> {
        let shader = self
            .shader_modules
            .get(&config.shader)
            .ok_or_else(|| format!("Shader '{}' not found", config.shader))?;

        let bind_group_layout_refs: Vec<&BindGroupLayout> =
            config.bind_group_layouts.iter().collect();
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&PipelineLayoutDescriptor {
                label: Some(&format!("{} Layout", name)),
                bind_group_layouts: &bind_group_layout_refs,
                push_constant_ranges: &[],
            });

        // Handle vertex-only pipelines (like shadow pass)
        let fragment_state = if config.vertex_only {
            None
        } else {
            Some(FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &config.color_targets,
                compilation_options: PipelineCompilationOptions::default(),
            })
        };

        let depth_stencil = config.depth_format.map(|format| DepthStencilState {
            format,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
            stencil: StencilState::default(),
            bias: config.depth_bias,
        });

        let pipeline = self
            .device
            .create_render_pipeline(&RenderPipelineDescriptor {
                label: Some(&config.label),
                layout: Some(&pipeline_layout),
                vertex: VertexState {
                    module: shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex3D::desc()],
                    compilation_options: PipelineCompilationOptions::default(),
                },
                fragment: fragment_state,
                primitive: PrimitiveState {
                    topology: config.primitive_topology,
                    strip_index_format: None,
                    front_face: FrontFace::Ccw,
                    cull_mode: config.cull_mode,
                    polygon_mode: PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil,
                multisample: config.multisample,
                multiview: None,
                cache: None,
            });

        Ok(pipeline)
    }

    /// Returns pipeline manager statistics
    pub fn get_stats(&self) -> PipelineStats {
        PipelineStats {
            total_pipelines: self.pipelines.len(),
            pending_pipelines: self.pending_pipelines.len(),
            loaded_shaders: self.shader_modules.len(),
        }
    }
}

/// Statistics about pipeline manager state
#[derive(Debug)]
pub struct PipelineStats {
    pub total_pipelines: usize,
    pub pending_pipelines: usize,
    pub loaded_shaders: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builders() {
        let config = PipelineConfig::default()
            .with_label("SHADOW")
            .with_shader("shadow")
            .with_vertex_only()
            .with_cull_mode(None)
            .with_depth_stencil(TextureFormat::Depth32Float)
            .with_depth_bias(2, 2.0)
            .with_color_targets(vec![]);

        assert_eq!(config.label, "SHADOW");
        assert!(config.vertex_only);
        assert!(config.cull_mode.is_none());
        assert_eq!(config.depth_format, Some(TextureFormat::Depth32Float));
        assert_eq!(config.depth_bias.constant, 2);
        assert!(config.color_targets.is_empty());
    }
}
