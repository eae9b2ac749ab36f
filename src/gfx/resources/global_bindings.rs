//! Global uniform bindings for camera and scene lighting
//!
//! Manages the GPU uniform buffer and bind group for state shared by every
//! object in a frame: camera matrices, the light used for shadow mapping,
//! and the ambient term. Bound to slot 0 in all render pipelines.

use cgmath::Matrix4;

use crate::{
    gfx::{camera::OrbitCamera, scene::light::SceneLighting},
    wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc, UniformBuffer},
};

/// Global uniform buffer content structure
///
/// MUST match the GlobalUniform struct in the shaders exactly.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],        // Camera position (homogeneous coordinates)
    view_proj: [[f32; 4]; 4],       // Camera view-projection matrix
    light_view_proj: [[f32; 4]; 4], // Light's view-projection matrix for shadows
    light_direction: [f32; 4],      // xyz: towards the light, w: intensity
    light_color: [f32; 4],          // rgb: colour, w: 1 when shadows are enabled
    ambient: [f32; 4],              // rgb: colour * intensity
}

impl GlobalUBOContent {
    pub fn new(camera: &OrbitCamera, lighting: &SceneLighting, light_view_proj: Matrix4<f32>) -> Self {
        let eye = camera.eye;
        let (light_direction, light_color) = match &lighting.directional {
            Some(light) => {
                let dir = light.direction();
                (
                    [dir.x, dir.y, dir.z, light.intensity],
                    [
                        light.color[0],
                        light.color[1],
                        light.color[2],
                        if light.cast_shadow { 1.0 } else { 0.0 },
                    ],
                )
            }
            None => ([0.0, 1.0, 0.0, 0.0], [0.0; 4]),
        };

        Self {
            view_position: [eye.x, eye.y, eye.z, 1.0],
            view_proj: camera.view_projection().into(),
            light_view_proj: light_view_proj.into(),
            light_direction,
            light_color,
            ambient: [lighting.ambient[0], lighting.ambient[1], lighting.ambient[2], 1.0],
        }
    }
}

/// Type alias for the global uniform buffer
pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Bind group layout and bind group for the global uniforms
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: wgpu::BindGroup,
}

impl GlobalBindings {
    /// Creates the layout and binds `ubo` to it
    pub fn new(device: &wgpu::Device, ubo: &GlobalUBO) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform()) // Global uniforms (camera + light)
            .create(device, "Globals Bind Group");
        let bind_group = BindGroupBuilder::new(&bind_group_layout)
            .resource(ubo.binding_resource())
            .create(device, "Global Bind Group");

        GlobalBindings {
            bind_group_layout,
            bind_group,
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Layout for bind group 3: shadow depth map and its comparison sampler
pub fn shadow_bind_group_layout(device: &wgpu::Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_fragment(binding_types::texture_depth_2d())
        .next_binding_fragment(binding_types::sampler_comparison())
        .create(device, "Shadow Bind Group")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::light::DirectionalLight;
    use cgmath::{SquareMatrix, Vector3, Zero};

    #[test]
    fn test_content_size_is_uniform_aligned() {
        assert_eq!(std::mem::size_of::<GlobalUBOContent>(), 192);
        assert_eq!(std::mem::size_of::<GlobalUBOContent>() % 16, 0);
    }

    #[test]
    fn test_content_packs_lighting() {
        let camera = OrbitCamera::from_position(Vector3::new(0.0, 12.0, 36.0), Vector3::zero(), 1.5);
        let lighting = SceneLighting {
            ambient: [0.7, 0.7, 0.7],
            directional: Some(DirectionalLight::new([1.0, 1.0, 1.0], 0.85, [0.0, 10.0, 0.0])),
        };

        let content = GlobalUBOContent::new(&camera, &lighting, Matrix4::identity());
        assert_eq!(content.view_position, [0.0, 12.0, 36.0, 1.0]);
        assert!((content.light_direction[1] - 1.0).abs() < 1e-6);
        assert_eq!(content.light_direction[3], 0.85);
        assert_eq!(content.light_color[3], 1.0);
        assert_eq!(content.ambient, [0.7, 0.7, 0.7, 1.0]);
    }
}
