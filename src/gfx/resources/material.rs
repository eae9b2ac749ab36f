//! Material system for PBR rendering
//!
//! Provides material definitions and centralized management with GPU resource handling.
//! Materials are stored in MaterialManager and meshes reference them by ID.

use std::collections::HashMap;
use wgpu::Device;

use crate::wgpu_utils::{
    binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
    UniformBuffer,
};

/// Material ID for referencing materials
pub type MaterialId = String;

/// GPU uniform data for materials, matches `MaterialUniform` in the shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    /// rgb: emitted radiance, w unused
    pub emissive: [f32; 4],
    /// x: metallic, y: roughness
    pub params: [f32; 4],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Layout for bind group 2 shared by every material
pub fn material_bind_group_layout(device: &Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_fragment(binding_types::uniform())
        .create(device, "Material Bind Group")
}

struct MaterialGpuResources {
    ubo: MaterialUBO,
    bind_group: wgpu::BindGroup,
}

/// Material definition with PBR properties
///
/// Contains material properties and GPU resources. Materials are stored
/// centrally in MaterialManager and shared between meshes.
pub struct Material {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],

    // GPU resources - shared by all meshes using this material
    gpu: Option<MaterialGpuResources>,
}

impl Default for Material {
    fn default() -> Self {
        Self::new("default", [0.8, 0.8, 0.8, 1.0], 0.0, 0.5)
    }
}

impl Material {
    /// Creates a new material with basic PBR properties
    ///
    /// # Arguments
    /// * `name` - Unique name for this material
    /// * `base_color` - Linear RGBA base color
    /// * `metallic` - Metallic factor (0.0 = dielectric, 1.0 = metallic)
    /// * `roughness` - Surface roughness (0.0 = mirror, 1.0 = rough)
    pub fn new(name: &str, base_color: [f32; 4], metallic: f32, roughness: f32) -> Self {
        Self {
            name: name.to_string(),
            base_color,
            metallic: metallic.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            emissive: [0.0, 0.0, 0.0],
            gpu: None,
        }
    }

    /// Standard surface with the given linear colour
    pub fn standard(name: &str, color: [f32; 3]) -> Self {
        Self::new(name, [color[0], color[1], color[2], 1.0], 0.0, 1.0)
    }

    /// Builder pattern: Set metallic factor
    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic.clamp(0.0, 1.0);
        self
    }

    /// Builder pattern: Set roughness factor
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.roughness = roughness.clamp(0.0, 1.0);
        self
    }

    /// Builder pattern: Set emissive colour scaled by `intensity`
    pub fn with_emission(mut self, color: [f32; 3], intensity: f32) -> Self {
        self.emissive = [color[0] * intensity, color[1] * intensity, color[2] * intensity];
        self
    }

    fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            base_color: self.base_color,
            emissive: [self.emissive[0], self.emissive[1], self.emissive[2], 0.0],
            params: [self.metallic, self.roughness, 0.0, 0.0],
        }
    }

    /// Creates GPU resources on first use and syncs property changes
    pub fn update_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
    ) {
        let uniform = self.uniform();
        match &mut self.gpu {
            Some(gpu) => gpu.ubo.update_content(queue, uniform),
            None => {
                let ubo = MaterialUBO::new_with_data(device, &uniform);
                let bind_group = BindGroupBuilder::new(layout)
                    .resource(ubo.binding_resource())
                    .create(device, &format!("{} Material Bind Group", self.name));
                self.gpu = Some(MaterialGpuResources { ubo, bind_group });
            }
        }
    }

    /// Gets the bind group for rendering
    pub fn get_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.bind_group)
    }
}

/// Manages all materials in the scene
///
/// Centralized storage for all materials. Meshes reference materials by ID
/// rather than storing material data directly, enabling efficient sharing
/// of GPU resources between meshes.
pub struct MaterialManager {
    materials: HashMap<MaterialId, Material>,
    default_material: Material,
}

impl MaterialManager {
    /// Creates a new material manager with a default material
    pub fn new() -> Self {
        Self {
            materials: HashMap::new(),
            default_material: Material::default(),
        }
    }

    /// Adds a material, replacing any material with the same name
    pub fn add_material(&mut self, material: Material) -> MaterialId {
        let id = material.name.clone();
        self.materials.insert(id.clone(), material);
        id
    }

    pub fn get_material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    pub fn get_material_mut(&mut self, id: &str) -> Option<&mut Material> {
        self.materials.get_mut(id)
    }

    pub fn get_default_material(&self) -> &Material {
        &self.default_material
    }

    /// Gets material for a mesh with fallback to default
    ///
    /// Handles meshes with no material assigned or whose material no longer
    /// exists.
    pub fn get_material_for_mesh(&self, material_id: Option<&MaterialId>) -> &Material {
        material_id
            .and_then(|id| self.get_material(id))
            .unwrap_or(&self.default_material)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Updates GPU resources for all materials
    ///
    /// Called every frame; materials whose uniform is unchanged skip the write.
    pub fn update_all_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
    ) {
        self.default_material
            .update_gpu_resources(device, queue, layout);
        for material in self.materials.values_mut() {
            material.update_gpu_resources(device, queue, layout);
        }
    }
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_to_default() {
        let mut manager = MaterialManager::new();
        let id = manager.add_material(Material::standard("ground", [0.66, 0.56, 0.4]));

        assert_eq!(manager.get_material_for_mesh(Some(&id)).name, "ground");
        assert_eq!(manager.get_material_for_mesh(None).name, "default");
        assert_eq!(
            manager
                .get_material_for_mesh(Some(&"missing".to_string()))
                .name,
            "default"
        );
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_emission_and_clamping() {
        let material = Material::standard("cube", [1.0, 0.09, 0.09])
            .with_emission([1.0, 0.04, 0.04], 0.3)
            .with_roughness(2.0);
        assert_eq!(material.roughness, 1.0);

        let uniform = material.uniform();
        assert!((uniform.emissive[0] - 0.3).abs() < 1e-6);
        assert!((uniform.emissive[1] - 0.012).abs() < 1e-6);
        assert_eq!(uniform.params[1], 1.0);
    }
}
