// src/wgpu_utils/binding_builder.rs
//! Builders for bind group layouts and bind groups
//!
//! Bindings are numbered in the order they are added, so a layout and the
//! bind groups created from it always agree on slot indices.

/// A bind group layout together with the entries it was created from
pub struct BindGroupLayoutWithDesc {
    pub layout: wgpu::BindGroupLayout,
    pub entries: Vec<wgpu::BindGroupLayoutEntry>,
}

pub struct BindGroupLayoutBuilder {
    entries: Vec<wgpu::BindGroupLayoutEntry>,
    next_binding_index: u32,
}

impl BindGroupLayoutBuilder {
    pub fn new() -> Self {
        BindGroupLayoutBuilder {
            entries: Vec::new(),
            next_binding_index: 0,
        }
    }

    pub fn next_binding(mut self, visibility: wgpu::ShaderStages, ty: wgpu::BindingType) -> Self {
        self.entries.push(wgpu::BindGroupLayoutEntry {
            binding: self.next_binding_index,
            visibility,
            ty,
            count: None,
        });
        self.next_binding_index += 1;
        self
    }

    pub fn next_binding_vertex(self, ty: wgpu::BindingType) -> Self {
        self.next_binding(wgpu::ShaderStages::VERTEX, ty)
    }

    pub fn next_binding_fragment(self, ty: wgpu::BindingType) -> Self {
        self.next_binding(wgpu::ShaderStages::FRAGMENT, ty)
    }

    /// Binding visible to both vertex and fragment stages
    pub fn next_binding_rendering(self, ty: wgpu::BindingType) -> Self {
        self.next_binding(wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT, ty)
    }

    pub fn create(self, device: &wgpu::Device, label: &str) -> BindGroupLayoutWithDesc {
        BindGroupLayoutWithDesc {
            layout: device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &self.entries,
                label: Some(label),
            }),
            entries: self.entries,
        }
    }
}

impl Default for BindGroupLayoutBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BindGroupBuilder<'a> {
    layout_with_desc: &'a BindGroupLayoutWithDesc,
    entries: Vec<wgpu::BindGroupEntry<'a>>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn new(layout_with_desc: &'a BindGroupLayoutWithDesc) -> Self {
        BindGroupBuilder {
            layout_with_desc,
            entries: Vec::new(),
        }
    }

    pub fn resource(mut self, resource: wgpu::BindingResource<'a>) -> Self {
        assert!(
            self.entries.len() < self.layout_with_desc.entries.len(),
            "more resources than layout entries"
        );
        self.entries.push(wgpu::BindGroupEntry {
            binding: self.layout_with_desc.entries[self.entries.len()].binding,
            resource,
        });
        self
    }

    pub fn texture(self, texture_view: &'a wgpu::TextureView) -> Self {
        self.resource(wgpu::BindingResource::TextureView(texture_view))
    }

    pub fn sampler(self, sampler: &'a wgpu::Sampler) -> Self {
        self.resource(wgpu::BindingResource::Sampler(sampler))
    }

    pub fn create(&self, device: &wgpu::Device, label: &str) -> wgpu::BindGroup {
        assert_eq!(
            self.entries.len(),
            self.layout_with_desc.entries.len(),
            "bind group '{label}' does not fill every layout entry"
        );
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.layout_with_desc.layout,
            entries: &self.entries,
            label: Some(label),
        })
    }
}
