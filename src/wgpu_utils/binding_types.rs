// src/wgpu_utils/binding_types.rs
//! WGPU binding type utilities

pub fn uniform() -> wgpu::BindingType {
    wgpu::BindingType::Buffer {
        ty: wgpu::BufferBindingType::Uniform,
        has_dynamic_offset: false,
        min_binding_size: None,
    }
}

pub fn sampler(filtering: wgpu::SamplerBindingType) -> wgpu::BindingType {
    wgpu::BindingType::Sampler(filtering)
}

/// Depth texture sampled through a comparison sampler (shadow maps)
pub fn texture_depth_2d() -> wgpu::BindingType {
    wgpu::BindingType::Texture {
        sample_type: wgpu::TextureSampleType::Depth,
        view_dimension: wgpu::TextureViewDimension::D2,
        multisampled: false,
    }
}

pub fn sampler_comparison() -> wgpu::BindingType {
    sampler(wgpu::SamplerBindingType::Comparison)
}
