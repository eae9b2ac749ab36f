//! # Vertex Data Structures
//!
//! Vertex layout shared by every mesh the renderer draws.

/// A 3D vertex with position and normal data.
///
/// The `#[repr(C)]` attribute ensures the struct has a C-compatible memory
/// layout, which is required for GPU buffer operations.
///
/// # Examples
///
/// ```no_run
/// use memory_palace::gfx::scene::vertex::Vertex3D;
///
/// let vertex = Vertex3D {
///     position: [0.0, 1.0, 0.0],
///     normal: [0.0, 1.0, 0.0],
/// };
/// ```
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    /// 3D position coordinates [x, y, z]
    pub position: [f32; 3],
    /// 3D normal vector [nx, ny, nz] for lighting calculations
    pub normal: [f32; 3],
}

impl Vertex3D {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    /// Returns the vertex buffer layout for wgpu rendering.
    ///
    /// - Attribute 0: Position (Float32x3) at shader location 0
    /// - Attribute 1: Normal (Float32x3) at shader location 1
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout() {
        let layout = Vertex3D::desc();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes.len(), 2);
        assert_eq!(layout.attributes[1].offset, 12);
    }
}
