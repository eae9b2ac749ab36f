//! # Procedural Geometry Generation
//!
//! Generates the primitive shapes the viewer builds its base scene from, so
//! the ground plane and sanity-check cubes need no model files.
//!
//! ## Supported Primitives
//!
//! - **Box**: Axis-aligned box with arbitrary edge lengths
//! - **Plane**: Horizontal plane (XZ, normal +Y) with configurable subdivisions
//!
//! ## Usage
//!
//! ```rust
//! use memory_palace::gfx::geometry::{generate_box, generate_plane};
//!
//! // The 8x8x8 sanity-check cube
//! let cube = generate_box(8.0, 8.0, 8.0);
//!
//! // A 240x240 ground plane
//! let ground = generate_plane(240.0, 240.0, 1, 1);
//! assert_eq!(ground.triangle_count(), 2);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::{object::Mesh, vertex::Vertex3D};

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Normal vectors (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    /// Create a new empty geometry data structure
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of triangles in this geometry
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Converts into a scene mesh without a material of its own
    pub fn into_mesh(self) -> Mesh {
        let vertices: Vec<Vertex3D> = self
            .vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect();

        Mesh::new(vertices, self.indices)
    }
}
