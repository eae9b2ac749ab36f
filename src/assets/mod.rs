//! # Model Assets
//!
//! Decoded model data and the background loader that produces it.
//!
//! Decoding is pure CPU work: [`decode`] turns file bytes into a
//! [`ModelData`] with node transforms already baked into the vertices, and the
//! scene converts that into GPU-backed objects later. [`ModelLoader`] runs
//! reads and decodes on worker threads and reports [`LoadEvent`]s back to the
//! frame loop.

pub mod gltf_import;
pub mod loader;
pub mod obj_import;

use std::path::Path;

use cgmath::Vector3;

use crate::{error::LoadError, gfx::bounds::Aabb};

pub use loader::ModelLoader;

/// Identifies one [`ModelLoader::load`] call
pub type RequestId = u64;

/// One decoded primitive
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    /// Either one normal per position or empty
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
    /// Index into [`ModelData::materials`]
    pub material: Option<usize>,
}

impl MeshData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub base_color: [f32; 4],
    pub metallic: f32,
    pub roughness: f32,
    pub emissive: [f32; 3],
}

/// A whole decoded model file
#[derive(Debug, Clone, PartialEq)]
pub struct ModelData {
    pub name: String,
    pub meshes: Vec<MeshData>,
    pub materials: Vec<MaterialData>,
}

impl ModelData {
    /// Bounds of every vertex in model space
    pub fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::empty();
        for position in self.meshes.iter().flat_map(|mesh| mesh.positions.iter()) {
            bounds.expand(Vector3::from(*position));
        }
        bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(MeshData::triangle_count).sum()
    }
}

#[derive(Debug)]
pub enum LoadEventKind {
    /// `total` is `None` when the file size is unknown
    Progress { loaded: u64, total: Option<u64> },
    Loaded(ModelData),
    Failed(LoadError),
}

/// Message from a loader worker to the frame loop
#[derive(Debug)]
pub struct LoadEvent {
    pub request: RequestId,
    pub kind: LoadEventKind,
}

/// Decodes model bytes, picking the format from the file extension
///
/// Relative resources such as `.bin` buffers or `.mtl` libraries are looked up
/// next to `path`.
pub fn decode(path: &Path, bytes: &[u8]) -> Result<ModelData, LoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("model");
    let base_dir = path.parent();

    let model = match extension.as_str() {
        "glb" | "gltf" => gltf_import::decode_gltf(name, bytes, base_dir)?,
        "obj" => obj_import::decode_obj(name, bytes, base_dir)?,
        "" => return Err(LoadError::UnsupportedFormat(path.display().to_string())),
        other => return Err(LoadError::UnsupportedFormat(format!(".{other}"))),
    };

    if model.meshes.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_extension() {
        let err = decode(Path::new("models/statue.fbx"), b"").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ref ext) if ext == ".fbx"));

        let err = decode(Path::new("models/statue"), b"").unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_model_bounds() {
        let model = ModelData {
            name: "pair".into(),
            meshes: vec![
                MeshData {
                    positions: vec![[0.0, 0.0, 0.0], [1.0, 2.0, 0.0], [0.0, 0.0, 1.0]],
                    normals: Vec::new(),
                    indices: vec![0, 1, 2],
                    material: None,
                },
                MeshData {
                    positions: vec![[-3.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                    normals: Vec::new(),
                    indices: vec![0, 1, 2],
                    material: None,
                },
            ],
            materials: Vec::new(),
        };

        let bounds = model.bounds();
        assert_eq!(bounds.min, Vector3::new(-3.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vector3::new(1.0, 2.0, 1.0));
        assert_eq!(model.triangle_count(), 2);
    }
}
