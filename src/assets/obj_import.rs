//! Wavefront OBJ decoding via `tobj`

use std::{io::BufReader, path::Path};

use crate::{error::LoadError, gfx::scene::object::Mesh};

use super::{MaterialData, MeshData, ModelData};

/// Decodes OBJ bytes; `mtllib` references are resolved against `base_dir`
///
/// A missing material library is not fatal, the meshes fall back to the
/// default material.
pub fn decode_obj(name: &str, bytes: &[u8], base_dir: Option<&Path>) -> Result<ModelData, LoadError> {
    let mut reader = BufReader::new(bytes);
    let (models, materials) = tobj::load_obj_buf(
        &mut reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |mtl_path| match base_dir {
            Some(dir) => tobj::load_mtl(dir.join(mtl_path)),
            None => Err(tobj::LoadError::OpenFileFailed),
        },
    )?;

    let materials = materials.unwrap_or_else(|err| {
        log::warn!("No usable MTL for {name} ({err}), using default materials");
        Vec::new()
    });

    let materials: Vec<MaterialData> = materials
        .iter()
        .enumerate()
        .map(|(i, mtl)| {
            let diffuse = mtl.diffuse.unwrap_or([0.8, 0.8, 0.8]);
            MaterialData {
                name: if mtl.name.is_empty() {
                    format!("material_{i}")
                } else {
                    mtl.name.clone()
                },
                base_color: [diffuse[0], diffuse[1], diffuse[2], mtl.dissolve.unwrap_or(1.0)],
                metallic: 0.0,
                // Shininess 0..128 maps onto roughness 1..0
                roughness: 1.0 - (mtl.shininess.unwrap_or(32.0) / 128.0).clamp(0.0, 1.0),
                emissive: [0.0; 3],
            }
        })
        .collect();

    let meshes = models
        .into_iter()
        .filter(|model| !model.mesh.indices.is_empty())
        .map(|model| {
            let mesh = model.mesh;
            let positions: Vec<[f32; 3]> = mesh
                .positions
                .chunks_exact(3)
                .map(|p| [p[0], p[1], p[2]])
                .collect();

            // Use normals from OBJ if available, otherwise calculate them
            let normals = if mesh.normals.len() == mesh.positions.len() {
                mesh.normals
                    .chunks_exact(3)
                    .map(|n| [n[0], n[1], n[2]])
                    .collect()
            } else {
                Mesh::calculate_face_normals(&positions, &mesh.indices)
            };

            MeshData {
                positions,
                normals,
                indices: mesh.indices,
                material: mesh.material_id.filter(|&id| id < materials.len()),
            }
        })
        .collect();

    Ok(ModelData {
        name: name.to_string(),
        meshes,
        materials,
    })
}
