//! glTF 2.0 decoding (`.gltf` and `.glb`)

use std::path::Path;

use cgmath::{EuclideanSpace, InnerSpace, Matrix, Matrix3, Matrix4, Point3, SquareMatrix, Transform, Vector3};
use gltf::{buffer, mesh::Mode, Document, Gltf};

use crate::{error::LoadError, gfx::scene::object::Mesh};

use super::{MaterialData, MeshData, ModelData};

/// Decodes a glTF document, baking the default scene's node transforms
///
/// Buffers may be embedded (GLB blob or base64 data URI) or live next to the
/// file in `base_dir`.
pub fn decode_gltf(name: &str, bytes: &[u8], base_dir: Option<&Path>) -> Result<ModelData, LoadError> {
    let Gltf { document, blob } = Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, base_dir, blob)?;

    let materials = document
        .materials()
        .enumerate()
        .map(|(i, material)| {
            let pbr = material.pbr_metallic_roughness();
            MaterialData {
                name: material
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("material_{i}")),
                base_color: pbr.base_color_factor(),
                metallic: pbr.metallic_factor(),
                roughness: pbr.roughness_factor(),
                emissive: material.emissive_factor(),
            }
        })
        .collect();

    let mut meshes = Vec::new();
    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                collect_node(&node, Matrix4::identity(), &buffers, &mut meshes);
            }
        }
        // No scene at all: take every mesh as-is
        None => {
            for mesh in document.meshes() {
                collect_mesh(&mesh, Matrix4::identity(), &buffers, &mut meshes);
            }
        }
    }

    log_summary(&document, name, &meshes);

    Ok(ModelData {
        name: name.to_string(),
        meshes,
        materials,
    })
}

fn collect_node(
    node: &gltf::Node,
    parent: Matrix4<f32>,
    buffers: &[buffer::Data],
    out: &mut Vec<MeshData>,
) {
    let world = parent * Matrix4::from(node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        collect_mesh(&mesh, world, buffers, out);
    }
    for child in node.children() {
        collect_node(&child, world, buffers, out);
    }
}

fn collect_mesh(
    mesh: &gltf::Mesh,
    world: Matrix4<f32>,
    buffers: &[buffer::Data],
    out: &mut Vec<MeshData>,
) {
    for primitive in mesh.primitives() {
        if primitive.mode() != Mode::Triangles {
            log::debug!(
                "Skipping {:?} primitive in mesh {}",
                primitive.mode(),
                mesh.name().unwrap_or("<unnamed>")
            );
            continue;
        }
        if let Some(data) = read_primitive(&primitive, world, buffers) {
            out.push(data);
        }
    }
}

fn read_primitive(
    primitive: &gltf::Primitive,
    world: Matrix4<f32>,
    buffers: &[buffer::Data],
) -> Option<MeshData> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    let positions: Vec<[f32; 3]> = reader
        .read_positions()?
        .map(|p| world.transform_point(Point3::from(p)).to_vec().into())
        .collect();

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };
    if indices.len() < 3 || indices.iter().any(|&i| i as usize >= positions.len()) {
        log::warn!("Skipping primitive with invalid indices");
        return None;
    }

    let normals = match reader.read_normals() {
        Some(normals) => {
            let normal_matrix = normal_matrix(&world);
            normals
                .map(|n| {
                    let n = normal_matrix * Vector3::from(n);
                    if n.magnitude2() > f32::EPSILON {
                        n.normalize().into()
                    } else {
                        [0.0, 1.0, 0.0]
                    }
                })
                .collect()
        }
        None => Mesh::calculate_face_normals(&positions, &indices),
    };

    Some(MeshData {
        positions,
        normals,
        indices,
        material: primitive.material().index(),
    })
}

/// Inverse transpose of the upper 3x3
fn normal_matrix(world: &Matrix4<f32>) -> Matrix3<f32> {
    let linear = Matrix3::from_cols(world.x.truncate(), world.y.truncate(), world.z.truncate());
    linear
        .invert()
        .map(|inverse| inverse.transpose())
        .unwrap_or(linear)
}

fn log_summary(document: &Document, name: &str, meshes: &[MeshData]) {
    let triangles: usize = meshes.iter().map(MeshData::triangle_count).sum();
    log::debug!(
        "Decoded glTF {name}: {} nodes, {} primitives, {} triangles",
        document.nodes().len(),
        meshes.len(),
        triangles
    );
}

/// Binary glTF holding one indexed triangle lifted 5 units up
#[cfg(test)]
pub(crate) fn triangle_glb() -> Vec<u8> {
    const JSON: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "mesh": 0, "translation": [0.0, 5.0, 0.0] }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
        ],
        "bufferViews": [
            { "buffer": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
        ],
        "buffers": [{ "byteLength": 44 }]
    }"#;

    let mut json = JSON.as_bytes().to_vec();
    json.resize(json.len().next_multiple_of(4), b' ');

    let mut bin: Vec<u8> = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        .iter()
        .flat_map(|f| f.to_le_bytes())
        .collect();
    bin.extend([0u16, 1, 2].iter().flat_map(|i| i.to_le_bytes()));
    bin.resize(44, 0);

    let total = 12 + 8 + json.len() + 8 + bin.len();
    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(b"glTF");
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());
    glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"JSON");
    glb.extend_from_slice(&json);
    glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
    glb.extend_from_slice(b"BIN\0");
    glb.extend_from_slice(&bin);
    glb
}

#[cfg(test)]
mod tests {
    use super::*;

    // One triangle (0,0,0) (1,0,0) (0,1,0) in an embedded base64 buffer
    const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "children": [1], "translation": [10.0, 0.0, 0.0] }, { "mesh": 0, "scale": [2.0, 2.0, 2.0] }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 }, "material": 0 }] }],
        "materials": [{
            "name": "marble",
            "pbrMetallicRoughness": { "baseColorFactor": [0.9, 0.8, 0.7, 1.0], "metallicFactor": 0.0, "roughnessFactor": 0.6 },
            "emissiveFactor": [0.1, 0.0, 0.0]
        }],
        "accessors": [{
            "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]
        }],
        "bufferViews": [{ "buffer": 0, "byteLength": 36 }],
        "buffers": [{
            "byteLength": 36,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"
        }]
    }"#;

    #[test]
    fn test_decode_embedded_gltf() {
        let model = decode_gltf("triangle", TRIANGLE_GLTF.as_bytes(), None).unwrap();

        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        // Child scale then parent translation are baked into the positions
        assert_eq!(mesh.positions, vec![[10.0, 0.0, 0.0], [12.0, 0.0, 0.0], [10.0, 2.0, 0.0]]);
        // Non-indexed primitives get sequential indices
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        // Missing normals are computed from the face
        assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0]; 3]);
        assert_eq!(mesh.material, Some(0));

        let material = &model.materials[0];
        assert_eq!(material.name, "marble");
        assert_eq!(material.base_color, [0.9, 0.8, 0.7, 1.0]);
        assert_eq!(material.roughness, 0.6);
        assert_eq!(material.emissive, [0.1, 0.0, 0.0]);
    }

    #[test]
    fn test_decode_binary_glb() {
        let model = decode_gltf("temple", &triangle_glb(), None).unwrap();

        assert_eq!(model.name, "temple");
        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        // Vertices come out of the BIN chunk, indices from the u16 accessor
        assert_eq!(mesh.positions, vec![[0.0, 5.0, 0.0], [1.0, 5.0, 0.0], [0.0, 6.0, 0.0]]);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.normals, vec![[0.0, 0.0, 1.0]; 3]);
        // No material in the file
        assert_eq!(mesh.material, None);
        assert!(model.materials.is_empty());
    }

    #[test]
    fn test_decode_garbage_fails() {
        let err = decode_gltf("junk", b"not a model", None).unwrap_err();
        assert!(matches!(err, LoadError::Gltf(_)));
    }

    #[test]
    fn test_normal_matrix_undoes_non_uniform_scale() {
        let world = Matrix4::from_nonuniform_scale(4.0, 1.0, 1.0);
        let n = (normal_matrix(&world) * Vector3::new(1.0, 1.0, 0.0)).normalize();
        // The normal tilts away from the stretched axis
        assert!(n.y > n.x);
    }
}
