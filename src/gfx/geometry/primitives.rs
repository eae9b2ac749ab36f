//! # Primitive Shape Generation
//!
//! All shapes are generated with outward normals and counter-clockwise
//! winding, in the Y-up space the renderer uses.

use super::GeometryData;

/// Generate a box centered at the origin
///
/// # Arguments
/// * `width` - Extent along X
/// * `height` - Extent along Y
/// * `depth` - Extent along Z
///
/// Each face gets its own four vertices so normals stay flat.
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-hx, -hy,  hz], [ hx, -hy,  hz], [ hx,  hy,  hz], [-hx,  hy,  hz],
        // Back face
        [-hx, -hy, -hz], [-hx,  hy, -hz], [ hx,  hy, -hz], [ hx, -hy, -hz],
        // Left face
        [-hx, -hy, -hz], [-hx, -hy,  hz], [-hx,  hy,  hz], [-hx,  hy, -hz],
        // Right face
        [ hx, -hy,  hz], [ hx, -hy, -hz], [ hx,  hy, -hz], [ hx,  hy,  hz],
        // Top face
        [-hx,  hy,  hz], [ hx,  hy,  hz], [ hx,  hy, -hz], [-hx,  hy, -hz],
        // Bottom face
        [-hx, -hy, -hz], [ hx, -hy, -hz], [ hx, -hy,  hz], [-hx, -hy,  hz],
    ];

    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    let mut data = GeometryData::new();
    data.vertices = positions.to_vec();
    data.normals = face_normals
        .iter()
        .flat_map(|normal| std::iter::repeat(*normal).take(4))
        .collect();

    // Two triangles per face
    data.indices = (0..6u32)
        .flat_map(|face| {
            let base = face * 4;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect();

    data
}

/// Generate a horizontal plane in XZ facing +Y
///
/// # Arguments
/// * `width` - Extent along X
/// * `depth` - Extent along Z
/// * `width_segments` - Number of subdivisions along X
/// * `depth_segments` - Number of subdivisions along Z
pub fn generate_plane(width: f32, depth: f32, width_segments: u32, depth_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let d_segs = depth_segments.max(1);

    for z in 0..=d_segs {
        let v = z as f32 / d_segs as f32;
        let pos_z = (v - 0.5) * depth;

        for x in 0..=w_segs {
            let u = x as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, 0.0, pos_z]);
            data.normals.push([0.0, 1.0, 0.0]);
        }
    }

    // Counter-clockwise when viewed from above
    for z in 0..d_segs {
        for x in 0..w_segs {
            let i = z * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            data.indices.extend_from_slice(&[i, next_row, i + 1]);
            data.indices.extend_from_slice(&[next_row, next_row + 1, i + 1]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_normal(data: &GeometryData, triangle: usize) -> [f32; 3] {
        let i = &data.indices[triangle * 3..triangle * 3 + 3];
        let a = data.vertices[i[0] as usize];
        let b = data.vertices[i[1] as usize];
        let c = data.vertices[i[2] as usize];
        let e1 = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let e2 = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ]
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_box(1.0, 1.0, 1.0);
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.normals.len(), cube.vertices.len());
    }

    #[test]
    fn test_box_extents_and_winding() {
        let test_cube = generate_box(8.0, 8.0, 8.0);
        for v in &test_cube.vertices {
            assert!(v.iter().all(|c| c.abs() == 4.0));
        }

        // Winding must agree with the stored normal on every triangle
        for t in 0..test_cube.triangle_count() {
            let n = face_normal(&test_cube, t);
            let stored = test_cube.normals[test_cube.indices[t * 3] as usize];
            let dot = n[0] * stored[0] + n[1] * stored[1] + n[2] * stored[2];
            assert!(dot > 0.0, "triangle {t} is wound inward");
        }
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertices.len(), 9); // 3x3 grid
        assert_eq!(plane.indices.len(), 24); // 4 quads * 2 triangles * 3 indices
        assert!(plane.vertices.iter().all(|v| v[1] == 0.0));
    }

    #[test]
    fn test_plane_faces_up() {
        let ground = generate_plane(240.0, 240.0, 1, 1);
        assert_eq!(ground.vertices[0], [-120.0, 0.0, -120.0]);
        assert_eq!(ground.vertices[3], [120.0, 0.0, 120.0]);
        for t in 0..ground.triangle_count() {
            assert!(face_normal(&ground, t)[1] > 0.0);
        }
    }
}
