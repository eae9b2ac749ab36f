use std::ops::Range;

use cgmath::{Matrix, Matrix4, Rad, SquareMatrix, Vector3};
use wgpu::{util::DeviceExt, Device};

use super::vertex::Vertex3D;
use crate::{
    gfx::{bounds::Aabb, resources::material::MaterialId},
    wgpu_utils::{
        binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc,
        UniformBuffer,
    },
};

pub struct Mesh {
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    /// Material used for this mesh; `None` falls back to the default
    pub material_id: Option<MaterialId>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let index_count = indices.len() as u32;
        Self {
            vertices,
            indices,
            material_id: None,
            vertex_buffer: None,
            index_buffer: None,
            index_count,
        }
    }

    /// Builds a mesh from separate attribute streams
    ///
    /// Normals are computed from the faces when `normals` does not match
    /// `positions` one to one.
    pub fn from_attributes(positions: &[[f32; 3]], normals: &[[f32; 3]], indices: Vec<u32>) -> Self {
        let computed;
        let normals = if normals.len() == positions.len() {
            normals
        } else {
            computed = Self::calculate_face_normals(positions, &indices);
            &computed
        };

        let vertices = positions
            .iter()
            .zip(normals)
            .map(|(position, normal)| Vertex3D {
                position: *position,
                normal: *normal,
            })
            .collect();

        Self::new(vertices, indices)
    }

    pub fn with_material(mut self, material_id: impl Into<MaterialId>) -> Self {
        self.material_id = Some(material_id.into());
        self
    }

    /// Averages the face normals around each vertex
    pub fn calculate_face_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
        let mut normals = vec![[0.0f32; 3]; positions.len()];

        for triangle in indices.chunks_exact(3) {
            let (i0, i1, i2) = (triangle[0] as usize, triangle[1] as usize, triangle[2] as usize);
            if i0 >= positions.len() || i1 >= positions.len() || i2 >= positions.len() {
                continue;
            }

            let (v0, v1, v2) = (positions[i0], positions[i1], positions[i2]);
            let edge1 = [v1[0] - v0[0], v1[1] - v0[1], v1[2] - v0[2]];
            let edge2 = [v2[0] - v0[0], v2[1] - v0[1], v2[2] - v0[2]];

            let face_normal = [
                edge1[1] * edge2[2] - edge1[2] * edge2[1],
                edge1[2] * edge2[0] - edge1[0] * edge2[2],
                edge1[0] * edge2[1] - edge1[1] * edge2[0],
            ];

            for &vertex_idx in &[i0, i1, i2] {
                for axis in 0..3 {
                    normals[vertex_idx][axis] += face_normal[axis];
                }
            }
        }

        for normal in normals.iter_mut() {
            let length = (normal[0].powi(2) + normal[1].powi(2) + normal[2].powi(2)).sqrt();
            *normal = if length > 0.0 {
                [normal[0] / length, normal[1] / length, normal[2] / length]
            } else {
                [0.0, 1.0, 0.0]
            };
        }

        normals
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Bounds in the owning object's local space
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.vertices.iter().map(|v| &v.position))
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some() && self.index_buffer.is_some()
    }

    fn init_gpu_resources(&mut self, device: &Device) {
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

/// Per-object uniform block, matches `ObjectUniform` in the shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    /// x: receives shadows (0 or 1)
    pub flags: [f32; 4],
}

/// Layout for bind group 1 shared by every object
pub fn object_bind_group_layout(device: &Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_rendering(binding_types::uniform())
        .create(device, "Object Bind Group")
}

// GPU resources struct to hold the per-object uniform and its bind group
pub struct ObjectGpuResources {
    pub uniform: UniformBuffer<ObjectUniform>,
    pub bind_group: wgpu::BindGroup,
}

/// A named, transformed group of meshes
///
/// The world transform is `T * Rx * Ry * Rz * S`, i.e. Euler angles applied
/// in XYZ order.
pub struct Object {
    pub name: String,
    pub meshes: Vec<Mesh>,
    translation: Vector3<f32>,
    /// Euler XYZ rotation in radians
    rotation: Vector3<f32>,
    scale: Vector3<f32>,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub visible: bool,
    pub gpu_resources: Option<ObjectGpuResources>, // None until init_gpu_resources called
}

impl Object {
    /// Create a new Object with identity transformation
    pub fn new(name: impl Into<String>, meshes: Vec<Mesh>) -> Self {
        Self {
            name: name.into(),
            meshes,
            translation: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
            cast_shadow: false,
            receive_shadow: false,
            visible: true,
            gpu_resources: None,
        }
    }

    pub fn with_translation(mut self, translation: [f32; 3]) -> Self {
        self.translation = translation.into();
        self
    }

    pub fn with_rotation(mut self, rotation: [f32; 3]) -> Self {
        self.rotation = rotation.into();
        self
    }

    pub fn with_scale(mut self, scale: [f32; 3]) -> Self {
        self.scale = scale.into();
        self
    }

    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale([scale; 3])
    }

    pub fn with_shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }

    pub fn translation(&self) -> Vector3<f32> {
        self.translation
    }

    pub fn rotation(&self) -> Vector3<f32> {
        self.rotation
    }

    pub fn scale(&self) -> Vector3<f32> {
        self.scale
    }

    pub fn set_translation(&mut self, translation: Vector3<f32>) {
        self.translation = translation;
    }

    pub fn set_rotation(&mut self, rotation: Vector3<f32>) {
        self.rotation = rotation;
    }

    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = scale;
    }

    /// Model matrix: T * R * S
    pub fn transform(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.translation);
        let r = Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z));
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * r * s // Order matters: T * R * S
    }

    pub fn local_bounds(&self) -> Aabb {
        self.meshes
            .iter()
            .fold(Aabb::empty(), |bounds, mesh| bounds.union(&mesh.bounds()))
    }

    pub fn world_bounds(&self) -> Aabb {
        self.local_bounds().transformed(&self.transform())
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }

    fn uniform(&self) -> ObjectUniform {
        let model = self.transform();
        // Inverse transpose keeps normals perpendicular under non-uniform scale
        let normal_matrix = model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);

        ObjectUniform {
            model: model.into(),
            normal_matrix: normal_matrix.into(),
            flags: [if self.receive_shadow { 1.0 } else { 0.0 }, 0.0, 0.0, 0.0],
        }
    }

    /// Uploads meshes and creates the object uniform; a no-op once done
    pub fn init_gpu_resources(&mut self, device: &Device, layout: &BindGroupLayoutWithDesc) {
        for mesh in self.meshes.iter_mut().filter(|mesh| !mesh.is_uploaded()) {
            mesh.init_gpu_resources(device);
        }

        if self.gpu_resources.is_none() {
            let uniform = UniformBuffer::new_with_data(device, &self.uniform());
            let bind_group = BindGroupBuilder::new(layout)
                .resource(uniform.binding_resource())
                .create(device, &format!("{} Object Bind Group", self.name));
            self.gpu_resources = Some(ObjectGpuResources { uniform, bind_group });
        }
    }

    /// Syncs the transform and shadow flags to the GPU
    ///
    /// Unchanged content is not rewritten.
    pub fn update_transform(&mut self, queue: &wgpu::Queue) {
        let content = self.uniform();
        if let Some(gpu_resources) = &mut self.gpu_resources {
            gpu_resources.uniform.update_content(queue, content);
        }
    }

    /// Get the object bind group for rendering
    pub fn get_bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources.as_ref().map(|res| &res.bind_group)
    }
}

pub trait DrawObject<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
}

impl<'a, 'b> DrawObject<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return; // Skip drawing if not uploaded
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Transform, Point3, EuclideanSpace};
    use std::f32::consts::FRAC_PI_2;

    fn unit_triangle() -> Mesh {
        Mesh::from_attributes(
            &[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]],
            &[],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn test_missing_normals_are_computed() {
        let mesh = unit_triangle();
        for vertex in mesh.vertices() {
            assert_eq!(vertex.normal, [0.0, 1.0, 0.0]);
        }
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn test_transform_order() {
        let object = Object::new("probe", vec![unit_triangle()])
            .with_translation([10.0, 3.0, -6.0])
            .with_rotation([0.0, FRAC_PI_2, 0.0])
            .with_uniform_scale(4.0);

        // Scale first, then a quarter turn about Y maps +X to -Z, then translate
        let p = object.transform().transform_point(Point3::new(1.0, 0.0, 0.0));
        assert!((p.to_vec() - Vector3::new(10.0, 3.0, -10.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_world_bounds() {
        let object = Object::new("probe", vec![unit_triangle()])
            .with_translation([-12.0, 3.0, -10.0])
            .with_uniform_scale(3.0);
        let bounds = object.world_bounds();
        assert!((bounds.min - Vector3::new(-12.0, 3.0, -13.0)).magnitude() < 1e-5);
        assert!((bounds.max - Vector3::new(-9.0, 3.0, -10.0)).magnitude() < 1e-5);
    }

    #[test]
    fn test_uniform_carries_receive_flag() {
        let object = Object::new("ground", vec![unit_triangle()]).with_shadows(false, true);
        assert_eq!(object.uniform().flags[0], 1.0);

        let object = Object::new("cube", vec![unit_triangle()]).with_shadows(true, false);
        assert_eq!(object.uniform().flags[0], 0.0);
    }
}
