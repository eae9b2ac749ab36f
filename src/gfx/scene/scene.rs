use crate::{
    assets::ModelData,
    gfx::{
        bounds::Aabb,
        camera::camera_utils::CameraManager,
        resources::material::{Material, MaterialManager},
        scene::object::Mesh,
    },
};

use super::{
    light::{AmbientLight, DirectionalLight, Light, SceneLighting},
    object::Object,
};

/// Index of an object in [`Scene::objects`]
pub type ObjectId = usize;

/// Main scene containing objects, materials, lights and camera
pub struct Scene {
    pub camera_manager: CameraManager,
    pub objects: Vec<Object>,
    pub material_manager: MaterialManager, // Centralized material storage
    pub lights: Vec<Light>,
    /// Linear RGB clear colour
    pub background: [f32; 3],
    revision: u64,
}

impl Scene {
    /// Creates an empty scene with the given camera manager
    pub fn new(camera_manager: CameraManager, background: [f32; 3]) -> Self {
        Self {
            camera_manager,
            objects: Vec::new(),
            material_manager: MaterialManager::new(),
            lights: Vec::new(),
            background,
            revision: 0,
        }
    }

    /// Counter bumped whenever something that affects shadows may have changed
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    pub fn add_ambient_light(&mut self, color: [f32; 3], intensity: f32) {
        self.lights.push(Light::Ambient(AmbientLight { color, intensity }));
    }

    pub fn add_directional_light(&mut self, light: DirectionalLight) {
        self.lights.push(Light::Directional(light));
        self.touch();
    }

    pub fn lighting(&self) -> SceneLighting {
        SceneLighting::from_lights(&self.lights)
    }

    pub fn add_material(&mut self, material: Material) -> String {
        self.material_manager.add_material(material)
    }

    /// Adds an object, renaming it if the name is taken
    pub fn add_object(&mut self, mut object: Object) -> ObjectId {
        object.name = self.ensure_unique_name(&object.name);
        self.objects.push(object);
        self.touch();
        self.objects.len() - 1
    }

    /// Converts decoded model data into an object, registering its materials
    ///
    /// The object is not added; callers position it first.
    pub fn object_from_model(&mut self, model: ModelData, name: &str) -> Object {
        let name = self.ensure_unique_name(name);

        let material_ids: Vec<String> = model
            .materials
            .iter()
            .enumerate()
            .map(|(i, data)| {
                let material = Material::new(
                    &format!("{name}/{i}:{}", data.name),
                    data.base_color,
                    data.metallic,
                    data.roughness,
                )
                .with_emission(data.emissive, 1.0);
                self.material_manager.add_material(material)
            })
            .collect();

        let meshes = model
            .meshes
            .into_iter()
            .map(|data| {
                let mut mesh = Mesh::from_attributes(&data.positions, &data.normals, data.indices);
                mesh.material_id = data
                    .material
                    .and_then(|index| material_ids.get(index).cloned());
                mesh
            })
            .collect();

        Object::new(name, meshes)
    }

    /// Adds decoded model data at the origin
    pub fn add_model(&mut self, model: ModelData, name: &str) -> ObjectId {
        let object = self.object_from_model(model, name);
        self.add_object(object)
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(id)
    }

    /// Mutable access; assumes the caller may change shadow casting state
    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.touch();
        self.objects.get_mut(id)
    }

    pub fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects.iter().position(|object| object.name == name)
    }

    /// Top-level children: every light and every object
    pub fn children_count(&self) -> usize {
        self.lights.len() + self.objects.len()
    }

    pub fn object_world_bounds(&self, id: ObjectId) -> Option<Aabb> {
        self.objects.get(id).map(Object::world_bounds)
    }

    /// Bounds of every visible object
    pub fn bounds(&self) -> Aabb {
        self.objects
            .iter()
            .filter(|object| object.visible)
            .fold(Aabb::empty(), |bounds, object| bounds.union(&object.world_bounds()))
    }

    /// Bounds of every visible shadow caster
    pub fn shadow_caster_bounds(&self) -> Aabb {
        self.objects
            .iter()
            .filter(|object| object.visible && object.cast_shadow)
            .fold(Aabb::empty(), |bounds, object| bounds.union(&object.world_bounds()))
    }

    /// Triangles drawn by the main pass
    pub fn triangle_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|object| object.visible)
            .map(Object::triangle_count)
            .sum()
    }

    pub fn get_material_for_mesh(&self, mesh: &Mesh) -> &Material {
        self.material_manager
            .get_material_for_mesh(mesh.material_id.as_ref())
    }

    pub fn ensure_unique_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.objects.iter().any(|obj| obj.name == test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        test_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assets::{MaterialData, MeshData},
        config::ViewerConfig,
        gfx::geometry::generate_box,
    };

    fn scene() -> Scene {
        Scene::new(CameraManager::from_config(&ViewerConfig::default()), [0.0; 3])
    }

    fn triangle_model() -> ModelData {
        ModelData {
            name: "triangle".into(),
            meshes: vec![MeshData {
                positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                normals: Vec::new(),
                indices: vec![0, 1, 2],
                material: Some(0),
            }],
            materials: vec![MaterialData {
                name: "marble".into(),
                base_color: [0.9, 0.9, 0.85, 1.0],
                metallic: 0.0,
                roughness: 0.8,
                emissive: [0.0; 3],
            }],
        }
    }

    #[test]
    fn test_children_count_includes_lights() {
        let mut scene = scene();
        scene.add_ambient_light([1.0; 3], 0.7);
        scene.add_directional_light(DirectionalLight::new([1.0; 3], 0.85, [25.0, 35.0, 10.0]));
        scene.add_object(Object::new("cube", vec![generate_box(8.0, 8.0, 8.0).into_mesh()]));

        assert_eq!(scene.children_count(), 3);
        assert_eq!(scene.triangle_count(), 12);
    }

    #[test]
    fn test_add_model_registers_materials() {
        let mut scene = scene();
        let id = scene.add_model(triangle_model(), "Parthenon");
        let object = scene.object(id).unwrap();

        assert_eq!(object.name, "Parthenon");
        let material = scene.get_material_for_mesh(&object.meshes[0]);
        assert_eq!(material.base_color, [0.9, 0.9, 0.85, 1.0]);
        assert_eq!(material.roughness, 0.8);

        // A second copy gets its own name and materials
        let second = scene.add_model(triangle_model(), "Parthenon");
        assert_eq!(scene.object(second).unwrap().name, "Parthenon (1)");
        assert_eq!(scene.material_manager.len(), 2);
    }

    #[test]
    fn test_revision_tracks_changes() {
        let mut scene = scene();
        let before = scene.revision();
        let id = scene.add_object(Object::new("cube", vec![generate_box(1.0, 1.0, 1.0).into_mesh()]));
        assert!(scene.revision() > before);

        let before = scene.revision();
        let _ = scene.object_world_bounds(id);
        assert_eq!(scene.revision(), before);
        scene.object_mut(id).unwrap().cast_shadow = true;
        assert!(scene.revision() > before);
    }

    #[test]
    fn test_shadow_caster_bounds() {
        let mut scene = scene();
        scene.add_object(
            Object::new("ground", vec![crate::gfx::geometry::generate_plane(240.0, 240.0, 1, 1).into_mesh()])
                .with_shadows(false, true),
        );
        scene.add_object(
            Object::new("cube", vec![generate_box(8.0, 8.0, 8.0).into_mesh()])
                .with_translation([0.0, 6.0, 0.0])
                .with_shadows(true, false),
        );

        let casters = scene.shadow_caster_bounds();
        assert_eq!(casters.max_dimension(), 8.0);
        assert_eq!(scene.bounds().max_dimension(), 240.0);
    }
}
