//! Construction of the fixed part of the workshop scene.

use cgmath::Vector3;

use crate::{
    config::{rgb, LightingConfig, ViewerConfig},
    gfx::{
        camera::CameraManager,
        geometry::{generate_box, generate_plane},
        resources::Material,
        scene::{DirectionalLight, Object, ObjectId, Scene},
    },
};

pub const GROUND_NAME: &str = "Ground";
pub const TEST_CUBE_NAME: &str = "Test Cube";
pub const HELPER_CUBE_NAME: &str = "Helper Cube";

const GROUND_SIZE: f32 = 240.0;
const TEST_CUBE_SIZE: f32 = 8.0;
const HELPER_CUBE_SIZE: f32 = 5.0;

/// Sky, lights, ground and the red sanity cube
pub fn build_scene(config: &ViewerConfig) -> Scene {
    let mut scene = Scene::new(CameraManager::from_config(config), config.background);
    log::info!("Scene created");

    let [x, y, z] = config.camera.eye;
    log::info!("Camera created at {x:.1}, {y:.1}, {z:.1}");

    add_lighting(&mut scene, &config.lighting);
    log::info!("Lighting configured");

    add_ground(&mut scene);
    log::info!("Ground plane ready");

    add_test_cube(&mut scene);
    log::info!("Test cube added");

    scene
}

fn add_lighting(scene: &mut Scene, lighting: &LightingConfig) {
    scene.add_ambient_light(lighting.ambient_color, lighting.ambient_intensity);
    scene.add_directional_light(
        DirectionalLight::new(
            lighting.directional_color,
            lighting.directional_intensity,
            lighting.directional_position,
        )
        .with_shadow_map_size(lighting.shadow_map_size),
    );
}

fn add_ground(scene: &mut Scene) -> ObjectId {
    let material = scene.add_material(Material::standard(GROUND_NAME, rgb(0xd4c5a9)));
    let mesh = generate_plane(GROUND_SIZE, GROUND_SIZE, 1, 1)
        .into_mesh()
        .with_material(material);

    scene.add_object(Object::new(GROUND_NAME, vec![mesh]).with_shadows(false, true))
}

fn add_test_cube(scene: &mut Scene) -> ObjectId {
    let material = scene.add_material(
        Material::standard(TEST_CUBE_NAME, rgb(0xff5555)).with_emission(rgb(0xff3333), 0.3),
    );
    let mesh = generate_box(TEST_CUBE_SIZE, TEST_CUBE_SIZE, TEST_CUBE_SIZE)
        .into_mesh()
        .with_material(material);

    scene.add_object(
        Object::new(TEST_CUBE_NAME, vec![mesh])
            .with_translation([0.0, 6.0, 0.0])
            .with_shadows(true, false),
    )
}

/// Adds a 5 x 5 x 5 shadow-casting cube in `color` (linear RGB)
pub fn add_helper_cube(scene: &mut Scene, position: Vector3<f32>, color: [f32; 3]) -> ObjectId {
    let name = scene.ensure_unique_name(HELPER_CUBE_NAME);
    let material = scene.add_material(Material::standard(&name, color));
    let mesh = generate_box(HELPER_CUBE_SIZE, HELPER_CUBE_SIZE, HELPER_CUBE_SIZE)
        .into_mesh()
        .with_material(material);

    let id = scene.add_object(
        Object::new(name, vec![mesh])
            .with_translation(position.into())
            .with_shadows(true, false),
    );
    log::info!("Helper cube added at {}, {}, {}", position.x, position.y, position.z);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_scene() {
        let scene = build_scene(&ViewerConfig::default());

        // Ambient, directional, ground and cube
        assert_eq!(scene.children_count(), 4);
        assert_eq!(scene.background, rgb(0x87ceeb));

        let lighting = scene.lighting();
        let sun = lighting.directional.unwrap();
        assert_eq!(sun.position, [25.0, 35.0, 10.0]);
        assert!(sun.cast_shadow);
        assert_eq!(sun.shadow_map_size, 2048);

        let ground = scene.object(scene.find_object(GROUND_NAME).unwrap()).unwrap();
        assert!(ground.receive_shadow && !ground.cast_shadow);
        let bounds = ground.world_bounds();
        assert_eq!(bounds.size(), Vector3::new(240.0, 0.0, 240.0));

        let cube = scene.object(scene.find_object(TEST_CUBE_NAME).unwrap()).unwrap();
        assert!(cube.cast_shadow);
        assert_eq!(cube.translation(), Vector3::new(0.0, 6.0, 0.0));
        let material = scene.get_material_for_mesh(&cube.meshes[0]);
        assert_eq!(material.emissive, {
            let e = rgb(0xff3333);
            [e[0] * 0.3, e[1] * 0.3, e[2] * 0.3]
        });
    }

    #[test]
    fn test_helper_cubes_get_own_materials() {
        let mut scene = build_scene(&ViewerConfig::default());
        let a = add_helper_cube(&mut scene, Vector3::new(0.0, 5.0, 0.0), [1.0, 0.0, 0.0]);
        let b = add_helper_cube(&mut scene, Vector3::new(0.0, 5.0, 0.0), [0.0, 0.0, 1.0]);

        let a = scene.object(a).unwrap();
        let b = scene.object(b).unwrap();
        assert_ne!(a.name, b.name);
        assert_eq!(scene.get_material_for_mesh(&a.meshes[0]).base_color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(scene.get_material_for_mesh(&b.meshes[0]).base_color, [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(a.world_bounds().size(), Vector3::new(5.0, 5.0, 5.0));
    }
}
