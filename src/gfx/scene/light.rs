//! Scene lights.
//!
//! The renderer shades with a single ambient term (the sum of all ambient
//! lights) and the first directional light, which is also the shadow caster.

use cgmath::{InnerSpace, Matrix4, Point3, Vector3};

use crate::gfx::{bounds::Aabb, camera::OPENGL_TO_WGPU_MATRIX};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    /// Light position; it shines from here towards `target`
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub cast_shadow: bool,
    pub shadow_map_size: u32,
}

impl DirectionalLight {
    pub fn new(color: [f32; 3], intensity: f32, position: [f32; 3]) -> Self {
        Self {
            color,
            intensity,
            position,
            target: [0.0, 0.0, 0.0],
            cast_shadow: true,
            shadow_map_size: 2048,
        }
    }

    pub fn with_shadow_map_size(mut self, size: u32) -> Self {
        self.shadow_map_size = size.max(1);
        self
    }

    /// Unit vector pointing from the target towards the light
    pub fn direction(&self) -> Vector3<f32> {
        let dir = Vector3::from(self.position) - Vector3::from(self.target);
        if dir.magnitude2() > f32::EPSILON {
            dir.normalize()
        } else {
            Vector3::unit_y()
        }
    }

    /// Orthographic light projection enclosing `casters`
    ///
    /// The light looks along its direction at the centre of the bounds from
    /// twice their bounding radius, so every caster lies inside the depth range.
    pub fn view_proj(&self, casters: &Aabb) -> Matrix4<f32> {
        let (center, radius) = if casters.is_empty() {
            (Vector3::from(self.target), 10.0)
        } else {
            (casters.center(), (casters.size().magnitude() * 0.5).max(1.0))
        };

        let dir = self.direction();
        let eye = center + dir * radius * 2.0;
        let up = if dir.y.abs() > 0.99 {
            Vector3::unit_z()
        } else {
            Vector3::unit_y()
        };

        let view = Matrix4::look_at_rh(Point3::new(eye.x, eye.y, eye.z), Point3::new(center.x, center.y, center.z), up);
        let proj = cgmath::ortho(-radius, radius, -radius, radius, radius * 0.5, radius * 3.5);
        OPENGL_TO_WGPU_MATRIX * proj * view
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient(AmbientLight),
    Directional(DirectionalLight),
}

/// Lighting as the shaders consume it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneLighting {
    /// Sum of ambient colour times intensity
    pub ambient: [f32; 3],
    pub directional: Option<DirectionalLight>,
}

impl SceneLighting {
    pub fn from_lights(lights: &[Light]) -> Self {
        let mut ambient = [0.0f32; 3];
        let mut directional = None;
        for light in lights {
            match light {
                Light::Ambient(a) => {
                    for (sum, channel) in ambient.iter_mut().zip(a.color) {
                        *sum += channel * a.intensity;
                    }
                }
                Light::Directional(d) => {
                    directional.get_or_insert(*d);
                }
            }
        }
        Self { ambient, directional }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn test_direction_points_at_light() {
        let light = DirectionalLight::new([1.0; 3], 0.85, [25.0, 35.0, 10.0]);
        let dir = light.direction();
        assert!((dir.magnitude() - 1.0).abs() < 1e-6);
        assert!(dir.x > 0.0 && dir.y > 0.0 && dir.z > 0.0);
    }

    #[test]
    fn test_casters_fit_in_light_clip_space() {
        let light = DirectionalLight::new([1.0; 3], 0.85, [25.0, 35.0, 10.0]);
        let casters = Aabb::new(Vector3::new(-4.0, 2.0, -4.0), Vector3::new(4.0, 10.0, 4.0));
        let view_proj = light.view_proj(&casters);

        for corner in [casters.min, casters.max, casters.center()] {
            let clip = view_proj * Vector4::new(corner.x, corner.y, corner.z, 1.0);
            let ndc = clip.truncate() / clip.w;
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0, "{ndc:?}");
            assert!((0.0..=1.0).contains(&ndc.z), "{ndc:?}");
        }
    }

    #[test]
    fn test_lighting_summary() {
        let lights = [
            Light::Ambient(AmbientLight { color: [1.0; 3], intensity: 0.7 }),
            Light::Directional(DirectionalLight::new([1.0; 3], 0.85, [25.0, 35.0, 10.0])),
            Light::Directional(DirectionalLight::new([1.0, 0.0, 0.0], 0.2, [0.0, 5.0, 0.0])),
        ];
        let lighting = SceneLighting::from_lights(&lights);
        assert_eq!(lighting.ambient, [0.7, 0.7, 0.7]);
        assert_eq!(lighting.directional.map(|d| d.intensity), Some(0.85));
    }
}
