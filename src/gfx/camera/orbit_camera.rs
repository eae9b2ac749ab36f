use cgmath::*;

use crate::config::{CameraConfig, ControlsConfig};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Perspective camera orbiting a target point, Y up
///
/// `pitch` is the elevation above the XZ plane and `yaw` the angle around Y
/// measured from +Z, so a yaw of zero looks down -Z.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Will be auto-calculated in `update()` nevertheless.
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
        };
        camera.update();
        camera
    }

    /// Builds a camera whose spherical coordinates reproduce `eye` around `target`
    pub fn from_position(eye: Vector3<f32>, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self::new(1.0, 0.0, 0.0, target, aspect);
        camera.set_position(eye, target);
        camera
    }

    /// Camera and bounds as described by the viewer configuration
    pub fn from_config(camera: &CameraConfig, controls: &ControlsConfig, aspect: f32) -> Self {
        let mut orbit = Self::new(1.0, 0.0, 0.0, Vector3::from(camera.target), aspect);
        orbit.fovy = Deg(camera.fov_y_degrees).into();
        orbit.znear = camera.near;
        orbit.zfar = camera.far;
        orbit.bounds = OrbitCameraBounds::with_max_polar_angle(controls.max_polar_angle);
        orbit.set_position(Vector3::from(camera.eye), Vector3::from(camera.target));
        orbit
    }

    /// Moves the camera to `eye` looking at `target`
    ///
    /// Pitch and distance are clamped to the bounds, so the resulting eye can
    /// differ from the requested one when it lies outside them.
    pub fn set_position(&mut self, eye: Vector3<f32>, target: Vector3<f32>) {
        let offset = eye - target;
        let distance = offset.magnitude();
        self.target = target;

        if distance <= f32::EPSILON {
            self.update();
            return;
        }

        self.yaw = offset.x.atan2(offset.z);
        self.pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        self.distance = distance;
        self.clamp_to_bounds();
        self.update();
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    /// Multiplies the orbit distance, e.g. by 0.95 per wheel step
    pub fn scale_distance(&mut self, factor: f32) {
        self.set_distance(self.distance * factor);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    /// Yaw is unbounded; the camera can circle the target freely
    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Pans the camera relative to the current view direction
    /// delta.0 = horizontal pan (left/right relative to camera view)
    /// delta.1 = vertical pan (up/down relative to camera view)
    ///
    /// Deltas are fractions of the orbit distance, so panning feels the same
    /// at every zoom level.
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        let movement = (right * delta.0 + up * delta.1) * self.distance;

        // Move both eye and target to maintain the view direction
        self.target += movement;
        self.update();
    }

    fn clamp_to_bounds(&mut self) {
        self.pitch = self.pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.distance = self.distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(
            Point3::from_vec(self.eye),
            Point3::from_vec(self.target),
            self.up,
        )
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    pub fn view_projection(&self) -> Matrix4<f32> {
        self.projection_matrix() * self.view_matrix()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
}

impl OrbitCameraBounds {
    /// Bounds keeping the view direction within `max_polar_angle` of +Y
    ///
    /// A polar angle below half pi keeps the camera above the ground plane.
    pub fn with_max_polar_angle(max_polar_angle: f32) -> Self {
        Self {
            min_pitch: std::f32::consts::FRAC_PI_2 - max_polar_angle,
            ..Self::default()
        }
    }
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: Some(0.5),
            max_distance: None,
            min_pitch: -std::f32::consts::FRAC_PI_2 + f32::EPSILON,
            max_pitch: std::f32::consts::FRAC_PI_2 - 0.001,
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-3
    }

    #[test]
    fn test_from_position_round_trips() {
        let eye = Vector3::new(0.0, 12.0, 36.0);
        let camera = OrbitCamera::from_position(eye, Vector3::zero(), 1.6);

        assert!(close(camera.eye, eye));
        assert!((camera.distance - (12.0f32 * 12.0 + 36.0 * 36.0).sqrt()).abs() < 1e-4);
        assert!(camera.yaw.abs() < 1e-6);

        let target = Vector3::new(3.0, 1.0, -2.0);
        let eye = Vector3::new(-10.0, 8.0, 5.0);
        let camera = OrbitCamera::from_position(eye, target, 1.0);
        assert!(close(camera.eye, eye));
        assert!(close(camera.target, target));
    }

    #[test]
    fn test_polar_angle_keeps_camera_above_ground() {
        let mut camera = OrbitCamera::from_config(
            &CameraConfig::default(),
            &ControlsConfig::default(),
            1.0,
        );
        assert!((camera.bounds.min_pitch - 0.01 * PI).abs() < 1e-6);

        camera.add_pitch(-10.0);
        assert!((camera.pitch - 0.01 * PI).abs() < 1e-6);
        assert!(camera.eye.y > 0.0);

        // Requests below the ground are lifted to the minimum elevation
        camera.set_position(Vector3::new(0.0, -5.0, 20.0), Vector3::zero());
        assert!(camera.eye.y > 0.0);
    }

    #[test]
    fn test_config_projection() {
        let camera = OrbitCamera::from_config(
            &CameraConfig::default(),
            &ControlsConfig::default(),
            1.0,
        );
        assert!((camera.fovy.0 - 70f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.znear, 0.1);
        assert_eq!(camera.zfar, 1000.0);
        assert!(close(camera.eye, Vector3::new(0.0, 12.0, 36.0)));

        // The target projects to the centre of clip space
        let clip = camera.view_projection() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert!((clip.x / clip.w).abs() < 1e-5);
        assert!((clip.y / clip.w).abs() < 1e-5);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }

    #[test]
    fn test_zoom_and_pan() {
        let mut camera = OrbitCamera::from_position(Vector3::new(0.0, 0.5, 10.0), Vector3::zero(), 1.0);
        let before = camera.distance;
        camera.scale_distance(0.95);
        assert!((camera.distance - before * 0.95).abs() < 1e-4);

        let forward = (camera.target - camera.eye).normalize();
        camera.pan((0.1, 0.0));
        assert!(camera.target.x > 0.0);
        // Panning translates without turning
        assert!(close((camera.target - camera.eye).normalize(), forward));
    }
}
