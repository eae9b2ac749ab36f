use cgmath::Vector3;
use winit::event::{DeviceEvent, WindowEvent};

use super::{camera_controller::CameraController, orbit_camera::OrbitCamera};
use crate::{config::ViewerConfig, gfx::bounds::Aabb};

/// Eye distance as a multiple of the largest bounds dimension
pub const FRAMING_DISTANCE_FACTOR: f32 = 1.6;

pub struct CameraManager {
    pub camera: OrbitCamera,
    pub controller: CameraController,
}

impl CameraManager {
    pub fn new(camera: OrbitCamera, controller: CameraController) -> Self {
        Self { camera, controller }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        let (width, height) = config.window_size;
        let aspect = width as f32 / height.max(1) as f32;
        Self::new(
            OrbitCamera::from_config(&config.camera, &config.controls, aspect),
            CameraController::new(&config.controls),
        )
    }

    pub fn process_window_event(&mut self, event: &WindowEvent) -> bool {
        self.controller
            .process_window_event(event, &mut self.camera)
    }

    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        self.controller.process_device_event(event);
    }

    /// Steps the damped controls
    pub fn update(&mut self) {
        self.controller.update(&mut self.camera);
    }

    /// Places the camera and drops any motion still easing in
    pub fn set_position(&mut self, eye: Vector3<f32>, target: Vector3<f32>) {
        self.controller.stop();
        self.camera.set_position(eye, target);
    }

    /// Frames `bounds`; returns false and leaves the camera alone when they are degenerate
    pub fn frame(&mut self, bounds: &Aabb) -> bool {
        match frame_bounds(bounds) {
            Some((eye, target)) => {
                self.set_position(eye, target);
                true
            }
            None => false,
        }
    }

    /// Get the view projection matrix from the camera
    pub fn get_view_proj_matrix(&self) -> cgmath::Matrix4<f32> {
        self.camera.view_projection()
    }
}

/// Camera placement showing the whole of `bounds`
///
/// The eye sits at the absolute position `(0.5 d, 0.4 d, d)` with
/// `d = 1.6 * max dimension`, looking at the box centre. Returns `None` for
/// empty or zero-size bounds.
pub fn frame_bounds(bounds: &Aabb) -> Option<(Vector3<f32>, Vector3<f32>)> {
    if bounds.is_empty() {
        return None;
    }

    let max_dim = bounds.max_dimension();
    if !max_dim.is_finite() || max_dim <= 0.0 {
        return None;
    }

    let distance = max_dim * FRAMING_DISTANCE_FACTOR;
    let eye = Vector3::new(distance * 0.5, distance * 0.4, distance);
    Some((eye, bounds.center()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn test_frame_bounds() {
        let bounds = Aabb::new(Vector3::new(-20.0, 0.0, -10.0), Vector3::new(20.0, 15.0, 10.0));
        let (eye, target) = frame_bounds(&bounds).unwrap();

        assert_eq!(eye, Vector3::new(32.0, 25.6, 64.0));
        assert_eq!(target, Vector3::new(0.0, 7.5, 0.0));
    }

    #[test]
    fn test_frame_bounds_is_absolute() {
        // The eye does not follow an off-centre box
        let bounds = Aabb::new(Vector3::new(100.0, 0.0, 100.0), Vector3::new(110.0, 5.0, 105.0));
        let (eye, target) = frame_bounds(&bounds).unwrap();
        assert_eq!(eye, Vector3::new(8.0, 6.4, 16.0));
        assert_eq!(target, Vector3::new(105.0, 2.5, 102.5));
    }

    #[test]
    fn test_degenerate_bounds_leave_camera() {
        assert!(frame_bounds(&Aabb::empty()).is_none());

        let point = Aabb::new(Vector3::new(1.0, 1.0, 1.0), Vector3::new(1.0, 1.0, 1.0));
        assert!(frame_bounds(&point).is_none());

        let mut manager = CameraManager::from_config(&ViewerConfig::default());
        let eye = manager.camera.eye;
        assert!(!manager.frame(&point));
        assert!((manager.camera.eye - eye).magnitude() < 1e-6);
    }

    #[test]
    fn test_manager_frames_camera() {
        let mut manager = CameraManager::from_config(&ViewerConfig::default());
        let bounds = Aabb::new(Vector3::new(-10.0, 0.0, -5.0), Vector3::new(10.0, 8.0, 5.0));

        assert!(manager.frame(&bounds));
        assert!((manager.camera.eye - Vector3::new(16.0, 12.8, 32.0)).magnitude() < 1e-3);
        assert!((manager.camera.target - Vector3::new(0.0, 4.0, 0.0)).magnitude() < 1e-5);
    }
}
