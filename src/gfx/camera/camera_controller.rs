use cgmath::{Vector2, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent},
};

use super::orbit_camera::OrbitCamera;
use crate::config::ControlsConfig;

/// Damped orbit controls
///
/// Left drag orbits, right drag pans, the wheel zooms. Drag input accumulates
/// into pending deltas that [`CameraController::update`] eases into the
/// camera over several frames.
pub struct CameraController {
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_step: f32,
    pub damping_factor: f32,
    is_rotate_pressed: bool,
    is_pan_pressed: bool,
    pending_rotate: Vector2<f32>,
    pending_pan: Vector2<f32>,
}

impl CameraController {
    pub fn new(controls: &ControlsConfig) -> Self {
        Self {
            rotate_speed: controls.rotate_speed,
            pan_speed: controls.pan_speed,
            zoom_step: controls.zoom_step,
            damping_factor: controls.damping_factor.clamp(f32::EPSILON, 1.0),
            is_rotate_pressed: false,
            is_pan_pressed: false,
            pending_rotate: Vector2::zero(),
            pending_pan: Vector2::zero(),
        }
    }

    /// Tracks buttons and applies wheel zoom; returns true if the event was used
    pub fn process_window_event(&mut self, event: &WindowEvent, camera: &mut OrbitCamera) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.is_rotate_pressed = pressed,
                    MouseButton::Right => self.is_pan_pressed = pressed,
                    _ => return false,
                }
                true
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let steps = match delta {
                    MouseScrollDelta::LineDelta(_, scroll) => *scroll,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => (*y as f32).signum(),
                };
                if steps == 0.0 {
                    return false;
                }
                // Scrolling up moves towards the target
                camera.scale_distance(self.zoom_step.powf(steps));
                true
            }
            _ => false,
        }
    }

    /// Accumulates drag motion for the pressed button
    pub fn process_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            let delta = Vector2::new(delta.0 as f32, delta.1 as f32);
            if self.is_rotate_pressed {
                self.pending_rotate += delta * self.rotate_speed;
            } else if self.is_pan_pressed {
                self.pending_pan += delta * self.pan_speed;
            }
        }
    }

    /// Releases all buttons, e.g. when the cursor leaves or the UI takes input
    pub fn release_buttons(&mut self) {
        self.is_rotate_pressed = false;
        self.is_pan_pressed = false;
    }

    /// Drops any motion still easing in
    pub fn stop(&mut self) {
        self.pending_rotate = Vector2::zero();
        self.pending_pan = Vector2::zero();
    }

    pub fn is_rotating(&self) -> bool {
        self.is_rotate_pressed
    }

    pub fn is_panning(&self) -> bool {
        self.is_pan_pressed
    }

    /// True while damped motion is still being applied
    pub fn is_moving(&self) -> bool {
        self.pending_rotate.x.abs() + self.pending_rotate.y.abs() > 1e-6
            || self.pending_pan.x.abs() + self.pending_pan.y.abs() > 1e-6
    }

    /// Applies one damping step to the camera
    pub fn update(&mut self, camera: &mut OrbitCamera) {
        if !self.is_moving() {
            self.stop();
            return;
        }

        let rotate = self.pending_rotate * self.damping_factor;
        let pan = self.pending_pan * self.damping_factor;

        // Dragging right swings the camera left around the target
        camera.add_yaw(-rotate.x);
        camera.add_pitch(rotate.y);
        camera.pan((-pan.x, pan.y));

        self.pending_rotate *= 1.0 - self.damping_factor;
        self.pending_pan *= 1.0 - self.damping_factor;
    }
}
