//! # User Interface Module
//!
//! Dear ImGui overlay for the viewer.
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu, input capture and rendering
//! - [`panel`] - The debug panel, loading and warning overlays, and the help panel
//!
//! When the UI wants the mouse or keyboard, the app stops forwarding input
//! to the hotkeys and the orbit camera.

pub mod manager;
pub mod panel;

// Re-export main types
pub use manager::UiManager;
pub use panel::workshop_overlay;
