// src/lib.rs
//! Parthenon Memory Workshop
//!
//! A native 3D viewer built on wgpu and winit: a ground plane, a sanity cube,
//! a loaded Parthenon model and any number of "memory objects", seen through
//! a damped orbit camera with a live ImGui debug overlay.
//!
//! ```no_run
//! use memory_palace::{app::ViewerApp, config::ViewerConfig};
//!
//! fn main() -> Result<(), memory_palace::error::ViewerError> {
//!     ViewerApp::new(ViewerConfig::from_env()).run()
//! }
//! ```

pub mod app;
pub mod assets;
pub mod config;
pub mod error;
pub mod gfx;
pub mod memory;
pub mod performance;
pub mod prelude;
pub mod ui;
pub mod viewer;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::ViewerApp;
pub use config::ViewerConfig;
pub use viewer::Viewer;
