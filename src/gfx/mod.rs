//! # Graphics Module
//!
//! Everything the viewer needs to put pixels on screen: the orbit camera,
//! procedural geometry, the scene graph, GPU resources and the render engine.
//!
//! ## Architecture Overview
//!
//! - **Camera System** ([`camera`]) - Orbit camera with damped controls and auto-framing
//! - **Geometry** ([`geometry`]) - Boxes and ground planes generated on the CPU
//! - **Rendering Pipeline** ([`rendering`]) - Lit pass with cached shadow mapping
//! - **Scene Management** ([`scene`]) - Objects, meshes and lights
//! - **Resource Management** ([`resources`]) - Materials, uniforms and depth textures
//!
//! GPU resources are created lazily, so a [`Scene`] can be built and inspected
//! without a device:
//!
//! ```no_run
//! use memory_palace::config::ViewerConfig;
//! use memory_palace::gfx::{camera::CameraManager, scene::Scene};
//!
//! let config = ViewerConfig::default();
//! let scene = Scene::new(CameraManager::from_config(&config), config.background);
//! assert_eq!(scene.children_count(), 0);
//! ```
//!
//! [`Scene`]: scene::Scene

pub mod bounds;
pub mod camera;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use bounds::Aabb;
pub use camera::orbit_camera::OrbitCamera;
pub use rendering::render_engine::RenderEngine;
