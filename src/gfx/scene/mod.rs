//! # Scene Management Module
//!
//! The scene holds everything the renderer draws: objects with their meshes
//! and transforms, the shared material library, lights, and the orbit camera.
//!
//! ## Key Components
//!
//! - [`Scene`] - The main scene container
//! - [`Object`] - A named group of meshes with a transform and shadow flags
//! - [`Light`] - Ambient or directional light
//! - [`Vertex3D`] - Vertex layout with position and normal
//!
//! ## Usage
//!
//! ```no_run
//! use memory_palace::config::ViewerConfig;
//! use memory_palace::gfx::{camera::CameraManager, geometry::generate_box, scene::{Object, Scene}};
//!
//! let config = ViewerConfig::default();
//! let mut scene = Scene::new(CameraManager::from_config(&config), config.background);
//! scene.add_object(
//!     Object::new("cube", vec![generate_box(8.0, 8.0, 8.0).into_mesh()])
//!         .with_translation([0.0, 6.0, 0.0])
//!         .with_shadows(true, false),
//! );
//! ```
//!
//! GPU resources are created lazily by the render engine, so scenes can be
//! built and inspected without a device.

pub mod light;
pub mod object;
pub mod scene;
pub mod vertex;

// Re-export main types
pub use light::{DirectionalLight, Light, SceneLighting};
pub use object::{DrawObject, Mesh, Object};
pub use scene::{ObjectId, Scene};
pub use vertex::Vertex3D;
