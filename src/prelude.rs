//! # Prelude
//!
//! Commonly used types in one import, mainly for writing memory object
//! registrars and small tools around the viewer.
//!
//! ```rust
//! use memory_palace::prelude::*;
//!
//! fn register_column(registry: &mut dyn MemoryRegistry) {
//!     registry.add_memory_object(
//!         MemoryObjectConfig::new("Column", "/models/column.glb")
//!             .with_position([6.0, 0.0, 4.0])
//!             .with_scale(Scale::PerAxis([1.0, 3.0, 1.0])),
//!     );
//! }
//!
//! let mut app = ViewerApp::new(ViewerConfig::default());
//! app.register_memory(register_column);
//! ```

// Application and configuration
pub use crate::app::ViewerApp;
pub use crate::config::ViewerConfig;
pub use crate::viewer::{DebugStatus, Viewer};

// Memory object plugins
pub use crate::memory::{MemoryObjectConfig, MemoryObjectRegistrar, MemoryRegistry, Scale};

// Scene and assets
pub use crate::assets::{ModelData, ModelLoader};
pub use crate::gfx::bounds::Aabb;
pub use crate::gfx::camera::CameraManager;
pub use crate::gfx::geometry::{generate_box, generate_plane, GeometryData};
pub use crate::gfx::scene::{Object, Scene};

// Errors
pub use crate::error::{LoadError, RenderError, ViewerError};

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Vector3, Zero};
