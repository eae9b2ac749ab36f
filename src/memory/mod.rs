//! # Memory Objects
//!
//! Extra models placed in the workshop scene. A registrar is a plain function
//! that receives a [`MemoryRegistry`] and adds any number of
//! [`MemoryObjectConfig`]s to it; the built-in list lives in [`registrars`].
//! JSON manifests passed on the command line feed the same registry.
//!
//! ```
//! use memory_palace::memory::{MemoryObjectConfig, MemoryRegistry};
//!
//! fn register_statue(registry: &mut dyn MemoryRegistry) {
//!     registry.add_memory_object(
//!         MemoryObjectConfig::new("Statue", "/models/memory-objects/statue.glb")
//!             .with_position([0.0, 0.0, 12.0]),
//!     );
//! }
//!
//! let mut collected: Vec<MemoryObjectConfig> = Vec::new();
//! register_statue(&mut collected);
//! assert_eq!(collected[0].name, "Statue");
//! ```

pub mod sample;

use std::path::Path;

use cgmath::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

/// Uniform or per-axis scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scale {
    Uniform(f32),
    PerAxis([f32; 3]),
}

impl Scale {
    pub fn to_vector(self) -> Vector3<f32> {
        match self {
            Scale::Uniform(s) => Vector3::new(s, s, s),
            Scale::PerAxis(s) => Vector3::from(s),
        }
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale::Uniform(1.0)
    }
}

/// Where and how a memory object appears
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryObjectConfig {
    pub name: String,
    /// Web-style path resolved against the asset root
    pub model_path: String,
    #[serde(default)]
    pub position: [f32; 3],
    /// Euler XYZ angles in radians
    #[serde(default)]
    pub rotation: [f32; 3],
    #[serde(default)]
    pub scale: Scale,
}

impl MemoryObjectConfig {
    pub fn new(name: impl Into<String>, model_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model_path: model_path.into(),
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: Scale::default(),
        }
    }

    pub fn with_position(mut self, position: [f32; 3]) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: [f32; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }
}

/// Anything memory objects can be registered with
pub trait MemoryRegistry {
    fn add_memory_object(&mut self, config: MemoryObjectConfig);
}

impl MemoryRegistry for Vec<MemoryObjectConfig> {
    fn add_memory_object(&mut self, config: MemoryObjectConfig) {
        self.push(config);
    }
}

pub type MemoryObjectRegistrar = fn(&mut dyn MemoryRegistry);

/// Built-in registrars, run in order when the viewer starts
pub fn registrars() -> Vec<MemoryObjectRegistrar> {
    vec![sample::sample_memory]
}

/// Reads a JSON array of memory object configs
pub fn load_manifest(path: &Path) -> Result<Vec<MemoryObjectConfig>, ViewerError> {
    let text = std::fs::read_to_string(path).map_err(|source| ViewerError::ManifestIo {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&text).map_err(|source| ViewerError::ManifestParse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_manifest(text: &str) -> Result<Vec<MemoryObjectConfig>, serde_json::Error> {
    serde_json::from_str(text)
}
