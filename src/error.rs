//! Error types shared across the crate.

use std::path::PathBuf;

/// Failure to load a model from the asset root
///
/// Crosses the loader channel, so every variant is `Send`.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("model not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported model format: {0}")]
    UnsupportedFormat(String),

    #[error("glTF decode error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("OBJ decode error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("model contains no triangle geometry")]
    Empty,
}

/// GPU initialisation failure
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible GPU adapter: {0}")]
    NoAdapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// Top-level viewer failure
#[derive(thiserror::Error, Debug)]
pub enum ViewerError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to read memory manifest {}: {source}", path.display())]
    ManifestIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid memory manifest {}: {source}", path.display())]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send<T: Send + 'static>() {}

    #[test]
    fn test_load_error_is_send() {
        assert_send::<LoadError>();
    }

    #[test]
    fn test_messages() {
        let err = LoadError::NotFound(PathBuf::from("public/models/parthenon.glb"));
        assert_eq!(err.to_string(), "model not found: public/models/parthenon.glb");
        assert_eq!(
            LoadError::UnsupportedFormat("fbx".into()).to_string(),
            "unsupported model format: fbx"
        );
    }
}
