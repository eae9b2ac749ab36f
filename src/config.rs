//! # Viewer Configuration
//!
//! Every tunable the viewer reads lives on [`ViewerConfig`]. The defaults
//! reproduce the workshop scene; the command line and the
//! `MEMORY_PALACE_ASSETS` environment variable override a handful of them.

use std::{
    f32::consts::PI,
    path::{Path, PathBuf},
    time::Duration,
};

/// Environment variable overriding the asset root
pub const ASSET_ROOT_ENV: &str = "MEMORY_PALACE_ASSETS";

/// Converts a `0xRRGGBB` sRGB colour into linear RGB
///
/// The surface is sRGB, so colours written as hex are linearised before they
/// reach shaders or clear values.
pub fn rgb(hex: u32) -> [f32; 3] {
    let channel = |shift: u32| srgb_to_linear(((hex >> shift) & 0xff) as f32 / 255.0);
    [channel(16), channel(8), channel(0)]
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Perspective camera placement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub eye: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 70.0,
            near: 0.1,
            far: 1000.0,
            eye: [0.0, 12.0, 36.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

/// Orbit control tuning
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlsConfig {
    /// Fraction of the pending rotate/pan delta applied per update
    pub damping_factor: f32,
    /// Largest angle between +Y and the view direction, in radians
    pub max_polar_angle: f32,
    /// Radians per pixel of drag
    pub rotate_speed: f32,
    /// Fraction of the orbit distance panned per pixel of drag
    pub pan_speed: f32,
    /// Distance multiplier per wheel step towards the target
    pub zoom_step: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            max_polar_angle: PI * 0.49,
            rotate_speed: 0.005,
            pan_speed: 0.0015,
            zoom_step: 0.95,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingConfig {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub directional_color: [f32; 3],
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    pub shadow_map_size: u32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 0.7,
            directional_color: [1.0, 1.0, 1.0],
            directional_intensity: 0.85,
            directional_position: [25.0, 35.0, 10.0],
            shadow_map_size: 2048,
        }
    }
}

/// Top-level viewer configuration
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub window_title: String,
    /// Logical window size in pixels
    pub window_size: (u32, u32),
    /// Directory web-style model paths are resolved against
    pub asset_root: PathBuf,
    pub test_model_path: String,
    pub parthenon_model_path: String,
    /// Linear RGB clear colour
    pub background: [f32; 3],
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub lighting: LightingConfig,
    /// Delay between the test model request and the Parthenon request
    pub parthenon_delay: Duration,
    /// Delay between the Parthenon settling and the loading overlay hiding
    pub ready_delay: Duration,
    pub vsync: bool,
    /// JSON files listing extra memory objects
    pub memory_manifests: Vec<PathBuf>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_title: "Parthenon Memory Workshop".to_string(),
            window_size: (1280, 800),
            asset_root: PathBuf::from("public"),
            test_model_path: "/models/test-cube.glb".to_string(),
            parthenon_model_path: "/models/parthenon.glb".to_string(),
            background: rgb(0x87ceeb),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            lighting: LightingConfig::default(),
            parthenon_delay: Duration::from_millis(100),
            ready_delay: Duration::from_millis(400),
            vsync: true,
            memory_manifests: Vec::new(),
        }
    }
}

impl ViewerConfig {
    /// Defaults with `MEMORY_PALACE_ASSETS` applied when set
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var_os(ASSET_ROOT_ENV) {
            Some(root) if !root.is_empty() => config.with_asset_root(root),
            _ => config,
        }
    }

    pub fn with_asset_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.asset_root = root.into();
        self
    }

    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = (width.max(1), height.max(1));
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_memory_manifest(mut self, path: impl Into<PathBuf>) -> Self {
        self.memory_manifests.push(path.into());
        self
    }

    /// Maps a web-style model path such as `/models/x.glb` onto the asset root
    ///
    /// Absolute paths that already exist on disk are returned unchanged.
    pub fn resolve_asset(&self, model_path: &str) -> PathBuf {
        let direct = Path::new(model_path);
        if direct.is_absolute() && direct.exists() {
            return direct.to_path_buf();
        }

        let relative = model_path.trim_start_matches(['/', '\\']);
        self.asset_root.join(relative)
    }

    /// Checks that models can be served from the asset root
    ///
    /// The error string is shown verbatim in the warning overlay.
    pub fn check_assets(&self) -> Result<(), String> {
        if self.asset_root.is_dir() {
            Ok(())
        } else {
            Err(format!(
                "Asset directory '{}' not found. Run the viewer from the project folder, \
                 pass --assets <dir>, or set {} so models can be loaded.",
                self.asset_root.display(),
                ASSET_ROOT_ENV
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_workshop_scene() {
        let config = ViewerConfig::default();
        assert_eq!(config.window_title, "Parthenon Memory Workshop");
        assert_eq!(config.camera.eye, [0.0, 12.0, 36.0]);
        assert_eq!(config.camera.fov_y_degrees, 70.0);
        assert_eq!(config.lighting.shadow_map_size, 2048);
        assert_eq!(config.parthenon_delay, Duration::from_millis(100));
        assert_eq!(config.ready_delay, Duration::from_millis(400));
        assert!((config.controls.max_polar_angle - 0.49 * PI).abs() < 1e-6);
    }

    #[test]
    fn test_rgb_linearises() {
        assert_eq!(rgb(0x000000), [0.0, 0.0, 0.0]);
        assert_eq!(rgb(0xffffff), [1.0, 1.0, 1.0]);

        let red = rgb(0xff5555);
        assert_eq!(red[0], 1.0);
        // 0x55 is about 0.333 in sRGB and about 0.09 linear
        assert!((red[1] - 0.0908).abs() < 1e-3);
        assert_eq!(red[1], red[2]);
    }

    #[test]
    fn test_resolve_asset_strips_leading_slash() {
        let config = ViewerConfig::default().with_asset_root("/srv/workshop");
        assert_eq!(
            config.resolve_asset("/models/test-cube.glb"),
            PathBuf::from("/srv/workshop/models/test-cube.glb")
        );
        assert_eq!(
            config.resolve_asset("models/parthenon.glb"),
            PathBuf::from("/srv/workshop/models/parthenon.glb")
        );
    }

    #[test]
    fn test_resolve_asset_keeps_existing_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        let model = dir.path().join("statue.glb");
        std::fs::write(&model, b"glTF").unwrap();

        let config = ViewerConfig::default().with_asset_root("/nowhere");
        assert_eq!(config.resolve_asset(model.to_str().unwrap()), model);
    }

    #[test]
    fn test_check_assets() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ViewerConfig::default()
            .with_asset_root(dir.path())
            .check_assets()
            .is_ok());

        let missing = ViewerConfig::default().with_asset_root(dir.path().join("missing"));
        let message = missing.check_assets().unwrap_err();
        assert!(message.contains("missing"));
        assert!(message.contains(ASSET_ROOT_ENV));
    }

    #[test]
    fn test_builders() {
        let config = ViewerConfig::default()
            .with_window_size(0, 600)
            .with_vsync(false)
            .with_memory_manifest("a.json")
            .with_memory_manifest("b.json");
        assert_eq!(config.window_size, (1, 600));
        assert!(!config.vsync);
        assert_eq!(config.memory_manifests.len(), 2);
    }
}
