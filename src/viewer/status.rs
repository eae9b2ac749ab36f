//! State shown by the debug panel and the loading overlay.

/// A status row value; `ok` picks the colour (`None` is neutral)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusValue {
    pub text: String,
    pub ok: Option<bool>,
}

impl StatusValue {
    pub fn pending(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ok: None,
        }
    }

    pub fn ok(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ok: Some(true),
        }
    }

    pub fn failed(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ok: Some(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugStatus {
    /// GPU support row, labelled "WebGL" in the panel
    pub webgl: StatusValue,
    pub renderer: StatusValue,
    pub models_loaded: usize,
    pub fps: u32,
    pub scene_children: usize,
    pub scene_message: String,
}

impl Default for DebugStatus {
    fn default() -> Self {
        Self {
            webgl: StatusValue::pending("Checking..."),
            renderer: StatusValue::pending("Init..."),
            models_loaded: 0,
            fps: 0,
            scene_children: 0,
            scene_message: "Waiting for models...".to_string(),
        }
    }
}

impl DebugStatus {
    /// Counts a loaded model and updates the scene message to match
    pub fn mark_model_loaded(&mut self) {
        self.models_loaded += 1;
        self.scene_message = format!(
            "{} model{} loaded",
            self.models_loaded,
            if self.models_loaded == 1 { "" } else { "s" }
        );
    }
}

/// Centred overlay shown until the scene is ready
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingOverlay {
    pub message: String,
    pub scene_ready: bool,
    /// Blocking asset warning; replaces every other panel when set
    pub warning: Option<String>,
}

impl Default for LoadingOverlay {
    fn default() -> Self {
        Self {
            message: "Setting up renderer...".to_string(),
            scene_ready: false,
            warning: None,
        }
    }
}

impl LoadingOverlay {
    pub fn is_visible(&self) -> bool {
        !self.scene_ready && self.warning.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_values() {
        let status = DebugStatus::default();
        assert_eq!(status.webgl, StatusValue::pending("Checking..."));
        assert_eq!(status.renderer.text, "Init...");
        assert_eq!(status.scene_message, "Waiting for models...");

        let overlay = LoadingOverlay::default();
        assert_eq!(overlay.message, "Setting up renderer...");
        assert!(overlay.is_visible());
    }

    #[test]
    fn test_model_message_pluralises() {
        let mut status = DebugStatus::default();
        status.mark_model_loaded();
        assert_eq!(status.scene_message, "1 model loaded");
        status.mark_model_loaded();
        assert_eq!(status.scene_message, "2 models loaded");
    }

    #[test]
    fn test_warning_hides_loading_overlay() {
        let overlay = LoadingOverlay {
            warning: Some("no assets".into()),
            ..Default::default()
        };
        assert!(!overlay.is_visible());
    }
}
