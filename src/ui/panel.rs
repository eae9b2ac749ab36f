// src/ui/panel.rs
//! Overlay panels drawn over the workshop scene
//!
//! Everything here reads [`Viewer`] state; the panels never mutate it.

use imgui::{Condition, Ui};

use crate::viewer::{DebugStatus, LoadingOverlay, StatusValue, Viewer};

const MARGIN: f32 = 16.0;
const VALUE_COLUMN: f32 = 150.0;

const LABEL_COLOR: u32 = 0x9be7ff;
const OK_COLOR: u32 = 0x3ddc97;
const FAIL_COLOR: u32 = 0xff6b6b;
const NEUTRAL_COLOR: u32 = 0xf5f5f5;
const MESSAGE_COLOR: u32 = 0xc5c5c5;

/// `0xRRGGBB` as an opaque ImGui colour
fn hex(color: u32) -> [f32; 4] {
    let channel = |shift: u32| ((color >> shift) & 0xff) as f32 / 255.0;
    [channel(16), channel(8), channel(0), 1.0]
}

fn status_color(ok: Option<bool>) -> [f32; 4] {
    match ok {
        Some(true) => hex(OK_COLOR),
        Some(false) => hex(FAIL_COLOR),
        None => hex(NEUTRAL_COLOR),
    }
}

/// Draws every panel for the current frame
pub fn workshop_overlay(ui: &Ui, viewer: &Viewer) {
    let display_size = ui.io().display_size;
    // Guard against invalid display size that could cause crashes
    if display_size[0] <= 0.0 || display_size[1] <= 0.0 {
        return;
    }

    let overlay = viewer.overlay();
    if let Some(warning) = &overlay.warning {
        warning_overlay(ui, display_size, warning);
        return;
    }

    if overlay.is_visible() {
        loading_overlay(ui, display_size, overlay);
    }
    debug_panel(ui, display_size, viewer.status());
    info_panel(ui, display_size);
}

fn warning_overlay(ui: &Ui, display_size: [f32; 2], warning: &str) {
    ui.window("Asset Directory Required")
        .position([display_size[0] * 0.5, display_size[1] * 0.5], Condition::Always)
        .position_pivot([0.5, 0.5])
        .size([display_size[0] * 0.6, 0.0], Condition::Always)
        .movable(false)
        .resizable(false)
        .collapsible(false)
        .save_settings(false)
        .build(|| {
            ui.text_colored(hex(FAIL_COLOR), "Asset Directory Required");
            ui.separator();
            ui.text_wrapped(warning);
        });
}

fn loading_overlay(ui: &Ui, display_size: [f32; 2], overlay: &LoadingOverlay) {
    ui.window("##loading")
        .position([display_size[0] * 0.5, display_size[1] * 0.5], Condition::Always)
        .position_pivot([0.5, 0.5])
        .no_decoration()
        .always_auto_resize(true)
        .movable(false)
        .save_settings(false)
        .bg_alpha(0.85)
        .build(|| {
            ui.text("Loading Parthenon Memory Workshop...");
            ui.spacing();
            ui.text(&overlay.message);
            ui.spacing();
            ui.text_disabled("Check the debug panel and the log output for status updates.");
        });
}

fn status_row(ui: &Ui, label: &str, value: &StatusValue) {
    ui.text_colored(hex(LABEL_COLOR), label);
    ui.same_line_with_pos(VALUE_COLUMN);
    ui.text_colored(status_color(value.ok), &value.text);
}

fn count_row(ui: &Ui, label: &str, value: impl std::fmt::Display) {
    ui.text_colored(hex(LABEL_COLOR), label);
    ui.same_line_with_pos(VALUE_COLUMN);
    ui.text_colored(hex(NEUTRAL_COLOR), value.to_string());
}

fn debug_panel(ui: &Ui, display_size: [f32; 2], status: &DebugStatus) {
    ui.window("##debug")
        .position([display_size[0] - MARGIN, MARGIN], Condition::Always)
        .position_pivot([1.0, 0.0])
        .no_decoration()
        .always_auto_resize(true)
        .movable(false)
        .save_settings(false)
        .bg_alpha(0.8)
        .build(|| {
            status_row(ui, "WebGL", &status.webgl);
            status_row(ui, "Renderer", &status.renderer);
            count_row(ui, "Models", status.models_loaded);
            count_row(ui, "FPS", status.fps);
            count_row(ui, "Scene Children", status.scene_children);
            ui.spacing();
            ui.text_colored(hex(MESSAGE_COLOR), &status.scene_message);
        });
}

fn info_panel(ui: &Ui, display_size: [f32; 2]) {
    ui.window("##info")
        .position([MARGIN, display_size[1] - MARGIN], Condition::Always)
        .position_pivot([0.0, 1.0])
        .no_decoration()
        .always_auto_resize(true)
        .movable(false)
        .save_settings(false)
        .bg_alpha(0.7)
        .build(|| {
            ui.text("Parthenon Memory Workshop");
            ui.separator();
            ui.text("Left drag to orbit, right drag to pan, scroll to zoom.");
            ui.spacing();
            ui.text("T  add a helper cube");
            ui.text("M  drop a debug model");
            ui.text("F  frame the Parthenon");
            ui.text("V  toggle vsync");
            ui.text("Esc  quit");
            ui.spacing();
            ui.text_disabled("Add memory objects with --memory <manifest.json>.");
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_colours() {
        assert_eq!(hex(0xffffff), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(hex(0xff0000), [1.0, 0.0, 0.0, 1.0]);
        let label = hex(LABEL_COLOR);
        assert!((label[0] - 0x9b as f32 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_status_colours() {
        assert_eq!(status_color(Some(true)), hex(0x3ddc97));
        assert_eq!(status_color(Some(false)), hex(0xff6b6b));
        assert_eq!(status_color(None), hex(0xf5f5f5));
    }
}
