//! # Viewer
//!
//! Composition root for the workshop. [`Viewer`] owns the scene, the model
//! loader and everything the overlay displays, and drives the load sequence:
//!
//! 1. The base scene (sky, lights, ground, sanity cube) is built up front.
//! 2. [`Viewer::start`] requests the test model, schedules the Parthenon a
//!    moment later and runs every memory object registrar.
//! 3. [`Viewer::update`] issues due requests, applies loader events and
//!    hides the loading overlay once the Parthenon has settled.
//!
//! Nothing here touches the GPU, so the whole state machine can be driven
//! with synthetic [`LoadEvent`]s.

pub mod setup;
pub mod status;

use std::{
    collections::HashMap,
    f32::consts::TAU,
    time::Instant,
};

use cgmath::Vector3;
use rand::Rng;

use crate::{
    assets::{LoadEvent, LoadEventKind, ModelData, ModelLoader, RequestId},
    config::{rgb, ViewerConfig},
    error::LoadError,
    gfx::scene::{ObjectId, Scene},
    memory::{load_manifest, MemoryObjectConfig, MemoryObjectRegistrar, MemoryRegistry, Scale},
    performance::FrameRateCounter,
};

pub use status::{DebugStatus, LoadingOverlay, StatusValue};

pub const TEST_MODEL_NAME: &str = "Test Model";
pub const PARTHENON_NAME: &str = "Parthenon";
pub const DEBUG_MODEL_NAME: &str = "Console Debug Model";

/// What a model request is for
#[derive(Debug, Clone, PartialEq)]
pub enum LoadTarget {
    TestModel,
    Parthenon,
    Memory(MemoryObjectConfig),
}

pub struct Viewer {
    config: ViewerConfig,
    pub scene: Scene,
    loader: Option<ModelLoader>,
    status: DebugStatus,
    overlay: LoadingOverlay,
    registrars: Vec<MemoryObjectRegistrar>,

    requests: HashMap<RequestId, LoadTarget>,
    scheduled: Vec<(Instant, LoadTarget)>,
    ready_at: Option<Instant>,
    started: bool,

    parthenon: Option<ObjectId>,
    last_logged_percent: Option<u64>,
    frame_rate: FrameRateCounter,
    frames_rendered: u64,
}

impl Viewer {
    /// Builds the base scene; no model is requested until [`Viewer::start`]
    pub fn new(config: ViewerConfig, registrars: Vec<MemoryObjectRegistrar>) -> Self {
        let scene = setup::build_scene(&config);
        Self {
            config,
            scene,
            loader: Some(ModelLoader::new()),
            status: DebugStatus::default(),
            overlay: LoadingOverlay::default(),
            registrars,
            requests: HashMap::new(),
            scheduled: Vec::new(),
            ready_at: None,
            started: false,
            parthenon: None,
            last_logged_percent: None,
            frame_rate: FrameRateCounter::new(),
            frames_rendered: 0,
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn status(&self) -> &DebugStatus {
        &self.status
    }

    pub fn overlay(&self) -> &LoadingOverlay {
        &self.overlay
    }

    pub fn parthenon(&self) -> Option<ObjectId> {
        self.parthenon
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Request id of an in-flight load for `target`
    pub fn pending_request(&self, target: &LoadTarget) -> Option<RequestId> {
        self.requests
            .iter()
            .find(|(_, pending)| *pending == target)
            .map(|(id, _)| *id)
    }

    pub fn renderer_ready(&mut self, width: u32, height: u32) {
        self.status.webgl = StatusValue::ok("Supported ✓");
        self.status.renderer = StatusValue::ok("Active ✓");
        self.status.scene_message = "Renderer ready".to_string();
        log::info!("Renderer attached ({width}x{height})");
        log::info!("Orbit controls ready");
    }

    pub fn renderer_failed(&mut self, err: &dyn std::error::Error) {
        log::error!("Renderer initialisation failed: {err}");
        self.status.webgl = StatusValue::failed("NOT SUPPORTED");
        self.status.renderer = StatusValue::failed("INIT FAILED");
        self.status.scene_message = "GPU rendering not available".to_string();
        self.overlay.message = "GPU rendering not supported".to_string();
    }

    /// Kicks off every model load; later calls do nothing
    pub fn start(&mut self, now: Instant) {
        if self.started {
            return;
        }
        self.started = true;

        if let Err(warning) = self.config.check_assets() {
            log::warn!("{warning}");
            self.overlay.warning = Some(warning);
            return;
        }

        self.request(LoadTarget::TestModel);
        self.scheduled
            .push((now + self.config.parthenon_delay, LoadTarget::Parthenon));

        let registrars = self.registrars.clone();
        for register in registrars {
            register(self);
        }

        for path in self.config.memory_manifests.clone() {
            match load_manifest(&path) {
                Ok(configs) => {
                    for config in configs {
                        self.add_memory_object(config);
                    }
                }
                Err(err) => log::error!("{err}"),
            }
        }
    }

    /// Advances the load sequence and the camera by one frame
    pub fn update(&mut self, now: Instant) {
        self.issue_due_requests(now);

        let events = self
            .loader
            .as_mut()
            .map(ModelLoader::poll)
            .unwrap_or_default();
        for event in events {
            self.handle_load_event(event, now);
        }

        self.advance(now);
        self.scene.camera_manager.update();
    }

    /// Sends scheduled requests whose time has come
    pub fn issue_due_requests(&mut self, now: Instant) {
        let (due, later): (Vec<_>, Vec<_>) = self
            .scheduled
            .drain(..)
            .partition(|(at, _)| *at <= now);
        self.scheduled = later;

        for (_, target) in due {
            self.request(target);
        }
    }

    /// Flips `scene_ready` once the ready deadline has passed
    pub fn advance(&mut self, now: Instant) {
        if let Some(ready_at) = self.ready_at {
            if !self.overlay.scene_ready && now >= ready_at {
                self.overlay.scene_ready = true;
                log::info!("Scene ready");
            }
        }
    }

    pub fn handle_load_event(&mut self, event: LoadEvent, now: Instant) {
        let Some(target) = self.requests.get(&event.request).cloned() else {
            log::debug!("Ignoring event for unknown request {}", event.request);
            return;
        };

        match event.kind {
            LoadEventKind::Progress { loaded, total } => {
                if target == LoadTarget::Parthenon {
                    self.parthenon_progress(loaded, total);
                }
            }
            LoadEventKind::Loaded(model) => {
                self.requests.remove(&event.request);
                self.model_loaded(target, model, now);
            }
            LoadEventKind::Failed(err) => {
                self.requests.remove(&event.request);
                self.model_failed(target, err, now);
            }
        }
    }

    fn request(&mut self, target: LoadTarget) {
        let Some(loader) = self.loader.as_mut() else {
            return;
        };

        let model_path = match &target {
            LoadTarget::TestModel => &self.config.test_model_path,
            LoadTarget::Parthenon => &self.config.parthenon_model_path,
            LoadTarget::Memory(config) => &config.model_path,
        };
        let id = loader.load(self.config.resolve_asset(model_path));
        self.requests.insert(id, target);
    }

    fn parthenon_progress(&mut self, loaded: u64, total: Option<u64>) {
        match total.filter(|&total| total > 0) {
            Some(total) => {
                let percent = (loaded as f64 / total as f64 * 100.0).round() as u64;
                self.overlay.message = format!("Loading Parthenon {percent}%");
                if percent % 20 == 0 && self.last_logged_percent != Some(percent) {
                    self.last_logged_percent = Some(percent);
                    log::info!("Parthenon load {percent}%");
                }
            }
            None => self.overlay.message = "Loading Parthenon...".to_string(),
        }
    }

    fn model_loaded(&mut self, target: LoadTarget, model: ModelData, now: Instant) {
        match target {
            LoadTarget::TestModel => {
                let object = self
                    .scene
                    .object_from_model(model, TEST_MODEL_NAME)
                    .with_translation([-12.0, 3.0, -10.0])
                    .with_uniform_scale(3.0)
                    .with_shadows(false, false);
                self.scene.add_object(object);
                self.status.mark_model_loaded();
                log::info!("Simple test model loaded");
            }
            LoadTarget::Parthenon => {
                let object = self
                    .scene
                    .object_from_model(model, PARTHENON_NAME)
                    .with_shadows(true, true);
                let id = self.scene.add_object(object);
                self.parthenon = Some(id);
                self.status.mark_model_loaded();
                self.frame_parthenon(id);

                self.overlay.message = "Parthenon ready".to_string();
                self.ready_at = Some(now + self.config.ready_delay);
            }
            LoadTarget::Memory(config) => {
                let object = self
                    .scene
                    .object_from_model(model, &config.name)
                    .with_translation(config.position)
                    .with_rotation(config.rotation)
                    .with_scale(config.scale.to_vector().into())
                    .with_shadows(true, true);
                self.scene.add_object(object);
                self.status.mark_model_loaded();
                log::info!("Memory object ready: {}", config.name);
            }
        }
    }

    fn model_failed(&mut self, target: LoadTarget, err: LoadError, now: Instant) {
        match target {
            LoadTarget::TestModel => {
                log::error!("Failed to load test cube: {err}");
                self.status.scene_message = "Test cube failed to load.".to_string();
            }
            LoadTarget::Parthenon => {
                log::error!("Failed to load Parthenon: {err}");
                self.overlay.message = "Failed to load Parthenon. Check console.".to_string();
                self.status.scene_message = "Parthenon not loaded".to_string();
                self.ready_at = Some(now + self.config.ready_delay);
            }
            LoadTarget::Memory(config) => {
                log::error!("Failed to load memory object {}: {err}", config.name);
                self.status.scene_message = format!("Error loading {}. Check console.", config.name);
            }
        }
    }

    fn frame_parthenon(&mut self, id: ObjectId) {
        let Some(bounds) = self.scene.object_world_bounds(id) else {
            return;
        };
        if self.scene.camera_manager.frame(&bounds) {
            let size = bounds.size();
            log::info!(
                "Camera adjusted for Parthenon bounds ({:.1}x{:.1}x{:.1})",
                size.x,
                size.y,
                size.z
            );
        } else {
            log::warn!("Parthenon has no extent, camera left in place");
        }
    }

    /// Counts a presented frame
    pub fn record_frame(&mut self, now: Instant, triangles: usize) {
        self.frames_rendered += 1;
        if self.frames_rendered == 1 {
            log::info!("First frame rendered");
            log::info!("Triangles: {triangles}");
        }

        if let Some(fps) = self.frame_rate.tick(now) {
            self.status.fps = fps;
            self.status.scene_children = self.scene.children_count();
        }
    }

    /// Adds a randomly coloured helper cube
    pub fn add_test_cube(&mut self, position: Vector3<f32>) -> ObjectId {
        let color = rgb(rand::rng().random::<u32>() & 0xff_ffff);
        setup::add_helper_cube(&mut self.scene, position, color)
    }

    /// Drops the test cube model somewhere random near the temple
    pub fn add_debug_model(&mut self) {
        if self.overlay.warning.is_some() {
            return;
        }

        let mut rng = rand::rng();
        let config = MemoryObjectConfig::new(DEBUG_MODEL_NAME, self.config.test_model_path.clone())
            .with_position([rng.random_range(-15.0..15.0), 4.0, rng.random_range(-15.0..15.0)])
            .with_rotation([0.0, rng.random_range(0.0..TAU), 0.0])
            .with_scale(Scale::Uniform(5.0));
        self.add_memory_object(config);
    }

    /// Re-frames the camera on the Parthenon, or on everything when it is missing
    pub fn frame_focus(&mut self) -> bool {
        let bounds = match self.parthenon.and_then(|id| self.scene.object_world_bounds(id)) {
            Some(bounds) => bounds,
            None => self.scene.bounds(),
        };
        self.scene.camera_manager.frame(&bounds)
    }

    /// Closes the loader channel; in-flight results are discarded
    pub fn shutdown(&mut self) {
        self.loader = None;
        self.requests.clear();
        self.scheduled.clear();
        log::debug!("Model loader closed");
    }
}

impl MemoryRegistry for Viewer {
    fn add_memory_object(&mut self, config: MemoryObjectConfig) {
        log::info!("Loading memory object: {} ({})", config.name, config.model_path);
        self.request(LoadTarget::Memory(config));
    }
}
