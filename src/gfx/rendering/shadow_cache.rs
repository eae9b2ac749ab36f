//! Shadow map caching
//!
//! The shadow map is only regenerated when:
//! - the directional light changes
//! - the scene revision changes (objects added, moved or re-flagged)
//!
//! The workshop scene is static between loads, so most frames reuse the map.
//! A map only counts as current once its pass has actually been submitted;
//! a frame dropped on surface loss leaves the update pending.

use crate::gfx::scene::light::DirectionalLight;

/// State a shadow map is rendered from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowState {
    pub revision: u64,
    pub light: Option<DirectionalLight>,
}

impl ShadowState {
    pub fn new(revision: u64, light: Option<&DirectionalLight>) -> Self {
        Self {
            revision,
            light: light.copied(),
        }
    }
}

/// Tracks the state the current shadow map was rendered from
#[derive(Debug, Default)]
pub struct ShadowCache {
    rendered: Option<ShadowState>,
}

impl ShadowCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the map is missing or was rendered from a different state
    pub fn needs_update(&self, state: &ShadowState) -> bool {
        self.rendered.as_ref() != Some(state)
    }

    /// Records that the map for `state` has been submitted
    pub fn mark_rendered(&mut self, state: ShadowState) {
        self.rendered = Some(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light() -> DirectionalLight {
        DirectionalLight::new([1.0; 3], 0.85, [25.0, 35.0, 10.0])
    }

    #[test]
    fn test_first_frame_renders_then_caches() {
        let mut cache = ShadowCache::new();
        let state = ShadowState::new(1, Some(&light()));

        assert!(cache.needs_update(&state));
        cache.mark_rendered(state);
        assert!(!cache.needs_update(&state));
    }

    #[test]
    fn test_dropped_frame_keeps_update_pending() {
        let mut cache = ShadowCache::new();
        let state = ShadowState::new(1, Some(&light()));

        // The pass was planned but the surface was lost before it ran
        assert!(cache.needs_update(&state));
        assert!(cache.needs_update(&state));

        cache.mark_rendered(state);
        assert!(!cache.needs_update(&state));

        // Same again after a revision bump
        let next = ShadowState::new(2, Some(&light()));
        assert!(cache.needs_update(&next));
        assert!(cache.needs_update(&next));
    }

    #[test]
    fn test_revision_and_light_changes_invalidate() {
        let mut cache = ShadowCache::new();
        let light = light();
        cache.mark_rendered(ShadowState::new(1, Some(&light)));

        assert!(cache.needs_update(&ShadowState::new(2, Some(&light))));
        cache.mark_rendered(ShadowState::new(2, Some(&light)));

        let moved = DirectionalLight {
            position: [0.0, 40.0, 0.0],
            ..light
        };
        assert!(cache.needs_update(&ShadowState::new(2, Some(&moved))));
        cache.mark_rendered(ShadowState::new(2, Some(&moved)));
        assert!(cache.needs_update(&ShadowState::new(2, None)));
    }
}
