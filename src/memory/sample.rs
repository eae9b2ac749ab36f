//! The workshop's example memory object. Copy this file to add your own and
//! list the new function in [`registrars`](super::registrars).

use std::f32::consts::FRAC_PI_4;

use super::{MemoryObjectConfig, MemoryRegistry, Scale};

pub fn sample_memory(registry: &mut dyn MemoryRegistry) {
    registry.add_memory_object(
        MemoryObjectConfig::new("Sample Cube Memory", "/models/test-cube.glb")
            .with_position([10.0, 3.0, -6.0])
            .with_rotation([0.0, FRAC_PI_4, 0.0])
            .with_scale(Scale::Uniform(4.0)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_memory_placement() {
        let mut collected: Vec<MemoryObjectConfig> = Vec::new();
        sample_memory(&mut collected);

        let config = &collected[0];
        assert_eq!(config.model_path, "/models/test-cube.glb");
        assert_eq!(config.position, [10.0, 3.0, -6.0]);
        assert_eq!(config.rotation, [0.0, FRAC_PI_4, 0.0]);
        assert_eq!(config.scale, Scale::Uniform(4.0));
    }
}
