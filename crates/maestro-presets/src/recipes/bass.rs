use maestro_core::{node, AudioNode};

use crate::error::Result;
use crate::params::PresetParams;
use crate::recipe::PresetRecipe;

/// Low single-oscillator voice the orchestrator routes its `bass` part to.
pub struct Bass;

const DEFAULT_FREQ: f64 = 55.0;

impl PresetRecipe for Bass {
    fn schema(&self) -> &'static [&'static str] {
        &["freq1", "duration", "intensity"]
    }

    fn supports_melody(&self) -> bool {
        false
    }

    fn build(&self, params: &PresetParams) -> Result<Box<dyn AudioNode>> {
        let _freq = if params.freq1 > 0.0 {
            params.freq1
        } else {
            DEFAULT_FREQ
        };
        Ok(node::sine(params.duration.max(0.1), params.intensity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::play;

    #[test]
    fn single_shot_builds() {
        let bass = Bass;
        let handle = play(&bass, &PresetParams::default()).unwrap();
        assert!(!handle.is_done());
    }
}
