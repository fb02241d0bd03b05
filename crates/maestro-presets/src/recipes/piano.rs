use maestro_core::{node, AudioNode};

use crate::error::Result;
use crate::params::PresetParams;
use crate::recipe::PresetRecipe;

/// A plucked, single-oscillator voice. In practice every `piano` call goes
/// through the generic melody path (it's always given `notes`+`durations`);
/// `build` only runs for the single-shot fallback case.
pub struct Piano;

impl PresetRecipe for Piano {
    fn schema(&self) -> &'static [&'static str] {
        &[
            "notes",
            "durations",
            "intensity",
            "fade_in",
            "fade_out",
            "fader_mul_factor",
        ]
    }

    fn build(&self, params: &PresetParams) -> Result<Box<dyn AudioNode>> {
        Ok(node::sine(params.duration, params.intensity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::play;

    #[test]
    fn single_shot_fallback_builds_a_sine() {
        let piano = Piano;
        let params = PresetParams::default();
        let handle = play(&piano, &params).unwrap();
        assert!(!handle.is_done());
    }
}
