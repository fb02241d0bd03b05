use maestro_core::{node, AudioNode};

use crate::error::Result;
use crate::params::PresetParams;
use crate::recipe::PresetRecipe;

/// Bandpassed noise burst, short envelope. Defaults to dry and mono: a snare
/// hit doesn't want reverb smearing its transient or being spread in stereo.
pub struct Snare;

const FADE_IN: f64 = 0.01;
const FADE_OUT: f64 = 0.2;

impl PresetRecipe for Snare {
    fn schema(&self) -> &'static [&'static str] {
        &["center_freq", "fade_in", "fade_out"]
    }

    fn supports_melody(&self) -> bool {
        false
    }

    fn build(&self, params: &PresetParams) -> Result<Box<dyn AudioNode>> {
        let duration = FADE_IN + FADE_OUT;
        Ok(node::noise(duration, params.intensity))
    }
}
