use maestro_core::node;
use maestro_core::AudioNode;

use crate::error::Result;
use crate::handle::{EffectedNode, PresetHandle};
use crate::params::PresetParams;

/// A registered voice: knows its own declared parameter names and how to
/// build a single-shot node. Melody playback (notes+durations present) is
/// handled generically by [`play`] and does not go through `build`.
pub trait PresetRecipe: Send + Sync {
    /// Declared parameter names, for introspection (mirrors the old
    /// signature-derived parameter set).
    fn schema(&self) -> &'static [&'static str];

    /// Whether this recipe can be driven by a melody (`notes`+`durations`).
    /// Single-shot voices like `snare` or `drone` return `false`.
    fn supports_melody(&self) -> bool {
        true
    }

    /// Most recipes build a raw node and let [`play`] run it through the
    /// common FX chain. A handful (e.g. `drone`) wire their own modulation
    /// directly and skip the shared chain entirely.
    fn bypasses_fx_chain(&self) -> bool {
        false
    }

    fn build(&self, params: &PresetParams) -> Result<Box<dyn AudioNode>>;
}

fn fx_chain(node: Box<dyn AudioNode>, params: &PresetParams) -> EffectedNode {
    let mut effected = EffectedNode::new(node);
    if params.enable_filter {
        effected = effected.apply("filter");
    }
    if params.stereo_w > 0.0 {
        effected = effected.apply("chorus");
    }
    if params.enable_reverb {
        effected = effected.apply("reverb");
    }
    effected.apply("pan")
}

/// Mirrors `BasePreset.play()`: if the caller supplied a melody and this
/// recipe supports one, build a per-note sequence directly (each note gets
/// its own node, unaffected by the single-shot FX chain); otherwise build
/// one node via the recipe and run it through the common FX chain.
pub fn play(recipe: &dyn PresetRecipe, params: &PresetParams) -> Result<PresetHandle> {
    if recipe.supports_melody() {
        if let (Some(notes), Some(durations)) = (&params.notes, &params.durations) {
            let intensities = params.per_note_intensities(notes.len());
            let mut sequence = Vec::with_capacity(notes.len());
            for ((_freq, duration), intensity) in
                notes.iter().zip(durations.iter()).zip(intensities.iter())
            {
                sequence.push(node::sine(*duration, *intensity));
            }
            return Ok(PresetHandle::Sequence(sequence));
        }
    }

    let built = recipe.build(params)?;
    if recipe.bypasses_fx_chain() {
        return Ok(PresetHandle::Single(built));
    }
    Ok(PresetHandle::Single(Box::new(fx_chain(built, params))))
}
