mod bass;
mod drone;
mod harmonic_swarm;
mod piano;
mod snare;

pub use bass::Bass;
pub use drone::Drone;
pub use harmonic_swarm::{apply_defaults as harmonic_swarm_defaults, HarmonicSwarm};
pub use piano::Piano;
pub use snare::Snare;

use std::sync::Arc;

use crate::recipe::PresetRecipe;

pub fn builtin_recipes() -> Vec<(&'static str, Arc<dyn PresetRecipe>)> {
    vec![
        ("piano", Arc::new(Piano)),
        ("snare", Arc::new(Snare)),
        ("bass", Arc::new(Bass)),
        ("drone", Arc::new(Drone)),
        ("harmonic_swarm", Arc::new(HarmonicSwarm)),
    ]
}
