//! # 03 - Registering a custom preset
//!
//! Demonstrates extending the built-in preset table with a new
//! `PresetRecipe` implementation before entering a zone.
//!
//! ```bash
//! cargo run --example 03_custom_preset
//! ```

use std::sync::Arc;
use std::time::Duration;

use maestro::prelude::*;
use maestro::core::node;
use maestro::core::AudioNode;
use maestro::presets::{PresetRecipe, Result as PresetResult};

struct Bell;

impl PresetRecipe for Bell {
    fn schema(&self) -> &'static [&'static str] {
        &["freq1", "duration", "intensity"]
    }

    fn supports_melody(&self) -> bool {
        false
    }

    fn build(&self, params: &PresetParams) -> PresetResult<Box<dyn AudioNode>> {
        Ok(node::sine(params.duration.max(0.5), params.intensity))
    }
}

fn main() -> maestro::Result<()> {
    let engine = MaestroEngine::builder().melody_dir("melodies").build()?;

    engine.registry().register("bell", Arc::new(Bell))?;
    engine.play_preset("bell", PresetParams::default())?;

    std::thread::sleep(Duration::from_millis(100));
    println!("active presets: {:?}", engine.get_active_presets()?);

    Ok(())
}
