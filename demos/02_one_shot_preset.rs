//! # 02 - One-shot preset dispatch and mute
//!
//! Plays a single preset outside any zone, then demonstrates that muting
//! both drops further playback requests and fades out whatever was already
//! sounding.
//!
//! ```bash
//! cargo run --example 02_one_shot_preset
//! ```

use std::time::Duration;

use maestro::prelude::*;

fn main() -> maestro::Result<()> {
    let engine = MaestroEngine::builder().melody_dir("melodies").build()?;

    engine.play_preset("snare", PresetParams::default())?;
    std::thread::sleep(Duration::from_millis(100));
    println!("active presets: {:?}", engine.get_active_presets()?);

    engine.set_mute(true);
    engine.play_preset("snare", PresetParams::default())?;
    std::thread::sleep(Duration::from_millis(100));
    println!("active after muted attempt: {:?}", engine.get_active_presets()?);

    Ok(())
}
