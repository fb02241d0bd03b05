//! # 01 - Zone Playback
//!
//! Loads a melody directory, enters a zone, and lets its block loop run for
//! a few seconds before leaving.
//!
//! ```bash
//! cargo run --example 01_zone_playback
//! ```

use std::time::Duration;

use maestro::prelude::*;

fn main() -> maestro::Result<()> {
    let engine = MaestroEngine::builder()
        .melody_dir("melodies")
        .genre("pop")
        .build()?;

    engine.enter_zone("forest_clearing");
    println!("entered forest_clearing, zones: {:?}", engine.active_zones());

    std::thread::sleep(Duration::from_secs(3));
    println!("current melody: {:?}", engine.get_current_melody()?);

    engine.leave_zone("forest_clearing");
    println!("left zone, remaining: {:?}", engine.active_zones());

    Ok(())
}
