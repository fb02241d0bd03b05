use std::fs;
use std::io::Write;
use std::time::Duration;

use maestro::prelude::*;

fn melody_dir_with(name: &str, contents: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let mut file = fs::File::create(dir.path().join(name)).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    dir
}

#[test]
fn builder_loads_melodies_and_starts_a_zone() {
    let dir = melody_dir_with(
        "a.json",
        r#"{"tempo": 120, "notes": [
            {"frequency": 440.0, "duration_beats": 0.25},
            {"frequency": 550.0, "duration_beats": 0.25}
        ]}"#,
    );

    let engine = MaestroEngine::builder()
        .melody_dir(dir.path())
        .genre("pop")
        .build()
        .unwrap();

    engine.enter_zone("plaza");
    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(engine.active_zones(), vec!["plaza".to_string()]);

    engine.leave_zone("plaza");
    assert!(engine.active_zones().is_empty());
}

#[test]
fn mute_and_one_shot_preset_dispatch() {
    let dir = melody_dir_with(
        "a.json",
        r#"{"notes": [{"frequency": 440.0, "duration_beats": 0.25}]}"#,
    );
    let engine = MaestroEngine::builder().melody_dir(dir.path()).build().unwrap();

    engine.play_preset("snare", PresetParams::default()).unwrap();
    std::thread::sleep(Duration::from_millis(50));
    let active = engine.get_active_presets().unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].name, "snare");

    engine.set_mute(true);
    assert!(engine.is_muted());
}

#[test]
fn builder_rejects_an_empty_melody_directory() {
    let dir = tempfile::tempdir().unwrap();
    let result = MaestroEngine::builder().melody_dir(dir.path()).build();
    assert!(result.is_err());
}
