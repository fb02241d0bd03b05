use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use maestro_arrange::ArrangementEngine;
use maestro_core::Compositor;
use maestro_presets::{PresetParams, PresetRegistry};
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{info, warn};

use crate::client::EngineClient;
use crate::commands::ScheduledEvent;

const ZONE_BLOCK_BEATS: f64 = 8.0;
const TEMPO_MIN: f64 = 60.0;
const TEMPO_MAX: f64 = 240.0;
const ENERGY_PERIOD_BEATS: f64 = 32.0;

struct ZoneHandle {
    cancel: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// Shared tempo/energy state, deliberately a single instance across every
/// zone: every active zone reads and nudges the same tempo and energy
/// random walk, the way the original engine's single `Maestro` object did.
struct SharedState {
    tempo: Mutex<f64>,
    energy: Mutex<f64>,
    last_tick: Mutex<Instant>,
    phase: Mutex<f64>,
}

/// Zone-driven orchestration on top of the compositor, arranger, and engine
/// client: each zone runs its own block loop, picking a melody, advancing
/// tempo/energy, and dispatching a block of scheduled voices every
/// `ZONE_BLOCK_BEATS` beats.
pub struct Maestro {
    client: Arc<EngineClient>,
    registry: Arc<PresetRegistry>,
    compositor: Arc<Mutex<Compositor>>,
    arranger: Arc<Mutex<ArrangementEngine>>,
    state: Arc<SharedState>,
    mute: Arc<AtomicBool>,
    zones: Mutex<HashMap<String, ZoneHandle>>,
    sfx_events: Arc<Mutex<Vec<ScheduledEvent>>>,
}

impl Maestro {
    pub fn new(client: Arc<EngineClient>, compositor: Compositor, genre: impl Into<String>) -> Self {
        let registry = client.registry();
        Self {
            client,
            registry,
            compositor: Arc::new(Mutex::new(compositor)),
            arranger: Arc::new(Mutex::new(ArrangementEngine::new(genre))),
            state: Arc::new(SharedState {
                tempo: Mutex::new(120.0),
                energy: Mutex::new(0.7),
                last_tick: Mutex::new(Instant::now()),
                phase: Mutex::new(0.02),
            }),
            mute: Arc::new(AtomicBool::new(false)),
            zones: Mutex::new(HashMap::new()),
            sfx_events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn set_mute(&self, muted: bool) {
        self.mute.store(muted, Ordering::SeqCst);
        self.client.set_mute(muted);
        if muted {
            if let Err(err) = self.client.stop_all(1.0) {
                warn!(error = %err, "failed to stop active voices on mute");
            }
        }
    }

    pub fn is_muted(&self) -> bool {
        self.mute.load(Ordering::SeqCst)
    }

    pub fn queue_sfx(&self, event: ScheduledEvent) {
        self.sfx_events.lock().push(event);
    }

    pub fn enter_zone(&self, name: impl Into<String>) {
        self.set_zone(name);
    }

    pub fn set_zone(&self, name: impl Into<String>) {
        let name = name.into();
        let mut zones = self.zones.lock();
        if let Some(existing) = zones.remove(&name) {
            existing.cancel.store(true, Ordering::SeqCst);
            let _ = existing.thread.join();
        }
        let cancel = Arc::new(AtomicBool::new(false));
        let thread = spawn_zone_loop(
            name.clone(),
            Arc::clone(&cancel),
            Arc::clone(&self.client),
            Arc::clone(&self.registry),
            Arc::clone(&self.compositor),
            Arc::clone(&self.arranger),
            Arc::clone(&self.state),
            Arc::clone(&self.mute),
            Arc::clone(&self.sfx_events),
        );
        zones.insert(name, ZoneHandle { cancel, thread });
    }

    pub fn leave_zone(&self, name: &str) {
        if let Some(zone) = self.zones.lock().remove(name) {
            zone.cancel.store(true, Ordering::SeqCst);
            let _ = zone.thread.join();
        }
    }

    pub fn active_zones(&self) -> Vec<String> {
        self.zones.lock().keys().cloned().collect()
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_zone_loop(
    zone_name: String,
    cancel: Arc<AtomicBool>,
    client: Arc<EngineClient>,
    registry: Arc<PresetRegistry>,
    compositor: Arc<Mutex<Compositor>>,
    arranger: Arc<Mutex<ArrangementEngine>>,
    state: Arc<SharedState>,
    mute: Arc<AtomicBool>,
    sfx_events: Arc<Mutex<Vec<ScheduledEvent>>>,
) -> JoinHandle<()> {
    thread::Builder::new()
        .name(format!("maestro-zone-{zone_name}"))
        .spawn(move || {
            info!(zone = %zone_name, "zone block loop starting");

            let mut started = false;
            while !cancel.load(Ordering::SeqCst) {
                if !started {
                    let mut compositor = compositor.lock();
                    let names: Vec<String> = compositor.melody_names().map(|s| s.to_string()).collect();
                    if let Some(name) = names.choose(&mut rand::thread_rng()) {
                        let _ = compositor.start(name);
                    }
                    started = true;
                }

                update_tempo(&state);
                update_energy(&state);

                let tempo = *state.tempo.lock();

                let raw = compositor.lock().next_block_events(ZONE_BLOCK_BEATS);
                let mut events: Vec<ScheduledEvent> = raw
                    .into_iter()
                    .map(|ev| ScheduledEvent {
                        time_offset: ev.time * (60.0 / tempo),
                        preset: "piano".to_string(),
                        params: PresetParams {
                            notes: Some(ev.notes),
                            durations: Some(ev.durations),
                            intensities: Some(ev.intensity),
                            ..Default::default()
                        },
                        gain_db: 0.0,
                        enable_reverb: false,
                        enable_chorus: false,
                    })
                    .collect();

                if let Some(parts_fx) = arranger
                    .lock()
                    .prepare_block(&mut compositor.lock(), mute.load(Ordering::SeqCst), ZONE_BLOCK_BEATS)
                {
                    let preset_names = registry.list_types();
                    // Each part independently rolls a random preset name;
                    // collisions overwrite, matching the original's
                    // dict-comprehension remap.
                    let mut remapped: HashMap<String, maestro_arrange::PartConfig> = HashMap::new();
                    for cfg in parts_fx.into_values() {
                        if let Some(preset) = preset_names.choose(&mut rand::thread_rng()) {
                            remapped.insert(preset.clone(), cfg);
                        }
                    }
                    for (preset, cfg) in remapped {
                        events.push(ScheduledEvent {
                            time_offset: 0.0,
                            preset,
                            params: PresetParams {
                                notes: Some(cfg.notes),
                                durations: Some(cfg.durations),
                                intensities: Some(cfg.intensity),
                                ..Default::default()
                            },
                            gain_db: cfg.gain_db,
                            enable_reverb: cfg.enable_reverb,
                            enable_chorus: cfg.enable_chorus,
                        });
                    }
                }

                let mut sfx = sfx_events.lock();
                events.append(&mut sfx);
                drop(sfx);

                events.sort_by(|a, b| a.time_offset.total_cmp(&b.time_offset));

                if let Err(err) = client.play_block(zone_name.clone(), events) {
                    warn!(zone = %zone_name, error = %err, "failed to dispatch block");
                }

                let sleep_secs = ZONE_BLOCK_BEATS * (60.0 / tempo);
                let deadline = Instant::now() + Duration::from_secs_f64(sleep_secs);
                while Instant::now() < deadline {
                    if cancel.load(Ordering::SeqCst) {
                        break;
                    }
                    thread::sleep(Duration::from_millis(20).min(deadline - Instant::now()));
                }
            }

            info!(zone = %zone_name, "zone block loop stopped");
        })
        .expect("failed to spawn zone block loop thread")
}

fn update_tempo(state: &SharedState) {
    let mut tempo = state.tempo.lock();
    let mut rng = rand::thread_rng();
    let step = *tempo * rng.gen_range(-0.07..0.07);
    let bound = step.abs();
    let delta = if bound > 0.0 { rng.gen_range(-bound..bound) } else { 0.0 };
    *tempo = (*tempo + delta).clamp(TEMPO_MIN, TEMPO_MAX);
}

fn update_energy(state: &SharedState) {
    let tempo = *state.tempo.lock();
    let beat_time = 60.0 / tempo;
    let mut last_tick = state.last_tick.lock();
    let now = Instant::now();
    let dt = now.duration_since(*last_tick).as_secs_f64();
    *last_tick = now;

    let mut phase = state.phase.lock();
    *phase = (*phase + dt / (ENERGY_PERIOD_BEATS * beat_time)) % 1.0;
    let mut energy = state.energy.lock();
    *energy = 0.7 + 0.3 * (2.0 * std::f64::consts::PI * *phase).sin();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use std::fs;
    use std::io::Write;

    fn compositor_fixture() -> Compositor {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("mel.json")).unwrap();
        file.write_all(
            br#"{"notes": [
                {"frequency": 440.0, "duration_beats": 0.25},
                {"frequency": 550.0, "duration_beats": 0.25}
            ]}"#,
        )
        .unwrap();
        Compositor::load_repo(dir.path(), 0.8).unwrap()
    }

    #[test]
    fn enter_and_leave_zone_joins_cleanly() {
        let client = Arc::new(EngineClient::start(&EngineConfig::default()));
        let maestro = Maestro::new(client, compositor_fixture(), "pop");

        maestro.enter_zone("forest");
        assert_eq!(maestro.active_zones(), vec!["forest".to_string()]);
        maestro.leave_zone("forest");
        assert!(maestro.active_zones().is_empty());
    }

    #[test]
    fn tempo_random_walk_stays_within_bounds() {
        let state = SharedState {
            tempo: Mutex::new(120.0),
            energy: Mutex::new(0.7),
            last_tick: Mutex::new(Instant::now()),
            phase: Mutex::new(0.02),
        };
        for _ in 0..200 {
            update_tempo(&state);
            let tempo = *state.tempo.lock();
            assert!((TEMPO_MIN..=TEMPO_MAX).contains(&tempo));
        }
    }

    #[test]
    fn energy_stays_within_its_declared_range() {
        let state = SharedState {
            tempo: Mutex::new(120.0),
            energy: Mutex::new(0.7),
            last_tick: Mutex::new(Instant::now() - Duration::from_millis(50)),
            phase: Mutex::new(0.02),
        };
        update_energy(&state);
        let energy = *state.energy.lock();
        assert!((0.4..=1.0).contains(&energy));
    }
}
