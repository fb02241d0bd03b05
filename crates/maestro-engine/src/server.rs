use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError};
use maestro_presets::{PresetHandle, PresetParams, PresetRegistry};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::commands::{Ack, ActivePresetInfo, EngineCommand, ScheduledEvent};

struct ActiveVoice {
    preset: String,
    handle: PresetHandle,
    params_used: PresetParams,
}

/// The single-threaded command/schedule loop: owns the preset registry and
/// the list of currently-sounding voices, dispatches commands, and sweeps
/// finished voices on a fixed interval.
pub struct AudioEngine {
    registry: Arc<PresetRegistry>,
    active: Arc<Mutex<Vec<ActiveVoice>>>,
    current_melody: Arc<Mutex<Option<String>>>,
    mute: Arc<AtomicBool>,
    cleanup_interval: Duration,
    shutdown: Arc<AtomicBool>,
}

impl AudioEngine {
    pub fn new(registry: Arc<PresetRegistry>, cleanup_interval: Duration, mute: Arc<AtomicBool>) -> Self {
        Self {
            registry,
            active: Arc::new(Mutex::new(Vec::new())),
            current_melody: Arc::new(Mutex::new(None)),
            mute,
            cleanup_interval,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// Consumes commands from `cmd_rx` until a `Stop` command arrives or the
    /// channel disconnects, sweeping finished voices every
    /// `cleanup_interval` in between.
    pub fn run(&self, cmd_rx: Receiver<EngineCommand>) {
        info!("audio engine loop starting");
        loop {
            match cmd_rx.recv_timeout(self.cleanup_interval) {
                Ok(cmd) => {
                    if self.handle(cmd) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            self.cleanup_stopped_presets();
            if self.shutdown.load(Ordering::SeqCst) {
                break;
            }
        }
        info!("audio engine loop stopped");
    }

    /// Returns `true` if the loop should stop.
    fn handle(&self, cmd: EngineCommand) -> bool {
        match cmd {
            EngineCommand::PlayPreset { name, params, reply } => {
                self.handle_play_preset(name, params, reply);
                false
            }
            EngineCommand::PlayBlock { name, events } => {
                *self.current_melody.lock() = Some(name);
                self.process_block_events(events);
                false
            }
            EngineCommand::GetActivePresets { reply } => {
                let infos = self
                    .active
                    .lock()
                    .iter()
                    .map(|v| ActivePresetInfo {
                        name: v.preset.clone(),
                        params: v.params_used.clone(),
                        instance_repr: v.handle.describe(),
                    })
                    .collect();
                let _ = reply.send(infos);
                false
            }
            EngineCommand::GetCurrentMelody { reply } => {
                let _ = reply.send(self.current_melody.lock().clone());
                false
            }
            EngineCommand::StopPreset { name, fade } => {
                self.fade_out(Some(&name), fade);
                false
            }
            EngineCommand::StopAll { fade } => {
                self.fade_out(None, fade);
                false
            }
            EngineCommand::Stop => {
                info!("engine received stop command");
                true
            }
            EngineCommand::Unsupported(name) => {
                warn!(command = name, "unsupported command dropped");
                false
            }
        }
    }

    /// Silences every active voice whose preset matches `name` (or every
    /// voice, when `name` is `None`), the way the original re-triggered a
    /// matching preset with `intensity=0` rather than tearing down the node.
    fn fade_out(&self, name: Option<&str>, fade: f64) {
        let mut active = self.active.lock();
        let mut count = 0;
        for voice in active.iter_mut() {
            if name.map_or(true, |n| voice.preset == n) {
                voice.handle.set_gain(0.0);
                count += 1;
            }
        }
        debug!(count, fade, preset = ?name, "faded out matching voices");
    }

    fn handle_play_preset(
        &self,
        name: String,
        params: maestro_presets::PresetParams,
        reply: Option<crossbeam_channel::Sender<Ack>>,
    ) {
        match self.registry.create(&name, &params) {
            Ok(handle) => {
                self.active.lock().push(ActiveVoice {
                    preset: name.clone(),
                    handle,
                    params_used: params,
                });
                if let Some(reply) = reply {
                    let _ = reply.send(Ack::Played { preset: name });
                }
            }
            Err(err) => {
                warn!(preset = %name, error = %err, "unknown preset, ignoring");
                if let Some(reply) = reply {
                    let _ = reply.send(Ack::UnknownPreset);
                }
            }
        }
    }

    /// Schedules each event against absolute deadlines off a single start
    /// instant (rather than successive relative sleeps) so per-event
    /// dispatch jitter doesn't accumulate drift across the block.
    fn process_block_events(&self, mut events: Vec<ScheduledEvent>) {
        events.sort_by(|a, b| a.time_offset.total_cmp(&b.time_offset));
        let start = Instant::now();

        for event in events {
            if self.mute.load(Ordering::SeqCst) {
                continue;
            }
            let deadline = start + Duration::from_secs_f64(event.time_offset.max(0.0));
            let now = Instant::now();
            if deadline > now {
                thread::sleep(deadline - now);
            }

            match self.registry.create(&event.preset, &event.params) {
                Ok(mut handle) => {
                    handle.apply_gain_db(event.gain_db);
                    debug!(
                        preset = %event.preset,
                        gain_db = event.gain_db,
                        reverb = event.enable_reverb,
                        chorus = event.enable_chorus,
                        "dispatched scheduled voice"
                    );
                    self.active.lock().push(ActiveVoice {
                        preset: event.preset,
                        handle,
                        params_used: event.params,
                    });
                }
                Err(err) => {
                    warn!(preset = %event.preset, error = %err, "unknown preset in block, skipping");
                }
            }
        }
    }

    /// Removes any voice whose handle reports done. Mirrors the reaper's
    /// "remove on unrecognizable or errored state" policy: since our node
    /// abstraction can't throw mid-query, there's no separate error branch,
    /// but a voice is always dropped rather than retried if unsure.
    fn cleanup_stopped_presets(&self) {
        let mut active = self.active.lock();
        let before = active.len();
        active.retain(|voice| !voice.handle.is_done());
        let removed = before - active.len();
        if removed > 0 {
            debug!(removed, remaining = active.len(), "reaper swept finished voices");
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use maestro_presets::PresetParams;
    use std::sync::atomic::AtomicBool;
    use std::thread;

    fn registry() -> Arc<PresetRegistry> {
        Arc::new(PresetRegistry::default())
    }

    #[test]
    fn play_preset_acks_and_registers_active_voice() {
        let engine = AudioEngine::new(registry(), Duration::from_millis(20), Arc::new(AtomicBool::new(false)));
        let (reply_tx, reply_rx) = unbounded();
        engine.handle_play_preset("snare".to_string(), PresetParams::default(), Some(reply_tx));
        assert_eq!(engine.active_count(), 1);
        match reply_rx.recv().unwrap() {
            Ack::Played { preset } => assert_eq!(preset, "snare"),
            other => panic!("unexpected ack: {other:?}"),
        }
    }

    #[test]
    fn unknown_preset_is_silently_ignored_but_acked_as_unknown() {
        let engine = AudioEngine::new(registry(), Duration::from_millis(20), Arc::new(AtomicBool::new(false)));
        let (reply_tx, reply_rx) = unbounded();
        engine.handle_play_preset("not_a_preset".to_string(), PresetParams::default(), Some(reply_tx));
        assert_eq!(engine.active_count(), 0);
        assert!(matches!(reply_rx.recv().unwrap(), Ack::UnknownPreset));
    }

    #[test]
    fn stop_command_ends_the_loop() {
        let engine = AudioEngine::new(registry(), Duration::from_millis(5), Arc::new(AtomicBool::new(false)));
        let (tx, rx) = unbounded();
        tx.send(EngineCommand::Stop).unwrap();
        let handle = thread::spawn(move || engine.run(rx));
        handle.join().unwrap();
    }

    #[test]
    fn fade_out_zeroes_gain_on_matching_voices_only() {
        let engine = AudioEngine::new(registry(), Duration::from_millis(20), Arc::new(AtomicBool::new(false)));
        engine.handle_play_preset("snare".to_string(), PresetParams::default(), None);
        engine.handle_play_preset("bass".to_string(), PresetParams::default(), None);

        engine.fade_out(Some("snare"), 0.5);

        let active = engine.active.lock();
        let snare = active.iter().find(|v| v.preset == "snare").unwrap();
        let bass = active.iter().find(|v| v.preset == "bass").unwrap();
        assert!(snare.handle.describe().contains("gain=0.000"));
        assert!(!bass.handle.describe().contains("gain=0.000"));
    }

    #[test]
    fn reaper_removes_finished_single_shot_voices() {
        let engine = AudioEngine::new(registry(), Duration::from_millis(5), Arc::new(AtomicBool::new(false)));
        engine.handle_play_preset("snare".to_string(), PresetParams::default(), None);
        assert_eq!(engine.active_count(), 1);
        thread::sleep(Duration::from_millis(250));
        engine.cleanup_stopped_presets();
        assert_eq!(engine.active_count(), 0);
    }
}
