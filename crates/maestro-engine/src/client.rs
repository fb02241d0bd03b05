use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use maestro_presets::{PresetParams, PresetRegistry};
use tracing::{info, warn};

use crate::commands::{Ack, ActivePresetInfo, EngineCommand, ScheduledEvent};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::server::AudioEngine;

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_FADE_SECS: f64 = 1.0;
const SHUTDOWN_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// The public façade onto the audio engine: owns its dedicated worker
/// thread and the command channel feeding it, the way the sampler's
/// butler thread owns its own channel and is never touched directly by
/// callers once started.
pub struct EngineClient {
    command_tx: Sender<EngineCommand>,
    thread_handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
    mute: Arc<AtomicBool>,
    registry: Arc<PresetRegistry>,
}

impl EngineClient {
    pub fn start(config: &EngineConfig) -> Self {
        let (command_tx, command_rx): (Sender<EngineCommand>, Receiver<EngineCommand>) =
            bounded(config.channel_capacity);

        let registry = Arc::new(PresetRegistry::default());
        let mute = Arc::new(AtomicBool::new(false));
        let engine = AudioEngine::new(
            Arc::clone(&registry),
            Duration::from_secs_f64(config.cleanup_interval_secs),
            Arc::clone(&mute),
        );
        let shutdown = engine.shutdown_flag();

        let thread_handle = thread::Builder::new()
            .name("maestro-engine".to_string())
            .spawn(move || engine.run(command_rx))
            .expect("failed to spawn maestro-engine worker thread");

        info!("engine client started worker thread");

        Self {
            command_tx,
            thread_handle: Some(thread_handle),
            shutdown,
            mute,
            registry,
        }
    }

    /// The same registry instance the worker thread dispatches against,
    /// shared rather than duplicated so callers picking a random preset
    /// name always see what the engine can actually play.
    pub fn registry(&self) -> Arc<PresetRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn set_mute(&self, muted: bool) {
        self.mute.store(muted, Ordering::SeqCst);
    }

    pub fn is_muted(&self) -> bool {
        self.mute.load(Ordering::SeqCst)
    }

    pub fn play_preset(&self, name: impl Into<String>, params: PresetParams) -> Result<()> {
        if self.is_muted() {
            return self.stop_all(DEFAULT_FADE_SECS);
        }
        self.command_tx
            .send(EngineCommand::PlayPreset {
                name: name.into(),
                params,
                reply: None,
            })
            .map_err(|_| Error::ChannelClosed)
    }

    pub fn play_block(&self, name: impl Into<String>, events: Vec<ScheduledEvent>) -> Result<()> {
        if self.is_muted() {
            return self.stop_all(DEFAULT_FADE_SECS);
        }
        self.command_tx
            .send(EngineCommand::PlayBlock {
                name: name.into(),
                events,
            })
            .map_err(|_| Error::ChannelClosed)
    }

    /// Fades out every active voice whose preset matches `name`, mirroring
    /// the original's re-send of `play_preset` with `intensity=0` plus
    /// cancelling that preset's scheduled future.
    pub fn stop_preset(&self, name: impl Into<String>, fade: f64) -> Result<()> {
        info!(fade, "stopping preset");
        self.command_tx
            .send(EngineCommand::StopPreset { name: name.into(), fade })
            .map_err(|_| Error::ChannelClosed)
    }

    /// Fades out every active voice, playing or scheduled.
    pub fn stop_all(&self, fade: f64) -> Result<()> {
        warn!(fade, "stopping all active voices");
        self.command_tx
            .send(EngineCommand::StopAll { fade })
            .map_err(|_| Error::ChannelClosed)
    }

    pub fn get_active_presets(&self) -> Result<Vec<ActivePresetInfo>> {
        let (reply_tx, reply_rx) = bounded(1);
        self.command_tx
            .send(EngineCommand::GetActivePresets { reply: reply_tx })
            .map_err(|_| Error::ChannelClosed)?;
        reply_rx.recv_timeout(RESPONSE_TIMEOUT).map_err(|_| Error::Timeout)
    }

    pub fn get_current_melody(&self) -> Result<Option<String>> {
        let (reply_tx, reply_rx) = bounded(1);
        self.command_tx
            .send(EngineCommand::GetCurrentMelody { reply: reply_tx })
            .map_err(|_| Error::ChannelClosed)?;
        reply_rx.recv_timeout(RESPONSE_TIMEOUT).map_err(|_| Error::Timeout)
    }

    pub fn play_preset_with_ack(
        &self,
        name: impl Into<String>,
        params: PresetParams,
    ) -> Result<Ack> {
        let (reply_tx, reply_rx) = bounded(1);
        self.command_tx
            .send(EngineCommand::PlayPreset {
                name: name.into(),
                params,
                reply: Some(reply_tx),
            })
            .map_err(|_| Error::ChannelClosed)?;
        reply_rx.recv_timeout(RESPONSE_TIMEOUT).map_err(|_| Error::Timeout)
    }

    pub fn shutdown(&mut self) {
        self.stop();
    }

    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        let _ = self.command_tx.send(EngineCommand::Stop);
        if let Some(handle) = self.thread_handle.take() {
            let deadline = std::time::Instant::now() + SHUTDOWN_JOIN_TIMEOUT;
            while !handle.is_finished() && std::time::Instant::now() < deadline {
                thread::sleep(Duration::from_millis(10));
            }
            let _ = handle.join();
        }
    }
}

impl Drop for EngineClient {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_preset_then_query_active_presets() {
        let client = EngineClient::start(&EngineConfig::default());
        client.play_preset("snare", PresetParams::default()).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        let active = client.get_active_presets().unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "snare");
    }

    #[test]
    fn mute_drops_playback_requests() {
        let client = EngineClient::start(&EngineConfig::default());
        client.set_mute(true);
        client.play_preset("snare", PresetParams::default()).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        let active = client.get_active_presets().unwrap();
        assert!(active.is_empty());
    }

    #[test]
    fn stop_preset_fades_out_the_matching_active_voice() {
        let client = EngineClient::start(&EngineConfig::default());
        client.play_preset("snare", PresetParams::default()).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        client.stop_preset("snare", 0.5).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        let active = client.get_active_presets().unwrap();
        assert_eq!(active[0].params.intensity, 0.8); // params_used is untouched by the fade
        assert!(active[0].instance_repr.contains("gain=0.000"));
    }

    #[test]
    fn shutdown_joins_the_worker_thread() {
        let mut client = EngineClient::start(&EngineConfig::default());
        client.shutdown();
        assert!(client.thread_handle.is_none());
    }
}
