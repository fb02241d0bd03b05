//! Top-level engine that coordinates the compositor, arranger, audio
//! scheduler, and zone orchestrator behind one façade.

use std::sync::Arc;

use maestro_core::Compositor;
use maestro_engine::{ActivePresetInfo, EngineClient, EngineConfig, Maestro, ScheduledEvent};
use maestro_presets::{PresetParams, PresetRegistry};

use crate::Result;

const DEFAULT_FADE_SECS: f64 = 1.0;

/// Owns the engine's worker thread and the `Maestro` zone orchestrator
/// built on top of it. Dropping this drops the `Arc<EngineClient>`; the
/// worker thread itself is joined once the last reference goes away.
pub struct MaestroEngine {
    client: Arc<EngineClient>,
    maestro: Maestro,
}

impl MaestroEngine {
    pub fn builder() -> crate::MaestroEngineBuilder {
        crate::MaestroEngineBuilder::default()
    }

    pub(crate) fn new(config: EngineConfig, compositor: Compositor, genre: impl Into<String>) -> Self {
        let client = Arc::new(EngineClient::start(&config));
        let maestro = Maestro::new(Arc::clone(&client), compositor, genre);
        Self { client, maestro }
    }

    /// One-shot preset trigger outside the zone block loop, e.g. a UI sound.
    pub fn play_preset(&self, name: impl Into<String>, params: PresetParams) -> Result<()> {
        Ok(self.client.play_preset(name, params)?)
    }

    pub fn set_mute(&self, muted: bool) {
        self.maestro.set_mute(muted);
    }

    pub fn is_muted(&self) -> bool {
        self.maestro.is_muted()
    }

    /// Queues a one-off sound effect to be folded into the next dispatched
    /// block of whichever zone is currently active, rather than firing
    /// immediately.
    pub fn queue_sfx(&self, event: ScheduledEvent) {
        self.maestro.queue_sfx(event);
    }

    pub fn enter_zone(&self, name: impl Into<String>) {
        self.maestro.enter_zone(name);
    }

    pub fn leave_zone(&self, name: &str) {
        self.maestro.leave_zone(name);
    }

    pub fn active_zones(&self) -> Vec<String> {
        self.maestro.active_zones()
    }

    pub fn get_active_presets(&self) -> Result<Vec<ActivePresetInfo>> {
        Ok(self.client.get_active_presets()?)
    }

    /// Fades out every active voice whose preset matches `name`.
    pub fn stop_preset(&self, name: impl Into<String>, fade: f64) -> Result<()> {
        Ok(self.client.stop_preset(name, fade)?)
    }

    /// Fades out every active voice, the way muting is expected to actually
    /// silence whatever was already playing rather than just blocking new
    /// playback.
    pub fn stop_all(&self) -> Result<()> {
        Ok(self.client.stop_all(DEFAULT_FADE_SECS)?)
    }

    pub fn get_current_melody(&self) -> Result<Option<String>> {
        Ok(self.client.get_current_melody()?)
    }

    /// The shared preset registry the worker thread dispatches against;
    /// register additional recipes here before entering a zone that fires
    /// them.
    pub fn registry(&self) -> Arc<PresetRegistry> {
        self.client.registry()
    }
}
