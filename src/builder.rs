//! Builder for configuring and constructing a [`MaestroEngine`](crate::MaestroEngine).

use std::path::PathBuf;

use maestro_core::Compositor;
use maestro_engine::EngineConfig;

use crate::{MaestroEngine, Result};

/// Melody directory and worker-thread tuning are configured here; the
/// starting zone is entered separately via `MaestroEngine::enter_zone`
/// once the engine is built.
pub struct MaestroEngineBuilder {
    melody_dir: PathBuf,
    default_intensity: f64,
    genre: String,
    channel_capacity: usize,
    cleanup_interval_secs: f64,
}

impl Default for MaestroEngineBuilder {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            melody_dir: config.melody_dir,
            default_intensity: config.default_intensity,
            genre: "pop".to_string(),
            channel_capacity: config.channel_capacity,
            cleanup_interval_secs: config.cleanup_interval_secs,
        }
    }
}

impl MaestroEngineBuilder {
    pub fn melody_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.melody_dir = dir.into();
        self
    }

    /// Default: 0.8
    pub fn default_intensity(mut self, intensity: f64) -> Self {
        self.default_intensity = intensity;
        self
    }

    /// One of the genre templates `ProgressionSynth` recognizes
    /// (`"pop"`, `"jazz"`, `"blues"`, `"rock"`, `"funk"`, `"classical"`),
    /// or anything else to fall back to the random functional walk.
    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = genre.into();
        self
    }

    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn cleanup_interval_secs(mut self, secs: f64) -> Self {
        self.cleanup_interval_secs = secs;
        self
    }

    pub fn build(self) -> Result<MaestroEngine> {
        let compositor = Compositor::load_repo(&self.melody_dir, self.default_intensity)?;
        let config = EngineConfig {
            melody_dir: self.melody_dir,
            default_intensity: self.default_intensity,
            channel_capacity: self.channel_capacity,
            cleanup_interval_secs: self.cleanup_interval_secs,
            ..EngineConfig::default()
        };
        Ok(MaestroEngine::new(config, compositor, self.genre))
    }
}
