//! # maestro - zone-driven generative music engine
//!
//! Composes four subsystems into one facade:
//! - **maestro-core** - melody loading, the abstract audio-node surface
//! - **maestro-presets** - compile-time-registered voice recipes
//! - **maestro-arrange** - key/function analysis, progression synthesis, auto-mixing
//! - **maestro-engine** - the worker-thread audio scheduler and zone orchestrator
//!
//! ## Quick start
//!
//! ```ignore
//! use maestro::prelude::*;
//!
//! let engine = MaestroEngine::builder()
//!     .melody_dir("melodies")
//!     .genre("pop")
//!     .build()?;
//!
//! engine.enter_zone("forest");
//! # Ok::<(), maestro::Error>(())
//! ```

pub mod builder;
pub mod engine;
pub mod error;

pub use builder::MaestroEngineBuilder;
pub use engine::MaestroEngine;
pub use error::{Error, Result};

pub use maestro_core as core;
pub use maestro_presets as presets;
pub use maestro_arrange as arrange;
pub use maestro_engine as runtime;

pub mod prelude {
    pub use crate::{MaestroEngine, MaestroEngineBuilder};
    pub use crate::core::{AudioNode, Compositor, NoteEvent};
    pub use crate::presets::{PresetParams, PresetRegistry};
    pub use crate::runtime::{ActivePresetInfo, ScheduledEvent};
}
