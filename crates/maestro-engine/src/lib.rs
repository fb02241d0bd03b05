//! The audio engine worker thread, its command protocol, and the
//! zone-driven `Maestro` orchestrator built on top of it.

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod maestro;
pub mod server;

pub use client::EngineClient;
pub use commands::{Ack, ActivePresetInfo, EngineCommand, ScheduledEvent};
pub use config::EngineConfig;
pub use error::{Error, Result};
pub use maestro::Maestro;
pub use server::AudioEngine;
