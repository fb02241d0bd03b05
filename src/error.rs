//! Centralized error type for the `maestro` umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] maestro_core::Error),

    #[error(transparent)]
    Preset(#[from] maestro_presets::Error),

    #[error(transparent)]
    Arrange(#[from] maestro_arrange::Error),

    #[error(transparent)]
    Engine(#[from] maestro_engine::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
