//! Music-theory arranger: key/function analysis, progression synthesis,
//! register-bounded voice leading, and block auto-mixing.

pub mod arrangement_engine;
pub mod automix;
pub mod error;
pub mod harmonic;
pub mod orchestrator;
pub mod progression;
pub mod theory;

pub use arrangement_engine::ArrangementEngine;
pub use automix::{AutoMixer, PartConfig};
pub use error::{Error, Result};
pub use harmonic::{Function, HarmonicAnalyser, HarmonicDescription};
pub use orchestrator::{Orchestrator, PartVoicing};
pub use progression::ProgressionSynth;
