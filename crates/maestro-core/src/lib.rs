//! Data model, melody loading, and the abstract audio-node surface shared by
//! every other `maestro` crate.

pub mod compositor;
pub mod error;
pub mod node;
pub mod note;

pub use compositor::{BlockEvent, Compositor};
pub use error::{Error, Result};
pub use node::AudioNode;
pub use note::{strip_comments, MelodyFile, NoteEvent, RawEvent};
