use crossbeam_channel::Sender;
use maestro_presets::PresetParams;

/// One scheduled voice inside a `PlayBlock` command: `time_offset` is
/// relative to the block's dispatch time, `gain_db`/`enable_reverb`/
/// `enable_chorus` are the auto-mix's post-construction hooks, separate
/// from whatever FX flags are already baked into `params`.
#[derive(Debug, Clone)]
pub struct ScheduledEvent {
    pub time_offset: f64,
    pub preset: String,
    pub params: PresetParams,
    pub gain_db: f64,
    pub enable_reverb: bool,
    pub enable_chorus: bool,
}

#[derive(Debug, Clone)]
pub enum Ack {
    Played { preset: String },
    UnknownPreset,
    Stopped,
}

/// What `get_active_presets` hands back for one sounding voice: the preset
/// name, the params it was constructed with, and a human-readable rendering
/// of the underlying node, mirroring the original's
/// `{"name", "params", "instance": str(instance)}` serialization.
#[derive(Debug, Clone)]
pub struct ActivePresetInfo {
    pub name: String,
    pub params: PresetParams,
    pub instance_repr: String,
}

pub enum EngineCommand {
    PlayPreset {
        name: String,
        params: PresetParams,
        reply: Option<Sender<Ack>>,
    },
    PlayBlock {
        name: String,
        events: Vec<ScheduledEvent>,
    },
    GetActivePresets {
        reply: Sender<Vec<ActivePresetInfo>>,
    },
    GetCurrentMelody {
        reply: Sender<Option<String>>,
    },
    /// Fades out every active voice whose preset name matches, the way the
    /// original re-sent `play_preset` with `intensity=0` and cancelled the
    /// matching scheduled future.
    StopPreset {
        name: String,
        fade: f64,
    },
    /// Fades out every active voice, regardless of preset name.
    StopAll {
        fade: f64,
    },
    Stop,
    /// Commands named in the original protocol but out of scope here
    /// (TTS paths): logged and dropped rather than faked.
    Unsupported(&'static str),
}
