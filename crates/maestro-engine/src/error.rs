use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] maestro_core::Error),

    #[error(transparent)]
    Preset(#[from] maestro_presets::Error),

    #[error("engine worker thread is not running")]
    WorkerNotRunning,

    #[error("engine command channel disconnected")]
    ChannelClosed,

    #[error("timed out waiting for engine response")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, Error>;
