use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown preset type: {0}")]
    UnknownPreset(String),

    #[error("preset {0} is already registered")]
    DuplicateName(String),

    #[error("preset {preset} missing required parameter {param}")]
    MissingParameter { preset: String, param: String },

    #[error("preset {preset} got invalid value for {param}: {reason}")]
    InvalidParameter {
        preset: String,
        param: String,
        reason: String,
    },

    #[error("failed to construct preset {0}")]
    ConstructionFailed(String),
}

pub type Result<T> = std::result::Result<T, Error>;
