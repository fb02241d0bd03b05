use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no chord progression could be resolved for key '{0}'")]
    UnresolvableKey(String),
}

pub type Result<T> = std::result::Result<T, Error>;
