use std::io;
use thiserror::Error;


/// Failures surfaced by the engine. Rendering itself never fails, only
/// loading a template or reading a configuration can.
#[derive(Debug, Error)]
pub enum Error {
    #[error("template not found: {0}")]
    NotFound(String),

    #[error("failed to read template {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: io::Error
    },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error)
}


pub type Result<T> = std::result::Result<T, Error>;
