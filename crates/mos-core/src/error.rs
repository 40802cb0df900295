use mos_devices::DeviceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid sweep: {0}")]
    InvalidSweep(String),

    #[error("unknown terminal: {0:?} (expected gate, source, drain or body)")]
    UnknownTerminal(String),

    #[error("run {0} not found")]
    RunNotFound(usize),

    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
