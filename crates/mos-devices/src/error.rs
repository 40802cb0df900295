//! Error types for mos-devices.
//!
//! The current kernels never fail; these errors only come from building
//! device parameters out of text or from incomplete parameter sets.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeviceError {
    #[error("parameter {name} has invalid value: {value:?}")]
    InvalidNumber { name: String, value: String },

    #[error("unknown activation mode: {0:?} (expected nmos or pmos)")]
    UnknownMode(String),

    #[error("unknown channel model: {0:?} (expected lcm or scm)")]
    UnknownModel(String),

    #[error("short-channel model selected without velocity-saturation parameters")]
    MissingVelocitySaturation,

    #[error("velocity saturation parameter {present} given without {missing}")]
    IncompleteVelocitySaturation {
        present: &'static str,
        missing: &'static str,
    },

    #[error("model card line {line}: {message}")]
    MalformedCard { line: usize, message: String },
}

pub type Result<T> = std::result::Result<T, DeviceError>;
