//! MOSFET drain-current models.
//!
//! Long-channel (square-law) and short-channel (velocity-saturation
//! corrected) kernels for NMOS and PMOS devices, the body-effect threshold
//! corrector that feeds them, and a dispatcher that works from absolute
//! terminal voltages.

pub mod error;
pub mod mosfet;

pub use error::{DeviceError, Result};
pub use mosfet::{
    evaluate, ActivationMode, DeviceParams, DiagnosticSink, EvaluationResult, ModelSelector,
    OperatingRegion, Terminals,
};
