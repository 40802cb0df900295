use mos_core::analysis::Terminal;
use mos_core::result_store::RunResult;
use mos_devices::mosfet::{Diagnostic, DeviceParams, OperatingRegion, Terminals};
use serde::{Deserialize, Serialize};

/// Device description: structured parameters or a model card
///
/// `device` wins when both are given.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceInput {
    pub device: Option<DeviceParams>,
    pub card: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluateRequest {
    #[serde(flatten)]
    pub input: DeviceInput,
    pub terminals: Terminals,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateResponse {
    pub region: OperatingRegion,
    /// `null` when the equations produced NaN or an infinity
    pub current: Option<f64>,
    pub finite: bool,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SweepRequest {
    #[serde(flatten)]
    pub input: DeviceInput,
    pub terminals: Terminals,
    pub terminal: Terminal,
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

/// A stored sweep plus the advisories raised while computing it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepResponse {
    #[serde(flatten)]
    pub run: RunResult,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    pub details: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}
