//! MOSFET type definitions
//!
//! Enums selecting polarity and model family, and the tagged result
//! returned by every kernel.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;

/// Absolute tolerance used when comparing two results' currents.
pub const CURRENT_TOLERANCE: f64 = 0.001;

/// Operating region of the MOSFET
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingRegion {
    /// Vgs > Vth, Vds >= Vdsat
    Saturated,
    /// Vgs > Vth, Vds <= Vdsat
    Triode,
    /// Vgs < Vth, or no branch matched
    #[default]
    Off,
}

impl OperatingRegion {
    /// Pick the region for a device whose conduction test is `conducting`.
    ///
    /// The triode test runs first, so `vds == vdsat` lands in triode.
    /// A non-conducting device, or a NaN in the comparison, is off.
    pub(crate) fn classify(conducting: bool, vds: f64, vdsat: f64) -> Self {
        if !conducting {
            OperatingRegion::Off
        } else if vds <= vdsat {
            OperatingRegion::Triode
        } else if vds >= vdsat {
            OperatingRegion::Saturated
        } else {
            OperatingRegion::Off
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OperatingRegion::Saturated => "SATURATED",
            OperatingRegion::Triode => "TRIODE",
            OperatingRegion::Off => "OFF",
        }
    }
}

impl fmt::Display for OperatingRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MOSFET polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationMode {
    #[default]
    Nmos,
    Pmos,
}

impl fmt::Display for ActivationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationMode::Nmos => f.write_str("NMOS"),
            ActivationMode::Pmos => f.write_str("PMOS"),
        }
    }
}

impl FromStr for ActivationMode {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nmos" | "n" => Ok(ActivationMode::Nmos),
            "pmos" | "p" => Ok(ActivationMode::Pmos),
            _ => Err(DeviceError::UnknownMode(s.to_string())),
        }
    }
}

/// Which kernel family computes the drain current
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSelector {
    /// Square-law model, no velocity saturation
    LongChannel,
    /// Square-law model corrected by the critical field times length
    #[default]
    ShortChannel,
}

impl ModelSelector {
    pub const LCM: ModelSelector = ModelSelector::LongChannel;
    pub const SCM: ModelSelector = ModelSelector::ShortChannel;
}

impl fmt::Display for ModelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSelector::LongChannel => f.write_str("LCM"),
            ModelSelector::ShortChannel => f.write_str("SCM"),
        }
    }
}

impl FromStr for ModelSelector {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lcm" | "long" | "long-channel" | "long_channel" => Ok(ModelSelector::LongChannel),
            "scm" | "short" | "short-channel" | "short_channel" => Ok(ModelSelector::ShortChannel),
            _ => Err(DeviceError::UnknownModel(s.to_string())),
        }
    }
}

/// Region and drain current produced by one kernel evaluation
///
/// Equality compares regions exactly and currents within
/// [`CURRENT_TOLERANCE`] (absolute, not relative).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub region: OperatingRegion,
    pub current: f64,
}

impl EvaluationResult {
    pub fn new(region: OperatingRegion, current: f64) -> Self {
        Self { region, current }
    }

    pub fn off() -> Self {
        Self::new(OperatingRegion::Off, 0.0)
    }

    /// False when the equations produced NaN or an infinity.
    pub fn is_finite(&self) -> bool {
        self.current.is_finite()
    }
}

impl PartialEq for EvaluationResult {
    fn eq(&self, other: &Self) -> bool {
        self.region == other.region && (self.current - other.current).abs() < CURRENT_TOLERANCE
    }
}

impl fmt::Display for EvaluationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region: {}, current: {}", self.region, self.current)
    }
}
