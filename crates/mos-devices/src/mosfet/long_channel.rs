//! Long-channel (square-law) kernels
//!
//! ## DC Current Model
//!
//! With overdrive `Vov = Vgs - Vtn` (NMOS) or `Vsg + Vtp` (PMOS) and
//! `Vdsat = Vov`:
//!
//! **Off (Vgs < Vtn)**:
//! - Ids = 0
//!
//! **Triode (Vgs > Vtn, Vds <= Vdsat)**:
//! - Ids = k' * W/L * [Vov*Vds - Vds^2/2]
//!
//! **Saturation (Vgs > Vtn, Vds >= Vdsat)**:
//! - Ids = k'/2 * W/L * Vov^2 * (1 + lambda*(Vds - Vdsat))
//!
//! `Vgs == Vtn` matches neither the off test nor the conduction test and
//! is reported as off.

use super::diagnostics::{check_bias, DiagnosticSink};
use super::params::{OutputImpedance, Process};
use super::types::{ActivationMode, EvaluationResult, OperatingRegion};

/// Canonical long-channel arguments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LongChannelArgs {
    /// Process transconductance k' = mobility * Cox
    pub kprime: f64,
    /// W / L
    pub aspect: f64,
    /// Channel-length modulation [1/V]
    pub lambda: f64,
}

impl LongChannelArgs {
    pub fn new(kprime: f64, aspect: f64, lambda: f64) -> Self {
        Self {
            kprime,
            aspect,
            lambda,
        }
    }

    /// From raw `Cox`, mobility, `W`, `L` and an Early voltage or lambda.
    pub fn from_process(process: &Process, output: OutputImpedance) -> Self {
        Self::new(process.kprime(), process.aspect(), output.lambda())
    }
}

/// NMOS long-channel drain current.
pub fn long_channel_nmos(
    vgs: f64,
    vtn: f64,
    vds: f64,
    args: &LongChannelArgs,
    sink: &dyn DiagnosticSink,
) -> EvaluationResult {
    let vdsat = vgs - vtn;
    check_bias(sink, ActivationMode::Nmos, vdsat, vds, args.lambda);

    if vgs < vtn {
        return EvaluationResult::off();
    }
    let region = OperatingRegion::classify(vgs > vtn, vds, vdsat);
    square_law(region, vgs - vtn, vds, vdsat, args)
}

/// PMOS long-channel drain current, from Vsg, Vtp (negative for an
/// enhancement device) and Vsd.
pub fn long_channel_pmos(
    vsg: f64,
    vtp: f64,
    vsd: f64,
    args: &LongChannelArgs,
    sink: &dyn DiagnosticSink,
) -> EvaluationResult {
    let vsdsat = vsg + vtp;
    check_bias(sink, ActivationMode::Pmos, vsdsat, vsd, args.lambda);

    if vsg < -vtp {
        return EvaluationResult::off();
    }
    let region = OperatingRegion::classify(vsg > -vtp, vsd, vsdsat);
    square_law(region, vsg + vtp, vsd, vsdsat, args)
}

fn square_law(
    region: OperatingRegion,
    vov: f64,
    vds: f64,
    vdsat: f64,
    args: &LongChannelArgs,
) -> EvaluationResult {
    let current = match region {
        OperatingRegion::Off => 0.0,
        OperatingRegion::Triode => args.kprime * args.aspect * (vov * vds - (vds * vds) / 2.0),
        OperatingRegion::Saturated => {
            (args.kprime / 2.0) * args.aspect * vov * vov * (1.0 + args.lambda * (vds - vdsat))
        }
    };
    EvaluationResult::new(region, current)
}
