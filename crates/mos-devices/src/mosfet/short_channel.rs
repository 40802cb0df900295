//! Short-channel (velocity-saturation) kernels
//!
//! The long-channel equations corrected by `EcLc`, the product of the
//! critical field and the carrier path length:
//!
//! ```text
//! Vov    = Vgs - Vtn                     (PMOS: Vsg + Vtp)
//! Vdsat  = Vov * EcLc / (Vov + EcLc)
//! k      = W/L * k'
//!
//! triode     Ids = k / (1 + Vds/EcLc) * (Vov*Vds - Vds^2/2)
//! saturation Ids = k/2 * EcLc * Vov^2 / (Vov + EcLc) * (1 + lambda*(Vds - Vdsat))
//! ```
//!
//! `Vdsat` is always below the long-channel `Vov` for a finite positive
//! `EcLc` and approaches it as `EcLc` grows. `Vov + EcLc == 0` is not
//! guarded and yields a non-finite current.

use super::diagnostics::{check_bias, DiagnosticSink};
use super::params::{OutputImpedance, Process, VelocitySaturation};
use super::types::{ActivationMode, EvaluationResult, OperatingRegion};

/// Canonical short-channel arguments
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShortChannelArgs {
    /// Device transconductance k = W/L * k'
    pub k: f64,
    /// Channel-length modulation [1/V]
    pub lambda: f64,
    /// Critical field times carrier path length [V]
    pub ec_l: f64,
}

impl ShortChannelArgs {
    pub fn new(k: f64, lambda: f64, ec_l: f64) -> Self {
        Self { k, lambda, ec_l }
    }

    /// From a process transconductance and a separate aspect ratio.
    pub fn from_kprime(kprime: f64, aspect: f64, lambda: f64, ec_l: f64) -> Self {
        Self::new(aspect * kprime, lambda, ec_l)
    }

    /// From raw `Cox`, mobility, `W`, `L`, output impedance and velocity saturation.
    pub fn from_process(
        process: &Process,
        output: OutputImpedance,
        velocity: VelocitySaturation,
    ) -> Self {
        Self::from_kprime(
            process.kprime(),
            process.aspect(),
            output.lambda(),
            velocity.ec_l(),
        )
    }
}

/// Velocity-saturated drain saturation voltage for overdrive `vov`.
pub fn saturation_voltage(vov: f64, ec_l: f64) -> f64 {
    (vov * ec_l) / (vov + ec_l)
}

/// NMOS short-channel drain current.
pub fn short_channel_nmos(
    vgs: f64,
    vtn: f64,
    vds: f64,
    args: &ShortChannelArgs,
    sink: &dyn DiagnosticSink,
) -> EvaluationResult {
    let vov = vgs - vtn;
    let vdsat = saturation_voltage(vov, args.ec_l);
    check_bias(sink, ActivationMode::Nmos, vdsat, vds, args.lambda);

    if vgs < vtn {
        return EvaluationResult::off();
    }
    let region = OperatingRegion::classify(vgs > vtn, vds, vdsat);
    velocity_saturated(region, vov, vds, vdsat, args)
}

/// PMOS short-channel drain current, from Vsg, Vtp and Vsd.
pub fn short_channel_pmos(
    vsg: f64,
    vtp: f64,
    vsd: f64,
    args: &ShortChannelArgs,
    sink: &dyn DiagnosticSink,
) -> EvaluationResult {
    let vov = vsg + vtp;
    let vsdsat = saturation_voltage(vov, args.ec_l);
    check_bias(sink, ActivationMode::Pmos, vsdsat, vsd, args.lambda);

    if vsg < -vtp {
        return EvaluationResult::off();
    }
    let region = OperatingRegion::classify(vsg > -vtp, vsd, vsdsat);
    velocity_saturated(region, vov, vsd, vsdsat, args)
}

fn velocity_saturated(
    region: OperatingRegion,
    vov: f64,
    vds: f64,
    vdsat: f64,
    args: &ShortChannelArgs,
) -> EvaluationResult {
    let ShortChannelArgs { k, lambda, ec_l } = *args;
    let current = match region {
        OperatingRegion::Off => 0.0,
        OperatingRegion::Triode => (k / (1.0 + vds / ec_l)) * (vov * vds - (vds * vds) / 2.0),
        OperatingRegion::Saturated => {
            ((k / 2.0) * ec_l) * ((vov * vov) / (vov + ec_l)) * (1.0 + lambda * (vds - vdsat))
        }
    };
    EvaluationResult::new(region, current)
}
