//! Threshold voltage with body effect
//!
//! ```text
//! NMOS: Vtn = Vt + gamma * (sqrt(|2*Phi| + Vsb) - sqrt(|2*Phi|))    Vsb = Vs - Vb
//! PMOS: Vtp = Vt - gamma * (sqrt(|2*Phi| + Vbs) - sqrt(|2*Phi|))    Vbs = Vb - Vs
//! ```
//!
//! A zero body bias skips the square roots entirely. A body bias below
//! `-|2*Phi|` makes the radicand negative and the result NaN; that is left
//! to the caller to detect.

use super::params::BodyEffect;
use super::types::ActivationMode;

/// Magnitude of the body-effect shift `gamma * (sqrt(|2Phi| + vxb) - sqrt(|2Phi|))`.
pub fn body_effect_shift(gamma: f64, phi: f64, vxb: f64) -> f64 {
    if vxb == 0.0 {
        return 0.0;
    }
    let two_phi = (2.0 * phi).abs();
    gamma * ((two_phi + vxb).sqrt() - two_phi.sqrt())
}

/// NMOS threshold for source-to-body bias `vsb`.
pub fn nmos_threshold(body: &BodyEffect, vsb: f64) -> f64 {
    body.vt + body_effect_shift(body.gamma, body.phi, vsb)
}

/// PMOS threshold for body-to-source bias `vbs`.
pub fn pmos_threshold(body: &BodyEffect, vbs: f64) -> f64 {
    body.vt - body_effect_shift(body.gamma, body.phi, vbs)
}

/// Effective threshold for `mode`, given the polarity-correct body differential.
pub fn effective_threshold(mode: ActivationMode, body: &BodyEffect, vxb: f64) -> f64 {
    match mode {
        ActivationMode::Nmos => nmos_threshold(body, vxb),
        ActivationMode::Pmos => pmos_threshold(body, vxb),
    }
}
