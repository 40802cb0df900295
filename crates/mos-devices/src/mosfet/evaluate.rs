//! Terminal-voltage dispatch
//!
//! Works from absolute terminal voltages:
//!
//! 1. polarity-correct differentials ([`Terminals::differentials`])
//! 2. body-effect threshold ([`effective_threshold`])
//! 3. the long- or short-channel kernel matching the polarity
//!
//! Nothing is retained between calls.

use super::diagnostics::DiagnosticSink;
use super::long_channel::{long_channel_nmos, long_channel_pmos, LongChannelArgs};
use super::params::{BodyEffect, DeviceParams, OutputImpedance, Process, Terminals, VelocitySaturation};
use super::short_channel::{short_channel_nmos, short_channel_pmos, ShortChannelArgs};
use super::threshold::effective_threshold;
use super::types::{ActivationMode, EvaluationResult, ModelSelector};
use crate::error::{DeviceError, Result};

/// Evaluate a device at the given terminals with the model it selects.
///
/// Fails only when the short-channel model is selected without
/// velocity-saturation parameters.
pub fn evaluate(
    params: &DeviceParams,
    terminals: &Terminals,
    sink: &dyn DiagnosticSink,
) -> Result<EvaluationResult> {
    match params.model {
        ModelSelector::LongChannel => Ok(long_channel(
            params.mode,
            terminals,
            &params.body,
            &params.process,
            params.output,
            sink,
        )),
        ModelSelector::ShortChannel => {
            let velocity = params
                .velocity
                .ok_or(DeviceError::MissingVelocitySaturation)?;
            Ok(short_channel(
                params.mode,
                terminals,
                &params.body,
                &params.process,
                params.output,
                velocity,
                sink,
            ))
        }
    }
}

/// Long-channel evaluation from absolute terminal voltages.
pub fn long_channel(
    mode: ActivationMode,
    terminals: &Terminals,
    body: &BodyEffect,
    process: &Process,
    output: OutputImpedance,
    sink: &dyn DiagnosticSink,
) -> EvaluationResult {
    let d = terminals.differentials(mode);
    let vth = effective_threshold(mode, body, d.vxb);
    let args = LongChannelArgs::from_process(process, output);
    match mode {
        ActivationMode::Nmos => long_channel_nmos(d.vgs, vth, d.vds, &args, sink),
        ActivationMode::Pmos => long_channel_pmos(d.vgs, vth, d.vds, &args, sink),
    }
}

/// Short-channel evaluation from absolute terminal voltages.
pub fn short_channel(
    mode: ActivationMode,
    terminals: &Terminals,
    body: &BodyEffect,
    process: &Process,
    output: OutputImpedance,
    velocity: VelocitySaturation,
    sink: &dyn DiagnosticSink,
) -> EvaluationResult {
    let d = terminals.differentials(mode);
    let vth = effective_threshold(mode, body, d.vxb);
    let args = ShortChannelArgs::from_process(process, output, velocity);
    match mode {
        ActivationMode::Nmos => short_channel_nmos(d.vgs, vth, d.vds, &args, sink),
        ActivationMode::Pmos => short_channel_pmos(d.vgs, vth, d.vds, &args, sink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mosfet::diagnostics::{NullSink, RecordingSink};
    use crate::mosfet::types::OperatingRegion;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_nmos_default_reference_point() {
        let params = DeviceParams::nmos_default();
        let t = Terminals::new(1.0, 0.0, 0.24806, 0.0);
        let out = evaluate(&params, &t, &NullSink).unwrap();
        assert_eq!(out.region, OperatingRegion::Triode);
        assert_abs_diff_eq!(out.current, 60.65024002075324, epsilon = 1e-9);
    }

    #[test]
    fn test_body_bias_shifts_threshold() {
        let params = DeviceParams {
            model: ModelSelector::LCM,
            ..DeviceParams::nmos_default()
        };
        // Vsb = 0.5 lifts Vtn to ~0.374; Vgs = 0.35 is then below threshold
        let t = Terminals::new(0.85, 0.5, 2.0, 0.0);
        let out = evaluate(&params, &t, &NullSink).unwrap();
        assert_eq!(out, EvaluationResult::off());

        let unbiased = Terminals::new(0.85, 0.5, 2.0, 0.5);
        let out = evaluate(&params, &unbiased, &NullSink).unwrap();
        assert_eq!(out.region, OperatingRegion::Saturated);
    }

    #[test]
    fn test_selector_picks_kernel() {
        let t = Terminals::new(1.0, 0.0, 0.2, 0.0);
        let long = DeviceParams {
            model: ModelSelector::LongChannel,
            ..DeviceParams::nmos_default()
        };
        let short = DeviceParams::nmos_default();
        let lc = evaluate(&long, &t, &NullSink).unwrap();
        let sc = evaluate(&short, &t, &NullSink).unwrap();
        assert_abs_diff_eq!(lc.current, 72.0, epsilon = 1e-9);
        assert!(sc.current < lc.current);
    }

    #[test]
    fn test_missing_velocity_saturation() {
        let params = DeviceParams {
            velocity: None,
            ..DeviceParams::nmos_default()
        };
        let t = Terminals::new(1.0, 0.0, 0.5, 0.0);
        assert_eq!(
            evaluate(&params, &t, &NullSink),
            Err(DeviceError::MissingVelocitySaturation)
        );
    }

    #[test]
    fn test_pmos_dispatch_uses_drain_minus_source() {
        // Source at 1.8, drain at 2.0: Vd - Vs = +0.2 is treated as Vsd
        let params = DeviceParams {
            model: ModelSelector::LCM,
            ..DeviceParams::pmos_default()
        };
        let t = Terminals::new(0.8, 1.8, 2.0, 1.8);
        let out = evaluate(&params, &t, &NullSink).unwrap();
        assert_eq!(out.region, OperatingRegion::Triode);
        assert!(out.current > 0.0);
    }

    #[test]
    fn test_pmos_conventional_bias_warns() {
        // Drain below source gives a negative Vd - Vs and an advisory
        let params = DeviceParams::pmos_default();
        let sink = RecordingSink::new();
        let t = Terminals::new(0.0, 1.8, 0.0, 1.8);
        let out = evaluate(&params, &t, &sink).unwrap();
        assert!(sink.contains("vsd"));
        assert_eq!(out.region, OperatingRegion::Triode);
    }

    #[test]
    fn test_repeated_evaluation_is_bit_identical() {
        let params = DeviceParams::nmos_default();
        let t = Terminals::new(1.2, 0.1, 0.9, 0.0);
        let a = evaluate(&params, &t, &NullSink).unwrap();
        let b = evaluate(&params, &t, &NullSink).unwrap();
        assert_eq!(a.region, b.region);
        assert_eq!(a.current.to_bits(), b.current.to_bits());
    }
}
