//! Advisory diagnostics for physically invalid inputs
//!
//! Kernels report suspicious values (a non-positive saturation voltage, a
//! non-positive drain differential, a negative lambda) to a
//! [`DiagnosticSink`] and then carry on computing.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use super::types::ActivationMode;

/// Receiver for advisory invalid-parameter reports
pub trait DiagnosticSink: Send + Sync {
    fn invalid_parameter(&self, name: &'static str, value: f64);
}

/// Emits each advisory as a `tracing` warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn invalid_parameter(&self, name: &'static str, value: f64) {
        tracing::warn!(parameter = name, value, "physically invalid device input");
    }
}

/// Discards every advisory.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn invalid_parameter(&self, _name: &'static str, _value: f64) {}
}

/// One recorded advisory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub parameter: String,
    pub value: f64,
}

/// Keeps advisories in memory, in the order they were raised.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<Diagnostic>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Drain the recorded advisories.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(
            &mut *self
                .entries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries().iter().any(|d| d.parameter == name)
    }
}

impl DiagnosticSink for RecordingSink {
    fn invalid_parameter(&self, name: &'static str, value: f64) {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(Diagnostic {
                parameter: name.to_string(),
                value,
            });
    }
}

/// Run the three advisory checks shared by every kernel.
///
/// Order: saturation voltage, drain differential, lambda.
pub(crate) fn check_bias(
    sink: &dyn DiagnosticSink,
    mode: ActivationMode,
    vdsat: f64,
    vds: f64,
    lambda: f64,
) {
    let (sat_name, drain_name) = match mode {
        ActivationMode::Nmos => ("vdsat", "vds"),
        ActivationMode::Pmos => ("vsdsat", "vsd"),
    };
    if vdsat <= 0.0 {
        sink.invalid_parameter(sat_name, vdsat);
    }
    if vds <= 0.0 {
        sink.invalid_parameter(drain_name, vds);
    }
    if lambda < 0.0 {
        sink.invalid_parameter("lambda", lambda);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bias_is_silent() {
        let sink = RecordingSink::new();
        check_bias(&sink, ActivationMode::Nmos, 0.5, 0.2, 0.0);
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn test_all_checks_fire_in_order() {
        let sink = RecordingSink::new();
        check_bias(&sink, ActivationMode::Nmos, 0.0, -0.1, -0.5);
        let names: Vec<String> = sink.take().into_iter().map(|d| d.parameter).collect();
        assert_eq!(names, vec!["vdsat", "vds", "lambda"]);
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn test_pmos_names() {
        let sink = RecordingSink::new();
        check_bias(&sink, ActivationMode::Pmos, -0.2, 0.0, 0.1);
        assert!(sink.contains("vsdsat"));
        assert!(sink.contains("vsd"));
        assert!(!sink.contains("lambda"));
    }

    #[test]
    fn test_nan_does_not_trigger() {
        let sink = RecordingSink::new();
        check_bias(&sink, ActivationMode::Nmos, f64::NAN, f64::NAN, f64::NAN);
        assert!(sink.entries().is_empty());
    }
}
