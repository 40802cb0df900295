//! MOSFET Drain-Current Models
//!
//! Two hand-analysis models, each for NMOS and PMOS:
//!
//! - **Long-channel**: classical square law, `Vdsat = Vgs - Vt`
//! - **Short-channel**: square law corrected for velocity saturation by the
//!   critical field times channel length `EcLc`
//!
//! ## Module Structure
//!
//! - `types`: Enums and the tagged result (OperatingRegion, ActivationMode,
//!   ModelSelector, EvaluationResult)
//! - `params`: Terminal voltages and device parameters with defaults
//! - `threshold`: Threshold voltage with body effect
//! - `long_channel`: Square-law kernels
//! - `short_channel`: Velocity-saturation kernels
//! - `diagnostics`: Advisory sink for physically invalid inputs
//! - `evaluate`: Dispatch from absolute terminal voltages
//!
//! ## Usage
//!
//! ```ignore
//! use mos_devices::mosfet::{evaluate, DeviceParams, Terminals, TracingSink};
//!
//! let params = DeviceParams::nmos_default();
//! let terminals = Terminals::new(1.0, 0.0, 0.24806, 0.0); // Vg, Vs, Vd, Vb
//! let result = evaluate(&params, &terminals, &TracingSink)?;
//!
//! println!("{}", result); // region: TRIODE, current: 60.650...
//! ```
//!
//! ## Parameter cards
//!
//! Parameters can also be given as SPICE-flavoured text:
//!
//! ```text
//! * comment
//! .model n1 nmos (vt=0.3 gamma=0.3 phi=0.4
//! + cox=1 u0=200 w=3u l=1u eclc=0.6 lambda=0)
//! ```
//!
//! ## References
//!
//! - A. Sedra, K. Smith, "Microelectronic Circuits", MOSFET chapter
//! - J. Rabaey, "Digital Integrated Circuits", velocity-saturated MOS model

pub mod diagnostics;
pub mod evaluate;
pub mod long_channel;
pub mod params;
pub mod short_channel;
pub mod threshold;
pub mod types;

// Re-export commonly used items
pub use diagnostics::{Diagnostic, DiagnosticSink, NullSink, RecordingSink, TracingSink};
pub use evaluate::{evaluate, long_channel, short_channel};
pub use long_channel::{long_channel_nmos, long_channel_pmos, LongChannelArgs};
pub use params::{
    BodyEffect, DeviceParams, Differentials, OutputImpedance, Process, Terminals,
    VelocitySaturation,
};
pub use short_channel::{saturation_voltage, short_channel_nmos, short_channel_pmos, ShortChannelArgs};
pub use threshold::{effective_threshold, nmos_threshold, pmos_threshold};
pub use types::{ActivationMode, EvaluationResult, ModelSelector, OperatingRegion};

use std::collections::HashMap;

use crate::error::{DeviceError, Result};

/// Parsed parameter card
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelCard {
    /// Name from a `.model` header, if any
    pub name: Option<String>,
    /// Polarity from a `.model` header, if any
    pub mode: Option<ActivationMode>,
    /// Lower-cased key -> raw value
    pub params: HashMap<String, String>,
}

/// Parse SPICE-flavoured parameter text
///
/// Lines starting with `*` are comments, a leading `+` continues the
/// previous line, `.model <name> <nmos|pmos>` sets name and polarity, and
/// every other token must be `key=value`. Parentheses are ignored.
pub fn parse_model_card(text: &str) -> Result<ModelCard> {
    let mut card = ModelCard::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with('*') {
            continue;
        }
        let line = line.strip_prefix('+').unwrap_or(line);
        let cleaned = line.replace(|c: char| c == '(' || c == ')', " ");
        let mut tokens = cleaned.split_whitespace().peekable();

        if tokens
            .peek()
            .is_some_and(|t| t.eq_ignore_ascii_case(".model"))
        {
            tokens.next();
            let Some(name) = tokens.next() else {
                return Err(DeviceError::MalformedCard {
                    line: line_no,
                    message: ".model requires a name".to_string(),
                });
            };
            let Some(kind) = tokens.next() else {
                return Err(DeviceError::MalformedCard {
                    line: line_no,
                    message: ".model requires nmos or pmos".to_string(),
                });
            };
            card.name = Some(name.to_string());
            card.mode = Some(kind.parse()?);
        }

        for token in tokens {
            let Some((key, value)) = token.split_once('=') else {
                return Err(DeviceError::MalformedCard {
                    line: line_no,
                    message: format!("expected key=value, found {:?}", token),
                });
            };
            if key.is_empty() || value.is_empty() {
                return Err(DeviceError::MalformedCard {
                    line: line_no,
                    message: format!("empty key or value in {:?}", token),
                });
            }
            card.params
                .insert(key.to_ascii_lowercase(), value.to_string());
        }
    }

    Ok(card)
}

/// Build DeviceParams from a parameter map
///
/// Starts from the defaults for `mode` and overlays every recognised key.
/// Keys are matched case-insensitively; the first alias present wins.
///
/// # Arguments
/// * `params` - Map of parameter name -> value string
/// * `mode` - Polarity used to pick defaults
///
/// # Returns
/// * `DeviceParams`, or an error naming the first unparsable value
pub fn build_device_params(
    params: &HashMap<String, String>,
    mode: ActivationMode,
) -> Result<DeviceParams> {
    let mut p = DeviceParams::default_for(mode);

    let lowered: HashMap<String, &String> = params
        .iter()
        .map(|(k, v)| (k.to_ascii_lowercase(), v))
        .collect();

    let get_param = |keys: &[&str]| -> Result<Option<f64>> {
        for key in keys {
            if let Some(value) = lowered.get(*key) {
                return parse_number(value).map(Some).ok_or_else(|| DeviceError::InvalidNumber {
                    name: key.to_string(),
                    value: value.to_string(),
                });
            }
        }
        Ok(None)
    };

    if let Some(model) = lowered.get("model") {
        p.model = model.parse()?;
    }

    // Body effect
    if let Some(v) = get_param(&["vt", "vto", "vth0"])? {
        p.body.vt = v;
    }
    if let Some(v) = get_param(&["gamma"])? {
        p.body.gamma = v;
    }
    if let Some(v) = get_param(&["phi"])? {
        p.body.phi = v;
    }

    // Process
    if let Some(v) = get_param(&["cox"])? {
        p.process.cox = v;
    }
    if let Some(v) = get_param(&["u0", "un", "up", "mobility"])? {
        p.process.mobility = v;
    }
    if let Some(v) = get_param(&["w"])? {
        p.process.w = v;
    }
    if let Some(v) = get_param(&["l"])? {
        p.process.l = v;
    }

    // Output impedance: an explicit lambda wins over an Early voltage
    if let Some(v) = get_param(&["va", "van", "vap"])? {
        p.output = OutputImpedance::EarlyVoltage(v);
    }
    if let Some(v) = get_param(&["lambda"])? {
        p.output = OutputImpedance::Lambda(v);
    }

    // Velocity saturation: the combined product wins over the split form
    let ec = get_param(&["ec", "ecn", "ecp"])?;
    let lc = get_param(&["lc", "lpn", "ln", "lp"])?;
    match (ec, lc) {
        (Some(ec), Some(l)) => p.velocity = Some(VelocitySaturation::Split { ec, l }),
        (Some(_), None) => {
            return Err(DeviceError::IncompleteVelocitySaturation {
                present: "ec",
                missing: "lc",
            })
        }
        (None, Some(_)) => {
            return Err(DeviceError::IncompleteVelocitySaturation {
                present: "lc",
                missing: "ec",
            })
        }
        (None, None) => {}
    }
    if let Some(v) = get_param(&["eclc", "ecl", "ecnln", "ecplp"])? {
        p.velocity = Some(VelocitySaturation::Combined(v));
    }

    for key in lowered.keys() {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            tracing::debug!(key = key.as_str(), "ignoring unknown device parameter");
        }
    }

    Ok(p)
}

const KNOWN_KEYS: &[&str] = &[
    "model", "vt", "vto", "vth0", "gamma", "phi", "cox", "u0", "un", "up", "mobility", "w", "l",
    "va", "van", "vap", "lambda", "ec", "ecn", "ecp", "lc", "lpn", "ln", "lp", "eclc", "ecl",
    "ecnln", "ecplp",
];

/// Parse a number with optional SI suffix
pub fn parse_number(s: &str) -> Option<f64> {
    let lower = s.to_ascii_lowercase();
    let trimmed = lower.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(stripped) = trimmed.strip_suffix("meg") {
        (stripped, 1e6)
    } else if let Some(stripped) = trimmed.strip_suffix("mil") {
        (stripped, 25.4e-6)
    } else {
        let last = trimmed.chars().last().map_or(0, char::len_utf8);
        let (value_part, suffix) = trimmed.split_at(trimmed.len() - last);
        match suffix {
            "f" => (value_part, 1e-15),
            "p" => (value_part, 1e-12),
            "n" => (value_part, 1e-9),
            "u" => (value_part, 1e-6),
            "m" => (value_part, 1e-3),
            "k" => (value_part, 1e3),
            "g" => (value_part, 1e9),
            "t" => (value_part, 1e12),
            _ => (trimmed, 1.0),
        }
    };

    num_str
        .parse::<f64>()
        .ok()
        .map(|n| n * multiplier)
        .or_else(|| trimmed.parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_build_params_empty() {
        let params = HashMap::new();
        let p = build_device_params(&params, ActivationMode::Pmos).unwrap();
        assert_eq!(p, DeviceParams::pmos_default());
    }

    #[test]
    fn test_build_params_with_values() {
        let mut params = HashMap::new();
        params.insert("VTO".to_string(), "0.45".to_string());
        params.insert("u0".to_string(), "400".to_string());
        params.insert("w".to_string(), "2u".to_string());
        params.insert("l".to_string(), "100n".to_string());
        params.insert("va".to_string(), "20".to_string());
        params.insert("model".to_string(), "lcm".to_string());

        let p = build_device_params(&params, ActivationMode::Nmos).unwrap();
        assert_abs_diff_eq!(p.body.vt, 0.45);
        assert_abs_diff_eq!(p.process.mobility, 400.0);
        assert_abs_diff_eq!(p.process.aspect(), 20.0, epsilon = 1e-9);
        assert_eq!(p.output, OutputImpedance::EarlyVoltage(20.0));
        assert_eq!(p.model, ModelSelector::LCM);
    }

    #[test]
    fn test_lambda_overrides_early_voltage() {
        let mut params = HashMap::new();
        params.insert("va".to_string(), "20".to_string());
        params.insert("lambda".to_string(), "0.02".to_string());
        let p = build_device_params(&params, ActivationMode::Nmos).unwrap();
        assert_eq!(p.output, OutputImpedance::Lambda(0.02));
    }

    #[test]
    fn test_velocity_forms() {
        let mut params = HashMap::new();
        params.insert("ec".to_string(), "1.5".to_string());
        params.insert("lc".to_string(), "0.4".to_string());
        let p = build_device_params(&params, ActivationMode::Nmos).unwrap();
        assert_eq!(p.velocity, Some(VelocitySaturation::Split { ec: 1.5, l: 0.4 }));

        params.insert("eclc".to_string(), "0.9".to_string());
        let p = build_device_params(&params, ActivationMode::Nmos).unwrap();
        assert_eq!(p.velocity, Some(VelocitySaturation::Combined(0.9)));
    }

    #[test]
    fn test_half_split_velocity_is_error() {
        let card = parse_model_card(".model n1 nmos ec=2.0").unwrap();
        let err = build_device_params(&card.params, ActivationMode::Nmos).unwrap_err();
        assert_eq!(
            err,
            DeviceError::IncompleteVelocitySaturation {
                present: "ec",
                missing: "lc"
            }
        );

        let mut params = HashMap::new();
        params.insert("lpn".to_string(), "0.5".to_string());
        params.insert("eclc".to_string(), "0.9".to_string());
        assert!(matches!(
            build_device_params(&params, ActivationMode::Nmos),
            Err(DeviceError::IncompleteVelocitySaturation { present: "lc", .. })
        ));
    }

    #[test]
    fn test_invalid_number_is_error() {
        let mut params = HashMap::new();
        params.insert("gamma".to_string(), "abc".to_string());
        let err = build_device_params(&params, ActivationMode::Nmos).unwrap_err();
        assert_eq!(
            err,
            DeviceError::InvalidNumber {
                name: "gamma".to_string(),
                value: "abc".to_string()
            }
        );
    }

    #[test]
    fn test_invalid_model_is_error() {
        let mut params = HashMap::new();
        params.insert("model".to_string(), "bsim3".to_string());
        assert!(matches!(
            build_device_params(&params, ActivationMode::Nmos),
            Err(DeviceError::UnknownModel(_))
        ));
    }

    #[test]
    fn test_parse_number_suffixes() {
        assert!((parse_number("1.5").unwrap() - 1.5).abs() < 1e-10);
        assert!((parse_number("1n").unwrap() - 1e-9).abs() < 1e-15);
        assert!((parse_number("1u").unwrap() - 1e-6).abs() < 1e-12);
        assert!((parse_number("10k").unwrap() - 1e4).abs() < 1e-6);
        assert!((parse_number("2.5meg").unwrap() - 2.5e6).abs() < 1.0);
        assert!((parse_number("-0.3").unwrap() + 0.3).abs() < 1e-12);
        assert!((parse_number("1e-3").unwrap() - 1e-3).abs() < 1e-15);
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("volts"), None);
        assert_eq!(parse_number("5µ"), None);
    }

    #[test]
    fn test_parse_model_card() {
        let text = "\
* demo card
.model n1 NMOS (vt=0.3 gamma=0.3
+ phi=0.4 eclc=0.6)
lambda=0
";
        let card = parse_model_card(text).unwrap();
        assert_eq!(card.name.as_deref(), Some("n1"));
        assert_eq!(card.mode, Some(ActivationMode::Nmos));
        assert_eq!(card.params.len(), 5);
        assert_eq!(card.params.get("eclc").map(String::as_str), Some("0.6"));
    }

    #[test]
    fn test_parse_model_card_rejects_bare_token() {
        let err = parse_model_card("vt=0.3 gamma\n").unwrap_err();
        assert!(matches!(err, DeviceError::MalformedCard { line: 1, .. }));
    }

    #[test]
    fn test_parse_model_card_rejects_bad_polarity() {
        let err = parse_model_card(".model x jfet vt=1").unwrap_err();
        assert!(matches!(err, DeviceError::UnknownMode(_)));
    }

    #[test]
    fn test_card_round_trips_into_params() {
        let card = parse_model_card(".model p1 pmos vt=-0.4 u0=80 eclc=1.2").unwrap();
        let mode = card.mode.unwrap_or_default();
        let p = build_device_params(&card.params, mode).unwrap();
        assert_eq!(p.mode, ActivationMode::Pmos);
        assert_abs_diff_eq!(p.body.vt, -0.4);
        assert_abs_diff_eq!(p.process.mobility, 80.0);
        assert_eq!(p.velocity, Some(VelocitySaturation::Combined(1.2)));
    }
}
