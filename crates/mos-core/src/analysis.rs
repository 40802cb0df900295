use std::fmt;
use std::str::FromStr;

use mos_devices::Terminals;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Upper bound on points generated by one sweep.
pub const MAX_SWEEP_POINTS: usize = 1_000_000;

const SNAP_TOLERANCE: f64 = 1e-9;

/// Device terminal that a sweep varies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terminal {
    Gate,
    Source,
    Drain,
    Body,
}

impl Terminal {
    /// Copy of `base` with this terminal set to `value`.
    pub fn apply(&self, base: &Terminals, value: f64) -> Terminals {
        let mut t = *base;
        match self {
            Terminal::Gate => t.vg = value,
            Terminal::Source => t.vs = value,
            Terminal::Drain => t.vd = value,
            Terminal::Body => t.vb = value,
        }
        t
    }

    pub fn signal_name(&self) -> &'static str {
        match self {
            Terminal::Gate => "vg",
            Terminal::Source => "vs",
            Terminal::Drain => "vd",
            Terminal::Body => "vb",
        }
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.signal_name())
    }
}

impl FromStr for Terminal {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gate" | "g" | "vg" => Ok(Terminal::Gate),
            "source" | "s" | "vs" => Ok(Terminal::Source),
            "drain" | "d" | "vd" => Ok(Terminal::Drain),
            "body" | "bulk" | "b" | "vb" => Ok(Terminal::Body),
            _ => Err(CoreError::UnknownTerminal(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AnalysisCmd {
    Op,
    Sweep {
        terminal: Terminal,
        start: f64,
        stop: f64,
        step: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPlan {
    pub cmd: AnalysisCmd,
    /// Terminal voltages for an op, and the fixed terminals of a sweep
    pub terminals: Terminals,
}

impl AnalysisPlan {
    pub fn op(terminals: Terminals) -> Self {
        Self {
            cmd: AnalysisCmd::Op,
            terminals,
        }
    }

    pub fn sweep(terminals: Terminals, terminal: Terminal, start: f64, stop: f64, step: f64) -> Self {
        Self {
            cmd: AnalysisCmd::Sweep {
                terminal,
                start,
                stop,
                step,
            },
            terminals,
        }
    }
}

/// Number of points a sweep from `start` to `stop` by `step` produces.
///
/// Fails for non-finite bounds, a zero step, a step pointing away from
/// `stop`, or more than [`MAX_SWEEP_POINTS`] points.
pub fn sweep_point_count(start: f64, stop: f64, step: f64) -> Result<usize> {
    if !(start.is_finite() && stop.is_finite() && step.is_finite()) {
        return Err(CoreError::InvalidSweep(format!(
            "non-finite bounds: start={} stop={} step={}",
            start, stop, step
        )));
    }
    if step == 0.0 {
        return Err(CoreError::InvalidSweep("step must be non-zero".to_string()));
    }
    if (stop - start) * step < 0.0 {
        return Err(CoreError::InvalidSweep(format!(
            "step {} moves away from stop {} (start {})",
            step, stop, start
        )));
    }

    let intervals = ((stop - start) / step + SNAP_TOLERANCE).floor();
    if intervals >= MAX_SWEEP_POINTS as f64 {
        return Err(CoreError::InvalidSweep(format!(
            "sweep would produce more than {} points",
            MAX_SWEEP_POINTS
        )));
    }
    Ok(intervals as usize + 1)
}

/// Sweep points from `start` to `stop` inclusive.
///
/// Points are `start + i*step` so that rounding does not accumulate; a
/// last point within `|step| * 1e-9` of `stop` is snapped onto it.
pub fn sweep_values(start: f64, stop: f64, step: f64) -> Result<Vec<f64>> {
    let count = sweep_point_count(start, stop, step)?;
    let values = (0..count)
        .map(|i| {
            let v = start + i as f64 * step;
            if (v - stop).abs() <= step.abs() * SNAP_TOLERANCE {
                stop
            } else {
                v
            }
        })
        .collect();
    Ok(values)
}
