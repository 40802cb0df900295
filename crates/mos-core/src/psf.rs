use crate::result_store::RunResult;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Render a run as PSF-style text.
///
/// `precision` is the number of significant digits in the exponent
/// notation used for every value (at least one).
pub fn render_psf_text(run: &RunResult, precision: usize) -> String {
    let precision = precision.max(1) - 1;
    let mut out = String::new();
    out.push_str("PSF_TEXT\n");
    out.push_str(&format!("analysis={:?}\n", run.analysis));
    out.push_str(&format!("status={:?}\n", run.status));
    out.push_str(&format!("mode={}\n", run.mode));
    out.push_str(&format!("model={}\n", run.model));
    if let Some(terminal) = run.sweep_terminal {
        out.push_str(&format!("sweep={}\n", terminal));
    }
    out.push_str(&format!("points={}\n", run.points.len()));
    out.push_str("signals:\n");
    for name in ["vg", "vs", "vd", "vb", "region", "id"] {
        out.push_str(&format!("- {}\n", name));
    }
    out.push_str("values:\n");
    for point in &run.points {
        let t = &point.terminals;
        out.push_str(&format!(
            "{:.*e} {:.*e} {:.*e} {:.*e} {} {:.*e}\n",
            precision,
            t.vg,
            precision,
            t.vs,
            precision,
            t.vd,
            precision,
            t.vb,
            point.region,
            precision,
            point.current
        ));
    }
    out
}

pub fn write_psf_text(run: &RunResult, path: &Path, precision: usize) -> Result<()> {
    fs::write(path, render_psf_text(run, precision))?;
    Ok(())
}
