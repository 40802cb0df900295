use std::sync::Arc;

use mos_devices::mosfet::{evaluate, DeviceParams, DiagnosticSink, Terminals, TracingSink};

use crate::analysis::{sweep_values, AnalysisCmd, AnalysisPlan, Terminal};
use crate::error::Result;
use crate::result_store::{
    AnalysisType, OperatingPoint, ResultStore, RunId, RunResult, RunStatus,
};

/// Runs analyses against one device
///
/// Holds no state between runs; history lives in a [`ResultStore`].
#[derive(Clone)]
pub struct Engine {
    pub device: DeviceParams,
    sink: Arc<dyn DiagnosticSink>,
}

impl Engine {
    /// Engine reporting advisories through `tracing`.
    pub fn new(device: DeviceParams) -> Self {
        Self::with_sink(device, Arc::new(TracingSink))
    }

    pub fn with_sink(device: DeviceParams, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self { device, sink }
    }

    pub fn run(&self, plan: &AnalysisPlan) -> Result<RunResult> {
        match plan.cmd {
            AnalysisCmd::Op => self.run_op(&plan.terminals),
            AnalysisCmd::Sweep {
                terminal,
                start,
                stop,
                step,
            } => self.run_sweep(&plan.terminals, terminal, start, stop, step),
        }
    }

    pub fn run_with_store(&self, plan: &AnalysisPlan, store: &mut ResultStore) -> Result<RunId> {
        let result = self.run(plan)?;
        Ok(store.add_run(result))
    }

    fn run_op(&self, terminals: &Terminals) -> Result<RunResult> {
        let _span = tracing::info_span!("op", mode = %self.device.mode, model = %self.device.model)
            .entered();
        let point = self.evaluate_point(terminals)?;
        tracing::debug!(region = %point.region, current = point.current, "op evaluated");
        Ok(self.finish(AnalysisType::Op, None, vec![point]))
    }

    fn run_sweep(
        &self,
        base: &Terminals,
        terminal: Terminal,
        start: f64,
        stop: f64,
        step: f64,
    ) -> Result<RunResult> {
        let values = sweep_values(start, stop, step)?;
        let _span = tracing::info_span!(
            "sweep",
            terminal = %terminal,
            points = values.len(),
            mode = %self.device.mode,
            model = %self.device.model
        )
        .entered();

        let points = values
            .iter()
            .map(|&v| self.evaluate_point(&terminal.apply(base, v)))
            .collect::<Result<Vec<_>>>()?;
        tracing::debug!(points = points.len(), "sweep evaluated");
        Ok(self.finish(AnalysisType::Sweep, Some(terminal), points))
    }

    fn evaluate_point(&self, terminals: &Terminals) -> Result<OperatingPoint> {
        let result = evaluate(&self.device, terminals, self.sink.as_ref())?;
        Ok(OperatingPoint {
            terminals: *terminals,
            region: result.region,
            current: result.current,
        })
    }

    fn finish(
        &self,
        analysis: AnalysisType,
        sweep_terminal: Option<Terminal>,
        points: Vec<OperatingPoint>,
    ) -> RunResult {
        let bad = points.iter().position(|p| !p.current.is_finite());
        let (status, message) = match bad {
            None => (RunStatus::Completed, None),
            Some(idx) => {
                let p = &points[idx];
                let message = format!(
                    "non-finite current {} at point {} (vg={} vs={} vd={} vb={})",
                    p.current, idx, p.terminals.vg, p.terminals.vs, p.terminals.vd, p.terminals.vb
                );
                tracing::warn!("{}", message);
                (RunStatus::NonFinite, Some(message))
            }
        };
        RunResult {
            id: RunId(0),
            analysis,
            status,
            mode: self.device.mode,
            model: self.device.model,
            sweep_terminal,
            points,
            message,
        }
    }
}
