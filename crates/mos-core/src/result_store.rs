use std::collections::VecDeque;

use mos_devices::{ActivationMode, ModelSelector, OperatingRegion, Terminals};
use serde::{Deserialize, Serialize};

use crate::analysis::Terminal;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisType {
    Op,
    Sweep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Every point produced a finite current
    Completed,
    /// At least one point produced NaN or an infinity
    NonFinite,
}

/// One evaluated bias point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatingPoint {
    pub terminals: Terminals,
    pub region: OperatingRegion,
    pub current: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub id: RunId,
    pub analysis: AnalysisType,
    pub status: RunStatus,
    pub mode: ActivationMode,
    pub model: ModelSelector,
    /// Swept terminal, for sweeps
    pub sweep_terminal: Option<Terminal>,
    pub points: Vec<OperatingPoint>,
    pub message: Option<String>,
}

/// Run history in insertion order.
///
/// A bounded store drops its oldest runs once it holds `max_runs`; ids keep
/// counting up, so an evicted id reports [`CoreError::RunNotFound`].
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    pub runs: VecDeque<RunResult>,
    max_runs: Option<usize>,
    evicted: usize,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bounded(max_runs: usize) -> Self {
        Self {
            max_runs: Some(max_runs.max(1)),
            ..Self::default()
        }
    }

    pub fn add_run(&mut self, mut run: RunResult) -> RunId {
        let id = RunId(self.evicted + self.runs.len());
        run.id = id;
        self.runs.push_back(run);
        if let Some(max) = self.max_runs {
            while self.runs.len() > max {
                if let Some(old) = self.runs.pop_front() {
                    tracing::debug!(run = old.id.0, points = old.points.len(), "evicting run");
                }
                self.evicted += 1;
            }
        }
        id
    }

    pub fn get(&self, id: RunId) -> Result<&RunResult> {
        id.0
            .checked_sub(self.evicted)
            .and_then(|idx| self.runs.get(idx))
            .ok_or(CoreError::RunNotFound(id.0))
    }

    pub fn write_psf_text(
        &self,
        id: RunId,
        path: &std::path::Path,
        precision: usize,
    ) -> Result<()> {
        let run = self.get(id)?;
        crate::psf::write_psf_text(run, path, precision)
    }
}
