//! Scripted [`MipBackend`] used by unit and behaviour tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{LinearModel, MipBackend, MipSolution, MipStatus, REGION_COUNT};

#[derive(Debug, Clone)]
enum Script {
    Fail(MipStatus),
    Values(MipStatus, Vec<f64>),
    StayAtHome,
}

/// Backend that answers from a script and counts how often it is called.
#[derive(Debug)]
pub struct ScriptedBackend {
    script: Script,
    calls: AtomicUsize,
    last_model: Mutex<Option<LinearModel>>,
}

impl ScriptedBackend {
    fn scripted(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            last_model: Mutex::new(None),
        }
    }

    /// Always report `status` without values.
    #[must_use]
    pub fn failing(status: MipStatus) -> Self {
        Self::scripted(Script::Fail(status))
    }

    /// Always report `status` with `values`, whatever the model.
    #[must_use]
    pub fn with_values(status: MipStatus, values: Vec<f64>) -> Self {
        Self::scripted(Script::Values(status, values))
    }

    /// Seat every student in a cab from their own region.
    ///
    /// The answer is feasible for any allocation model but only optimal when
    /// no consolidation is cheaper.
    #[must_use]
    pub fn stay_at_home() -> Self {
        Self::scripted(Script::StayAtHome)
    }

    /// Number of `solve` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Copy of the model passed to the most recent call.
    pub fn last_model(&self) -> Option<LinearModel> {
        self.last_model.lock().ok().and_then(|model| model.clone())
    }
}

impl MipBackend for ScriptedBackend {
    fn solve(&self, model: &LinearModel) -> MipSolution {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_model.lock() {
            *last = Some(model.clone());
        }
        match &self.script {
            Script::Fail(status) => MipSolution::failed(*status),
            Script::Values(status, values) => MipSolution::solved(*status, values.clone()),
            Script::StayAtHome => MipSolution::solved(MipStatus::Optimal, stay_at_home(model)),
        }
    }
}

/// Values for the allocation layout: `x_i_j` row-major, then `y_j`, then
/// `r_j`. Demand and capacity are read back from the variable bounds.
fn stay_at_home(model: &LinearModel) -> Vec<f64> {
    let variables = model.variables();
    let cells = REGION_COUNT * REGION_COUNT;
    let capacity = variables
        .get(cells + 2 * REGION_COUNT)
        .map_or(1, |unused| unused.upper + 1);
    let mut values = vec![0.0; variables.len()];
    for region in 0..REGION_COUNT {
        let home = region * REGION_COUNT + region;
        let demand = variables.get(home).map_or(0, |cell| cell.upper);
        let cabs = if demand == 0 { 0 } else { (demand - 1) / capacity + 1 };
        values[home] = demand as f64;
        values[cells + region] = cabs as f64;
        values[cells + REGION_COUNT + region] = (cabs * capacity - demand) as f64;
    }
    values
}
