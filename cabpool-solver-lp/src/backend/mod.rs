//! `LpBackend` implementation backed by `good_lp`.
//!
//! Every [`LinearModel`] variable becomes a bounded integer `good_lp`
//! variable in the same order, so solution values can be read back by
//! position.

use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    default_solver, variable,
};

use cabpool_core::{LinearModel, MipBackend, MipSolution, MipStatus, Term};

/// Exact MILP backend using the pure-Rust `microlp` solver.
///
/// The backend is stateless: each call to [`MipBackend::solve`] builds and
/// solves a fresh problem, so one instance may serve any number of requests.
///
/// # Examples
/// ```
/// use cabpool_core::{Allocator, MipStatus};
/// use cabpool_solver_lp::LpBackend;
///
/// let allocator = Allocator::new(LpBackend::new());
/// let outcome = allocator.allocate(&[7, 0, 0, 0, 0, 0, 0]).unwrap();
/// let result = outcome.solved().unwrap();
/// assert_eq!(result.objective_cost(), 100);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct LpBackend;

impl LpBackend {
    /// Construct the backend.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl MipBackend for LpBackend {
    fn solve(&self, model: &LinearModel) -> MipSolution {
        let mut problem_variables = ProblemVariables::new();
        let variables: Vec<Variable> = model
            .variables()
            .iter()
            .map(|definition| {
                problem_variables.add(
                    variable()
                        .integer()
                        .min(to_float(definition.lower))
                        .max(to_float(definition.upper))
                        .name(definition.name.clone()),
                )
            })
            .collect();

        let objective = expression(model.objective(), &variables);
        let mut problem = problem_variables.minimise(objective).using(default_solver);
        for equality in model.constraints() {
            let lhs = expression(&equality.terms, &variables);
            let rhs = to_float(equality.rhs);
            problem = problem.with(constraint!(lhs == rhs));
        }

        match problem.solve() {
            Ok(solution) => {
                let values = variables.iter().map(|&var| solution.value(var)).collect();
                log::debug!(
                    "microlp solved {} variables under {} constraints",
                    variables.len(),
                    model.constraints().len()
                );
                MipSolution::solved(MipStatus::Optimal, values)
            }
            Err(err) => {
                let status = status_for(&err);
                log::warn!("microlp stopped without a solution: {err}");
                MipSolution::failed(status)
            }
        }
    }
}

fn expression(terms: &[Term], variables: &[Variable]) -> Expression {
    let mut expr = Expression::with_capacity(terms.len());
    for term in terms {
        // Every `VarId` in a model indexes that model's own variables.
        if let Some(&var) = variables.get(term.var.index()) {
            expr.add_mul(to_float(term.coefficient), var);
        }
    }
    expr
}

fn status_for(err: &ResolutionError) -> MipStatus {
    match err {
        ResolutionError::Infeasible => MipStatus::Infeasible,
        ResolutionError::Unbounded => MipStatus::Unbounded,
        _ => MipStatus::Unknown,
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "model bounds and coefficients are head counts and small costs"
)]
const fn to_float(value: i64) -> f64 {
    value as f64
}
