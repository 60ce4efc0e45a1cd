//! Solver boundary and the allocation driver.
//!
//! A [`MipBackend`] is an opaque optimisation oracle: it receives a
//! [`LinearModel`] and reports a status plus one value per variable. The
//! [`Allocator`] owns the rest of a request: validate the input, build a
//! fresh model, call the backend once, and turn the values into a
//! [`SolveResult`].

use thiserror::Error;

use crate::model::{AllocationModel, LinearModel};
use crate::{
    AllocationParams, ParamsError, RegionVector, RegionVectorError, SolveResult, SolveResultError,
};

/// Terminal status reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MipStatus {
    /// Proven optimal.
    Optimal,
    /// Feasible, optimality not proven.
    Feasible,
    /// Proven infeasible.
    Infeasible,
    /// Objective unbounded.
    Unbounded,
    /// The backend stopped without a usable answer.
    Unknown,
}

impl MipStatus {
    /// Whether the accompanying values describe a solution.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Optimal | Self::Feasible)
    }
}

impl std::fmt::Display for MipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Optimal => "optimal",
            Self::Feasible => "feasible",
            Self::Infeasible => "infeasible",
            Self::Unbounded => "unbounded",
            Self::Unknown => "unknown",
        })
    }
}

/// Raw backend answer.
#[derive(Debug, Clone, PartialEq)]
pub struct MipSolution {
    /// Terminal status.
    pub status: MipStatus,
    /// One value per model variable, indexed by
    /// [`VarId::index`](crate::VarId::index). Empty unless the status is a
    /// success.
    pub values: Vec<f64>,
}

impl MipSolution {
    /// A successful answer.
    #[must_use]
    pub const fn solved(status: MipStatus, values: Vec<f64>) -> Self {
        Self { status, values }
    }

    /// An answer without values.
    #[must_use]
    pub const fn failed(status: MipStatus) -> Self {
        Self {
            status,
            values: Vec::new(),
        }
    }
}

/// Solve a [`LinearModel`] to a terminal status.
///
/// Implementations block until the underlying solver stops and must report
/// failures through [`MipStatus`] rather than panicking. Backends must be
/// `Send + Sync` so one instance can serve independent requests.
pub trait MipBackend: Send + Sync {
    /// Minimise `model`, returning the status and variable values.
    fn solve(&self, model: &LinearModel) -> MipSolution;
}

impl<T: MipBackend + ?Sized> MipBackend for &T {
    fn solve(&self, model: &LinearModel) -> MipSolution {
        (**self).solve(model)
    }
}

impl<T: MipBackend + ?Sized> MipBackend for Box<T> {
    fn solve(&self, model: &LinearModel) -> MipSolution {
        (**self).solve(model)
    }
}

/// Outcome of one allocation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allocation {
    /// The backend found an allocation.
    Solved(SolveResult),
    /// The backend stopped without one. Callers surface this to the user; it
    /// is not an error in the request.
    NoSolution {
        /// Status the backend reported.
        status: MipStatus,
    },
}

impl Allocation {
    /// The result, if any.
    #[must_use]
    pub const fn solved(&self) -> Option<&SolveResult> {
        match self {
            Self::Solved(result) => Some(result),
            Self::NoSolution { .. } => None,
        }
    }

    /// Consume the outcome, keeping the result if any.
    #[must_use]
    pub fn into_solved(self) -> Option<SolveResult> {
        match self {
            Self::Solved(result) => Some(result),
            Self::NoSolution { .. } => None,
        }
    }
}

/// Errors returned by [`Allocator::allocate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AllocationError {
    /// The region counts were rejected before any model was built.
    #[error("invalid region counts: {0}")]
    InvalidInput(#[from] RegionVectorError),
    /// The allocator's parameters were rejected before any model was built.
    #[error("invalid allocation parameters: {0}")]
    InvalidParams(#[from] ParamsError),
    /// The backend claimed success but its values do not form a valid
    /// allocation.
    #[error("solver returned an inconsistent allocation: {0}")]
    InconsistentSolution(#[from] SolveResultError),
}

/// Drives a single allocation per call against a [`MipBackend`].
///
/// # Examples
/// ```
/// use cabpool_core::{Allocation, Allocator, LinearModel, MipBackend, MipSolution, MipStatus};
///
/// struct Refusing;
///
/// impl MipBackend for Refusing {
///     fn solve(&self, _model: &LinearModel) -> MipSolution {
///         MipSolution::failed(MipStatus::Infeasible)
///     }
/// }
///
/// let allocator = Allocator::new(Refusing);
/// let outcome = allocator.allocate(&[1, 0, 0, 0, 0, 0, 0]).unwrap();
/// assert_eq!(outcome, Allocation::NoSolution { status: MipStatus::Infeasible });
/// assert!(allocator.allocate(&[1, 2, 3]).is_err());
/// ```
#[derive(Debug, Clone)]
pub struct Allocator<B> {
    backend: B,
    params: AllocationParams,
}

impl<B: MipBackend> Allocator<B> {
    /// Construct an allocator with the default parameters.
    pub fn new(backend: B) -> Self {
        Self::with_params(backend, AllocationParams::default())
    }

    /// Construct an allocator with explicit parameters.
    pub const fn with_params(backend: B, params: AllocationParams) -> Self {
        Self { backend, params }
    }

    /// Parameters every request is solved under.
    pub const fn params(&self) -> &AllocationParams {
        &self.params
    }

    /// Validate raw counts and allocate them.
    ///
    /// # Errors
    /// Returns [`AllocationError::InvalidInput`] for malformed counts; the
    /// backend is not called in that case. See [`Self::allocate_vector`] for
    /// the remaining errors.
    pub fn allocate(&self, counts: &[i64]) -> Result<Allocation, AllocationError> {
        let demand = RegionVector::new(counts)?;
        self.allocate_vector(&demand)
    }

    /// Allocate already validated counts.
    ///
    /// # Errors
    /// Returns [`AllocationError::InvalidParams`] for a zero capacity and
    /// [`AllocationError::InvalidInput`] for counts above
    /// [`MAX_REGION_STUDENTS`](crate::MAX_REGION_STUDENTS); the backend is not
    /// called in either case. Returns [`AllocationError::InconsistentSolution`]
    /// when the backend reports success with values that break an allocation
    /// invariant.
    pub fn allocate_vector(&self, demand: &RegionVector) -> Result<Allocation, AllocationError> {
        self.params.validate()?;
        demand.ensure_supported()?;
        let model = AllocationModel::build(demand, &self.params);
        let solution = self.backend.solve(model.linear());
        if !solution.status.is_success() {
            log::warn!(
                "solver finished without an allocation (status: {})",
                solution.status
            );
            return Ok(Allocation::NoSolution {
                status: solution.status,
            });
        }

        let result = model.extract(&solution.values).inspect_err(|err| {
            log::error!("solver reported {} but {err}", solution.status);
        })?;
        log::debug!(
            "allocated {} students to {} cabs at cost {}",
            result.total_students(),
            result.total_vehicles(),
            result.objective_cost()
        );
        Ok(Allocation::Solved(result))
    }
}
