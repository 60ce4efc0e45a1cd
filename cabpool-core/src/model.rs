//! Integer linear model of the cab allocation problem.
//!
//! [`LinearModel`] is the solver-agnostic exchange format handed to a
//! [`MipBackend`](crate::MipBackend): bounded integer variables, equality
//! constraints and a linear objective to minimise. [`AllocationModel`] builds
//! one from region counts and keeps the variable layout needed to read the
//! solution back.
//!
//! Variables:
//! - `x_i_j` students from origin `i` riding a cab dispatched at `j`, in
//!   `[0, demand[i]]`;
//! - `y_j` cabs dispatched at `j`, in `[0, total students]`;
//! - `r_j` empty seats left at `j`, in `[0, capacity - 1]`.
//!
//! Constraints: every origin is fully assigned (`sum_j x_i_j = demand[i]`) and
//! every region fills its cabs exactly up to the remainder
//! (`sum_i x_i_j + r_j = capacity * y_j`).

use crate::result::{AssignmentMatrix, SolveResult, SolveResultError};
use crate::{AllocationParams, REGION_COUNT, Region, RegionVector};

/// Distance from the nearest integer below which a solver value is accepted
/// as integral.
pub const INTEGRALITY_TOLERANCE: f64 = 1e-6;

/// Handle to a variable in a [`LinearModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    /// Position of the variable in [`LinearModel::variables`].
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A bounded integer decision variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntVariable {
    /// Diagnostic name, e.g. `x_0_6`.
    pub name: String,
    /// Inclusive lower bound.
    pub lower: i64,
    /// Inclusive upper bound.
    pub upper: i64,
}

/// A coefficient applied to one variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Term {
    /// Variable the coefficient applies to.
    pub var: VarId,
    /// Integer coefficient.
    pub coefficient: i64,
}

impl Term {
    /// Construct a term.
    #[must_use]
    pub const fn new(var: VarId, coefficient: i64) -> Self {
        Self { var, coefficient }
    }
}

/// `sum(terms) == rhs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualityConstraint {
    /// Diagnostic name, e.g. `demand_3`.
    pub name: String,
    /// Left-hand side.
    pub terms: Vec<Term>,
    /// Right-hand side constant.
    pub rhs: i64,
}

/// A minimisation problem over bounded integer variables.
///
/// # Examples
/// ```
/// use cabpool_core::{LinearModel, Term};
///
/// let mut model = LinearModel::new();
/// let a = model.add_variable("a", 0, 5);
/// let b = model.add_variable("b", 0, 5);
/// model.add_equality("sum", vec![Term::new(a, 1), Term::new(b, 1)], 4);
/// model.minimise(vec![Term::new(a, 3), Term::new(b, 1)]);
///
/// assert_eq!(model.evaluate(&[1, 3]), Some(6));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearModel {
    variables: Vec<IntVariable>,
    constraints: Vec<EqualityConstraint>,
    objective: Vec<Term>,
}

impl LinearModel {
    /// Create an empty model.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: Vec::new(),
        }
    }

    /// Declare an integer variable in `[lower, upper]`.
    pub fn add_variable(&mut self, name: impl Into<String>, lower: i64, upper: i64) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(IntVariable {
            name: name.into(),
            lower,
            upper,
        });
        id
    }

    /// Add `sum(terms) == rhs`.
    pub fn add_equality(&mut self, name: impl Into<String>, terms: Vec<Term>, rhs: i64) {
        self.constraints.push(EqualityConstraint {
            name: name.into(),
            terms,
            rhs,
        });
    }

    /// Replace the objective with `minimise sum(terms)`.
    pub fn minimise(&mut self, terms: Vec<Term>) {
        self.objective = terms;
    }

    /// Declared variables, indexable by [`VarId::index`].
    #[must_use]
    pub fn variables(&self) -> &[IntVariable] {
        &self.variables
    }

    /// Equality constraints in insertion order.
    #[must_use]
    pub fn constraints(&self) -> &[EqualityConstraint] {
        &self.constraints
    }

    /// Objective terms.
    #[must_use]
    pub fn objective(&self) -> &[Term] {
        &self.objective
    }

    /// Objective value of an integer assignment, or `None` if `values` does
    /// not cover every variable the objective mentions.
    #[must_use]
    pub fn evaluate(&self, values: &[i64]) -> Option<i64> {
        self.objective.iter().try_fold(0_i64, |acc, term| {
            let value = values.get(term.var.index())?;
            acc.checked_add(term.coefficient.checked_mul(*value)?)
        })
    }
}

/// Where each allocation variable lives inside the [`LinearModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableLayout {
    assignments: [[VarId; REGION_COUNT]; REGION_COUNT],
    vehicles: [VarId; REGION_COUNT],
    unused_seats: [VarId; REGION_COUNT],
}

impl VariableLayout {
    /// `x_i_j`: students from `origin` riding from `destination`.
    #[must_use]
    pub const fn assignment(&self, origin: Region, destination: Region) -> VarId {
        self.assignments[origin.index()][destination.index()]
    }

    /// `y_j`: cabs dispatched at `region`.
    #[must_use]
    pub const fn vehicles(&self, region: Region) -> VarId {
        self.vehicles[region.index()]
    }

    /// `r_j`: empty seats left at `region`.
    #[must_use]
    pub const fn unused_seats(&self, region: Region) -> VarId {
        self.unused_seats[region.index()]
    }
}

/// The allocation problem for one set of region counts.
///
/// A model is built per request and never shared between solves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationModel {
    linear: LinearModel,
    layout: VariableLayout,
    demand: RegionVector,
    params: AllocationParams,
}

impl AllocationModel {
    /// Build the model for `demand` under `params`.
    ///
    /// # Examples
    /// ```
    /// use cabpool_core::{AllocationModel, AllocationParams, RegionVector};
    ///
    /// let demand = RegionVector::from_counts([7, 0, 0, 0, 0, 0, 0]);
    /// let model = AllocationModel::build(&demand, &AllocationParams::default());
    /// assert_eq!(model.linear().variables().len(), 63);
    /// assert_eq!(model.linear().constraints().len(), 14);
    /// ```
    #[must_use]
    pub fn build(demand: &RegionVector, params: &AllocationParams) -> Self {
        let mut linear = LinearModel::new();
        let total = i64::try_from(demand.total()).unwrap_or(i64::MAX);

        let assignments = Region::ALL.map(|origin| {
            Region::ALL.map(|destination| {
                linear.add_variable(
                    format!("x_{}_{}", origin.index(), destination.index()),
                    0,
                    i64::from(demand[origin]),
                )
            })
        });
        let vehicles = Region::ALL
            .map(|region| linear.add_variable(format!("y_{}", region.index()), 0, total));
        let unused_seats = Region::ALL.map(|region| {
            linear.add_variable(
                format!("r_{}", region.index()),
                0,
                i64::from(params.capacity) - 1,
            )
        });
        let layout = VariableLayout {
            assignments,
            vehicles,
            unused_seats,
        };

        for origin in Region::ALL {
            let terms = Region::ALL
                .into_iter()
                .map(|destination| Term::new(layout.assignment(origin, destination), 1))
                .collect();
            linear.add_equality(
                format!("demand_{}", origin.index()),
                terms,
                i64::from(demand[origin]),
            );
        }

        for destination in Region::ALL {
            let mut terms: Vec<Term> = Region::ALL
                .into_iter()
                .map(|origin| Term::new(layout.assignment(origin, destination), 1))
                .collect();
            terms.push(Term::new(layout.unused_seats(destination), 1));
            terms.push(Term::new(
                layout.vehicles(destination),
                -i64::from(params.capacity),
            ));
            linear.add_equality(format!("capacity_{}", destination.index()), terms, 0);
        }

        let mut objective: Vec<Term> = Region::ALL
            .into_iter()
            .map(|region| Term::new(layout.vehicles(region), i64::from(params.vehicle_cost)))
            .collect();
        for origin in Region::ALL {
            for destination in Region::ALL {
                let weight = params.swap_cost(origin, destination);
                if weight != 0 {
                    objective.push(Term::new(
                        layout.assignment(origin, destination),
                        i64::try_from(weight).unwrap_or(i64::MAX),
                    ));
                }
            }
        }
        linear.minimise(objective);

        log::debug!(
            "built allocation model for {total} students: {} variables, {} constraints",
            linear.variables().len(),
            linear.constraints().len()
        );

        Self {
            linear,
            layout,
            demand: *demand,
            params: *params,
        }
    }

    /// The solver-facing model.
    #[must_use]
    pub const fn linear(&self) -> &LinearModel {
        &self.linear
    }

    /// Variable positions inside [`Self::linear`].
    #[must_use]
    pub const fn layout(&self) -> &VariableLayout {
        &self.layout
    }

    /// Region counts the model was built for.
    #[must_use]
    pub const fn demand(&self) -> &RegionVector {
        &self.demand
    }

    /// Turn raw solver values (one per variable) into a validated
    /// [`SolveResult`].
    ///
    /// # Errors
    /// Fails when the values do not match the model shape, are not integral,
    /// fall outside the supported range, or break an allocation invariant.
    pub fn extract(&self, values: &[f64]) -> Result<SolveResult, SolveResultError> {
        let expected = self.linear.variables().len();
        if values.len() != expected {
            return Err(SolveResultError::ValueCount {
                expected,
                found: values.len(),
            });
        }
        let integral = values
            .iter()
            .zip(self.linear.variables())
            .map(|(&value, variable)| round_integral(variable, value))
            .collect::<Result<Vec<i64>, _>>()?;

        let objective = self
            .linear
            .evaluate(&integral)
            .and_then(|cost| u64::try_from(cost).ok())
            .ok_or(SolveResultError::ObjectiveOverflow)?;

        let read = |id: VarId| -> Result<u32, SolveResultError> {
            let value = integral.get(id.index()).copied().unwrap_or_default();
            u32::try_from(value).map_err(|_| SolveResultError::OutOfRange {
                variable: self
                    .linear
                    .variables()
                    .get(id.index())
                    .map(|variable| variable.name.clone())
                    .unwrap_or_default(),
                value,
            })
        };

        let mut assignments: AssignmentMatrix = [[0; REGION_COUNT]; REGION_COUNT];
        let mut vehicles = [0_u32; REGION_COUNT];
        let mut unused_seats = [0_u32; REGION_COUNT];
        for origin in Region::ALL {
            for destination in Region::ALL {
                assignments[origin.index()][destination.index()] =
                    read(self.layout.assignment(origin, destination))?;
            }
        }
        for region in Region::ALL {
            vehicles[region.index()] = read(self.layout.vehicles(region))?;
            unused_seats[region.index()] = read(self.layout.unused_seats(region))?;
        }

        SolveResult::new(
            &self.demand,
            &self.params,
            assignments,
            vehicles,
            unused_seats,
            objective,
        )
    }
}

fn round_integral(variable: &IntVariable, value: f64) -> Result<i64, SolveResultError> {
    let rounded = value.round();
    if !value.is_finite() || (value - rounded).abs() > INTEGRALITY_TOLERANCE {
        return Err(SolveResultError::NonIntegral {
            variable: variable.name.clone(),
            value,
        });
    }
    Ok(rounded as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn demand() -> RegionVector {
        RegionVector::from_counts([3, 0, 0, 0, 0, 0, 4])
    }

    #[fixture]
    fn model(demand: RegionVector) -> AllocationModel {
        AllocationModel::build(&demand, &AllocationParams::default())
    }

    fn value_vector(
        model: &AllocationModel,
        assignments: &[(Region, Region, u32)],
        vehicles: &[(Region, u32)],
        unused: &[(Region, u32)],
    ) -> Vec<f64> {
        let mut values = vec![0.0; model.linear().variables().len()];
        let layout = model.layout();
        let entries = assignments
            .iter()
            .map(|&(o, d, v)| (layout.assignment(o, d), v))
            .chain(vehicles.iter().map(|&(r, v)| (layout.vehicles(r), v)))
            .chain(unused.iter().map(|&(r, v)| (layout.unused_seats(r), v)));
        for (id, value) in entries {
            values[id.index()] = f64::from(value);
        }
        values
    }

    #[rstest]
    fn variable_bounds_follow_demand(model: AllocationModel) {
        let variables = model.linear().variables();
        let x_0_6 = &variables[model.layout().assignment(Region::RkRp, Region::PanLoop).index()];
        assert_eq!(x_0_6.name, "x_0_6");
        assert_eq!((x_0_6.lower, x_0_6.upper), (0, 3));

        let y_2 = &variables[model.layout().vehicles(Region::Ms).index()];
        assert_eq!((y_2.lower, y_2.upper), (0, 7));

        let r_4 = &variables[model.layout().unused_seats(Region::Llr).index()];
        assert_eq!((r_4.lower, r_4.upper), (0, 6));
    }

    #[rstest]
    fn constraints_cover_demand_and_capacity(model: AllocationModel) {
        let constraints = model.linear().constraints();
        assert_eq!(constraints.len(), 2 * REGION_COUNT);

        let demand_6 = &constraints[6];
        assert_eq!(demand_6.name, "demand_6");
        assert_eq!(demand_6.rhs, 4);
        assert_eq!(demand_6.terms.len(), REGION_COUNT);

        let capacity_0 = &constraints[REGION_COUNT];
        assert_eq!(capacity_0.name, "capacity_0");
        assert_eq!(capacity_0.rhs, 0);
        assert!(capacity_0.terms.contains(&Term::new(
            model.layout().vehicles(Region::RkRp),
            -7
        )));
        assert!(capacity_0.terms.contains(&Term::new(
            model.layout().unused_seats(Region::RkRp),
            1
        )));
    }

    #[rstest]
    fn objective_skips_diagonal_and_weights_directions(model: AllocationModel) {
        let objective = model.linear().objective();
        // 7 cab terms plus 42 off-diagonal swap terms.
        assert_eq!(objective.len(), REGION_COUNT + 42);
        let layout = model.layout();
        let towards_gate = layout.assignment(Region::RkRp, Region::PanLoop);
        let away_from_gate = layout.assignment(Region::PanLoop, Region::RkRp);
        assert!(objective.contains(&Term::new(towards_gate, 6)));
        assert!(objective.contains(&Term::new(away_from_gate, 60)));
        assert!(
            !objective
                .iter()
                .any(|term| term.var == layout.assignment(Region::Ms, Region::Ms))
        );
    }

    #[rstest]
    fn extract_builds_result_and_recomputes_cost(model: AllocationModel) {
        let values = value_vector(
            &model,
            &[
                (Region::RkRp, Region::PanLoop, 3),
                (Region::PanLoop, Region::PanLoop, 4),
            ],
            &[(Region::PanLoop, 1)],
            &[],
        );
        let result = model.extract(&values).expect("consistent values");
        assert_eq!(result.objective_cost(), 118);
        assert_eq!(result.vehicles()[6], 1);
    }

    #[rstest]
    fn extract_tolerates_solver_noise(model: AllocationModel) {
        let mut values = value_vector(
            &model,
            &[
                (Region::RkRp, Region::RkRp, 3),
                (Region::PanLoop, Region::PanLoop, 4),
            ],
            &[(Region::RkRp, 1), (Region::PanLoop, 1)],
            &[(Region::RkRp, 4), (Region::PanLoop, 3)],
        );
        let id = model.layout().vehicles(Region::RkRp).index();
        values[id] = 0.999_999_9;
        let result = model.extract(&values).expect("noise within tolerance");
        assert_eq!(result.objective_cost(), 200);
    }

    #[rstest]
    fn extract_rejects_fractional_values(model: AllocationModel) {
        let mut values = vec![0.0; model.linear().variables().len()];
        values[0] = 0.5;
        let err = model.extract(&values).unwrap_err();
        assert!(matches!(
            err,
            SolveResultError::NonIntegral { ref variable, .. } if variable == "x_0_0"
        ));
    }

    #[rstest]
    fn extract_rejects_wrong_value_count(model: AllocationModel) {
        let err = model.extract(&[0.0; 3]).unwrap_err();
        assert_eq!(
            err,
            SolveResultError::ValueCount {
                expected: 63,
                found: 3
            }
        );
    }

    #[rstest]
    fn extract_rejects_negative_values(model: AllocationModel) {
        let mut values = vec![0.0; model.linear().variables().len()];
        let id = model.layout().unused_seats(Region::Ms).index();
        values[id] = -1.0;
        let err = model.extract(&values).unwrap_err();
        assert!(matches!(err, SolveResultError::OutOfRange { value: -1, .. }));
    }

    #[rstest]
    fn evaluate_requires_every_objective_value() {
        let mut model = LinearModel::new();
        let a = model.add_variable("a", 0, 1);
        model.minimise(vec![Term::new(a, 2)]);
        assert_eq!(model.evaluate(&[]), None);
        assert_eq!(model.evaluate(&[1]), Some(2));
    }
}
