//! Validated outcome of a successful allocation solve.

use thiserror::Error;

use crate::{AllocationParams, REGION_COUNT, Region, RegionVector};

/// `matrix[origin][destination]`: students from `origin` riding a cab
/// dispatched at `destination`.
pub type AssignmentMatrix = [[u32; REGION_COUNT]; REGION_COUNT];

/// One count per region, e.g. cabs dispatched or seats left empty.
pub type VehicleCounts = [u32; REGION_COUNT];

/// Errors raised when solver output does not describe a valid allocation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveResultError {
    /// The solver returned a different number of values than the model has
    /// variables.
    #[error("expected {expected} solver values, found {found}")]
    ValueCount {
        /// Variables in the model.
        expected: usize,
        /// Values returned.
        found: usize,
    },
    /// A value was not (close enough to) an integer.
    #[error("variable {variable} has non-integral value {value}")]
    NonIntegral {
        /// Variable name.
        variable: String,
        /// Raw solver value.
        value: f64,
    },
    /// A value was negative or too large for a count.
    #[error("variable {variable} has out-of-range value {value}")]
    OutOfRange {
        /// Variable name.
        variable: String,
        /// Rounded value.
        value: i64,
    },
    /// The objective could not be represented.
    #[error("objective value overflowed")]
    ObjectiveOverflow,
    /// An origin's students were not all assigned exactly once.
    #[error("{origin} has {assigned} students assigned but {expected} waiting")]
    Unbalanced {
        /// Origin region.
        origin: Region,
        /// Sum of the matrix row.
        assigned: u64,
        /// Demand for the region.
        expected: u32,
    },
    /// More seats were left empty than a single partial cab can hold.
    #[error("{region} reports {unused} unused seats with capacity {capacity}")]
    UnusedSeatsOutOfRange {
        /// Region at fault.
        region: Region,
        /// Reported empty seats.
        unused: u32,
        /// Seats per cab.
        capacity: u32,
    },
    /// Riders plus empty seats do not fill the dispatched cabs exactly.
    #[error("{region} has {riders} riders and {unused} empty seats for {cabs} cabs")]
    CapacityMismatch {
        /// Region at fault.
        region: Region,
        /// Sum of the matrix column.
        riders: u64,
        /// Reported empty seats.
        unused: u32,
        /// Reported cabs.
        cabs: u32,
    },
    /// The reported cost disagrees with the cost of the assignment.
    #[error("reported objective {reported} does not match computed cost {computed}")]
    ObjectiveMismatch {
        /// Cost supplied with the result.
        reported: u64,
        /// Cost recomputed from the assignment.
        computed: u64,
    },
}

/// Cost of an allocation: cab cost plus swap cost of every rider.
///
/// # Examples
/// ```
/// use cabpool_core::{AllocationParams, allocation_cost};
///
/// let mut assignments = [[0; 7]; 7];
/// assignments[0][6] = 3;
/// assignments[6][6] = 4;
/// let cost = allocation_cost(&AllocationParams::default(), &assignments, &[0, 0, 0, 0, 0, 0, 1]);
/// assert_eq!(cost, 118);
/// ```
#[must_use]
pub fn allocation_cost(
    params: &AllocationParams,
    assignments: &AssignmentMatrix,
    vehicles: &[u32; REGION_COUNT],
) -> u64 {
    let cab_cost: u64 = vehicles
        .iter()
        .map(|&cabs| u64::from(params.vehicle_cost) * u64::from(cabs))
        .sum();
    let swap_cost: u64 = Region::ALL
        .into_iter()
        .flat_map(|origin| Region::ALL.into_iter().map(move |destination| (origin, destination)))
        .map(|(origin, destination)| {
            params.swap_cost(origin, destination)
                * u64::from(assignments[origin.index()][destination.index()])
        })
        .sum();
    cab_cost + swap_cost
}

/// An optimal (or feasible) allocation.
///
/// Built once per solve and never mutated. Serialises to the external
/// contract: `numCabsPerRegion`, `unusedSeatsPerRegion`, `assignments` and
/// `objectiveValue`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SolveResult {
    #[cfg_attr(feature = "serde", serde(rename = "numCabsPerRegion"))]
    vehicles: [u32; REGION_COUNT],
    #[cfg_attr(feature = "serde", serde(rename = "unusedSeatsPerRegion"))]
    unused_seats: [u32; REGION_COUNT],
    assignments: AssignmentMatrix,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "objectiveValue", serialize_with = "serialize_cost")
    )]
    objective: u64,
    #[cfg_attr(feature = "serde", serde(skip))]
    demand: RegionVector,
    #[cfg_attr(feature = "serde", serde(skip))]
    capacity: u32,
}

impl SolveResult {
    /// Validate an allocation against the demand and parameters it was
    /// solved for.
    ///
    /// # Errors
    /// Returns a [`SolveResultError`] naming the first broken invariant:
    /// unassigned or over-assigned students, an out-of-range remainder, a
    /// column that does not fill its cabs, or a cost that disagrees with the
    /// assignment.
    pub fn new(
        demand: &RegionVector,
        params: &AllocationParams,
        assignments: AssignmentMatrix,
        vehicles: [u32; REGION_COUNT],
        unused_seats: [u32; REGION_COUNT],
        objective: u64,
    ) -> Result<Self, SolveResultError> {
        for (origin, expected) in demand.iter() {
            let assigned: u64 = assignments[origin.index()]
                .iter()
                .copied()
                .map(u64::from)
                .sum();
            if assigned != u64::from(expected) {
                return Err(SolveResultError::Unbalanced {
                    origin,
                    assigned,
                    expected,
                });
            }
        }

        for region in Region::ALL {
            let unused = unused_seats[region.index()];
            let cabs = vehicles[region.index()];
            if unused >= params.capacity {
                return Err(SolveResultError::UnusedSeatsOutOfRange {
                    region,
                    unused,
                    capacity: params.capacity,
                });
            }
            let riders = column_total(&assignments, region);
            if riders + u64::from(unused) != u64::from(params.capacity) * u64::from(cabs) {
                return Err(SolveResultError::CapacityMismatch {
                    region,
                    riders,
                    unused,
                    cabs,
                });
            }
        }

        let computed = allocation_cost(params, &assignments, &vehicles);
        if computed != objective {
            return Err(SolveResultError::ObjectiveMismatch {
                reported: objective,
                computed,
            });
        }

        Ok(Self {
            vehicles,
            unused_seats,
            assignments,
            objective,
            demand: *demand,
            capacity: params.capacity,
        })
    }

    /// Cabs dispatched per region.
    #[must_use]
    pub const fn vehicles(&self) -> &[u32; REGION_COUNT] {
        &self.vehicles
    }

    /// Empty seats left per region.
    #[must_use]
    pub const fn unused_seats(&self) -> &[u32; REGION_COUNT] {
        &self.unused_seats
    }

    /// Origin by destination rider counts.
    #[must_use]
    pub const fn assignments(&self) -> &AssignmentMatrix {
        &self.assignments
    }

    /// Students from `origin` riding from `destination`.
    #[must_use]
    pub const fn assigned(&self, origin: Region, destination: Region) -> u32 {
        self.assignments[origin.index()][destination.index()]
    }

    /// Exact integer cost of the allocation.
    #[must_use]
    pub const fn objective_cost(&self) -> u64 {
        self.objective
    }

    /// Cost as reported on the external contract.
    #[must_use]
    pub fn objective_value(&self) -> f64 {
        self.objective as f64
    }

    /// Region counts the allocation was solved for.
    #[must_use]
    pub const fn demand(&self) -> &RegionVector {
        &self.demand
    }

    /// Seats per cab used for this allocation.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Total students served.
    #[must_use]
    pub fn total_students(&self) -> u64 {
        self.demand.total()
    }

    /// Total cabs dispatched.
    #[must_use]
    pub fn total_vehicles(&self) -> u64 {
        self.vehicles.iter().copied().map(u64::from).sum()
    }

    /// Students from `origin` who ride a cab from their own region.
    #[must_use]
    pub const fn stayed(&self, origin: Region) -> u32 {
        self.assigned(origin, origin)
    }

    /// Students from `origin` who ride a cab from another region.
    #[must_use]
    pub fn moved(&self, origin: Region) -> u32 {
        self.demand[origin] - self.stayed(origin)
    }
}

fn column_total(assignments: &AssignmentMatrix, destination: Region) -> u64 {
    assignments
        .iter()
        .map(|row| u64::from(row[destination.index()]))
        .sum()
}

#[cfg(feature = "serde")]
fn serialize_cost<S>(cost: &u64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_f64(*cost as f64)
}
