//! Facade crate for the cabpool allocation engine.
//!
//! This crate re-exports the core domain types and exposes the bundled MILP
//! backend behind a feature flag.
//!
//! # Examples
//! ```
//! # #[cfg(feature = "solver-lp")]
//! # {
//! use cabpool_engine::{Allocator, LpBackend, VehiclePlan, render_report};
//!
//! let allocator = Allocator::new(LpBackend::new());
//! let outcome = allocator.allocate(&[3, 0, 0, 0, 0, 0, 4]).unwrap();
//! let result = outcome.solved().unwrap();
//! let plan = VehiclePlan::from_result(result).unwrap();
//! assert!(render_report(result, &plan).contains("Objective value: 118.00"));
//! # }
//! ```

#![forbid(unsafe_code)]

pub use cabpool_core::{
    Allocation, AllocationError, AllocationParams, Allocator, AssignmentMatrix, Booking,
    MAX_REGION_STUDENTS, MipBackend, MipSolution, MipStatus, PackingError, ParamsError,
    REGION_COUNT, Region, RegionVector, RegionVectorError, RosterError, SeatedCab, SeatedRider,
    SolveResult, SolveResultError, VehicleKind, VehicleManifest, VehiclePlan, pack_vehicles,
    render_report, seat_riders,
};

#[cfg(feature = "solver-lp")]
pub use cabpool_solver_lp::LpBackend;
