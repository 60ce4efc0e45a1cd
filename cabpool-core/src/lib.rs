//! Core domain types for the cab pooling engine.
//!
//! Students waiting in seven pickup regions are allocated to shared cabs so
//! that the combined cost of dispatched cabs and of students riding from a
//! region other than their own is minimal. This crate holds everything except
//! the optimiser itself: the region vocabulary, the integer model handed to a
//! [`MipBackend`], validation of the solver's answer, packing of the answer
//! into per-cab manifests, seating of individual bookings and the text report.
//!
//! Constructors return `Result` so invalid input is rejected before a model is
//! ever built.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod model;
pub mod packing;
pub mod params;
pub mod region;
pub mod report;
pub mod result;
pub mod roster;
pub mod solver;
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
pub mod test_support;

pub use model::{
    AllocationModel, EqualityConstraint, INTEGRALITY_TOLERANCE, IntVariable, LinearModel, Term,
    VarId, VariableLayout,
};
pub use packing::{
    Load, PackingError, VehicleKind, VehicleManifest, VehiclePlan, pack_matrix, pack_vehicles,
};
pub use params::{AllocationParams, ParamsError};
pub use region::{MAX_REGION_STUDENTS, REGION_COUNT, Region, RegionVector, RegionVectorError};
pub use report::{matrix_block, movement_block, packing_block, render_report, summary_block};
pub use result::{
    AssignmentMatrix, SolveResult, SolveResultError, VehicleCounts, allocation_cost,
};
pub use roster::{Booking, RosterError, SeatedCab, SeatedRider, seat_riders};
pub use solver::{Allocation, AllocationError, Allocator, MipBackend, MipSolution, MipStatus};
