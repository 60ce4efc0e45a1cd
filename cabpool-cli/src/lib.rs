//! Command-line interface for the cab pooling engine.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod allocate;
mod error;
mod fs;
mod input;
mod seat;

pub use error::CliError;

use allocate::AllocateArgs;
use seat::SeatArgs;

pub(crate) const ARG_COUNTS: &str = "counts";
pub(crate) const ARG_DEMAND: &str = "demand";
pub(crate) const ARG_BOOKINGS: &str = "bookings";
pub(crate) const ARG_CAPACITY: &str = "capacity";
pub(crate) const ARG_WITH_FLOW_RATE: &str = "with-flow-rate";
pub(crate) const ARG_AGAINST_FLOW_RATE: &str = "against-flow-rate";
pub(crate) const ARG_VEHICLE_COST: &str = "vehicle-cost";
pub(crate) const ARG_FORMAT: &str = "format";
pub(crate) const ENV_COUNTS: &str = "CABPOOL_CMDS_ALLOCATE_COUNTS";
pub(crate) const ENV_BOOKINGS: &str = "CABPOOL_CMDS_SEAT_BOOKINGS";

/// Run the cabpool CLI with the current process arguments and environment.
///
/// # Errors
/// Returns a [`CliError`] when arguments, configuration or input files are
/// invalid, when no allocation is found, or when output cannot be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Allocate(args) => allocate::run_allocate(args),
        Command::Seat(args) => seat::run_seat(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "cabpool",
    about = "Allocate waiting students to shared cabs at minimal cost",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve an allocation from region counts or hall demand.
    Allocate(AllocateArgs),
    /// Seat individual bookings in the cabs of an optimal allocation.
    Seat(SeatArgs),
}

#[cfg(test)]
mod tests;
