//! Seat command implementation for the cabpool CLI.

use std::io::Write;

use cabpool_core::{AllocationParams, Booking, RegionVector, VehiclePlan, seat_riders};
use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::input::{
    BackendBuilder, LpBackendBuilder, ParamOverrides, load_json, require_existing, solve_demand,
    write_json,
};
use crate::{
    ARG_AGAINST_FLOW_RATE, ARG_BOOKINGS, ARG_CAPACITY, ARG_VEHICLE_COST, ARG_WITH_FLOW_RATE,
    CliError, ENV_BOOKINGS,
};

/// CLI arguments for the `seat` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read a JSON array of bookings ({\"id\": ..., \"hall\": ...}), \
                 solve the allocation for their halls and print every cab with \
                 its riders in seat order.",
    about = "Seat bookings in optimally allocated cabs"
)]
#[ortho_config(prefix = "CABPOOL")]
pub(crate) struct SeatArgs {
    /// Path to a JSON array of bookings.
    #[arg(long = ARG_BOOKINGS, value_name = "path")]
    #[serde(default)]
    pub(crate) bookings: Option<Utf8PathBuf>,
    /// Seats per cab.
    #[arg(long = ARG_CAPACITY, value_name = "seats")]
    #[serde(default)]
    pub(crate) capacity: Option<u32>,
    /// Cost per region a student travels towards the gate.
    #[arg(long = ARG_WITH_FLOW_RATE, value_name = "cost")]
    #[serde(default)]
    pub(crate) with_flow_rate: Option<u32>,
    /// Cost per region a student travels away from the gate.
    #[arg(long = ARG_AGAINST_FLOW_RATE, value_name = "cost")]
    #[serde(default)]
    pub(crate) against_flow_rate: Option<u32>,
    /// Fixed cost of dispatching one cab.
    #[arg(long = ARG_VEHICLE_COST, value_name = "cost")]
    #[serde(default)]
    pub(crate) vehicle_cost: Option<u32>,
}

impl SeatArgs {
    pub(crate) fn into_config(self) -> Result<SeatConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        SeatConfig::try_from(merged)
    }
}

/// Resolved `seat` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SeatConfig {
    pub(crate) bookings: Utf8PathBuf,
    pub(crate) params: AllocationParams,
}

impl TryFrom<SeatArgs> for SeatConfig {
    type Error = CliError;

    fn try_from(args: SeatArgs) -> Result<Self, Self::Error> {
        let bookings = args.bookings.ok_or(CliError::MissingArgument {
            field: ARG_BOOKINGS,
            env: ENV_BOOKINGS,
        })?;
        let params = ParamOverrides {
            capacity: args.capacity,
            with_flow_rate: args.with_flow_rate,
            against_flow_rate: args.against_flow_rate,
            vehicle_cost: args.vehicle_cost,
        }
        .resolve()?;
        Ok(Self { bookings, params })
    }
}

pub(super) fn run_seat(args: SeatArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_seat_with(args, &LpBackendBuilder, &mut stdout)
}

pub(super) fn run_seat_with(
    args: SeatArgs,
    builder: &dyn BackendBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.bookings, ARG_BOOKINGS)?;
    let bookings: Vec<Booking> = load_json(&config.bookings, ARG_BOOKINGS)?;
    let demand = hall_demand(&config, &bookings)?;

    let result = solve_demand(builder, config.params, &demand)?;
    let plan = VehiclePlan::from_result(&result)?;
    let cabs = seat_riders(&plan, &bookings)?;
    write_json(writer, &cabs)
}

/// One student per booking, summed per region.
fn hall_demand(config: &SeatConfig, bookings: &[Booking]) -> Result<RegionVector, CliError> {
    RegionVector::from_hall_demand(bookings.iter().map(|booking| (booking.hall.as_str(), 1)))
        .map_err(|source| CliError::InvalidDemand {
            path: config.bookings.clone(),
            source,
        })
}
