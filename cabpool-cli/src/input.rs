//! Input loading, parameter resolution and solving shared by the subcommands.

use std::io::{BufReader, Write};

use cabpool_core::{Allocation, AllocationParams, Allocator, MipBackend, RegionVector, SolveResult};
use cabpool_solver_lp::LpBackend;
use camino::Utf8Path;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CliError;
use crate::fs::{file_is_file, open_utf8_file};

/// Builds the MILP backend for the current invocation.
pub(crate) trait BackendBuilder {
    fn build(&self) -> Box<dyn MipBackend + '_>;
}

/// Builds the bundled `microlp` backend.
pub(crate) struct LpBackendBuilder;

impl BackendBuilder for LpBackendBuilder {
    fn build(&self) -> Box<dyn MipBackend + '_> {
        Box::new(LpBackend::new())
    }
}

/// Capacity and cost overrides as they arrive from merged configuration.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ParamOverrides {
    pub(crate) capacity: Option<u32>,
    pub(crate) with_flow_rate: Option<u32>,
    pub(crate) against_flow_rate: Option<u32>,
    pub(crate) vehicle_cost: Option<u32>,
}

impl ParamOverrides {
    /// Apply the overrides on top of [`AllocationParams::default`].
    pub(crate) fn resolve(self) -> Result<AllocationParams, CliError> {
        let defaults = AllocationParams::default();
        let params = AllocationParams::new(
            self.capacity.unwrap_or(defaults.capacity),
            self.with_flow_rate.unwrap_or(defaults.with_flow_rate),
            self.against_flow_rate.unwrap_or(defaults.against_flow_rate),
            self.vehicle_cost.unwrap_or(defaults.vehicle_cost),
        )?;
        Ok(params)
    }
}

pub(crate) fn require_existing(path: &Utf8Path, field: &'static str) -> Result<(), CliError> {
    match file_is_file(path) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CliError::SourcePathNotFile {
            field,
            path: path.to_path_buf(),
        }),
        Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
            Err(CliError::MissingSourceFile {
                field,
                path: path.to_path_buf(),
            })
        }
        Err(source) => Err(CliError::InspectSourcePath {
            field,
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Loads a JSON document from disk.
pub(crate) fn load_json<T: DeserializeOwned>(
    path: &Utf8Path,
    field: &'static str,
) -> Result<T, CliError> {
    let file = open_utf8_file(path).map_err(|source| CliError::OpenInput {
        field,
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(|source| CliError::ParseInput {
        field,
        path: path.to_path_buf(),
        source,
    })
}

/// Solve `demand`, treating a missing allocation as a user-facing error.
pub(crate) fn solve_demand(
    builder: &dyn BackendBuilder,
    params: AllocationParams,
    demand: &RegionVector,
) -> Result<SolveResult, CliError> {
    let allocator = Allocator::with_params(builder.build(), params);
    match allocator.allocate_vector(demand)? {
        Allocation::Solved(result) => Ok(result),
        Allocation::NoSolution { status } => Err(CliError::NoSolution { status }),
    }
}

pub(crate) fn write_text(writer: &mut dyn Write, text: &str) -> Result<(), CliError> {
    writer
        .write_all(text.as_bytes())
        .map_err(CliError::WriteOutput)
}

pub(crate) fn write_json<T: Serialize + ?Sized>(
    writer: &mut dyn Write,
    value: &T,
) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::Serialise)?;
    write_text(writer, &payload)?;
    write_text(writer, "\n")
}
