//! Allocate command implementation for the cabpool CLI.

use std::collections::BTreeMap;
use std::io::Write;

use cabpool_core::{
    AllocationError, AllocationParams, RegionVector, SolveResult, VehicleManifest, VehiclePlan,
    render_report,
};
use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};

use crate::input::{
    BackendBuilder, LpBackendBuilder, ParamOverrides, load_json, require_existing, solve_demand,
    write_json, write_text,
};
use crate::{
    ARG_AGAINST_FLOW_RATE, ARG_CAPACITY, ARG_COUNTS, ARG_DEMAND, ARG_FORMAT, ARG_VEHICLE_COST,
    ARG_WITH_FLOW_RATE, CliError, ENV_COUNTS,
};

/// Printed instead of a report when nobody is waiting.
pub(crate) const NOTHING_TO_OPTIMISE: &str = "Total students is 0. Nothing to optimise.\n";

/// CLI arguments for the `allocate` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Allocate students to cabs from seven region counts (furthest \
                 region first) or from a JSON object of hall codes to student \
                 counts. Capacity and cost weights can come from CLI flags, \
                 configuration files, or environment variables.",
    about = "Solve a cab allocation"
)]
#[ortho_config(prefix = "CABPOOL")]
pub(crate) struct AllocateArgs {
    /// Comma-separated student counts for the seven regions.
    #[arg(long = ARG_COUNTS, value_name = "a,b,c,d,e,f,g")]
    #[serde(default)]
    pub(crate) counts: Option<String>,
    /// Path to a JSON object mapping hall codes to student counts.
    #[arg(long = ARG_DEMAND, value_name = "path")]
    #[serde(default)]
    pub(crate) demand: Option<Utf8PathBuf>,
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
    /// Output format.
    #[arg(long = ARG_FORMAT, value_enum, value_name = "format")]
    #[serde(default)]
    pub(crate) format: Option<OutputFormat>,
}

impl AllocateArgs {
    pub(crate) fn into_config(self) -> Result<AllocateConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AllocateConfig::try_from(merged)
    }
}

/// How `allocate` prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum OutputFormat {
    /// The plain-text optimisation report.
    #[default]
    Text,
    /// The solve result and cab manifests as JSON.
    Json,
}

/// Where the students waiting for cabs are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DemandSource {
    /// Counts given inline, in region order.
    Counts(Vec<i64>),
    /// A JSON file of hall codes to counts.
    Halls(Utf8PathBuf),
}

/// Resolved `allocate` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AllocateConfig {
    pub(crate) source: DemandSource,
    pub(crate) params: AllocationParams,
    pub(crate) format: OutputFormat,
}

impl AllocateConfig {
    pub(crate) fn validate_sources(&self) -> Result<(), CliError> {
        match &self.source {
            DemandSource::Counts(_) => Ok(()),
            DemandSource::Halls(path) => require_existing(path, ARG_DEMAND),
        }
    }

    /// Resolve the configured source into region counts.
    pub(crate) fn load_demand(&self) -> Result<RegionVector, CliError> {
        match &self.source {
            DemandSource::Counts(counts) => {
                RegionVector::new(counts).map_err(|err| AllocationError::from(err).into())
            }
            DemandSource::Halls(path) => {
                let halls: BTreeMap<String, i64> = load_json(path, ARG_DEMAND)?;
                RegionVector::from_hall_demand(halls).map_err(|source| CliError::InvalidDemand {
                    path: path.clone(),
                    source,
                })
            }
        }
    }
}

impl TryFrom<AllocateArgs> for AllocateConfig {
    type Error = CliError;

    fn try_from(args: AllocateArgs) -> Result<Self, Self::Error> {
        let source = match (args.counts, args.demand) {
            (Some(_), Some(_)) => {
                return Err(CliError::ConflictingArguments {
                    first: ARG_COUNTS,
                    second: ARG_DEMAND,
                });
            }
            (Some(raw), None) => DemandSource::Counts(parse_counts(&raw)?),
            (None, Some(path)) => DemandSource::Halls(path),
            (None, None) => {
                return Err(CliError::MissingArgument {
                    field: ARG_COUNTS,
                    env: ENV_COUNTS,
                });
            }
        };
        let params = ParamOverrides {
            capacity: args.capacity,
            with_flow_rate: args.with_flow_rate,
            against_flow_rate: args.against_flow_rate,
            vehicle_cost: args.vehicle_cost,
        }
        .resolve()?;
        Ok(Self {
            source,
            params,
            format: args.format.unwrap_or_default(),
        })
    }
}

/// Split a comma-separated list of counts.
///
/// Length and sign are checked later, when the counts become a
/// [`RegionVector`].
pub(crate) fn parse_counts(raw: &str) -> Result<Vec<i64>, CliError> {
    raw.split(',')
        .map(str::trim)
        .map(|value| {
            value.parse().map_err(|source| CliError::InvalidCounts {
                value: value.to_owned(),
                source,
            })
        })
        .collect()
}

/// JSON payload printed by `allocate --format json`.
#[derive(Debug, Serialize)]
pub(crate) struct AllocationOutput<'a> {
    #[serde(flatten)]
    result: &'a SolveResult,
    cabs: &'a [VehicleManifest],
}

pub(super) fn run_allocate(args: AllocateArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    run_allocate_with(args, &LpBackendBuilder, &mut stdout)
}

pub(super) fn run_allocate_with(
    args: AllocateArgs,
    builder: &dyn BackendBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = resolve_allocate_config(args)?;
    let demand = config.load_demand()?;
    if demand.is_empty() && config.format == OutputFormat::Text {
        log::info!("no students waiting; skipping the solver");
        return write_text(writer, NOTHING_TO_OPTIMISE);
    }

    let result = solve_demand(builder, config.params, &demand)?;
    let plan = VehiclePlan::from_result(&result)?;
    match config.format {
        OutputFormat::Text => write_text(writer, &render_report(&result, &plan)),
        OutputFormat::Json => write_json(
            writer,
            &AllocationOutput {
                result: &result,
                cabs: plan.manifests(),
            },
        ),
    }
}

fn resolve_allocate_config(args: AllocateArgs) -> Result<AllocateConfig, CliError> {
    let config = args.into_config()?;
    config.validate_sources()?;
    Ok(config)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<AllocateConfig, CliError> {
    let merged = AllocateArgs::merge_from_layers(layers).map_err(CliError::from)?;
    AllocateConfig::try_from(merged)
}
