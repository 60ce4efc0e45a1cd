//! Error types emitted by the cabpool CLI.
//!
//! Keep this error type reasonably small, as every command helper returns
//! `Result<_, CliError>`.

use std::num::ParseIntError;
use std::sync::Arc;

use cabpool_core::{
    AllocationError, MipStatus, PackingError, ParamsError, RegionVectorError, RosterError,
};
use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors emitted by the cabpool CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Long flag name of the option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// Two options that select the same input were both given.
    #[error("--{first} and --{second} cannot be used together")]
    ConflictingArguments {
        /// First option given.
        first: &'static str,
        /// Second option given.
        second: &'static str,
    },
    /// A region count in `--counts` is not an integer.
    #[error("region count {value:?} is not an integer: {source}")]
    InvalidCounts {
        /// The offending entry.
        value: String,
        /// Parse failure.
        #[source]
        source: ParseIntError,
    },
    /// Capacity and cost options do not form valid parameters.
    #[error("invalid allocation parameters: {0}")]
    InvalidParams(#[from] ParamsError),
    /// A referenced input path does not exist on disk or is not a file.
    #[error("{field} path {path:?} does not exist or is not a file")]
    MissingSourceFile {
        /// Option naming the path.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
    },
    /// A referenced input path exists but is not a file.
    #[error("{field} path {path:?} exists but is not a file")]
    SourcePathNotFile {
        /// Option naming the path.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
    },
    /// A referenced input path could not be inspected due to an IO error.
    #[error("failed to inspect {field} path {path:?}: {source}")]
    InspectSourcePath {
        /// Option naming the path.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// Opening an input file failed.
    #[error("failed to open {field} file at {path:?}: {source}")]
    OpenInput {
        /// Option naming the path.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// An input file is not valid JSON of the expected shape.
    #[error("failed to parse {field} JSON at {path:?}: {source}")]
    ParseInput {
        /// Option naming the path.
        field: &'static str,
        /// Path as given.
        path: Utf8PathBuf,
        /// Decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// Hall demand names an unknown hall or an invalid count.
    #[error("hall demand in {path:?} is invalid: {source}")]
    InvalidDemand {
        /// Path of the demand file.
        path: Utf8PathBuf,
        /// Validation failure.
        #[source]
        source: RegionVectorError,
    },
    /// The allocator rejected the request or the solver's answer.
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    /// The solver stopped without an allocation.
    #[error("no allocation found: solver reported {status}")]
    NoSolution {
        /// Status reported by the backend.
        status: MipStatus,
    },
    /// Packing the solved allocation into cabs failed.
    #[error("failed to pack cabs: {0}")]
    Packing(#[from] PackingError),
    /// Bookings could not be seated in the packed cabs.
    #[error("failed to seat bookings: {0}")]
    Roster(#[from] RosterError),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    Serialise(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
