//! Focused unit tests covering allocate CLI configuration and output.

use super::helpers::{ScriptedBuilder, workspace, write_utf8};
use super::*;
use crate::allocate::{
    AllocateConfig, DemandSource, NOTHING_TO_OPTIMISE, OutputFormat, config_from_layers_for_test,
    parse_counts, run_allocate_with,
};
use crate::input::{BackendBuilder, LpBackendBuilder};
use cabpool_core::test_support::ScriptedBackend;
use cabpool_core::{
    AllocationError, AllocationParams, MipStatus, ParamsError, Region, RegionVector,
    RegionVectorError,
};
use rstest::rstest;

fn counts_args(counts: &str) -> AllocateArgs {
    AllocateArgs {
        counts: Some(counts.to_owned()),
        ..AllocateArgs::default()
    }
}

fn run_to_string(args: AllocateArgs, builder: &dyn BackendBuilder) -> String {
    let mut buffer = Vec::new();
    run_allocate_with(args, builder, &mut buffer).expect("allocate should succeed");
    String::from_utf8(buffer).expect("stdout utf-8")
}

#[rstest]
fn converting_without_a_source_errors() {
    let err = AllocateConfig::try_from(AllocateArgs::default())
        .expect_err("missing counts should error");
    match err {
        CliError::MissingArgument { field, env } => {
            assert_eq!(field, ARG_COUNTS);
            assert_eq!(env, ENV_COUNTS);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
}

#[rstest]
fn counts_and_demand_conflict() {
    let args = AllocateArgs {
        counts: Some("1,0,0,0,0,0,0".to_owned()),
        demand: Some("halls.json".into()),
        ..AllocateArgs::default()
    };
    let err = AllocateConfig::try_from(args).expect_err("both sources should error");
    match err {
        CliError::ConflictingArguments { first, second } => {
            assert_eq!((first, second), (ARG_COUNTS, ARG_DEMAND));
        }
        other => panic!("expected ConflictingArguments, found {other:?}"),
    }
}

#[rstest]
fn config_applies_defaults() {
    let config = AllocateConfig::try_from(counts_args("7,0,0,0,0,0,0")).expect("config");
    assert_eq!(config.source, DemandSource::Counts(vec![7, 0, 0, 0, 0, 0, 0]));
    assert_eq!(config.params, AllocationParams::default());
    assert_eq!(config.format, OutputFormat::Text);
}

#[rstest]
fn zero_capacity_is_rejected() {
    let args = AllocateArgs {
        capacity: Some(0),
        ..counts_args("1,0,0,0,0,0,0")
    };
    let err = AllocateConfig::try_from(args).expect_err("zero capacity should error");
    match err {
        CliError::InvalidParams(source) => assert_eq!(source, ParamsError::ZeroCapacity),
        other => panic!("expected InvalidParams, found {other:?}"),
    }
}

#[rstest]
#[case(" 1, 2 ,3", vec![1, 2, 3])]
#[case("0,0,0,0,0,0,0", vec![0; 7])]
#[case("-4", vec![-4])]
fn parse_counts_accepts_integers(#[case] raw: &str, #[case] expected: Vec<i64>) {
    assert_eq!(parse_counts(raw).expect("counts should parse"), expected);
}

#[rstest]
#[case("1,two,3", "two")]
#[case("1,,3", "")]
fn parse_counts_rejects_non_integers(#[case] raw: &str, #[case] bad: &str) {
    let err = parse_counts(raw).expect_err("invalid counts should error");
    match err {
        CliError::InvalidCounts { value, .. } => assert_eq!(value, bad),
        other => panic!("expected InvalidCounts, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_missing_demand_file() {
    let (_tmp, root) = workspace();
    let config = AllocateConfig {
        source: DemandSource::Halls(root.join("halls.json")),
        params: AllocationParams::default(),
        format: OutputFormat::Text,
    };
    let err = config.validate_sources().expect_err("missing file should error");
    match err {
        CliError::MissingSourceFile { field, .. } => assert_eq!(field, ARG_DEMAND),
        other => panic!("expected MissingSourceFile, found {other:?}"),
    }
}

#[rstest]
fn validate_sources_reports_not_file() {
    let (_tmp, root) = workspace();
    let demand = root.join("halls.json");
    std::fs::create_dir(&demand).expect("demand directory");
    let config = AllocateConfig {
        source: DemandSource::Halls(demand.clone()),
        params: AllocationParams::default(),
        format: OutputFormat::Text,
    };
    let err = config.validate_sources().expect_err("directory should error");
    match err {
        CliError::SourcePathNotFile { field, path } => {
            assert_eq!(field, ARG_DEMAND);
            assert_eq!(path, demand);
        }
        other => panic!("expected SourcePathNotFile, found {other:?}"),
    }
}

#[rstest]
fn hall_demand_sums_halls_sharing_a_region() {
    let (_tmp, root) = workspace();
    let demand = root.join("halls.json");
    write_utf8(&demand, br#"{ "RK": 2, "RP": 1, "PAN": 4 }"#);
    let config = AllocateConfig {
        source: DemandSource::Halls(demand),
        params: AllocationParams::default(),
        format: OutputFormat::Text,
    };
    let vector = config.load_demand().expect("demand should load");
    assert_eq!(vector, RegionVector::from_counts([3, 0, 0, 0, 0, 0, 4]));
}

#[rstest]
fn hall_demand_rejects_unknown_halls() {
    let (_tmp, root) = workspace();
    let demand = root.join("halls.json");
    write_utf8(&demand, br#"{ "XYZ": 2 }"#);
    let config = AllocateConfig {
        source: DemandSource::Halls(demand.clone()),
        params: AllocationParams::default(),
        format: OutputFormat::Text,
    };
    let err = config.load_demand().expect_err("unknown hall should error");
    match err {
        CliError::InvalidDemand { path, source } => {
            assert_eq!(path, demand);
            assert!(matches!(source, RegionVectorError::UnknownHall { .. }));
        }
        other => panic!("expected InvalidDemand, found {other:?}"),
    }
}

#[rstest]
fn hall_demand_rejects_regions_above_the_ceiling() {
    let (_tmp, root) = workspace();
    let demand = root.join("halls.json");
    write_utf8(&demand, br#"{ "RK": 60000, "RP": 50000 }"#);
    let config = AllocateConfig {
        source: DemandSource::Halls(demand),
        params: AllocationParams::default(),
        format: OutputFormat::Text,
    };
    let err = config.load_demand().expect_err("oversized region should error");
    match err {
        CliError::InvalidDemand { source, .. } => assert_eq!(
            source,
            RegionVectorError::TooLarge {
                region: Region::RkRp,
                value: 110_000
            }
        ),
        other => panic!("expected InvalidDemand, found {other:?}"),
    }
}

#[rstest]
fn hall_demand_rejects_invalid_json() {
    let (_tmp, root) = workspace();
    let demand = root.join("halls.json");
    write_utf8(&demand, b"{ not valid json");
    let config = AllocateConfig {
        source: DemandSource::Halls(demand.clone()),
        params: AllocationParams::default(),
        format: OutputFormat::Text,
    };
    let err = config.load_demand().expect_err("invalid json should error");
    match err {
        CliError::ParseInput { field, path, .. } => {
            assert_eq!(field, ARG_DEMAND);
            assert_eq!(path, demand);
        }
        other => panic!("expected ParseInput, found {other:?}"),
    }
}

#[rstest]
fn six_counts_never_reach_the_solver() {
    let builder = ScriptedBuilder::new(ScriptedBackend::stay_at_home());
    let mut buffer = Vec::new();
    let err = run_allocate_with(counts_args("1,2,3,4,5,6"), &builder, &mut buffer)
        .expect_err("six counts should error");
    match err {
        CliError::Allocation(AllocationError::InvalidInput(source)) => {
            assert_eq!(source, RegionVectorError::WrongLength { found: 6 });
        }
        other => panic!("expected Allocation, found {other:?}"),
    }
    assert_eq!(builder.backend.calls(), 0);
    assert!(buffer.is_empty());
}

#[rstest]
fn oversized_counts_never_reach_the_solver() {
    let builder = ScriptedBuilder::new(ScriptedBackend::stay_at_home());
    let mut buffer = Vec::new();
    let err = run_allocate_with(counts_args("10000000,1,2,3,4,5,6"), &builder, &mut buffer)
        .expect_err("oversized count should error");
    match err {
        CliError::Allocation(AllocationError::InvalidInput(source)) => assert_eq!(
            source,
            RegionVectorError::TooLarge {
                region: Region::RkRp,
                value: 10_000_000
            }
        ),
        other => panic!("expected Allocation, found {other:?}"),
    }
    assert_eq!(builder.backend.calls(), 0);
    assert!(buffer.is_empty());
}

#[rstest]
fn nobody_waiting_skips_the_solver() {
    let builder = ScriptedBuilder::new(ScriptedBackend::stay_at_home());
    let stdout = run_to_string(counts_args("0,0,0,0,0,0,0"), &builder);
    assert_eq!(stdout, NOTHING_TO_OPTIMISE);
    assert_eq!(builder.backend.calls(), 0);
}

#[rstest]
fn text_output_is_the_report() {
    let stdout = run_to_string(counts_args("3,0,0,0,0,0,4"), &LpBackendBuilder);
    assert!(stdout.starts_with("=== Optimization Summary ===\n"));
    assert!(stdout.contains("Objective value: 118.00"));
    assert!(stdout.contains("Mixed cab:"));
}

#[rstest]
fn json_output_carries_result_and_cabs() {
    let args = AllocateArgs {
        format: Some(OutputFormat::Json),
        ..counts_args("7,0,0,0,0,0,0")
    };
    let stdout = run_to_string(args, &LpBackendBuilder);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("JSON output");
    assert_eq!(json["objectiveValue"], 100.0);
    assert_eq!(json["numCabsPerRegion"], serde_json::json!([1, 0, 0, 0, 0, 0, 0]));
    assert_eq!(json["cabs"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["cabs"][0]["kind"], "direct");
}

#[rstest]
fn json_output_solves_an_empty_request() {
    let args = AllocateArgs {
        format: Some(OutputFormat::Json),
        ..counts_args("0,0,0,0,0,0,0")
    };
    let stdout = run_to_string(args, &LpBackendBuilder);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("JSON output");
    assert_eq!(json["objectiveValue"], 0.0);
    assert_eq!(json["cabs"], serde_json::json!([]));
}

#[rstest]
fn missing_allocation_is_an_error() {
    let builder = ScriptedBuilder::new(ScriptedBackend::failing(MipStatus::Infeasible));
    let mut buffer = Vec::new();
    let err = run_allocate_with(counts_args("1,0,0,0,0,0,0"), &builder, &mut buffer)
        .expect_err("no solution should error");
    match err {
        CliError::NoSolution { status } => assert_eq!(status, MipStatus::Infeasible),
        other => panic!("expected NoSolution, found {other:?}"),
    }
    assert_eq!(builder.backend.calls(), 1);
}

#[rstest]
fn custom_parameters_reach_the_model() {
    let builder = ScriptedBuilder::new(ScriptedBackend::stay_at_home());
    let args = AllocateArgs {
        capacity: Some(4),
        ..counts_args("0,0,0,0,0,0,5")
    };
    let stdout = run_to_string(args, &builder);
    assert!(stdout.contains("Seats used: 4 / 4"));
    assert!(stdout.contains("Seats used: 1 / 4"));
}

#[rstest]
fn merge_layers_maps_configuration_errors() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_cli(json!({ "capacity": "seven" }));

    let err = config_from_layers_for_test(composer.layers())
        .expect_err("invalid config layer should map to CliError::Configuration");
    match err {
        CliError::Configuration(_) => {}
        other => panic!("expected CliError::Configuration, found {other:?}"),
    }
}

#[rstest]
fn merge_layers_honours_precedence() {
    use ortho_config::MergeComposer;
    use serde_json::json;

    let mut composer = MergeComposer::new();
    composer.push_file(
        json!({
            "counts": "1,1,1,1,1,1,1",
            "capacity": 5,
            "vehicle_cost": 80,
            "format": "json",
        }),
        None,
    );
    composer.push_environment(json!({
        "counts": "2,0,0,0,0,0,0",
        "vehicle_cost": 90,
    }));
    composer.push_cli(json!({ "vehicle_cost": 120 }));

    let config =
        config_from_layers_for_test(composer.layers()).expect("merged config should build");
    assert_eq!(config.source, DemandSource::Counts(vec![2, 0, 0, 0, 0, 0, 0]));
    assert_eq!(config.params.capacity, 5);
    assert_eq!(config.params.vehicle_cost, 120);
    assert_eq!(config.params.with_flow_rate, 1);
    assert_eq!(config.format, OutputFormat::Json);
}
