//! Plain-text rendering of a solved allocation.
//!
//! Each block is a list of lines ending in a blank line; [`render_report`]
//! joins the four blocks with a newline in a fixed order.

use crate::{Region, SolveResult, VehiclePlan};

/// Objective, totals and the per-region table.
#[must_use]
pub fn summary_block(result: &SolveResult) -> String {
    let mut lines = vec![
        "=== Optimization Summary ===".to_owned(),
        format!("Objective value: {:.2}", result.objective_value()),
        format!("Total students: {}", result.total_students()),
        format!("Total cabs used: {}", result.total_vehicles()),
        String::new(),
        "---- Per Region Summary ----".to_owned(),
        format!("{:<25} {:>8} {:>8} {:>8}", "Region", "Students", "Cabs", "Unused"),
    ];
    lines.extend(Region::ALL.map(|region| {
        format!(
            "{:<25} {:>8} {:>8} {:>8}",
            region.name(),
            result.demand()[region],
            result.vehicles()[region.index()],
            result.unused_seats()[region.index()],
        )
    }));
    lines.push(String::new());
    lines.join("\n")
}

/// Per-origin breakdown of who stays and who moves where.
#[must_use]
pub fn movement_block(result: &SolveResult) -> String {
    let mut lines = vec!["=== Movement Summary (who moves where) ===".to_owned()];
    for origin in Region::ALL {
        lines.push(format!("{}:", origin.name()));
        lines.push(format!("  Total students: {}", result.demand()[origin]));
        lines.push(format!("  Stay in own region: {}", result.stayed(origin)));
        lines.push(format!("  Move to other regions: {}", result.moved(origin)));
        for destination in Region::ALL {
            let count = result.assigned(origin, destination);
            if destination != origin && count > 0 {
                lines.push(format!("    -> {count} students to {}", destination.name()));
            }
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Per-cab verdicts and boarding lists.
#[must_use]
pub fn packing_block(plan: &VehiclePlan) -> String {
    let mut lines = vec!["=== Cab-wise Plan (per cab verdict) ===".to_owned()];
    for region in Region::ALL {
        let cabs: Vec<_> = plan.for_region(region).collect();
        if cabs.is_empty() {
            continue;
        }
        lines.push(format!("{} - {} cab(s):", region.name(), cabs.len()));
        for cab in cabs {
            lines.push(format!("  Cab {}: {}", cab.number(), cab.kind().verdict()));
            lines.push(format!(
                "    Seats used: {} / {}",
                cab.seats_used(),
                plan.capacity()
            ));
            if !cab.loads().is_empty() {
                lines.push("    Boarding:".to_owned());
            }
            for load in cab.loads() {
                let suffix = if load.origin == region {
                    " (home region)"
                } else {
                    ""
                };
                lines.push(format!(
                    "      {} student(s) from {}{suffix}",
                    load.count,
                    load.origin.label()
                ));
            }
        }
        lines.push(String::new());
    }
    lines.join("\n")
}

/// Origin by destination grid.
#[must_use]
pub fn matrix_block(result: &SolveResult) -> String {
    let mut lines = vec!["=== Assignment Matrix (From region -> Cab region) ===".to_owned()];
    let mut header = String::from("From\\To  ");
    header.push_str(&join_cells(Region::ALL.map(|region| {
        format!("R{:>3}", region.index() + 1)
    })));
    lines.push(header);
    for (index, row) in result.assignments().iter().enumerate() {
        let mut line = format!("R{:>3}    ", index + 1);
        line.push_str(&join_cells(row.map(|count| format!("{count:>3}"))));
        lines.push(line);
    }
    lines.push(String::new());
    lines.join("\n")
}

/// The four blocks in report order.
///
/// # Examples
/// ```
/// use cabpool_core::{AllocationParams, RegionVector, SolveResult, VehiclePlan, render_report};
///
/// let mut assignments = [[0; 7]; 7];
/// assignments[0][0] = 7;
/// let result = SolveResult::new(
///     &RegionVector::from_counts([7, 0, 0, 0, 0, 0, 0]),
///     &AllocationParams::default(),
///     assignments,
///     [1, 0, 0, 0, 0, 0, 0],
///     [0; 7],
///     100,
/// )
/// .unwrap();
/// let plan = VehiclePlan::from_result(&result).unwrap();
/// let report = render_report(&result, &plan);
/// assert!(report.starts_with("=== Optimization Summary ===\nObjective value: 100.00\n"));
/// assert!(report.contains("  Cab 1: Direct cab: ONLY students from its own region."));
/// ```
#[must_use]
pub fn render_report(result: &SolveResult, plan: &VehiclePlan) -> String {
    [
        summary_block(result),
        movement_block(result),
        packing_block(plan),
        matrix_block(result),
    ]
    .join("\n")
}

fn join_cells<const N: usize>(cells: [String; N]) -> String {
    cells.join(" ")
}
