//! Behavioural tests for cab packing using rstest-bdd.

use std::cell::RefCell;

use cabpool_core::{
    AssignmentMatrix, PackingError, REGION_COUNT, Region, VehicleKind, VehiclePlan, pack_matrix,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

/// World state for packing scenarios.
#[derive(Debug, Default)]
struct PackingWorld {
    assignments: RefCell<AssignmentMatrix>,
    vehicles: RefCell<[u32; REGION_COUNT]>,
    outcome: RefCell<Option<Result<VehiclePlan, PackingError>>>,
}

impl PackingWorld {
    fn plan(&self) -> VehiclePlan {
        self.outcome
            .borrow()
            .clone()
            .expect("cabs should be packed")
            .expect("packing should succeed")
    }

    fn error(&self) -> PackingError {
        self.outcome
            .borrow()
            .clone()
            .expect("cabs should be packed")
            .expect_err("packing should fail")
    }
}

fn region(number: usize) -> Region {
    Region::from_index(number - 1).expect("region numbers run from 1 to 7")
}

#[fixture]
fn world() -> PackingWorld {
    PackingWorld::default()
}

#[given("{count} students from region {origin} assigned to region {destination}")]
fn given_assignment(world: &PackingWorld, count: u32, origin: usize, destination: usize) {
    world.assignments.borrow_mut()[region(origin).index()][region(destination).index()] = count;
}

#[given("{cabs} cabs dispatched at region {number}")]
fn given_vehicles(world: &PackingWorld, cabs: u32, number: usize) {
    world.vehicles.borrow_mut()[region(number).index()] = cabs;
}

#[when("the cabs are packed")]
fn when_packed(world: &PackingWorld) {
    let outcome = pack_matrix(&world.assignments.borrow(), &world.vehicles.borrow(), 7);
    world.outcome.replace(Some(outcome));
}

#[then("{count} manifests are produced")]
fn then_manifest_count(world: &PackingWorld, count: usize) {
    assert_eq!(world.plan().len(), count);
}

#[then("cab {number} carries {riders} riders")]
fn then_cab_load(world: &PackingWorld, number: usize, riders: u32) {
    let plan = world.plan();
    let cab = plan.manifests().get(number - 1).expect("cab should exist");
    assert_eq!(cab.number() as usize, number);
    assert_eq!(cab.seats_used(), riders);
}

#[then("every cab is direct")]
fn then_all_direct(world: &PackingWorld) {
    let plan = world.plan();
    assert_eq!(plan.direct_count(), plan.len());
}

#[then("cab {number} boards {count} riders from region {origin} first")]
fn then_first_load(world: &PackingWorld, number: usize, count: u32, origin: usize) {
    let plan = world.plan();
    let cab = plan.manifests().get(number - 1).expect("cab should exist");
    let first = cab.loads().first().expect("cab should carry riders");
    assert_eq!(first.origin, region(origin));
    assert_eq!(first.count, count);
}

#[then("cab {number} is mixed")]
fn then_mixed(world: &PackingWorld, number: usize) {
    let plan = world.plan();
    let cab = plan.manifests().get(number - 1).expect("cab should exist");
    assert_eq!(cab.kind(), VehicleKind::Mixed);
}

#[then("packing fails with an empty cab")]
fn then_empty_cab(world: &PackingWorld) {
    assert!(matches!(world.error(), PackingError::EmptyVehicle { .. }));
}

#[then("packing fails with {remaining} students left over")]
fn then_left_over(world: &PackingWorld, remaining: u64) {
    assert!(matches!(
        world.error(),
        PackingError::UnpackedStudents { remaining: left, .. } if left == remaining
    ));
}

#[scenario(path = "tests/features/packing.feature", index = 0)]
fn direct_cabs(world: PackingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/packing.feature", index = 1)]
fn furthest_riders_board_first(world: PackingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/packing.feature", index = 2)]
fn empty_cab_rejected(world: PackingWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/packing.feature", index = 3)]
fn leftover_students_rejected(world: PackingWorld) {
    let _ = world;
}
