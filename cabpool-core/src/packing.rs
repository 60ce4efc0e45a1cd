//! Decompose a solved assignment matrix into per-cab manifests.
//!
//! Packing is first fit in index order: destinations are visited from the
//! furthest region towards the gate and each cab is filled by sweeping origins
//! in the same order. The decomposition is not optimal in the number of mixed
//! cabs; it is fixed so that reports stay reproducible for a given matrix.

use thiserror::Error;

use crate::result::{AssignmentMatrix, VehicleCounts};
use crate::{REGION_COUNT, Region, SolveResult};

/// Students from one origin boarding a cab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Load {
    /// Home region of the riders.
    pub origin: Region,
    /// Number of riders.
    pub count: u32,
}

/// Classification of a manifest by where its riders come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum VehicleKind {
    /// Every rider lives in the cab's own region.
    Direct,
    /// Riders from several regions, or from a single foreign one.
    Mixed,
    /// No riders. Packing rejects such a cab as
    /// [`PackingError::EmptyVehicle`], so a [`VehiclePlan`] never holds one.
    Empty,
}

impl VehicleKind {
    /// Report wording for the kind.
    #[must_use]
    pub const fn verdict(self) -> &'static str {
        match self {
            Self::Direct => "Direct cab: ONLY students from its own region.",
            Self::Mixed => "Mixed cab: boarding students from multiple regions.",
            Self::Empty => "Empty cab (no students) - should not happen.",
        }
    }
}

/// One dispatched cab and who boards it.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VehicleManifest {
    number: u32,
    region: Region,
    loads: Vec<Load>,
    kind: VehicleKind,
}

impl VehicleManifest {
    fn new(number: u32, region: Region, loads: Vec<Load>) -> Self {
        let kind = match loads.as_slice() {
            [] => VehicleKind::Empty,
            [only] if only.origin == region => VehicleKind::Direct,
            _ => VehicleKind::Mixed,
        };
        Self {
            number,
            region,
            loads,
            kind,
        }
    }

    /// Global cab number, starting at 1 in dispatch order.
    #[must_use]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Region the cab is dispatched from.
    #[must_use]
    pub const fn region(&self) -> Region {
        self.region
    }

    /// Boarding groups in boarding order.
    #[must_use]
    pub fn loads(&self) -> &[Load] {
        &self.loads
    }

    /// Derived classification.
    #[must_use]
    pub const fn kind(&self) -> VehicleKind {
        self.kind
    }

    /// Seats taken.
    #[must_use]
    pub fn seats_used(&self) -> u32 {
        self.loads.iter().map(|load| load.count).sum()
    }
}

/// Invariant violations detected while packing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PackingError {
    /// A dispatched cab received no riders.
    #[error("cab {number} at {region} has no riders")]
    EmptyVehicle {
        /// Region the cab was dispatched from.
        region: Region,
        /// Global cab number.
        number: u32,
    },
    /// The cabs at a region could not seat every student assigned to it.
    #[error("{remaining} students assigned to {region} do not fit its cabs")]
    UnpackedStudents {
        /// Destination region.
        region: Region,
        /// Students left over.
        remaining: u64,
    },
    /// Cabs were asked to carry riders with no seats.
    #[error("cab capacity must be at least 1")]
    ZeroCapacity,
}

/// Every cab manifest for one solved allocation, in dispatch order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VehiclePlan {
    capacity: u32,
    manifests: Vec<VehicleManifest>,
}

impl VehiclePlan {
    /// Pack the cabs of a solved allocation.
    ///
    /// # Errors
    /// See [`pack_matrix`].
    pub fn from_result(result: &SolveResult) -> Result<Self, PackingError> {
        pack_vehicles(result)
    }

    /// Seats per cab.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// All manifests, numbered from 1.
    #[must_use]
    pub fn manifests(&self) -> &[VehicleManifest] {
        &self.manifests
    }

    /// Manifests for cabs dispatched at `region`.
    pub fn for_region(&self, region: Region) -> impl Iterator<Item = &VehicleManifest> + '_ {
        self.manifests
            .iter()
            .filter(move |manifest| manifest.region == region)
    }

    /// Number of direct cabs.
    #[must_use]
    pub fn direct_count(&self) -> usize {
        self.count_kind(VehicleKind::Direct)
    }

    /// Number of mixed cabs.
    #[must_use]
    pub fn mixed_count(&self) -> usize {
        self.count_kind(VehicleKind::Mixed)
    }

    /// Number of cabs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.manifests.len()
    }

    /// Whether no cab is dispatched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.manifests.is_empty()
    }

    fn count_kind(&self, kind: VehicleKind) -> usize {
        self.manifests
            .iter()
            .filter(|manifest| manifest.kind == kind)
            .count()
    }
}

/// Pack the cabs of a solved allocation.
///
/// # Errors
/// See [`pack_matrix`]. A validated [`SolveResult`] never triggers them; an
/// error here means the packing routine itself is broken.
pub fn pack_vehicles(result: &SolveResult) -> Result<VehiclePlan, PackingError> {
    pack_matrix(result.assignments(), result.vehicles(), result.capacity())
}

/// Split each column of `assignments` over `vehicles[j]` cabs of `capacity`
/// seats.
///
/// # Errors
/// Returns [`PackingError::EmptyVehicle`] when a cab would leave without
/// riders and [`PackingError::UnpackedStudents`] when a region's cabs cannot
/// seat its column. Both are logged at error level.
///
/// # Examples
/// ```
/// use cabpool_core::{Region, VehicleKind, pack_matrix};
///
/// let mut assignments = [[0; 7]; 7];
/// assignments[0][6] = 3;
/// assignments[6][6] = 4;
/// let plan = pack_matrix(&assignments, &[0, 0, 0, 0, 0, 0, 1], 7).unwrap();
/// let cab = &plan.manifests()[0];
/// assert_eq!(cab.region(), Region::PanLoop);
/// assert_eq!(cab.kind(), VehicleKind::Mixed);
/// assert_eq!(cab.seats_used(), 7);
/// ```
pub fn pack_matrix(
    assignments: &AssignmentMatrix,
    vehicles: &VehicleCounts,
    capacity: u32,
) -> Result<VehiclePlan, PackingError> {
    if capacity == 0 {
        return Err(PackingError::ZeroCapacity);
    }

    let mut manifests = Vec::new();
    let mut number = 0_u32;
    for destination in Region::ALL {
        let mut remaining: [u32; REGION_COUNT] =
            std::array::from_fn(|origin| assignments[origin][destination.index()]);

        for _ in 0..vehicles[destination.index()] {
            number += 1;
            let loads = board(&mut remaining, capacity);
            let manifest = VehicleManifest::new(number, destination, loads);
            if manifest.kind == VehicleKind::Empty {
                log::error!("cab {number} dispatched at {destination} has no riders");
                return Err(PackingError::EmptyVehicle {
                    region: destination,
                    number,
                });
            }
            manifests.push(manifest);
        }

        let left: u64 = remaining.iter().copied().map(u64::from).sum();
        if left > 0 {
            log::error!("{left} students assigned to {destination} were not packed");
            return Err(PackingError::UnpackedStudents {
                region: destination,
                remaining: left,
            });
        }
    }

    Ok(VehiclePlan {
        capacity,
        manifests,
    })
}

fn board(remaining: &mut [u32; REGION_COUNT], capacity: u32) -> Vec<Load> {
    let mut seats_left = capacity;
    let mut loads = Vec::new();
    for origin in Region::ALL {
        if seats_left == 0 {
            break;
        }
        let waiting = &mut remaining[origin.index()];
        if *waiting == 0 {
            continue;
        }
        let count = (*waiting).min(seats_left);
        *waiting -= count;
        seats_left -= count;
        loads.push(Load { origin, count });
    }
    loads
}
