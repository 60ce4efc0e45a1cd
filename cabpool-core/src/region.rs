//! The seven pickup regions and per-region student counts.
//!
//! Regions are ordered along the path towards the campus gate: a higher index
//! sits closer to the gate. Every hall of residence belongs to exactly one
//! region; a few halls share a region with a neighbour.
//!
//! # Examples
//! ```
//! use cabpool_core::{Region, RegionVector};
//!
//! assert_eq!(Region::Ms.label(), "R3");
//! assert_eq!("jcb".parse::<Region>(), Ok(Region::HjbJcb));
//!
//! let demand = RegionVector::new(&[3, 0, 0, 0, 0, 0, 4]).unwrap();
//! assert_eq!(demand.total(), 7);
//! assert_eq!(demand[Region::PanLoop], 4);
//! ```

use std::ops::Index;

use thiserror::Error;

/// Number of regions served by the allocator.
pub const REGION_COUNT: usize = 7;

/// Largest student count accepted for one region.
///
/// The bundled `microlp` backend solves models at this size in well under a
/// second; far larger counts exhaust its memory.
pub const MAX_REGION_STUDENTS: u32 = 100_000;

/// A pickup region, ordered by distance from the gate (furthest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Region {
    /// RK and RP halls.
    RkRp,
    /// GKH and VS halls.
    GkhVs,
    /// MS hall.
    Ms,
    /// HJB and JCB halls.
    HjbJcb,
    /// LLR hall.
    Llr,
    /// LBS and MMM halls.
    LbsMmm,
    /// The PAN loop.
    PanLoop,
}

impl Region {
    /// All regions in index order.
    pub const ALL: [Self; REGION_COUNT] = [
        Self::RkRp,
        Self::GkhVs,
        Self::Ms,
        Self::HjbJcb,
        Self::Llr,
        Self::LbsMmm,
        Self::PanLoop,
    ];

    /// Zero-based position of the region on the path to the gate.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Look a region up by its zero-based index.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < REGION_COUNT {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Human-readable region name used in reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RkRp => "Region 1: RK + RP",
            Self::GkhVs => "Region 2: GKH + VS",
            Self::Ms => "Region 3: MS",
            Self::HjbJcb => "Region 4: HJB + JCB",
            Self::Llr => "Region 5: LLR",
            Self::LbsMmm => "Region 6: LBS + MMM",
            Self::PanLoop => "Region 7: PAN loop",
        }
    }

    /// Short label (`R1`..`R7`) used in compact tables.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RkRp => "R1",
            Self::GkhVs => "R2",
            Self::Ms => "R3",
            Self::HjbJcb => "R4",
            Self::Llr => "R5",
            Self::LbsMmm => "R6",
            Self::PanLoop => "R7",
        }
    }

    /// Primary hall code the region is booked under.
    #[must_use]
    pub const fn hall(self) -> &'static str {
        match self {
            Self::RkRp => "RK",
            Self::GkhVs => "VS",
            Self::Ms => "MS",
            Self::HjbJcb => "HJB",
            Self::Llr => "LLR",
            Self::LbsMmm => "LBS",
            Self::PanLoop => "PAN",
        }
    }

    /// Resolve a hall code (case-insensitive), including the halls that
    /// share a region with a neighbour.
    ///
    /// # Errors
    /// Returns [`RegionVectorError::UnknownHall`] when the code names no hall.
    pub fn from_hall(hall: &str) -> Result<Self, RegionVectorError> {
        match hall.trim().to_ascii_uppercase().as_str() {
            "RK" | "RP" => Ok(Self::RkRp),
            "VS" | "GKH" => Ok(Self::GkhVs),
            "MS" => Ok(Self::Ms),
            "HJB" | "JCB" => Ok(Self::HjbJcb),
            "LLR" => Ok(Self::Llr),
            "LBS" | "MMM" => Ok(Self::LbsMmm),
            "PAN" => Ok(Self::PanLoop),
            _ => Err(RegionVectorError::UnknownHall {
                hall: hall.to_owned(),
            }),
        }
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Region {
    type Err = RegionVectorError;

    /// Accepts hall codes as well as the `R1`..`R7` labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|region| region.label().eq_ignore_ascii_case(s.trim()))
            .map_or_else(|| Self::from_hall(s), Ok)
    }
}

/// Errors raised while building a [`RegionVector`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionVectorError {
    /// The input did not contain exactly one entry per region.
    #[error("expected {REGION_COUNT} region counts, found {found}")]
    WrongLength {
        /// Number of entries supplied.
        found: usize,
    },
    /// A region count was negative.
    #[error("student count for {region} must be non-negative, found {value}")]
    Negative {
        /// Offending region.
        region: Region,
        /// Value supplied.
        value: i64,
    },
    /// A region count exceeds [`MAX_REGION_STUDENTS`].
    #[error("student count for {region} exceeds {MAX_REGION_STUDENTS}: {value}")]
    TooLarge {
        /// Offending region.
        region: Region,
        /// Value supplied.
        value: i64,
    },
    /// A hall code did not match any region.
    #[error("unknown hall '{hall}'")]
    UnknownHall {
        /// Hall code as supplied.
        hall: String,
    },
}

/// Student counts per region, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RegionVector([u32; REGION_COUNT]);

impl RegionVector {
    /// Validate raw counts, one per region in index order.
    ///
    /// # Errors
    /// Returns [`RegionVectorError::WrongLength`] unless exactly seven counts
    /// are given, and [`RegionVectorError::Negative`] or
    /// [`RegionVectorError::TooLarge`] for out-of-range entries.
    pub fn new(counts: &[i64]) -> Result<Self, RegionVectorError> {
        if counts.len() != REGION_COUNT {
            return Err(RegionVectorError::WrongLength {
                found: counts.len(),
            });
        }
        let mut validated = [0_u32; REGION_COUNT];
        for ((slot, &value), region) in validated.iter_mut().zip(counts).zip(Region::ALL) {
            *slot = checked_count(region, value)?;
        }
        Ok(Self(validated))
    }

    /// Wrap counts that are already known to be valid.
    ///
    /// [`Self::ensure_supported`] rechecks the per-region ceiling.
    #[must_use]
    pub const fn from_counts(counts: [u32; REGION_COUNT]) -> Self {
        Self(counts)
    }

    /// Aggregate `(hall, count)` pairs into region counts.
    ///
    /// Halls sharing a region are summed.
    ///
    /// # Errors
    /// Fails on unknown hall codes and on negative or oversized counts.
    pub fn from_hall_demand<I, S>(demand: I) -> Result<Self, RegionVectorError>
    where
        I: IntoIterator<Item = (S, i64)>,
        S: AsRef<str>,
    {
        let mut totals = [0_i64; REGION_COUNT];
        for (hall, count) in demand {
            let region = Region::from_hall(hall.as_ref())?;
            if count < 0 {
                return Err(RegionVectorError::Negative {
                    region,
                    value: count,
                });
            }
            let slot = &mut totals[region.index()];
            *slot = slot.saturating_add(count);
        }
        Self::new(&totals)
    }

    /// Counts in region index order.
    #[must_use]
    pub const fn counts(&self) -> &[u32; REGION_COUNT] {
        &self.0
    }

    /// Recheck the per-region ceiling on counts wrapped by
    /// [`Self::from_counts`].
    ///
    /// # Errors
    /// Returns [`RegionVectorError::TooLarge`] for the first region above
    /// [`MAX_REGION_STUDENTS`].
    pub fn ensure_supported(&self) -> Result<(), RegionVectorError> {
        self.iter().try_for_each(|(region, count)| {
            checked_count(region, i64::from(count)).map(|_| ())
        })
    }

    /// Total number of students across all regions.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.0.iter().copied().map(u64::from).sum()
    }

    /// Whether no student needs a ride.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&count| count == 0)
    }

    /// Iterate `(region, count)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (Region, u32)> + '_ {
        Region::ALL.into_iter().zip(self.0.iter().copied())
    }
}

impl Index<Region> for RegionVector {
    type Output = u32;

    fn index(&self, region: Region) -> &Self::Output {
        &self.0[region.index()]
    }
}

fn checked_count(region: Region, value: i64) -> Result<u32, RegionVectorError> {
    if value < 0 {
        return Err(RegionVectorError::Negative { region, value });
    }
    u32::try_from(value)
        .ok()
        .filter(|&count| count <= MAX_REGION_STUDENTS)
        .ok_or(RegionVectorError::TooLarge { region, value })
}
