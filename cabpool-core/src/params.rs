//! Fixed cost and capacity parameters for an allocation run.

use thiserror::Error;

use crate::Region;

/// Capacity and cost weights fed into the model builder.
///
/// The defaults describe seven-seat cabs, a cost of 1 per region travelled
/// towards the gate, 10 per region travelled away from it and 100 per
/// dispatched cab.
///
/// # Examples
/// ```
/// use cabpool_core::{AllocationParams, Region};
///
/// let params = AllocationParams::default();
/// assert_eq!(params.capacity, 7);
/// assert_eq!(params.swap_cost(Region::RkRp, Region::PanLoop), 6);
/// assert_eq!(params.swap_cost(Region::PanLoop, Region::RkRp), 60);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct AllocationParams {
    /// Seats per cab.
    pub capacity: u32,
    /// Cost per region moved towards the gate.
    pub with_flow_rate: u32,
    /// Cost per region moved away from the gate.
    pub against_flow_rate: u32,
    /// Fixed cost of dispatching one cab.
    pub vehicle_cost: u32,
}

/// Errors returned by [`AllocationParams::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamsError {
    /// Cabs must have at least one seat.
    #[error("cab capacity must be at least 1")]
    ZeroCapacity,
}

impl Default for AllocationParams {
    fn default() -> Self {
        Self {
            capacity: 7,
            with_flow_rate: 1,
            against_flow_rate: 10,
            vehicle_cost: 100,
        }
    }
}

impl AllocationParams {
    /// Validates and constructs [`AllocationParams`].
    ///
    /// # Errors
    /// Returns [`ParamsError::ZeroCapacity`] when `capacity` is zero.
    pub const fn new(
        capacity: u32,
        with_flow_rate: u32,
        against_flow_rate: u32,
        vehicle_cost: u32,
    ) -> Result<Self, ParamsError> {
        let params = Self {
            capacity,
            with_flow_rate,
            against_flow_rate,
            vehicle_cost,
        };
        if let Err(err) = params.validate() {
            return Err(err);
        }
        Ok(params)
    }

    /// Check parameters built from a struct literal or deserialised input.
    ///
    /// # Errors
    /// Returns [`ParamsError::ZeroCapacity`] when `capacity` is zero.
    pub const fn validate(&self) -> Result<(), ParamsError> {
        if self.capacity == 0 {
            return Err(ParamsError::ZeroCapacity);
        }
        Ok(())
    }

    /// Per-student cost of riding from `origin` in a cab dispatched at
    /// `destination`.
    #[must_use]
    pub fn swap_cost(&self, origin: Region, destination: Region) -> u64 {
        let (from, to) = (origin.index(), destination.index());
        match to.cmp(&from) {
            std::cmp::Ordering::Equal => 0,
            std::cmp::Ordering::Greater => u64::from(self.with_flow_rate) * distance(from, to),
            std::cmp::Ordering::Less => u64::from(self.against_flow_rate) * distance(to, from),
        }
    }
}

const fn distance(low: usize, high: usize) -> u64 {
    (high - low) as u64
}
