//! Seat individual bookings into packed cabs.
//!
//! Bookings are taken per home region in the order they were made, so the
//! earliest booking from a region boards the first cab that picks up from it.

use std::collections::VecDeque;

use thiserror::Error;

use crate::{REGION_COUNT, Region, VehiclePlan};

/// A student's ride request.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Booking {
    /// Caller-assigned identifier.
    pub id: String,
    /// Hall code the student boards from.
    pub hall: String,
}

impl Booking {
    /// Convenience constructor.
    pub fn new(id: impl Into<String>, hall: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            hall: hall.into(),
        }
    }
}

/// A booking placed in a numbered seat.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SeatedRider {
    /// Identifier of the booking.
    pub booking_id: String,
    /// Home region of the rider.
    pub origin: Region,
    /// Seat position, from 1 in boarding order.
    pub seat: u32,
}

/// A cab with its riders in seat order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SeatedCab {
    /// Global cab number.
    pub number: u32,
    /// Region the cab is dispatched from.
    pub pickup: Region,
    /// Riders in seat order.
    pub riders: Vec<SeatedRider>,
}

/// Errors raised when bookings do not match a plan.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    /// A booking names a hall that belongs to no region.
    #[error("booking {booking_id} names unknown hall {hall:?}")]
    UnknownHall {
        /// Offending booking.
        booking_id: String,
        /// Hall as given.
        hall: String,
    },
    /// The plan seats more riders from a region than were booked.
    #[error("plan needs {needed} riders from {origin} but only {available} booked")]
    MissingBookings {
        /// Home region.
        origin: Region,
        /// Riders the plan seats.
        needed: u64,
        /// Bookings available.
        available: usize,
    },
    /// Bookings from a region were left without a seat.
    #[error("{unseated} bookings from {origin} have no seat in the plan")]
    SurplusBookings {
        /// Home region.
        origin: Region,
        /// Bookings left over.
        unseated: usize,
    },
}

/// Assign every booking to a seat in `plan`.
///
/// # Errors
/// Returns a [`RosterError`] when a hall is unknown or the bookings per
/// region differ from what the plan seats.
///
/// # Examples
/// ```
/// use cabpool_core::{Booking, Region, pack_matrix, seat_riders};
///
/// let mut assignments = [[0; 7]; 7];
/// assignments[0][0] = 2;
/// let plan = pack_matrix(&assignments, &[1, 0, 0, 0, 0, 0, 0], 7).unwrap();
/// let cabs = seat_riders(&plan, &[Booking::new("a", "RK"), Booking::new("b", "rp")]).unwrap();
/// assert_eq!(cabs[0].pickup, Region::RkRp);
/// assert_eq!(cabs[0].riders[1].booking_id, "b");
/// assert_eq!(cabs[0].riders[1].seat, 2);
/// ```
pub fn seat_riders(
    plan: &VehiclePlan,
    bookings: &[Booking],
) -> Result<Vec<SeatedCab>, RosterError> {
    let mut queues: [VecDeque<&Booking>; REGION_COUNT] = std::array::from_fn(|_| VecDeque::new());
    for booking in bookings {
        let region = Region::from_hall(&booking.hall).map_err(|_| RosterError::UnknownHall {
            booking_id: booking.id.clone(),
            hall: booking.hall.clone(),
        })?;
        queues[region.index()].push_back(booking);
    }
    let booked: [usize; REGION_COUNT] = std::array::from_fn(|i| queues[i].len());

    let mut cabs = Vec::with_capacity(plan.len());
    for manifest in plan.manifests() {
        let mut riders = Vec::new();
        for load in manifest.loads() {
            let queue = &mut queues[load.origin.index()];
            for _ in 0..load.count {
                let booking = queue
                    .pop_front()
                    .ok_or_else(|| missing(plan, load.origin, booked[load.origin.index()]))?;
                riders.push(SeatedRider {
                    booking_id: booking.id.clone(),
                    origin: load.origin,
                    seat: next_seat(&riders),
                });
            }
        }
        cabs.push(SeatedCab {
            number: manifest.number(),
            pickup: manifest.region(),
            riders,
        });
    }

    if let Some(origin) = Region::ALL
        .into_iter()
        .find(|origin| !queues[origin.index()].is_empty())
    {
        return Err(RosterError::SurplusBookings {
            origin,
            unseated: queues[origin.index()].len(),
        });
    }
    log::debug!("seated {} bookings in {} cabs", bookings.len(), cabs.len());
    Ok(cabs)
}

fn next_seat(riders: &[SeatedRider]) -> u32 {
    riders.last().map_or(1, |rider| rider.seat + 1)
}

fn missing(plan: &VehiclePlan, origin: Region, available: usize) -> RosterError {
    let needed = plan
        .manifests()
        .iter()
        .flat_map(|manifest| manifest.loads())
        .filter(|load| load.origin == origin)
        .map(|load| u64::from(load.count))
        .sum();
    RosterError::MissingBookings {
        origin,
        needed,
        available,
    }
}
