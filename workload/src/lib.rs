//! Frequency counting applications over flight records.
//!
//! Every input row describes one passenger on one flight:
//!
//! ```text
//! passenger_id,flight_id,from_airport,to_airport,departure_time,flight_minutes
//! UES9151GS5,SQU6245R,DEN,FRA,1420564460,1049
//! ```
//!
//! A workload picks which of these columns is counted.

use common::Workload;

pub mod airport_departures;
pub mod flight_load;
pub mod passenger_count;

/// Workload used when none is named.
pub const DEFAULT: &str = passenger_count::NAME;

/// All known workloads, in the order they are listed to users.
pub fn all() -> [Workload; 3] {
    [
        passenger_count::WORKLOAD,
        flight_load::WORKLOAD,
        airport_departures::WORKLOAD,
    ]
}

/// Look up a workload by name.
pub fn try_named(name: &str) -> Option<Workload> {
    all().into_iter().find(|wl| wl.name == name)
}
