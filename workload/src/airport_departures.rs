//! Number of passenger departures from each airport.

use common::Workload;
use csv::StringRecord;

pub const NAME: &str = "airport";

pub const WORKLOAD: Workload = Workload {
    name: NAME,
    extract_fn: extract,
    label: "Airport",
    metric: "Departures",
};

// Departure airport is the third column, its IATA code.
pub fn extract(record: &StringRecord) -> Option<&str> {
    record.get(2)
}
