//! Number of passengers booked on each flight.

use common::Workload;
use csv::StringRecord;

pub const NAME: &str = "flight";

pub const WORKLOAD: Workload = Workload {
    name: NAME,
    extract_fn: extract,
    label: "Flight ID",
    metric: "Passengers",
};

pub fn extract(record: &StringRecord) -> Option<&str> {
    record.get(1)
}
