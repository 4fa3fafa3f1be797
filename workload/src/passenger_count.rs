//! Number of flights taken by each passenger.

use common::Workload;
use csv::StringRecord;

pub const NAME: &str = "passenger";

pub const WORKLOAD: Workload = Workload {
    name: NAME,
    extract_fn: extract,
    label: "Passenger ID",
    metric: "Total Flights",
};

pub fn extract(record: &StringRecord) -> Option<&str> {
    record.get(0)
}
