//! Ranking of the reduce output and rendering of the final report.

use std::fmt;
use std::num::NonZeroUsize;

use clap::ValueEnum;
use itertools::Itertools;
use serde::Serialize;

use common::{FrequencyMap, Ranked, Workload};

/// Select the `n` keys with the highest counts.
///
/// Ordered by count, descending. Equal counts are ordered by key, ascending,
/// so the selection never depends on map iteration order. Asking for more
/// keys than exist returns all of them.
pub fn top_n(result: &FrequencyMap, n: NonZeroUsize) -> Vec<Ranked> {
    result
        .iter()
        .sorted_unstable_by(|(key_a, count_a), (key_b, count_b)| {
            count_b.cmp(count_a).then_with(|| key_a.cmp(key_b))
        })
        .take(n.get())
        .map(|(key, count)| Ranked::new(key.as_str(), *count))
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// `<label>: <key> - <metric>: <count>`, one line per key.
    #[default]
    Text,

    /// A single JSON document.
    Json,
}

/// Outcome of one standalone job.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub workload: &'static str,
    pub label: &'static str,
    pub metric: &'static str,

    /// Highest counts first.
    pub top: Vec<Ranked>,

    /// Number of input files read.
    pub shards: usize,

    /// Number of records counted.
    pub records: usize,

    /// Number of invalid records skipped.
    pub skipped: usize,
}

impl Report {
    pub fn new(workload: &Workload, top: Vec<Ranked>) -> Self {
        Self {
            workload: workload.name,
            label: workload.label,
            metric: workload.metric,
            top,
            shards: 0,
            records: 0,
            skipped: 0,
        }
    }

    pub fn render(&self, format: Format) -> serde_json::Result<String> {
        match format {
            Format::Text => Ok(self.to_string()),
            Format::Json => {
                let mut out = serde_json::to_string_pretty(self)?;
                out.push('\n');
                Ok(out)
            }
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ranked in &self.top {
            writeln!(
                f,
                "{}: {} - {}: {}",
                self.label, ranked.key, self.metric, ranked.count
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::count;

    fn n(value: usize) -> NonZeroUsize {
        NonZeroUsize::new(value).unwrap()
    }

    fn counts(entries: &[(&str, u64)]) -> FrequencyMap {
        entries.iter().map(|(k, c)| (k.to_string(), *c)).collect()
    }

    #[test]
    fn ties_go_to_the_smaller_key() {
        let result = counts(&[("A", 3), ("B", 5), ("C", 5)]);
        assert_eq!(top_n(&result, n(1)), [Ranked::new("B", 5)]);
        assert_eq!(
            top_n(&result, n(2)),
            [Ranked::new("B", 5), Ranked::new("C", 5)]
        );
    }

    #[test]
    fn more_than_available_returns_everything() {
        let result = counts(&[("A", 3), ("B", 5), ("C", 1)]);
        assert_eq!(
            top_n(&result, n(10)),
            [Ranked::new("B", 5), Ranked::new("A", 3), Ranked::new("C", 1)]
        );
    }

    #[test]
    fn empty_result_ranks_nothing() {
        assert!(top_n(&FrequencyMap::default(), n(3)).is_empty());
    }

    #[test]
    fn most_frequent_passenger() {
        let result = count(["P1", "P2", "P1", "P3", "P1", "P2"]);
        assert_eq!(top_n(&result, NonZeroUsize::MIN), [Ranked::new("P1", 3)]);
    }

    #[test]
    fn text_rendering() {
        let workload = workload::passenger_count::WORKLOAD;
        let report = Report::new(
            &workload,
            vec![Ranked::new("UES9151GS5", 25), Ranked::new("DAZ3029XA0", 23)],
        );
        assert_eq!(
            report.render(Format::Text).unwrap(),
            "Passenger ID: UES9151GS5 - Total Flights: 25\n\
             Passenger ID: DAZ3029XA0 - Total Flights: 23\n"
        );
    }

    #[test]
    fn json_rendering() {
        let workload = workload::flight_load::WORKLOAD;
        let mut report = Report::new(&workload, vec![Ranked::new("SQU6245R", 4)]);
        report.shards = 1;
        report.records = 9;
        report.skipped = 2;

        let rendered = report.render(Format::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["workload"], "flight");
        assert_eq!(value["label"], "Flight ID");
        assert_eq!(value["top"][0]["key"], "SQU6245R");
        assert_eq!(value["top"][0]["count"], 4);
        assert_eq!(value["skipped"], 2);
    }
}
