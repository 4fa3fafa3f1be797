//! Shared types for the MapReduce (lite) frequency pipeline.
//!
//! Records are read from delimited text files, reduced to a single key each,
//! counted, bucketed by `ihash(key) % n_reduce` and merged back together.
//! Everything runs inside one process, but the bucket is kept as the unit
//! a separate reducer would receive.

use std::fmt;
use std::hash::Hasher;
use std::num::NonZeroUsize;

use csv::StringRecord;
use fnv::FnvHashMap;
use serde::Serialize;

pub mod error;
pub mod job;

/////////////////////////////////////////////////////////////////////////////
// MapReduce application types
/////////////////////////////////////////////////////////////////////////////

/// Picks the key field out of a raw record.
///
/// Returns `None` when the record does not have the field at all. The
/// loader is responsible for rejecting blank keys.
pub type ExtractFn = fn(record: &StringRecord) -> Option<&str>;

/// A frequency counting application.
#[derive(Copy, Clone)]
pub struct Workload {
    /// Name used to select the workload on the command line.
    pub name: &'static str,

    /// Key extraction.
    pub extract_fn: ExtractFn,

    /// Label printed in front of each key in the report.
    pub label: &'static str,

    /// Name of the counted metric in the report.
    pub metric: &'static str,
}

impl fmt::Debug for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workload")
            .field("name", &self.name)
            .field("label", &self.label)
            .field("metric", &self.metric)
            .finish_non_exhaustive()
    }
}

/////////////////////////////////////////////////////////////////////////////
// Intermediate data
/////////////////////////////////////////////////////////////////////////////

/// Occurrence count of a key.
pub type Count = u64;

/// Mapping from key to occurrence count.
pub type FrequencyMap = FnvHashMap<String, Count>;

/// The (key, count) entries assigned to one reduce partition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bucket {
    /// Partition index in `[0, n_reduce)`.
    pub index: usize,

    /// Entries routed to this partition, in the order they were shuffled.
    pub entries: Vec<(String, Count)>,
}

impl Bucket {
    /// Construct an empty bucket for the given partition.
    pub fn new(index: usize) -> Self {
        Self {
            index,
            entries: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the keys carried by this bucket.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

/// A key and its total count, as selected by the reporter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Ranked {
    pub key: String,
    pub count: Count,
}

impl Ranked {
    pub fn new(key: impl Into<String>, count: Count) -> Self {
        Self {
            key: key.into(),
            count,
        }
    }
}

/////////////////////////////////////////////////////////////////////////////
// Hashing
/////////////////////////////////////////////////////////////////////////////

/// Hashes an intermediate key. Compute a reduce bucket for a given key
/// by calculating `ihash(key) % n_reduce`.
///
/// FNV-1a does not depend on a per-process seed, so the same key lands in
/// the same bucket on every run.
pub fn ihash(key: &[u8]) -> u32 {
    let mut hasher = fnv::FnvHasher::default();
    hasher.write(key);
    // Masked to 31 bits, the cast cannot truncate.
    (hasher.finish() & 0x7fff_ffff) as u32
}

/// Reduce bucket of `key` for `n_reduce` partitions.
#[inline]
pub fn bucket_of(key: &str, n_reduce: NonZeroUsize) -> usize {
    ihash(key.as_bytes()) as usize % n_reduce.get()
}
