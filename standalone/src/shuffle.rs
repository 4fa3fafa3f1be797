//! Shuffle phase: route frequency map entries to reduce partitions.

use std::num::NonZeroUsize;

use itertools::Itertools;
use tracing::{debug, info};

use common::{bucket_of, Bucket, FrequencyMap};

/// Chooses the reduce partition of a key.
///
/// Implementations must be deterministic for the lifetime of a job. Indices
/// at or above `n_reduce` wrap around.
pub trait Partitioner {
    fn partition(&self, key: &str, n_reduce: NonZeroUsize) -> usize;
}

/// `ihash(key) % n_reduce`.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashPartitioner;

impl Partitioner for HashPartitioner {
    fn partition(&self, key: &str, n_reduce: NonZeroUsize) -> usize {
        bucket_of(key, n_reduce)
    }
}

impl<F> Partitioner for F
where
    F: Fn(&str, NonZeroUsize) -> usize,
{
    fn partition(&self, key: &str, n_reduce: NonZeroUsize) -> usize {
        self(key, n_reduce)
    }
}

/// Split `counts` into exactly `n_reduce` buckets.
///
/// Every entry lands in one bucket. Entries inside a bucket are ordered by
/// key so the same map always shuffles to the same buckets.
pub fn shuffle<P>(counts: &FrequencyMap, n_reduce: NonZeroUsize, partitioner: &P) -> Vec<Bucket>
where
    P: Partitioner + ?Sized,
{
    let mut buckets = (0..n_reduce.get()).map(Bucket::new).collect::<Vec<_>>();

    for (key, count) in counts.iter().sorted_unstable_by(|a, b| a.0.cmp(b.0)) {
        let index = partitioner.partition(key, n_reduce) % n_reduce.get();
        buckets[index].entries.push((key.clone(), *count));
    }
    buckets
}

/// Shuffle the output of every map task. Bucket `r` of each map task is
/// destined for reducer `r`.
pub fn perform_shuffle<P>(maps: &[FrequencyMap], n_reduce: NonZeroUsize, partitioner: &P) -> Vec<Bucket>
where
    P: Partitioner + ?Sized,
{
    info!("Starting shuffle phase with {} partition(s)", n_reduce);

    let buckets = maps
        .iter()
        .flat_map(|counts| shuffle(counts, n_reduce, partitioner))
        .collect::<Vec<_>>();

    debug!(
        buckets = buckets.len(),
        non_empty = buckets.iter().filter(|b| !b.is_empty()).count(),
        "shuffle done"
    );
    buckets
}
