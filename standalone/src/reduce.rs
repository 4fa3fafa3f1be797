//! Reduce phase: merge buckets back into one frequency map.

use std::num::NonZeroUsize;
use std::sync::mpsc;
use std::thread;

use itertools::Itertools;
use tracing::{debug, info};

use common::{Bucket, FrequencyMap};

/// How the reduce phase is executed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReduceMode {
    /// Fold every bucket on the calling thread.
    #[default]
    Sequential,

    /// Non-empty partitions are spread over scoped workers, at most one per
    /// available core. Workers send their partial maps back over a channel.
    Threaded,
}

/// Sum the counts of every bucket entry per key.
///
/// A key carried by several buckets (several shards, or a partitioner that
/// splits a key) is summed, never overwritten.
pub fn aggregate<'a, I>(buckets: I) -> FrequencyMap
where
    I: IntoIterator<Item = &'a Bucket>,
{
    let mut result = FrequencyMap::default();
    for bucket in buckets {
        for (key, count) in &bucket.entries {
            add(&mut result, key, *count);
        }
    }
    result
}

/// Merge `partial` into `result` by summation.
pub fn merge_into(result: &mut FrequencyMap, partial: FrequencyMap) {
    if result.is_empty() {
        *result = partial;
        return;
    }
    for (key, count) in partial {
        *result.entry(key).or_insert(0) += count;
    }
}

fn add(result: &mut FrequencyMap, key: &str, count: u64) {
    match result.get_mut(key) {
        Some(total) => *total += count,
        None => {
            result.insert(key.to_owned(), count);
        }
    }
}

/// Non-empty buckets of one partition index.
type Partition<'a> = (usize, Vec<&'a Bucket>);

/// Deal the non-empty partitions round-robin to at most `workers` workers.
fn assign_partitions(buckets: &[Bucket], workers: NonZeroUsize) -> Vec<Vec<Partition<'_>>> {
    let partitions = buckets
        .iter()
        .filter(|bucket| !bucket.is_empty())
        .into_group_map_by(|bucket| bucket.index)
        .into_iter()
        .sorted_unstable_by_key(|(index, _)| *index)
        .collect::<Vec<_>>();

    let workers = workers.get().min(partitions.len());
    let mut assigned = (0..workers).map(|_| Vec::new()).collect::<Vec<_>>();
    for (i, partition) in partitions.into_iter().enumerate() {
        assigned[i % workers].push(partition);
    }
    assigned
}

/// Reduce all partitions on scoped worker threads, one per available core.
pub fn aggregate_threaded(buckets: &[Bucket]) -> FrequencyMap {
    let workers = thread::available_parallelism().unwrap_or(NonZeroUsize::MIN);
    aggregate_with_workers(buckets, workers)
}

/// Reduce all partitions on at most `workers` scoped threads. Empty
/// partitions get no worker.
pub fn aggregate_with_workers(buckets: &[Bucket], workers: NonZeroUsize) -> FrequencyMap {
    let assigned = assign_partitions(buckets, workers);
    let (tx, rx) = mpsc::channel();

    thread::scope(|s| {
        for (worker, partitions) in assigned.into_iter().enumerate() {
            let tx = tx.clone();
            s.spawn(move || {
                for (index, group) in partitions {
                    let partial = aggregate(group);
                    debug!(worker, partition = index, keys = partial.len(), "partition reduced");
                    // The receiver outlives the scope, send cannot fail.
                    let _ = tx.send(partial);
                }
            });
        }
    });
    drop(tx);

    let mut result = FrequencyMap::default();
    for partial in rx {
        merge_into(&mut result, partial);
    }
    result
}

pub fn perform_reduce(buckets: &[Bucket], mode: ReduceMode) -> FrequencyMap {
    info!("Starting reduce phase over {} bucket(s) ({:?})", buckets.len(), mode);

    let result = match mode {
        ReduceMode::Sequential => aggregate(buckets),
        ReduceMode::Threaded => aggregate_threaded(buckets),
    };

    debug!(keys = result.len(), "reduce done");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::count;
    use crate::shuffle::{shuffle, HashPartitioner};

    fn bucket(index: usize, entries: &[(&str, u64)]) -> Bucket {
        Bucket {
            index,
            entries: entries.iter().map(|(k, c)| (k.to_string(), *c)).collect(),
        }
    }

    #[test]
    fn shuffle_then_reduce_restores_counts() {
        let mut rng = fastrand::Rng::with_seed(42);
        let keys = (0..2_000)
            .map(|_| format!("P{}", rng.u32(0..150)))
            .collect::<Vec<_>>();
        let counts = count(&keys);

        for n in [1, 2, 3, 10, 64, 500] {
            let n = NonZeroUsize::new(n).unwrap();
            let buckets = shuffle(&counts, n, &HashPartitioner);
            assert_eq!(aggregate(&buckets), counts, "n_reduce = {n}");
        }
    }

    #[test]
    fn duplicate_keys_are_summed() {
        let buckets = [
            bucket(0, &[("A", 2), ("B", 1)]),
            bucket(1, &[("A", 3)]),
            bucket(0, &[("B", 4)]),
        ];
        let result = aggregate(&buckets);
        assert_eq!(result["A"], 5);
        assert_eq!(result["B"], 5);
    }

    #[test]
    fn bucket_order_does_not_matter() {
        let mut buckets = vec![
            bucket(0, &[("A", 1)]),
            bucket(1, &[("B", 2), ("A", 4)]),
            bucket(2, &[("C", 3)]),
        ];
        let forward = aggregate(&buckets);
        buckets.reverse();
        assert_eq!(forward, aggregate(&buckets));
    }

    #[test]
    fn threaded_matches_sequential() {
        let buckets = [
            bucket(0, &[("A", 2), ("C", 1)]),
            bucket(1, &[("B", 7)]),
            bucket(0, &[("A", 1)]),
            bucket(2, &[]),
            bucket(1, &[("B", 1), ("D", 9)]),
        ];
        assert_eq!(
            perform_reduce(&buckets, ReduceMode::Threaded),
            perform_reduce(&buckets, ReduceMode::Sequential)
        );
    }

    #[test]
    fn no_buckets_no_result() {
        assert!(perform_reduce(&[], ReduceMode::Threaded).is_empty());
        assert!(perform_reduce(&[], ReduceMode::Sequential).is_empty());
    }

    #[test]
    fn merge_sums_into_existing() {
        let mut result = count(["A", "B"]);
        merge_into(&mut result, count(["A", "C"]));
        assert_eq!(result["A"], 2);
        assert_eq!(result["B"], 1);
        assert_eq!(result["C"], 1);
    }

    #[test]
    fn many_partitions_few_keys() {
        let counts = count(["P1", "P2", "P1"]);
        let n_reduce = NonZeroUsize::new(200_000).unwrap();
        let buckets = shuffle(&counts, n_reduce, &HashPartitioner);
        let workers = NonZeroUsize::new(4).unwrap();

        let assigned = assign_partitions(&buckets, workers);
        let partitions = assigned.iter().map(Vec::len).sum::<usize>();
        assert!(assigned.len() <= 2, "{} workers", assigned.len());
        assert!((1..=2).contains(&partitions));
        assert!(assigned
            .iter()
            .flatten()
            .all(|(_, group)| group.iter().all(|b| !b.is_empty())));

        assert_eq!(aggregate_with_workers(&buckets, workers), counts);
    }

    #[test]
    fn workers_share_partitions() {
        let counts = count((0..100).map(|i| format!("P{i}")));
        let buckets = shuffle(&counts, NonZeroUsize::new(32).unwrap(), &HashPartitioner);
        let workers = NonZeroUsize::new(3).unwrap();

        let assigned = assign_partitions(&buckets, workers);
        assert_eq!(assigned.len(), 3);
        assert_eq!(aggregate_with_workers(&buckets, workers), counts);
        assert_eq!(aggregate_with_workers(&buckets, NonZeroUsize::MIN), counts);
    }
}
