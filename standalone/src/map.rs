//! Map phase: turn key sequences into frequency maps.

use tracing::{debug, info};

use common::FrequencyMap;

use crate::loader::Shard;

/// Count how often each key occurs.
///
/// The result does not depend on the order of `keys`.
pub fn count<I>(keys: I) -> FrequencyMap
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut counts = FrequencyMap::default();
    for key in keys {
        let key = key.as_ref();
        match counts.get_mut(key) {
            Some(count) => *count += 1,
            None => {
                counts.insert(key.to_owned(), 1);
            }
        }
    }
    counts
}

/// Run the map phase over every shard. One frequency map per shard.
pub fn perform_map(shards: &[Shard]) -> Vec<FrequencyMap> {
    info!("Starting map phase over {} shard(s)", shards.len());

    shards
        .iter()
        .map(|shard| {
            let counts = count(&shard.keys);
            debug!(
                shard = %shard.path.display(),
                keys = shard.keys.len(),
                distinct = counts.len(),
                "shard mapped"
            );
            counts
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_occurrences() {
        let counts = count(["P1", "P2", "P1", "P3", "P1", "P2"]);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts["P1"], 3);
        assert_eq!(counts["P2"], 2);
        assert_eq!(counts["P3"], 1);
    }

    #[test]
    fn total_equals_input_length() {
        let mut rng = fastrand::Rng::with_seed(7);
        let keys = (0..5_000)
            .map(|_| format!("P{}", rng.u32(0..300)))
            .collect::<Vec<_>>();
        let counts = count(&keys);
        assert_eq!(counts.values().sum::<u64>(), keys.len() as u64);
    }

    #[test]
    fn order_does_not_matter() {
        let mut keys = vec!["A", "B", "A", "C", "C", "C"];
        let forward = count(&keys);
        keys.reverse();
        assert_eq!(forward, count(&keys));
    }

    #[test]
    fn no_keys_no_counts() {
        assert!(count(Vec::<String>::new()).is_empty());
    }
}
