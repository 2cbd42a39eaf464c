use std::collections::BTreeMap;

use tracing::debug;

use crate::{Error, Result};

/// Groups every record by its own value and deals the groups out to
/// `num_reducers` buckets. See [`shuffle_by`].
pub fn shuffle(map_outputs: &[Vec<String>], num_reducers: usize) -> Result<Vec<Vec<String>>> {
    shuffle_by(map_outputs, num_reducers, |record| record.to_string())
}

/// Groups records by `key_fn` and assigns whole groups round-robin, in key
/// order, to `num_reducers` buckets.
///
/// Group `i` (counting in sorted key order) goes to bucket `i % num_reducers`,
/// so every record sharing a key ends up in the same bucket. Inside a group,
/// records keep the order of `map_outputs` and then of each output. The
/// result only depends on the input, never on how the mappers were scheduled.
pub fn shuffle_by<K>(
    map_outputs: &[Vec<String>],
    num_reducers: usize,
    key_fn: K,
) -> Result<Vec<Vec<String>>>
where
    K: Fn(&str) -> String,
{
    if map_outputs.is_empty() {
        return Err(Error::invalid("no map outputs to shuffle"));
    }
    if num_reducers == 0 {
        return Err(Error::invalid("number of reducers must be positive"));
    }

    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for output in map_outputs {
        for record in output {
            groups
                .entry(key_fn(record))
                .or_default()
                .push(record.clone());
        }
    }

    let mut buckets = vec![Vec::new(); num_reducers];
    let num_groups = groups.len();
    for (i, group) in groups.into_values().enumerate() {
        buckets[i % num_reducers].extend(group);
    }

    let sizes: Vec<usize> = buckets.iter().map(Vec::len).collect();
    debug!(groups = num_groups, ?sizes, "shuffled map outputs");
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_shuffle_round_robin_over_sorted_groups() {
        let outputs = vec![strings(&["c", "a"]), strings(&["b", "a", "d"])];
        let buckets = shuffle(&outputs, 2).unwrap();

        // groups in key order: a, b, c, d
        assert_eq!(buckets, vec![strings(&["a", "a", "c"]), strings(&["b", "d"])]);
    }

    #[test]
    fn test_shuffle_is_a_partition() {
        let outputs = vec![
            strings(&["x", "y", "x", "z"]),
            strings(&[]),
            strings(&["z", "w", "x"]),
        ];
        let buckets = shuffle(&outputs, 3).unwrap();

        let mut all: Vec<String> = buckets.iter().flatten().cloned().collect();
        let mut expected: Vec<String> = outputs.iter().flatten().cloned().collect();
        all.sort();
        expected.sort();
        assert_eq!(all, expected);

        for key in ["w", "x", "y", "z"] {
            let holders = buckets
                .iter()
                .filter(|b| b.iter().any(|r| r == key))
                .count();
            assert_eq!(holders, 1, "key {} is split across buckets", key);
        }
    }

    #[test]
    fn test_shuffle_more_reducers_than_keys() {
        let outputs = vec![strings(&["k", "k"])];
        let buckets = shuffle(&outputs, 4).unwrap();

        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets[0], strings(&["k", "k"]));
        assert!(buckets[1..].iter().all(Vec::is_empty));
    }

    #[test]
    fn test_shuffle_by_custom_key_keeps_record_order() {
        let outputs = vec![
            strings(&["apple 1", "banana 1"]),
            strings(&["apple 2", "cherry 1"]),
        ];
        let first_word = |record: &str| record.split(' ').next().unwrap_or("").to_string();
        let buckets = shuffle_by(&outputs, 2, first_word).unwrap();

        assert_eq!(
            buckets,
            vec![
                strings(&["apple 1", "apple 2", "cherry 1"]),
                strings(&["banana 1"]),
            ]
        );
    }

    #[test]
    fn test_shuffle_empty_outputs_yield_empty_buckets() {
        let outputs = vec![strings(&[]), strings(&[])];
        let buckets = shuffle(&outputs, 2).unwrap();
        assert_eq!(buckets, vec![Vec::<String>::new(), Vec::new()]);
    }

    #[test]
    fn test_shuffle_invalid_arguments() {
        assert!(matches!(shuffle(&[], 2), Err(Error::InvalidArgument(_))));
        assert!(matches!(
            shuffle(&[strings(&["a"])], 0),
            Err(Error::InvalidArgument(_))
        ));
    }
}
