//! Map and reduce functions plugged into a run.
//!
//! A map function turns one input line into zero or more records. A reduce
//! function turns a whole reducer bucket into the lines of that reducer's
//! output file. Buckets hold whole key groups laid out back to back in key
//! order, so a reduce function can walk a bucket group by group.

use std::sync::Arc;

use crate::{Error, Result};

pub type MapFn = Arc<dyn Fn(&str) -> Vec<String> + Send + Sync>;
pub type ReduceFn = Arc<dyn Fn(&[String]) -> Vec<String> + Send + Sync>;

/// A map reduce application.
#[derive(Clone)]
pub struct Workload {
    pub map_fn: MapFn,
    pub reduce_fn: ReduceFn,
}

impl std::fmt::Debug for Workload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workload").finish_non_exhaustive()
    }
}

impl Workload {
    pub fn builder() -> WorkloadBuilder {
        WorkloadBuilder::default()
    }

    /// Emit each line as is and write each bucket back unchanged.
    pub fn identity() -> Self {
        Workload {
            map_fn: Arc::new(identity_map),
            reduce_fn: Arc::new(identity_reduce),
        }
    }

    pub fn word_count() -> Self {
        Workload {
            map_fn: Arc::new(word_count_map),
            reduce_fn: Arc::new(word_count_reduce),
        }
    }

    /// Look up a built-in workload by name.
    pub fn named(name: &str) -> Result<Self> {
        match name {
            "identity" => Ok(Self::identity()),
            "word-count" => Ok(Self::word_count()),
            other => Err(Error::invalid(format!("unknown workload `{}`", other))),
        }
    }
}

#[derive(Default)]
pub struct WorkloadBuilder {
    map_fn: Option<MapFn>,
    reduce_fn: Option<ReduceFn>,
}

impl WorkloadBuilder {
    pub fn map_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        self.map_fn = Some(Arc::new(f));
        self
    }

    pub fn reduce_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&[String]) -> Vec<String> + Send + Sync + 'static,
    {
        self.reduce_fn = Some(Arc::new(f));
        self
    }

    pub fn build(self) -> Result<Workload> {
        let map_fn = self
            .map_fn
            .ok_or_else(|| Error::invalid("map function is not set"))?;
        let reduce_fn = self
            .reduce_fn
            .ok_or_else(|| Error::invalid("reduce function is not set"))?;
        Ok(Workload { map_fn, reduce_fn })
    }
}

pub fn identity_map(line: &str) -> Vec<String> {
    vec![line.to_string()]
}

pub fn identity_reduce(records: &[String]) -> Vec<String> {
    records.to_vec()
}

pub fn word_count_map(line: &str) -> Vec<String> {
    line.split_whitespace().map(|word| word.to_string()).collect()
}

/// Counts each run of equal records; the shuffle keeps every group
/// contiguous so a run is exactly one key.
pub fn word_count_reduce(records: &[String]) -> Vec<String> {
    records
        .chunk_by(|a, b| a == b)
        .map(|run| format!("{} {}", run[0], run.len()))
        .collect()
}
