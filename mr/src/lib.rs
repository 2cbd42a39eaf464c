//! A single-machine MapReduce engine.
//!
//! The input file is cut into line-aligned sections ([`split()`]), each section
//! is mapped on its own worker ([`worker::map_section`]), the emitted records
//! are grouped by key and dealt out to reducer buckets ([`shuffle()`]), and each
//! bucket is reduced on its own worker into `output_<i>.txt`
//! ([`worker::reduce_bucket`]). [`Coordinator`] runs the whole pipeline.

pub mod coordinator;
pub mod error;
pub mod shuffle;
pub mod split;
pub mod summary;
pub mod task;
pub mod worker;
pub mod workload;

pub use coordinator::{run, Coordinator, JobConfig, JobState};
pub use error::{Error, Result};
pub use shuffle::{shuffle, shuffle_by};
pub use split::{sections, split, Section};
pub use summary::RunSummary;
pub use worker::{map_section, reduce_bucket};
pub use workload::{MapFn, ReduceFn, Workload};
