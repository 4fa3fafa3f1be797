//! Drives a job through every phase inside the current process.

use std::num::NonZeroUsize;

use tracing::info;

use common::error::LoadResult;
use common::job::{JobState, JobTracker};
use common::Workload;

use crate::loader::{self, LoadOptions};
use crate::map::perform_map;
use crate::reduce::{perform_reduce, ReduceMode};
use crate::report::{top_n, Report};
use crate::shuffle::{perform_shuffle, HashPartitioner, Partitioner};

/// A fully resolved standalone job.
#[derive(Debug, Clone)]
pub struct Job {
    /// Input file, directory or glob spec.
    pub input: String,

    /// The application to run.
    pub workload: Workload,

    /// Number of keys to report.
    pub top: NonZeroUsize,

    /// Number of reduce partitions.
    pub n_reduce: NonZeroUsize,

    pub load: LoadOptions,

    pub reduce: ReduceMode,
}

impl Job {
    pub fn new(input: impl Into<String>, workload: Workload) -> Self {
        Self {
            input: input.into(),
            workload,
            top: NonZeroUsize::MIN,
            n_reduce: NonZeroUsize::MIN,
            load: LoadOptions::default(),
            reduce: ReduceMode::default(),
        }
    }
}

/// Partition count used when none is configured: one per available core.
pub fn default_n_reduce() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// Run `job` with the default hash partitioner.
pub fn run_standalone_mr_job(job: &Job) -> LoadResult<Report> {
    run_with_partitioner(job, &HashPartitioner)
}

/// Run `job`, routing keys to reduce partitions with `partitioner`.
///
/// Only loading can fail. When it does, no later phase runs.
pub fn run_with_partitioner<P>(job: &Job, partitioner: &P) -> LoadResult<Report>
where
    P: Partitioner + ?Sized,
{
    let mut tracker = JobTracker::new();

    tracker.enter(JobState::Loading);
    let shards = loader::load(&job.input, &job.workload, &job.load)?;
    let records = shards.iter().map(|s| s.keys.len()).sum::<usize>();
    let skipped = shards.iter().map(|s| s.skipped).sum::<usize>();
    info!(shards = shards.len(), records, skipped, "input loaded");

    // Each shard is one map task. Its buckets are what a remote reducer
    // would be sent; here they go straight to the reduce phase.
    tracker.enter(JobState::Mapping);
    let maps = perform_map(&shards);

    tracker.enter(JobState::Shuffling);
    let buckets = perform_shuffle(&maps, job.n_reduce, partitioner);

    tracker.enter(JobState::Reducing);
    let result = perform_reduce(&buckets, job.reduce);

    tracker.enter(JobState::Reporting);
    let mut report = Report::new(&job.workload, top_n(&result, job.top));
    report.shards = shards.len();
    report.records = records;
    report.skipped = skipped;

    tracker.enter(JobState::Completed);
    info!(distinct = result.len(), "job completed");
    Ok(report)
}
