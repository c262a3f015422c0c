//! Distributed sum-and-average benchmark.
//!
//! The root rank builds the vector `1..=N`, scatters contiguous chunks across the group,
//! every rank sums its chunk, and the partial sums are combined with an all-reduce so that
//! every rank ends up with the total. The root then times a serial sum of the same vector
//! and reports both.

pub mod bench;
pub mod comm;
pub mod config;
pub mod error;
pub mod partition;
pub mod report;

pub use bench::{expected_sum, generate, local_sum, run, serial_sum, RankOutcome};
pub use comm::{Collective, SingleProcess, ThreadComm, ThreadGroup, ROOT};
#[cfg(feature = "mpi")]
pub use comm::MpiComm;
pub use config::{BenchConfig, CombineMode, DEFAULT_LEN};
pub use error::{BenchError, Result};
pub use partition::{Partition, RemainderPolicy};
pub use report::{Banner, Report};

/// Runs the benchmark on an in-process group of `workers` threads.
///
/// Outcomes are indexed by rank; the root's carries the report.
pub fn run_threads(workers: usize, config: &BenchConfig) -> Result<Vec<RankOutcome>> {
    ThreadGroup::run(workers, |comm| run(&comm, config))
}
