use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::comm::Collective;
use crate::config::{BenchConfig, CombineMode};
use crate::error::Result;
use crate::partition::Partition;
use crate::report::Report;

/// The vector `1.0, 2.0, ..., len`.
pub fn generate(len: usize) -> Vec<f64> {
    (1..=len).map(|i| i as f64).collect()
}

/// Closed form `len * (len + 1) / 2`, exact before the final conversion.
pub fn expected_sum(len: usize) -> f64 {
    let n = len as u128;
    (n * (n + 1) / 2) as f64
}

/// Sums a rank's chunk over the local rayon pool.
pub fn local_sum(chunk: &[f64]) -> f64 {
    chunk.par_iter().sum()
}

/// Plain left-to-right sum, the baseline the parallel path is measured against.
pub fn serial_sum(data: &[f64]) -> f64 {
    data.iter().sum()
}

/// What one rank knows at the end of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RankOutcome {
    pub rank: usize,
    pub local_len: usize,
    pub local_sum: f64,
    /// `None` on non-root ranks in [`CombineMode::Reduce`].
    pub total: Option<f64>,
    pub average: Option<f64>,
    pub parallel_elapsed: Duration,
    /// Only the root builds a report.
    pub report: Option<Report>,
}

/// Runs the benchmark on one rank. Every rank of `comm` must call this with the same config.
pub fn run<C: Collective>(comm: &C, config: &BenchConfig) -> Result<RankOutcome> {
    config.validate()?;
    let rank = comm.rank();
    let partition = Partition::new(config.len, comm.size(), config.remainder)?;

    // Only calculate data on one rank, then distribute
    let data = comm.is_root().then(|| generate(config.len));
    if comm.is_root() {
        debug!(counts = ?partition.counts(), "partition layout");
        if partition.dropped() > 0 {
            warn!(
                dropped = partition.dropped(),
                "vector length not divisible by worker count, remainder is not summed"
            );
        }
    }

    let chunk = comm.scatter(data.as_deref(), &partition)?;
    let local = local_sum(&chunk);
    debug!(rank, elements = chunk.len(), local, "local sum");

    let start = Instant::now();
    let total = match config.mode {
        CombineMode::AllReduce => Some(comm.all_reduce_sum(local)?),
        CombineMode::Reduce => comm.reduce_sum(local)?,
    };
    let parallel_elapsed = start.elapsed();

    let average = total.map(|total| total / config.len as f64);

    // Every rank has its total before the root starts the serial baseline.
    comm.barrier()?;

    let report = match (data, total.zip(average)) {
        (Some(data), Some((total_sum, average))) => {
            let start = Instant::now();
            let serial = serial_sum(&data);
            let serial_elapsed = start.elapsed();
            info!(total_sum, serial, "serial baseline done");

            Some(Report {
                workers: comm.size(),
                len: config.len,
                remainder: config.remainder,
                mode: config.mode,
                dropped: partition.dropped(),
                total_sum,
                expected_sum: expected_sum(config.len),
                average,
                parallel_elapsed,
                serial_sum: serial,
                serial_elapsed,
            })
        }
        _ => None,
    };

    Ok(RankOutcome {
        rank,
        local_len: chunk.len(),
        local_sum: local,
        total,
        average,
        parallel_elapsed,
        report,
    })
}
