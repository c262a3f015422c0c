use std::fmt;
use std::time::Duration;

use crate::config::{BenchConfig, CombineMode};
use crate::partition::RemainderPolicy;

/// What the root prints once the run is over.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub workers: usize,
    pub len: usize,
    pub remainder: RemainderPolicy,
    pub mode: CombineMode,
    /// Elements that no rank summed.
    pub dropped: usize,
    pub total_sum: f64,
    pub expected_sum: f64,
    pub average: f64,
    /// Time spent inside the combine collective on the root.
    pub parallel_elapsed: Duration,
    pub serial_sum: f64,
    pub serial_elapsed: Duration,
}

impl Report {
    pub fn difference(&self) -> f64 {
        self.expected_sum - self.total_sum
    }

    /// Serial time over parallel time; `None` when the combine took no measurable time.
    pub fn speedup(&self) -> Option<f64> {
        let parallel = self.parallel_elapsed.as_secs_f64();
        (parallel > 0.0).then(|| self.serial_elapsed.as_secs_f64() / parallel)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self.mode {
            CombineMode::AllReduce => "ALL-REDUCE",
            CombineMode::Reduce => "REDUCE",
        };
        writeln!(f, "===== {title} =====")?;
        writeln!(
            f,
            "Total Sum = {:.0} | Expected = {:.0} | Difference = {:.5}",
            self.total_sum,
            self.expected_sum,
            self.difference()
        )?;
        if self.dropped > 0 {
            writeln!(f, "Dropped Elements = {}", self.dropped)?;
        }
        writeln!(f, "Average = {:.5}", self.average)?;
        writeln!(
            f,
            "Parallel Time = {:.6} sec",
            self.parallel_elapsed.as_secs_f64()
        )?;

        writeln!(f)?;
        writeln!(f, "===== SERIAL COMPUTATION =====")?;
        writeln!(
            f,
            "Serial Sum = {:.0} | Time = {:.6} sec",
            self.serial_sum,
            self.serial_elapsed.as_secs_f64()
        )?;

        writeln!(f)?;
        writeln!(f, "===== PERFORMANCE COMPARISON =====")?;
        match self.speedup() {
            Some(speedup) => writeln!(f, "Speedup = {speedup:.2}x"),
            None => writeln!(f, "Speedup = n/a"),
        }
    }
}

/// Run header printed by the root before any work starts.
pub struct Banner<'a> {
    pub workers: usize,
    pub config: &'a BenchConfig,
}

impl fmt::Display for Banner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--------- Distributed Sum ---------")?;
        writeln!(f, "         Workers : {}", self.workers)?;
        writeln!(f, "          Length : {}", self.config.len)?;
        writeln!(f, "       Remainder : {}", self.config.remainder)?;
        writeln!(f, "         Combine : {}", self.config.mode)?;
        write!(f, "-----------------------------------")
    }
}
