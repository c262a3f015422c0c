use std::sync::{Arc, Barrier, Mutex, MutexGuard};

use tracing::debug;

use super::{check_chunk, check_root_data, Collective};
use crate::error::{BenchError, Result};
use crate::partition::Partition;

/// State every rank of a [`ThreadGroup`] exchanges collectives through.
struct Shared {
    size: usize,
    barrier: Barrier,
    contributions: Mutex<Vec<f64>>,
    combined: Mutex<f64>,
    mailbox: Mutex<Vec<Option<Vec<f64>>>>,
    /// Set by the root when it could not stage a scatter.
    root_error: Mutex<Option<BenchError>>,
}

impl Shared {
    fn new(size: usize) -> Self {
        Shared {
            size,
            barrier: Barrier::new(size),
            contributions: Mutex::new(vec![0.0; size]),
            combined: Mutex::new(0.0),
            mailbox: Mutex::new(vec![None; size]),
            root_error: Mutex::new(None),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| BenchError::Poisoned)
}

/// One rank's handle on an in-process SPMD group.
pub struct ThreadComm {
    rank: usize,
    shared: Arc<Shared>,
}

impl ThreadComm {
    /// Gather, combine on one elected rank, broadcast.
    ///
    /// Contributions are summed in rank order so every rank sees bit-identical totals.
    /// The leader only overwrites `combined` after the first barrier of the next call,
    /// by which point every rank has read the previous value.
    fn combine(&self, local: f64) -> Result<f64> {
        lock(&self.shared.contributions)?[self.rank] = local;

        if self.shared.barrier.wait().is_leader() {
            let total: f64 = lock(&self.shared.contributions)?.iter().sum();
            *lock(&self.shared.combined)? = total;
            debug!(rank = self.rank, total, "combined partial sums");
        }
        self.shared.barrier.wait();

        let total = *lock(&self.shared.combined)?;
        Ok(total)
    }
}

impl Collective for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.shared.size
    }

    fn scatter(&self, data: Option<&[f64]>, partition: &Partition) -> Result<Vec<f64>> {
        // The root reaches both barriers even when its data is bad and publishes the
        // failure, so every rank returns the same error instead of waiting forever later.
        if self.is_root() {
            let staged = check_root_data(data, partition).and_then(|data| {
                let mut mailbox = lock(&self.shared.mailbox)?;
                for (rank, slot) in mailbox.iter_mut().enumerate() {
                    *slot = Some(data[partition.range(rank)].to_vec());
                }
                Ok(())
            });
            *lock(&self.shared.root_error)? = staged.err();
        }

        self.shared.barrier.wait();
        let root_error = lock(&self.shared.root_error)?.clone();
        let chunk = lock(&self.shared.mailbox)?[self.rank]
            .take()
            .unwrap_or_default();
        self.shared.barrier.wait();

        if let Some(err) = root_error {
            return Err(err);
        }
        check_chunk(self.rank, partition, chunk)
    }

    fn all_reduce_sum(&self, local: f64) -> Result<f64> {
        self.combine(local)
    }

    fn reduce_sum(&self, local: f64) -> Result<Option<f64>> {
        let total = self.combine(local)?;
        Ok(self.is_root().then_some(total))
    }

    fn barrier(&self) -> Result<()> {
        self.shared.barrier.wait();
        Ok(())
    }
}

/// Runs the same closure on `size` scoped threads, one per rank.
pub struct ThreadGroup;

impl ThreadGroup {
    /// Returns each rank's outcome, indexed by rank.
    ///
    /// A worker that never reaches a collective hangs the whole group; there is no timeout.
    pub fn run<T, F>(size: usize, work: F) -> Result<Vec<T>>
    where
        T: Send,
        F: Fn(ThreadComm) -> Result<T> + Sync,
    {
        if size == 0 {
            return Err(BenchError::NoWorkers);
        }

        let shared = Arc::new(Shared::new(size));
        let work = &work;

        crossbeam::scope(|scope| {
            let handles: Vec<_> = (0..size)
                .map(|rank| {
                    let comm = ThreadComm {
                        rank,
                        shared: Arc::clone(&shared),
                    };
                    scope.spawn(move |_| work(comm))
                })
                .collect();

            handles
                .into_iter()
                .enumerate()
                .map(|(rank, handle)| {
                    handle
                        .join()
                        .map_err(|_| BenchError::WorkerPanicked(rank))
                        .and_then(|outcome| outcome)
                })
                .collect::<Result<Vec<T>>>()
        })
        .map_err(|_| BenchError::WorkerPanicked(0))?
    }
}
