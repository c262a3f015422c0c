//! Collective operations the benchmark needs, independent of the transport.
//!
//! Backends: [`SingleProcess`] (one rank, identity collectives), [`ThreadGroup`]
//! (an in-process SPMD group of OS threads) and, behind the `mpi` feature, `MpiComm`
//! (the MPI world communicator).

#[cfg(feature = "mpi")]
mod mpi_world;
mod threads;

#[cfg(feature = "mpi")]
pub use mpi_world::MpiComm;
pub use threads::{ThreadComm, ThreadGroup};

use crate::error::{BenchError, Result};
use crate::partition::Partition;

/// Rank that owns the full vector and computes the serial baseline.
pub const ROOT: usize = 0;

/// The reduce-to-all capability plus the scatter that feeds it.
pub trait Collective {
    fn rank(&self) -> usize;

    fn size(&self) -> usize;

    fn is_root(&self) -> bool {
        self.rank() == ROOT
    }

    /// Distributes `partition`-shaped chunks of the root's `data`.
    ///
    /// Only the root's `data` is read; other ranks pass `None`.
    fn scatter(&self, data: Option<&[f64]>, partition: &Partition) -> Result<Vec<f64>>;

    /// Sums `local` over every rank. Every rank receives the same total, and no rank
    /// returns before every contribution has been incorporated.
    fn all_reduce_sum(&self, local: f64) -> Result<f64>;

    /// Sums `local` over every rank; only the root receives the total.
    fn reduce_sum(&self, local: f64) -> Result<Option<f64>>;

    fn barrier(&self) -> Result<()>;
}

/// Checks that the root holds exactly the vector the layout describes.
pub(crate) fn check_root_data<'a>(
    data: Option<&'a [f64]>,
    partition: &Partition,
) -> Result<&'a [f64]> {
    let data = data.ok_or(BenchError::MissingRootData)?;
    if data.len() != partition.vector_len() {
        return Err(BenchError::RootLength {
            expected: partition.vector_len(),
            actual: data.len(),
        });
    }
    Ok(data)
}

pub(crate) fn check_chunk(rank: usize, partition: &Partition, chunk: Vec<f64>) -> Result<Vec<f64>> {
    let expected = partition.count(rank);
    if chunk.len() != expected {
        return Err(BenchError::ChunkLength {
            rank,
            expected,
            actual: chunk.len(),
        });
    }
    Ok(chunk)
}

/// A group of one: the root is the only rank.
#[derive(Debug, Default, Clone, Copy)]
pub struct SingleProcess;

impl Collective for SingleProcess {
    fn rank(&self) -> usize {
        ROOT
    }

    fn size(&self) -> usize {
        1
    }

    fn scatter(&self, data: Option<&[f64]>, partition: &Partition) -> Result<Vec<f64>> {
        let data = check_root_data(data, partition)?;
        check_chunk(ROOT, partition, data[partition.range(ROOT)].to_vec())
    }

    fn all_reduce_sum(&self, local: f64) -> Result<f64> {
        Ok(local)
    }

    fn reduce_sum(&self, local: f64) -> Result<Option<f64>> {
        Ok(Some(local))
    }

    fn barrier(&self) -> Result<()> {
        Ok(())
    }
}
