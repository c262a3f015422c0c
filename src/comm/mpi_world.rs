use mpi::collective::SystemOperation;
use mpi::datatype::Partition as VarCount;
use mpi::environment::Universe;
use mpi::topology::{Rank, SystemCommunicator};
use mpi::traits::*;
use mpi::Count;
use tracing::info;

use super::{check_chunk, check_root_data, Collective, ROOT};
use crate::error::{BenchError, Result};
use crate::partition::Partition;

/// The MPI world communicator, one rank per launched process.
pub struct MpiComm {
    // This has a custom drop impl which calls MPI_FINALIZE so it needs to hang around
    #[allow(unused)]
    universe: Universe,
    world: SystemCommunicator,
    rank: usize,
    size: usize,
}

impl MpiComm {
    /// Initializes MPI. Can only succeed once per process.
    pub fn new() -> Result<Self> {
        let universe = mpi::initialize().ok_or(BenchError::MpiInit)?;
        let world = universe.world();

        // This is the node id and total number of nodes
        let rank = world.rank() as usize;
        let size = world.size() as usize;
        info!(rank, size, "mpi initialized");

        Ok(MpiComm {
            universe,
            world,
            rank,
            size,
        })
    }
}

fn to_counts(values: &[usize]) -> Vec<Count> {
    values.iter().map(|&v| v as Count).collect()
}

impl Collective for MpiComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn scatter(&self, data: Option<&[f64]>, partition: &Partition) -> Result<Vec<f64>> {
        let root = self.world.process_at_rank(ROOT as Rank);
        let mut chunk = vec![0.0; partition.count(self.rank)];

        if partition.is_uniform() {
            if self.is_root() {
                let data = check_root_data(data, partition)?;
                // Drop policy: the trailing remainder is simply never sent.
                let covered = partition.count(ROOT) * self.size;
                root.scatter_into_root(&data[..covered], &mut chunk[..]);
            } else {
                root.scatter_into(&mut chunk[..]);
            }
        } else if self.is_root() {
            let data = check_root_data(data, partition)?;
            let counts = to_counts(partition.counts());
            let displs = to_counts(partition.displacements());
            let send = VarCount::new(data, &counts[..], &displs[..]);
            root.scatter_varcount_into_root(&send, &mut chunk[..]);
        } else {
            root.scatter_varcount_into(&mut chunk[..]);
        }

        check_chunk(self.rank, partition, chunk)
    }

    fn all_reduce_sum(&self, local: f64) -> Result<f64> {
        let mut total = 0.0f64;
        self.world
            .all_reduce_into(&local, &mut total, SystemOperation::sum());
        Ok(total)
    }

    fn reduce_sum(&self, local: f64) -> Result<Option<f64>> {
        let root = self.world.process_at_rank(ROOT as Rank);
        if self.is_root() {
            let mut total = 0.0f64;
            root.reduce_into_root(&local, &mut total, SystemOperation::sum());
            Ok(Some(total))
        } else {
            root.reduce_into(&local, SystemOperation::sum());
            Ok(None)
        }
    }

    fn barrier(&self) -> Result<()> {
        self.world.barrier();
        Ok(())
    }
}
