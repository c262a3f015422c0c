use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum BenchError {
    #[error("vector length must be non-zero")]
    EmptyVector,
    #[error("worker count must be non-zero")]
    NoWorkers,
    #[error("root rank called scatter without data")]
    MissingRootData,
    #[error("root supplied {actual} elements for a layout of {expected}")]
    RootLength { expected: usize, actual: usize },
    #[error("rank {rank} received {actual} elements, expected {expected}")]
    ChunkLength {
        rank: usize,
        expected: usize,
        actual: usize,
    },
    #[error("collective state poisoned by a panicked worker")]
    Poisoned,
    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
    #[error("mpi initialization failed")]
    MpiInit,
    #[error("backend `{0}` not compiled in")]
    BackendUnavailable(&'static str),
}

pub type Result<T> = std::result::Result<T, BenchError>;
