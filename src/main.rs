use allreduce_bench::{
    run_threads, Banner, BenchConfig, BenchError, CombineMode, RankOutcome, RemainderPolicy,
    Result, DEFAULT_LEN,
};
use clap::{Parser, ValueEnum};
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Backend {
    /// One OS thread per rank inside this process
    Threads,
    /// One process per rank, launched with `mpirun -n P`
    Mpi,
}

/// Scatter 1..=N across workers, all-reduce the partial sums and compare with a serial sum.
#[derive(Debug, Parser)]
#[command(version)]
struct Opts {
    /// Vector length
    #[arg(short = 'n', long, default_value_t = DEFAULT_LEN)]
    len: usize,
    /// Worker count for the threads backend (defaults to available parallelism)
    #[arg(short, long)]
    workers: Option<usize>,
    /// `drop` ignores the len % workers trailing elements, `spread` hands them out
    #[arg(short, long, default_value = "spread")]
    remainder: RemainderPolicy,
    /// `all-reduce` gives every rank the total, `reduce` only the root
    #[arg(short, long, default_value = "all-reduce")]
    mode: CombineMode,
    #[arg(short, long, value_enum, default_value_t = Backend::Threads)]
    backend: Backend,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let opts = Opts::parse();
    let config = BenchConfig {
        len: opts.len,
        remainder: opts.remainder,
        mode: opts.mode,
    };
    config.validate()?;

    match thread_workers(&opts)? {
        Some(workers) => {
            println!("{}", Banner { workers, config: &config });
            let outcomes = run_threads(workers, &config)?;
            print_root(outcomes.first());
        }
        None => run_mpi(&config)?,
    }

    Ok(())
}

/// Worker count for the threads backend, `None` for mpi where the launcher sets it.
fn thread_workers(opts: &Opts) -> Result<Option<usize>> {
    match opts.backend {
        Backend::Threads => {
            let workers = match opts.workers {
                Some(workers) => workers,
                None => std::thread::available_parallelism().map_or(1, |n| n.get()),
            };
            if workers == 0 {
                return Err(BenchError::NoWorkers);
            }
            Ok(Some(workers))
        }
        Backend::Mpi => {
            if let Some(workers) = opts.workers {
                warn!(workers, "--workers is ignored by the mpi backend, use the launcher's -n");
            }
            Ok(None)
        }
    }
}

#[cfg(feature = "mpi")]
fn run_mpi(config: &BenchConfig) -> Result<()> {
    use allreduce_bench::{run, Collective};

    let comm = allreduce_bench::MpiComm::new()?;
    if comm.is_root() {
        println!("{}", Banner { workers: comm.size(), config });
    }
    let outcome = run(&comm, config)?;
    print_root(Some(&outcome));
    Ok(())
}

#[cfg(not(feature = "mpi"))]
fn run_mpi(_config: &BenchConfig) -> Result<()> {
    Err(BenchError::BackendUnavailable("mpi"))
}

fn print_root(outcome: Option<&RankOutcome>) {
    if let Some(report) = outcome.and_then(|outcome| outcome.report.as_ref()) {
        println!();
        print!("{report}");
    }
}
