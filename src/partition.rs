use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::error::{BenchError, Result};

/// What to do with the `len % size` elements an equal split leaves over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemainderPolicy {
    /// Every rank gets `len / size` elements; the trailing remainder is never summed.
    Drop,
    /// The first `len % size` ranks each take one extra element.
    #[default]
    Spread,
}

impl FromStr for RemainderPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "drop" => Ok(RemainderPolicy::Drop),
            "spread" => Ok(RemainderPolicy::Spread),
            other => Err(format!("unknown remainder policy `{other}`")),
        }
    }
}

impl fmt::Display for RemainderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemainderPolicy::Drop => write!(f, "drop"),
            RemainderPolicy::Spread => write!(f, "spread"),
        }
    }
}

/// Contiguous per-rank layout of a vector of `len` elements over `size` ranks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    len: usize,
    counts: Vec<usize>,
    displacements: Vec<usize>,
}

impl Partition {
    pub fn new(len: usize, size: usize, policy: RemainderPolicy) -> Result<Self> {
        if size == 0 {
            return Err(BenchError::NoWorkers);
        }

        let base = len / size;
        let extra = len % size;
        let counts: Vec<usize> = (0..size)
            .map(|rank| match policy {
                RemainderPolicy::Drop => base,
                RemainderPolicy::Spread => base + usize::from(rank < extra),
            })
            .collect();

        let displacements = counts
            .iter()
            .scan(0, |offset, &count| {
                let start = *offset;
                *offset += count;
                Some(start)
            })
            .collect();

        Ok(Partition {
            len,
            counts,
            displacements,
        })
    }

    /// Length of the full vector the layout was built for.
    pub fn vector_len(&self) -> usize {
        self.len
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn displacements(&self) -> &[usize] {
        &self.displacements
    }

    pub fn count(&self, rank: usize) -> usize {
        self.counts[rank]
    }

    /// Index range of `rank`'s chunk within the full vector.
    pub fn range(&self, rank: usize) -> Range<usize> {
        let start = self.displacements[rank];
        start..start + self.counts[rank]
    }

    /// Number of elements that land on no rank.
    pub fn dropped(&self) -> usize {
        self.len - self.counts.iter().sum::<usize>()
    }

    /// True when every rank holds the same number of elements.
    pub fn is_uniform(&self) -> bool {
        self.counts.windows(2).all(|w| w[0] == w[1])
    }
}
