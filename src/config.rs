use std::fmt;
use std::str::FromStr;

use crate::error::{BenchError, Result};
use crate::partition::RemainderPolicy;

/// Vector length used by the reference run.
pub const DEFAULT_LEN: usize = 10_000_000;

/// How partial sums are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CombineMode {
    /// Every rank receives the total.
    #[default]
    AllReduce,
    /// Only the root receives the total.
    Reduce,
}

impl FromStr for CombineMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "all-reduce" | "allreduce" => Ok(CombineMode::AllReduce),
            "reduce" => Ok(CombineMode::Reduce),
            other => Err(format!("unknown combine mode `{other}`")),
        }
    }
}

impl fmt::Display for CombineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CombineMode::AllReduce => write!(f, "all-reduce"),
            CombineMode::Reduce => write!(f, "reduce"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchConfig {
    pub len: usize,
    pub remainder: RemainderPolicy,
    pub mode: CombineMode,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            len: DEFAULT_LEN,
            remainder: RemainderPolicy::default(),
            mode: CombineMode::default(),
        }
    }
}

impl BenchConfig {
    pub fn with_len(len: usize) -> Self {
        BenchConfig {
            len,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.len == 0 {
            return Err(BenchError::EmptyVector);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_run() {
        let config = BenchConfig::default();
        assert_eq!(config.len, 10_000_000);
        assert_eq!(config.remainder, RemainderPolicy::Spread);
        assert_eq!(config.mode, CombineMode::AllReduce);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_vector_is_rejected() {
        assert!(matches!(
            BenchConfig::with_len(0).validate(),
            Err(BenchError::EmptyVector)
        ));
    }

    #[test]
    fn mode_parses_both_spellings() {
        assert_eq!("all-reduce".parse::<CombineMode>(), Ok(CombineMode::AllReduce));
        assert_eq!("allreduce".parse::<CombineMode>(), Ok(CombineMode::AllReduce));
        assert_eq!("reduce".parse::<CombineMode>(), Ok(CombineMode::Reduce));
    }
}
