//! Static row-to-worker assignment.

use serde::{Deserialize, Serialize};
use std::iter::StepBy;
use std::ops::Range;

/// How image rows are divided among workers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    /// Worker `t` of `N` takes rows `t, t + N, t + 2N, ...`.
    #[default]
    Interleaved,
    /// Worker `t` takes one contiguous stripe of `ceil(height / N)` rows.
    /// Trailing workers may get a short stripe or none at all.
    Block,
}

impl Partition {
    /// Rows owned by `worker` out of `num_workers`, in ascending order.
    ///
    /// # Panics
    /// Panics if `num_workers` is zero.
    pub fn rows_for(self, worker: usize, num_workers: usize, height: usize) -> StepBy<Range<usize>> {
        assert!(num_workers > 0, "num_workers must be at least 1");
        match self {
            Partition::Interleaved => (worker.min(height)..height).step_by(num_workers),
            Partition::Block => {
                let per = Self::stripe_len(num_workers, height);
                let start = worker.saturating_mul(per).min(height);
                let end = start.saturating_add(per).min(height);
                (start..end).step_by(1)
            }
        }
    }

    /// The worker that owns `row`. Agrees with [`Partition::rows_for`].
    ///
    /// # Panics
    /// Panics if `num_workers` is zero.
    pub fn owner_of(self, row: usize, num_workers: usize, height: usize) -> usize {
        assert!(num_workers > 0, "num_workers must be at least 1");
        match self {
            Partition::Interleaved => row % num_workers,
            Partition::Block => row / Self::stripe_len(num_workers, height).max(1),
        }
    }

    fn stripe_len(num_workers: usize, height: usize) -> usize {
        height.div_ceil(num_workers)
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Partition::Interleaved => f.write_str("interleaved"),
            Partition::Block => f.write_str("block"),
        }
    }
}

impl std::str::FromStr for Partition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "interleaved" | "interleave" => Ok(Partition::Interleaved),
            "block" => Ok(Partition::Block),
            other => Err(format!("unknown partition '{}'", other)),
        }
    }
}
