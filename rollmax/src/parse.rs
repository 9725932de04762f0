use crate::error::{Error, Result};
use itertools::Itertools;
use std::{fmt, str::FromStr};

/// The number of faces on a die.
pub const NUM_FACES: usize = 6;

/// The per-face max run used when the caller doesn't specify one.
pub const DEFAULT_MAX_RUN: u32 = 15;

/////////////
// RollMax //
/////////////

/// The maximum number of consecutive times each face may be rolled.
/// `RollMax[i]` is the limit for face `i + 1`. Every entry is at least 1.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RollMax([u32; NUM_FACES]);

impl RollMax {
    pub fn new(max_runs: [u32; NUM_FACES]) -> Result<Self> {
        if let Some(idx) = max_runs.iter().position(|&max_run| max_run == 0) {
            return Err(Error::invalid_argument(format!(
                "max run for face {} must be at least 1: rollMax = {}",
                idx + 1,
                Self(max_runs),
            )));
        }
        Ok(Self(max_runs))
    }

    /// Every face limited to the same max run.
    pub fn uniform(max_run: u32) -> Result<Self> {
        Self::new([max_run; NUM_FACES])
    }

    #[inline]
    pub fn as_array(&self) -> [u32; NUM_FACES] {
        self.0
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// `Σ rollMax[i]`, the total number of ring slots a simulation needs.
    pub fn total_max_run(&self) -> u64 {
        self.iter().map(u64::from).sum()
    }
}

impl Default for RollMax {
    fn default() -> Self {
        Self([DEFAULT_MAX_RUN; NUM_FACES])
    }
}

impl fmt::Display for RollMax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(","))
    }
}

impl FromStr for RollMax {
    type Err = Error;

    // [1,1,2,2,2,3]

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let s = s.trim_start_matches('[');
        let s = s.trim_end_matches(']');

        let splitters = &[',', ' ', '\n', '\t'];

        let max_runs = s
            .split(splitters)
            .filter(|s| !s.is_empty())
            .map(|max_run_str| {
                max_run_str.parse::<u32>().map_err(|err| {
                    Error::invalid_argument(format!(
                        "max run is not a valid integer: '{}': {}",
                        max_run_str, err
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let max_runs = <[u32; NUM_FACES]>::try_from(max_runs.as_slice()).map_err(|_| {
            Error::invalid_argument(format!(
                "rollMax must contain exactly {} entries, found {}",
                NUM_FACES,
                max_runs.len()
            ))
        })?;

        Self::new(max_runs)
    }
}
