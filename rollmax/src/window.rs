use crate::{
    error::{Error, Result},
    modular::Residue,
    TotalSize,
};
use std::fmt;

/// Tracks, for a single die face with max run `K`, how many valid roll
/// sequences end in a run of that face of each length `1..=K`.
///
/// The counts live in a ring buffer indexed by roll number, so the slot we're
/// about to overwrite always holds the run-length-`K` count: exactly the
/// sequences that become invalid (run length `K + 1`) when this face is
/// rolled again.
///
/// ```text
///                   write_idx
///                       v
/// ring: [ r=2 | r=1 | r=K | .. | r=3 ]
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FaceWindow {
    /// `ring[(write_idx - r) mod K]` = # sequences ending in a run of exactly
    /// `r` of this face.
    ring: Box<[Residue]>,
    /// Cached sum of every entry in `ring`, i.e., # sequences ending in this
    /// face at all.
    running_total: Residue,
    /// The next slot to overwrite. Always `< K`.
    write_idx: usize,
}

impl FaceWindow {
    /// A window for a face after the very first roll, where there is exactly
    /// one sequence ending in this face: the face by itself (run length 1).
    pub fn new(max_run: u32) -> Result<Self> {
        if max_run == 0 {
            return Err(Error::invalid_argument(
                "max run must be at least 1: max_run = 0",
            ));
        }

        let mut ring = vec![Residue::ZERO; max_run as usize].into_boxed_slice();
        ring[0] = Residue::ONE;

        Ok(Self {
            ring,
            running_total: Residue::ONE,
            write_idx: 1 % (max_run as usize),
        })
    }

    #[inline]
    pub fn max_run(&self) -> usize {
        self.ring.len()
    }

    /// # sequences (mod M) whose last roll is this face.
    #[inline]
    pub fn total(&self) -> Residue {
        self.running_total
    }

    /// Append one more roll. `global_sum` is the # of valid sequences across
    /// _all_ faces before this roll, and must be the same snapshot for every
    /// face in this step.
    #[inline]
    pub fn advance(&mut self, global_sum: Residue) {
        let idx = self.write_idx;

        // every run of this face extends by one, except the length-K run we're
        // about to overwrite, which would exceed the max.
        let new_total = global_sum - self.ring[idx];
        // any sequence that didn't end in this face starts a new length-1 run.
        self.ring[idx] = global_sum - self.running_total;
        self.running_total = new_total;

        self.write_idx = (idx + 1) % self.ring.len();
    }

    /// The ring unrolled into run-length order: `out[r - 1]` = # sequences
    /// ending in a run of exactly `r`.
    pub fn run_length_counts(&self) -> Vec<Residue> {
        let k = self.ring.len();
        (1..=k)
            .map(|r| self.ring[(self.write_idx + k - r) % k])
            .collect()
    }
}

impl TotalSize for FaceWindow {
    fn total_size(&self) -> usize {
        std::mem::size_of::<Self>() + self.ring.len() * std::mem::size_of::<Residue>()
    }
}

impl fmt::Debug for FaceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FaceWindow")
            .field("total", &self.running_total)
            .field("runs", &self.run_length_counts())
            .finish()
    }
}
