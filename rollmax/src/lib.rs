//! # rollmax
//!
//! Count the die roll sequences of length `n` where no face is rolled more
//! than `rollMax[face]` times in a row, modulo `1_000_000_007`.
//!
//! ## Explanation
//!
//! Naively, you'd track `dp[t][face][run]`, the # of length-`t` sequences
//! ending in exactly `run` consecutive rolls of `face`, and sum over `run` on
//! every step.
//!
//! Instead, each face keeps a ring buffer of its last `rollMax[face]` run
//! counts plus their cached sum (see [`window::FaceWindow`]). Appending a roll
//! then costs O(1) per face:
//!
//! * every sequence _not_ ending in `face` can start a fresh run of `face`, and
//! * every run of `face` grows by one, except the run already at the max,
//!   which is dropped.
//!
//! So counting takes O(6·n) time and O(Σ rollMax) memory.

#[macro_use]
mod macros;

pub mod cli;
pub mod error;
pub mod modular;
pub mod parse;
pub mod simulator;
pub mod window;

pub use crate::{
    error::{Error, Result},
    modular::{Residue, MODULUS},
    parse::{RollMax, DEFAULT_MAX_RUN, NUM_FACES},
    simulator::Simulator,
};

/// The number of length-`n` die roll sequences (mod `1_000_000_007`) in which
/// face `i + 1` never appears more than `roll_max[i]` times in a row.
///
/// Fails with [`Error::InvalidArgument`] if `n == 0` or any `roll_max[i] == 0`.
pub fn die_simulator(n: u32, roll_max: [u32; NUM_FACES]) -> Result<u32> {
    let roll_max = RollMax::new(roll_max)?;
    Simulator::compute(n, &roll_max).map(u32::from)
}

/////////////////////
// TotalSize trait //
/////////////////////

/// A trait for computing the total size of a data structure in memory. That means
/// not just the size on the stack, but also the total size of any owned resources.
pub trait TotalSize {
    /// Types whose total size is known statically, like a `u32`, can return a
    /// constant here. Unsized types or types that contain variable-size resources
    /// must return `None` here.
    fn static_size() -> Option<usize> {
        None
    }
    fn total_size(&self) -> usize {
        Self::static_size().unwrap_or_else(|| std::mem::size_of_val(self))
    }
}

impl_total_size_static!(u32, Residue);

impl<T> TotalSize for Vec<T>
where
    T: TotalSize,
{
    fn total_size(&self) -> usize {
        let inner_size = if let Some(elt_size) = T::static_size() {
            self.len() * elt_size
        } else {
            self.iter().map(|x| x.total_size()).sum()
        };
        std::mem::size_of::<Self>() + inner_size
    }
}

///////////
// Tests //
///////////
