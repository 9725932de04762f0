use claim::debug_assert_lt;
use std::{fmt, iter, ops};

/// All counts are reported modulo this prime.
pub const MODULUS: u32 = 1_000_000_007;

/// An integer in the range `0 <= x < MODULUS`.
///
/// Since `2 * MODULUS < u32::MAX`, adding two residues (or a residue and
/// `MODULUS`) never overflows a `u32`, so `+` and `-` reduce with a single
/// conditional subtract instead of a `%`.
#[repr(transparent)]
#[derive(Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Residue(u32);

impl Residue {
    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(1);

    /// Reduce an arbitrary `u64` into a residue.
    #[inline]
    pub const fn new(x: u64) -> Self {
        Self((x % (MODULUS as u64)) as u32)
    }

    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl From<Residue> for u32 {
    #[inline]
    fn from(x: Residue) -> Self {
        x.0
    }
}

impl ops::Add for Residue {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        debug_assert_lt!(self.0, MODULUS);
        debug_assert_lt!(rhs.0, MODULUS);

        let sum = self.0 + rhs.0;
        if sum >= MODULUS {
            Self(sum - MODULUS)
        } else {
            Self(sum)
        }
    }
}

impl ops::AddAssign for Residue {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl ops::Sub for Residue {
    type Output = Self;

    /// `(self - rhs) mod M`, always normalized into `[0, M)`.
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        debug_assert_lt!(self.0, MODULUS);
        debug_assert_lt!(rhs.0, MODULUS);

        if self.0 >= rhs.0 {
            Self(self.0 - rhs.0)
        } else {
            Self(self.0 + MODULUS - rhs.0)
        }
    }
}

impl iter::Sum for Residue {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, x| acc + x)
    }
}

impl<'a> iter::Sum<&'a Residue> for Residue {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Debug for Residue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for Residue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
