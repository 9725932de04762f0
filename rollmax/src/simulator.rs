use crate::{
    error::{Error, Result},
    modular::Residue,
    parse::RollMax,
    window::FaceWindow,
    TotalSize,
};
use log::{debug, trace};

/// Counts valid roll sequences one roll at a time, with one [`FaceWindow`]
/// per die face.
///
/// Each step appends a roll to every sequence counted so far. All windows see
/// the same pre-step global sum, so the sum is computed once, _before_ any
/// window advances.
/// The longest series [`Simulator::series`] will produce. Each entry is a
/// `u32`, so this caps the output at 64 MiB.
pub const MAX_SERIES_LEN: u32 = 1 << 24;

#[derive(Clone, Debug)]
pub struct Simulator {
    faces: Vec<FaceWindow>,
}

impl Simulator {
    /// A fresh simulator counting the length-1 sequences, i.e., each face
    /// rolled once.
    pub fn new(roll_max: &RollMax) -> Result<Self> {
        let faces = roll_max
            .iter()
            .map(FaceWindow::new)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { faces })
    }

    #[inline]
    pub fn faces(&self) -> &[FaceWindow] {
        &self.faces
    }

    /// # valid sequences (mod M) of the current length.
    #[inline]
    pub fn global_sum(&self) -> Residue {
        self.faces.iter().map(FaceWindow::total).sum()
    }

    /// Advance every face by one roll.
    pub fn step(&mut self) {
        let global_sum = self.global_sum();

        trace!("Simulator::step: global_sum: {global_sum}");

        for face in &mut self.faces {
            face.advance(global_sum);
        }
    }

    /// Step a simulator fresh from [`Simulator::new`] up to length-`n`
    /// sequences and return their count.
    pub(crate) fn run(mut self, n: u32) -> Result<Residue> {
        validate_num_rolls(n)?;

        let count = time!("Simulator::run", {
            for _ in 1..n {
                self.step();
            }
            self.global_sum()
        });

        debug!("Simulator::run: n: {n}, count: {count}");

        Ok(count)
    }

    /// The number of valid length-`n` roll sequences (mod M) under `roll_max`.
    pub fn compute(n: u32, roll_max: &RollMax) -> Result<Residue> {
        debug!("Simulator::compute: n: {n}, roll_max: {roll_max}");

        Self::new(roll_max)?.run(n)
    }

    /// The number of valid sequences (mod M) for every length `1..=n`, in a
    /// single pass. `series(n, rm)[i] == compute(i + 1, rm)`.
    pub fn series(n: u32, roll_max: &RollMax) -> Result<Vec<Residue>> {
        validate_num_rolls(n)?;
        if n > MAX_SERIES_LEN {
            return Err(Error::invalid_argument(format!(
                "series length must be at most {MAX_SERIES_LEN}: n = {n}"
            )));
        }

        debug!("Simulator::series: n: {n}, roll_max: {roll_max}");

        let mut sim = Self::new(roll_max)?;
        let counts = time!(log::Level::Trace, "Simulator::series", {
            let mut counts = vec![sim.global_sum()];
            for _ in 1..n {
                sim.step();
                counts.push(sim.global_sum());
            }
            counts
        });

        Ok(counts)
    }
}

impl TotalSize for Simulator {
    fn total_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self
                .faces
                .iter()
                .map(FaceWindow::total_size)
                .sum::<usize>()
    }
}

fn validate_num_rolls(n: u32) -> Result<()> {
    if n == 0 {
        Err(Error::invalid_argument(
            "sequence length must be at least 1: n = 0",
        ))
    } else {
        Ok(())
    }
}

cfg_test! {
    use crate::parse::NUM_FACES;
    use itertools::Itertools;

    /// An `Iterator` over _every_ sequence of `len` die rolls (faces `0..6`),
    /// in lexicographic order.
    struct AllRollSequencesIter {
        /// the _next_ sequence we'll output (unless we're done).
        next: Option<Vec<u8>>,
    }

    impl AllRollSequencesIter {
        fn new(len: usize) -> Self {
            Self {
                next: Some(vec![0; len]),
            }
        }
    }

    impl Iterator for AllRollSequencesIter {
        type Item = Vec<u8>;

        fn next(&mut self) -> Option<Self::Item> {
            let current = self.next.take()?;

            // odometer-style increment; we're done once every roll wraps.
            let mut succ = current.clone();
            for idx in (0..succ.len()).rev() {
                if (succ[idx] as usize) + 1 < NUM_FACES {
                    succ[idx] += 1;
                    self.next = Some(succ);
                    break;
                }
                succ[idx] = 0;
            }

            Some(current)
        }
    }

    fn is_valid_sequence(rolls: &[u8], roll_max: &RollMax) -> bool {
        let max_runs = roll_max.as_array();
        rolls
            .iter()
            .dedup_with_count()
            .all(|(run, &face)| run <= max_runs[face as usize] as usize)
    }

    /// `out[face][r - 1]` = # valid length-`n` sequences ending in a run of
    /// exactly `r` of `face`, by exhaustive enumeration.
    fn run_length_counts_ref(n: usize, roll_max: &RollMax) -> Vec<Vec<u64>> {
        let mut out = roll_max
            .iter()
            .map(|max_run| vec![0_u64; max_run as usize])
            .collect::<Vec<_>>();

        for rolls in AllRollSequencesIter::new(n).filter(|rolls| is_valid_sequence(rolls, roll_max)) {
            let (run, &face) = rolls
                .iter()
                .dedup_with_count()
                .last()
                .expect("sequences are non-empty");
            out[face as usize][run - 1] += 1;
        }

        out
    }

    fn compute_ref(n: usize, roll_max: &RollMax) -> u64 {
        AllRollSequencesIter::new(n)
            .filter(|rolls| is_valid_sequence(rolls, roll_max))
            .count() as u64
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::parse::prop::arb_roll_max;
    use claim::{assert_err, assert_lt};
    use proptest::prelude::*;

    fn niters(n: u32) -> ProptestConfig {
        ProptestConfig::with_cases(n)
    }

    fn compute(n: u32, max_runs: [u32; 6]) -> u32 {
        let roll_max = RollMax::new(max_runs).unwrap();
        Simulator::compute(n, &roll_max).unwrap().as_u32()
    }

    #[test]
    fn test_all_roll_sequences_iter() {
        assert_eq!(6, AllRollSequencesIter::new(1).count());
        assert_eq!(216, AllRollSequencesIter::new(3).count());

        let seqs = AllRollSequencesIter::new(2).collect::<Vec<_>>();
        assert_eq!(vec![0, 0], seqs[0]);
        assert_eq!(vec![0, 1], seqs[1]);
        assert_eq!(vec![5, 5], seqs[35]);
    }

    #[test]
    fn test_compute_known_values() {
        assert_eq!(6, compute(1, [1, 1, 1, 1, 1, 1]));
        assert_eq!(30, compute(2, [1, 1, 1, 1, 1, 1]));
        assert_eq!(34, compute(2, [1, 1, 2, 2, 2, 3]));
        assert_eq!(36, compute(2, [2, 2, 2, 2, 2, 2]));
        assert_eq!(181, compute(3, [1, 1, 1, 2, 2, 3]));
    }

    #[test]
    fn test_compute_invalid() {
        let roll_max = RollMax::default();
        assert_err!(Simulator::compute(0, &roll_max));
        assert_err!(Simulator::series(0, &roll_max));
        assert_err!(Simulator::new(&roll_max).unwrap().run(0));
    }

    #[test]
    fn test_series_len_limit() {
        let roll_max = RollMax::uniform(1).unwrap();

        // rejected before anything is allocated
        assert_err!(Simulator::series(MAX_SERIES_LEN + 1, &roll_max));
        assert_err!(Simulator::series(u32::MAX, &roll_max));

        let counts = Simulator::series(1, &roll_max).unwrap();
        assert_eq!(vec![Residue::new(6)], counts);
    }

    /// The unoptimized `dp[face][run - 1]` recurrence with exact counts.
    /// 6^25 < 2^65, so a `u128` never overflows here.
    fn compute_exact_ref(n: usize, roll_max: &RollMax) -> u128 {
        let mut dp = roll_max
            .iter()
            .map(|max_run| {
                let mut runs = vec![0_u128; max_run as usize];
                runs[0] = 1;
                runs
            })
            .collect::<Vec<_>>();

        for _ in 1..n {
            let total = dp.iter().flatten().sum::<u128>();
            dp = dp
                .iter()
                .map(|runs| {
                    let ours = runs.iter().sum::<u128>();
                    let mut next = vec![0_u128; runs.len()];
                    next[0] = total - ours;
                    next[1..].copy_from_slice(&runs[..runs.len() - 1]);
                    next
                })
                .collect();
        }

        dp.iter().flatten().sum()
    }

    #[test]
    fn test_run_matches_exact_dp() {
        let roll_max = RollMax::new([1, 4, 2, 15, 3, 7]).unwrap();
        for n in 1..=25 {
            let expected = compute_exact_ref(n, &roll_max) % (crate::MODULUS as u128);
            let sim = Simulator::new(&roll_max).unwrap();
            assert_eq!(expected as u32, sim.run(n as u32).unwrap().as_u32(), "n = {n}");
        }
    }

    #[test]
    fn test_compute_no_repeats() {
        // with every max run = 1, each roll after the first has 5 choices.
        let roll_max = RollMax::uniform(1).unwrap();
        let mut expected = Residue::new(6);
        for n in 1..=40 {
            assert_eq!(expected, Simulator::compute(n, &roll_max).unwrap());
            expected = Residue::new(expected.as_u32() as u64 * 5);
        }
    }

    #[test]
    fn test_compute_unconstrained() {
        // no run of length <= 15 can exceed a max run of 15, so every one of
        // the 6^n sequences is valid.
        let roll_max = RollMax::default();
        let mut pow6 = Residue::ONE;
        for n in 1..=15 {
            pow6 = Residue::new(pow6.as_u32() as u64 * 6);
            assert_eq!(pow6, Simulator::compute(n, &roll_max).unwrap());
        }
    }

    #[test]
    fn test_compute_large_n_in_range() {
        let roll_max = RollMax::new([1, 15, 2, 15, 3, 15]).unwrap();
        let count = Simulator::compute(5000, &roll_max).unwrap();
        assert_lt!(count.as_u32(), crate::MODULUS);
    }

    #[test]
    fn test_step_matches_brute_force_runs() {
        let roll_max = RollMax::new([1, 2, 3, 1, 2, 3]).unwrap();
        let mut sim = Simulator::new(&roll_max).unwrap();

        for n in 1..=5 {
            let expected = run_length_counts_ref(n, &roll_max);
            let actual = sim
                .faces()
                .iter()
                .map(|face| {
                    face.run_length_counts()
                        .into_iter()
                        .map(|count| count.as_u32() as u64)
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>();
            assert_eq!(expected, actual, "n = {n}");

            sim.step();
        }
    }

    #[test]
    fn test_total_size() {
        let small = Simulator::new(&RollMax::uniform(1).unwrap()).unwrap();
        let large = Simulator::new(&RollMax::uniform(15).unwrap()).unwrap();

        let slot = std::mem::size_of::<Residue>();
        assert_eq!(6 * 14 * slot, large.total_size() - small.total_size());
    }

    #[test]
    fn test_compute_matches_brute_force() {
        proptest!(niters(64), |(n in 1_usize..=6, roll_max in arb_roll_max(3))| {
            let count = Simulator::compute(n as u32, &roll_max).unwrap();
            prop_assert_eq!(compute_ref(n, &roll_max), count.as_u32() as u64);
        });
    }

    #[test]
    fn test_compute_monotone_in_max_run() {
        // 6^11 < M, so the counts here are never reduced mod M.
        proptest!(niters(256), |(n in 1_u32..=11, roll_max in arb_roll_max(8), face in 0_usize..6)| {
            let mut bumped = roll_max.as_array();
            bumped[face] += 1;
            let bumped = RollMax::new(bumped).unwrap();

            let count = Simulator::compute(n, &roll_max).unwrap();
            let bumped_count = Simulator::compute(n, &bumped).unwrap();
            prop_assert!(count <= bumped_count, "{count} > {bumped_count}");
        });
    }

    #[test]
    fn test_series_matches_compute() {
        proptest!(niters(64), |(n in 1_u32..=50, roll_max in arb_roll_max(15))| {
            let series = Simulator::series(n, &roll_max).unwrap();
            prop_assert_eq!(n as usize, series.len());
            for (idx, &count) in series.iter().enumerate() {
                prop_assert_eq!(Simulator::compute(idx as u32 + 1, &roll_max).unwrap(), count);
            }
        });
    }

    #[test]
    fn test_compute_deterministic() {
        proptest!(niters(64), |(n in 1_u32..=500, roll_max in arb_roll_max(15))| {
            let count1 = Simulator::compute(n, &roll_max).unwrap();
            let count2 = Simulator::compute(n, &roll_max).unwrap();
            prop_assert_eq!(count1, count2);
            prop_assert!(count1.as_u32() < crate::MODULUS);
        });
    }
}
