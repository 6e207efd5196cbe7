//! Rank/select queries answered over runs instead of individual symbols.
#![cfg(target_pointer_width = "64")]

use anyhow::Result;

use crate::int_vectors::CompactVector;
use crate::rlbwt::RunLengthBwt;
use crate::utils;

/// Runs of one symbol, in BWT order.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
struct SymbolRuns {
    // BWT start of each run.
    starts: CompactVector,
    // Number of occurrences of the symbol before each run.
    ranks: CompactVector,
    // Global run index of each run.
    run_ids: CompactVector,
    total: usize,
}

impl SymbolRuns {
    fn run_len(&self, j: usize) -> usize {
        let next = self.ranks.get_int(j + 1).unwrap_or(self.total);
        next - self.ranks.get_int(j).unwrap_or(0)
    }
}

/// Rank/select index over a [`RunLengthBwt`].
///
/// Occurrences of a symbol are clustered into whole runs, so for each symbol
/// it keeps the start of its runs and the prefix sums of their lengths.
/// A query binary-searches one of these arrays and touches $`O(\lg r)`$ runs
/// rather than $`O(n)`$ symbols.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rindex::rlbwt::RunLengthBwt;
/// use rindex::run_rank::RunRankSelect;
///
/// let bwt = RunLengthBwt::from_bwt(b"annb$aa")?;
/// let rs = RunRankSelect::new(&bwt)?;
///
/// assert_eq!(rs.rank(b'a', 0), Some(0));
/// assert_eq!(rs.rank(b'a', 6), Some(2));
/// assert_eq!(rs.rank(b'a', 7), Some(3));
/// assert_eq!(rs.select(b'a', 1), Some(5));
/// assert_eq!(rs.select(b'z', 0), None);
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RunRankSelect {
    symbols: Vec<SymbolRuns>,
    len: usize,
}

impl RunRankSelect {
    /// Builds the index from the runs of `bwt`.
    ///
    /// # Errors
    ///
    /// An error is returned if the internal vectors cannot be allocated with
    /// the widths implied by `bwt.len()`.
    pub fn new(bwt: &RunLengthBwt) -> Result<Self> {
        let n = bwt.len();
        let pos_width = utils::needed_bits(n as u64);
        let run_width = utils::needed_bits(bwt.run_count() as u64);

        let mut symbols = vec![SymbolRuns::default(); 256];
        for s in symbols.iter_mut() {
            s.starts = CompactVector::new(pos_width)?;
            s.ranks = CompactVector::new(pos_width)?;
            s.run_ids = CompactVector::new(run_width)?;
        }
        for (r, run) in bwt.iter().enumerate() {
            let s = &mut symbols[usize::from(run.symbol)];
            s.starts.push_int(run.start)?;
            s.ranks.push_int(s.total)?;
            s.run_ids.push_int(r)?;
            s.total += run.len;
        }
        Ok(Self { symbols, len: n })
    }

    /// Returns the number of occurrences of `c` in `BWT[0, i)`,
    /// or [`None`] if `self.len() < i`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg r_c)`$ where $`r_c`$ is the number of runs of `c`.
    pub fn rank(&self, c: u8, i: usize) -> Option<usize> {
        if self.len < i {
            return None;
        }
        let s = &self.symbols[usize::from(c)];
        let k = s.starts.partition_point(|x| x < i);
        if k == 0 {
            return Some(0);
        }
        let j = k - 1;
        let start = s.starts.get_int(j)?;
        Some(s.ranks.get_int(j)? + (i - start).min(s.run_len(j)))
    }

    /// Returns the BWT position of the `(k+1)`-th occurrence of `c`,
    /// or [`None`] if `c` occurs at most `k` times.
    ///
    /// # Complexity
    ///
    /// $`O(\lg r_c)`$
    pub fn select(&self, c: u8, k: usize) -> Option<usize> {
        let s = &self.symbols[usize::from(c)];
        if s.total <= k {
            return None;
        }
        let j = s.ranks.partition_point(|x| x <= k) - 1;
        Some(s.starts.get_int(j)? + (k - s.ranks.get_int(j)?))
    }

    /// Returns the last occurrence of `c` in `BWT[0, i)` together with the
    /// index of the run holding it, or [`None`] if there is none.
    ///
    /// If `BWT[i-1] != c`, the returned position is the last one of its run.
    pub fn last_occurrence_before(&self, c: u8, i: usize) -> Option<(usize, usize)> {
        let s = &self.symbols[usize::from(c)];
        let k = s.starts.partition_point(|x| x < i.min(self.len));
        if k == 0 {
            return None;
        }
        let j = k - 1;
        let run_end = s.starts.get_int(j)? + s.run_len(j) - 1;
        Some((run_end.min(i - 1), s.run_ids.get_int(j)?))
    }

    /// Returns the total number of occurrences of `c`.
    #[inline(always)]
    pub fn count(&self, c: u8) -> usize {
        self.symbols[usize::from(c)].total
    }

    /// Returns the number of runs of `c`.
    #[inline(always)]
    pub fn run_count(&self, c: u8) -> usize {
        self.symbols[usize::from(c)].starts.len()
    }

    /// Gets the BWT length.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the BWT is empty.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}
