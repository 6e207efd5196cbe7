//! LF-mapping and the backward-search step.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};
use std::ops::Range;

use anyhow::{anyhow, Result};

use crate::rlbwt::RunLengthBwt;
use crate::run_rank::RunRankSelect;
use crate::Serializable;

const TABLE_LEN: usize = 257;

/// Cumulative symbol counts: `C[c]` is the number of symbols smaller than `c`.
///
/// The table has 257 entries so that `C[c + 1] - C[c]` is the number of
/// occurrences of `c` for every byte, and `C[256]` is the BWT length.
///
/// # Examples
///
/// ```
/// use rindex::lf::CumulativeTable;
///
/// let mut counts = [0; 256];
/// counts[usize::from(b'$')] = 1;
/// counts[usize::from(b'a')] = 3;
/// counts[usize::from(b'b')] = 1;
/// counts[usize::from(b'n')] = 2;
/// let c = CumulativeTable::from_counts(&counts);
///
/// assert_eq!(c.get(b'$'), 0);
/// assert_eq!(c.get(b'a'), 1);
/// assert_eq!(c.get(b'b'), 4);
/// assert_eq!(c.count_of(b'n'), 2);
/// assert_eq!(c.total(), 7);
/// assert_eq!(c.alphabet_size(), 4);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CumulativeTable {
    table: Vec<usize>,
}

impl CumulativeTable {
    /// Builds the table from per-symbol totals.
    pub fn from_counts(counts: &[usize; 256]) -> Self {
        let mut table = Vec::with_capacity(TABLE_LEN);
        let mut acc = 0;
        table.push(acc);
        for &x in counts {
            acc += x;
            table.push(acc);
        }
        Self { table }
    }

    /// Returns the number of symbols smaller than `c`.
    #[inline(always)]
    pub fn get(&self, c: u8) -> usize {
        self.table[usize::from(c)]
    }

    /// Returns the number of occurrences of `c`.
    #[inline(always)]
    pub fn count_of(&self, c: u8) -> usize {
        self.table[usize::from(c) + 1] - self.table[usize::from(c)]
    }

    /// Checks if `c` occurs at all.
    #[inline(always)]
    pub fn contains(&self, c: u8) -> bool {
        self.count_of(c) != 0
    }

    /// Returns the number of distinct symbols, the sentinel included.
    pub fn alphabet_size(&self) -> usize {
        (0..=255u8).filter(|&c| self.contains(c)).count()
    }

    /// Returns the smallest symbol that occurs, or [`None`] if the table is empty.
    pub fn smallest_symbol(&self) -> Option<u8> {
        (0..=255u8).find(|&c| self.contains(c))
    }

    /// Returns the BWT length.
    #[inline(always)]
    pub fn total(&self) -> usize {
        self.table[TABLE_LEN - 1]
    }
}

impl Serializable for CumulativeTable {
    fn serialize_into<W: Write>(&self, writer: W) -> Result<usize> {
        self.table.serialize_into(writer)
    }

    fn deserialize_from<R: Read>(reader: R) -> Result<Self> {
        let table = Vec::<usize>::deserialize_from(reader)?;
        if table.len() != TABLE_LEN {
            return Err(anyhow!(
                "cumulative table must have {TABLE_LEN} entries, but got {}.",
                table.len()
            ));
        }
        if table[0] != 0 || table.windows(2).any(|w| w[0] > w[1]) {
            return Err(anyhow!(
                "cumulative table must be non-decreasing from 0."
            ));
        }
        Ok(Self { table })
    }

    fn size_in_bytes(&self) -> usize {
        self.table.size_in_bytes()
    }
}

/// LF-mapping engine over a run-length BWT.
///
/// Owns the run store, its rank/select index, and the cumulative table, and
/// implements $`\textrm{LF}(i) = C[\textrm{BWT}[i]] + \textrm{rank}(\textrm{BWT}[i], i)`$
/// together with the interval update of backward search.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rindex::lf::LfEngine;
/// use rindex::rlbwt::RunLengthBwt;
///
/// // BWT of "banana$".
/// let lf = LfEngine::new(RunLengthBwt::from_bwt(b"annb$aa")?)?;
///
/// assert_eq!(lf.lf(0), Some(1));
/// assert_eq!(lf.lf(4), Some(0));
///
/// let r = lf.backward_step(0..7, b'a');
/// let r = lf.backward_step(r, b'n');
/// let r = lf.backward_step(r, b'a');
/// assert_eq!(r, 2..4);
/// assert!(lf.backward_step(0..7, b'z').is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LfEngine {
    bwt: RunLengthBwt,
    ranks: RunRankSelect,
    ctable: CumulativeTable,
}

impl LfEngine {
    /// Creates the engine, computing the cumulative table from `bwt`.
    ///
    /// # Errors
    ///
    /// An error is returned if the rank index cannot be built.
    pub fn new(bwt: RunLengthBwt) -> Result<Self> {
        let ctable = CumulativeTable::from_counts(&bwt.symbol_counts());
        Self::with_table(bwt, ctable)
    }

    /// Creates the engine from a stored cumulative table.
    ///
    /// # Errors
    ///
    /// An error is returned if `ctable` disagrees with the symbol totals of `bwt`.
    pub fn with_table(bwt: RunLengthBwt, ctable: CumulativeTable) -> Result<Self> {
        let counts = bwt.symbol_counts();
        for c in 0..=255u8 {
            if ctable.count_of(c) != counts[usize::from(c)] {
                return Err(anyhow!(
                    "cumulative table must count {} occurrences of symbol {c}, but got {}.",
                    counts[usize::from(c)],
                    ctable.count_of(c)
                ));
            }
        }
        let ranks = RunRankSelect::new(&bwt)?;
        Ok(Self { bwt, ranks, ctable })
    }

    /// Maps BWT position `i` to the position of the preceding text character,
    /// or returns [`None`] if `self.len() <= i`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg r)`$
    #[inline(always)]
    pub fn lf(&self, i: usize) -> Option<usize> {
        let c = self.bwt.symbol_at(i)?;
        Some(self.ctable.get(c) + self.ranks.rank(c, i)?)
    }

    /// Narrows `range` to the rows whose suffixes are prefixed by `c`
    /// followed by the suffixes matched so far.
    ///
    /// The result is never wider than `range`; an empty `range` or a symbol
    /// absent from the BWT gives an empty result.
    pub fn backward_step(&self, range: Range<usize>, c: u8) -> Range<usize> {
        if range.is_empty() || self.len() < range.end || !self.ctable.contains(c) {
            return 0..0;
        }
        let base = self.ctable.get(c);
        let (Some(lo), Some(hi)) = (
            self.ranks.rank(c, range.start),
            self.ranks.rank(c, range.end),
        ) else {
            return 0..0;
        };
        if lo == hi {
            0..0
        } else {
            base + lo..base + hi
        }
    }

    /// Gets the run-length BWT.
    #[inline(always)]
    pub const fn bwt(&self) -> &RunLengthBwt {
        &self.bwt
    }

    /// Gets the rank/select index.
    #[inline(always)]
    pub const fn ranks(&self) -> &RunRankSelect {
        &self.ranks
    }

    /// Gets the cumulative table.
    #[inline(always)]
    pub const fn ctable(&self) -> &CumulativeTable {
        &self.ctable
    }

    /// Gets the BWT length.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.bwt.len()
    }

    /// Checks if the BWT is empty.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.bwt.is_empty()
    }
}
