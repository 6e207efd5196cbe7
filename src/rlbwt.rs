//! Run-length encoded BWT.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};

use anyhow::{anyhow, Result};

use crate::int_vectors::CompactVector;
use crate::{utils, Serializable};

/// A maximal block of identical symbols in the BWT.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Run {
    /// Symbol repeated in the run.
    pub symbol: u8,
    /// First BWT position of the run.
    pub start: usize,
    /// Number of positions covered (at least one).
    pub len: usize,
}

impl Run {
    /// Returns the last BWT position of the run.
    #[inline(always)]
    pub const fn end(&self) -> usize {
        self.start + self.len - 1
    }
}

/// The run owning a BWT position, returned by [`RunLengthBwt::run_of()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunPos {
    /// Index of the run.
    pub run: usize,
    /// Symbol of the run.
    pub symbol: u8,
    /// Offset of the position from the start of the run.
    pub offset: usize,
}

/// BWT stored as $`r`$ pairs of (symbol, run start).
///
/// Run lengths are implied by consecutive starts and the total length $`n`$,
/// so the structure takes $`r (8 + \lceil \lg n \rceil)`$ bits.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rindex::rlbwt::{RunLengthBwt, RunPos};
///
/// let bwt = RunLengthBwt::from_bwt(b"annb$aa")?;
///
/// assert_eq!(bwt.len(), 7);
/// assert_eq!(bwt.run_count(), 5);
/// assert_eq!(bwt.symbol_at(2), Some(b'n'));
/// assert_eq!(bwt.run_of(6), Some(RunPos { run: 4, symbol: b'a', offset: 1 }));
/// assert_eq!(bwt.run_of(7), None);
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct RunLengthBwt {
    heads: Vec<u8>,
    starts: CompactVector,
    len: usize,
}

impl RunLengthBwt {
    /// Decomposes a raw BWT into maximal runs.
    ///
    /// # Errors
    ///
    /// An error is returned if `bwt` is empty.
    pub fn from_bwt(bwt: &[u8]) -> Result<Self> {
        if bwt.is_empty() {
            return Err(anyhow!("bwt must not be empty."));
        }
        let mut runs = vec![];
        let mut start = 0;
        for i in 1..=bwt.len() {
            if i == bwt.len() || bwt[i] != bwt[start] {
                runs.push((bwt[start], i - start));
                start = i;
            }
        }
        Self::from_runs(runs, bwt.len())
    }

    /// Creates the store from a run decomposition of `(symbol, length)` pairs.
    ///
    /// # Errors
    ///
    /// An error is returned if
    ///
    ///  - a run has length zero,
    ///  - two adjacent runs have the same symbol, or
    ///  - the run lengths do not sum to `declared_len`.
    pub fn from_runs<I>(runs: I, declared_len: usize) -> Result<Self>
    where
        I: IntoIterator<Item = (u8, usize)>,
    {
        if declared_len == 0 {
            return Err(anyhow!("declared_len must be positive."));
        }
        let mut heads = vec![];
        let mut starts =
            CompactVector::new(utils::needed_bits(declared_len.saturating_sub(1) as u64))?;
        let mut total = 0usize;
        for (symbol, len) in runs {
            if len == 0 {
                return Err(anyhow!("run {} must not be empty.", heads.len()));
            }
            if heads.last() == Some(&symbol) {
                return Err(anyhow!(
                    "runs must be maximal, but runs {} and {} share symbol {symbol}.",
                    heads.len() - 1,
                    heads.len()
                ));
            }
            if total >= declared_len {
                return Err(anyhow!(
                    "run lengths must sum to declared_len={declared_len}, but exceed it."
                ));
            }
            heads.push(symbol);
            starts.push_int(total)?;
            total += len;
        }
        if total != declared_len {
            return Err(anyhow!(
                "run lengths must sum to declared_len={declared_len}, but got {total}."
            ));
        }
        Ok(Self {
            heads,
            starts,
            len: declared_len,
        })
    }

    /// Returns the run owning BWT position `pos`, or [`None`] if out of bounds.
    ///
    /// # Complexity
    ///
    /// $`O(\lg r)`$
    pub fn run_of(&self, pos: usize) -> Option<RunPos> {
        if self.len <= pos {
            return None;
        }
        let run = self.starts.partition_point(|s| s <= pos) - 1;
        Some(RunPos {
            run,
            symbol: self.heads[run],
            offset: pos - self.starts.get_int(run)?,
        })
    }

    /// Returns the symbol at BWT position `pos`, or [`None`] if out of bounds.
    #[inline(always)]
    pub fn symbol_at(&self, pos: usize) -> Option<u8> {
        self.run_of(pos).map(|rp| rp.symbol)
    }

    /// Returns the `run`-th run, or [`None`] if out of bounds.
    pub fn run(&self, run: usize) -> Option<Run> {
        let start = self.starts.get_int(run)?;
        let next = self.starts.get_int(run + 1).unwrap_or(self.len);
        Some(Run {
            symbol: self.heads[run],
            start,
            len: next - start,
        })
    }

    /// Returns the first BWT position of the `run`-th run.
    #[inline(always)]
    pub fn run_start(&self, run: usize) -> Option<usize> {
        self.starts.get_int(run)
    }

    /// Returns the length of the `run`-th run.
    #[inline(always)]
    pub fn run_len(&self, run: usize) -> Option<usize> {
        self.run(run).map(|r| r.len)
    }

    /// Returns the symbol of the `run`-th run.
    #[inline(always)]
    pub fn run_symbol(&self, run: usize) -> Option<u8> {
        self.heads.get(run).copied()
    }

    /// Gets the number of runs, $`r`$.
    #[inline(always)]
    pub fn run_count(&self) -> usize {
        self.heads.len()
    }

    /// Gets the BWT length, $`n`$ (text plus sentinel).
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the BWT is empty.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Creates an iterator over runs in BWT order.
    pub fn iter(&self) -> impl Iterator<Item = Run> + '_ {
        (0..self.run_count()).filter_map(move |r| self.run(r))
    }

    /// Computes the number of occurrences of every byte.
    pub fn symbol_counts(&self) -> [usize; 256] {
        let mut counts = [0; 256];
        for run in self.iter() {
            counts[usize::from(run.symbol)] += run.len;
        }
        counts
    }
}

impl Serializable for RunLengthBwt {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = self.heads.serialize_into(&mut writer)?;
        mem += self.starts.serialize_into(&mut writer)?;
        mem += self.len.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let heads = Vec::<u8>::deserialize_from(&mut reader)?;
        let starts = CompactVector::deserialize_from(&mut reader)?;
        let len = usize::deserialize_from(&mut reader)?;
        if heads.is_empty() || heads.len() != starts.len() {
            return Err(anyhow!(
                "heads and starts must have the same positive length, but got {} and {}.",
                heads.len(),
                starts.len()
            ));
        }
        let mut prev = None;
        for (r, start) in starts.iter().enumerate() {
            let valid = match prev {
                None => start == 0,
                Some(p) => p < start,
            };
            if !valid || len <= start {
                return Err(anyhow!(
                    "run starts must increase strictly from 0 below len={len}, but run {r} starts at {start}."
                ));
            }
            if r > 0 && heads[r - 1] == heads[r] {
                return Err(anyhow!(
                    "runs must be maximal, but runs {} and {r} share symbol {}.",
                    r - 1,
                    heads[r]
                ));
            }
            prev = Some(start);
        }
        Ok(Self { heads, starts, len })
    }

    fn size_in_bytes(&self) -> usize {
        self.heads.size_in_bytes()
            + self.starts.size_in_bytes()
            + usize::size_of().unwrap_or(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banana_runs() {
        let bwt = RunLengthBwt::from_bwt(b"annb$aa").unwrap();
        let runs: Vec<_> = bwt.iter().map(|r| (r.symbol, r.start, r.len)).collect();
        assert_eq!(
            runs,
            vec![
                (b'a', 0, 1),
                (b'n', 1, 2),
                (b'b', 3, 1),
                (b'$', 4, 1),
                (b'a', 5, 2)
            ]
        );
        let expanded: Vec<_> = (0..bwt.len()).map(|i| bwt.symbol_at(i).unwrap()).collect();
        assert_eq!(expanded, b"annb$aa".to_vec());
    }

    #[test]
    fn test_run_of_offsets() {
        let bwt = RunLengthBwt::from_bwt(b"aaabbbbc").unwrap();
        assert_eq!(
            bwt.run_of(0),
            Some(RunPos {
                run: 0,
                symbol: b'a',
                offset: 0
            })
        );
        assert_eq!(
            bwt.run_of(5),
            Some(RunPos {
                run: 1,
                symbol: b'b',
                offset: 2
            })
        );
        assert_eq!(bwt.run_len(2), Some(1));
        assert_eq!(bwt.run(3), None);
    }

    #[test]
    fn test_empty_bwt() {
        let e = RunLengthBwt::from_bwt(b"");
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("bwt must not be empty.".to_string())
        );
    }

    #[test]
    fn test_from_runs_length_mismatch() {
        let e = RunLengthBwt::from_runs([(b'a', 2), (b'b', 2)], 5);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("run lengths must sum to declared_len=5, but got 4.".to_string())
        );
    }

    #[test]
    fn test_from_runs_not_maximal() {
        let e = RunLengthBwt::from_runs([(b'a', 2), (b'a', 2)], 4);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("runs must be maximal, but runs 0 and 1 share symbol 97.".to_string())
        );
    }

    #[test]
    fn test_from_runs_zero_len() {
        let e = RunLengthBwt::from_runs([(b'a', 2), (b'b', 0)], 2);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("run 1 must not be empty.".to_string())
        );
    }

    #[test]
    fn test_symbol_counts() {
        let bwt = RunLengthBwt::from_bwt(b"annb$aa").unwrap();
        let counts = bwt.symbol_counts();
        assert_eq!(counts[usize::from(b'a')], 3);
        assert_eq!(counts[usize::from(b'n')], 2);
        assert_eq!(counts[usize::from(b'$')], 1);
        assert_eq!(counts.iter().sum::<usize>(), 7);
    }

    #[test]
    fn test_serialize() {
        let mut bytes = vec![];
        let bwt = RunLengthBwt::from_bwt(b"ard$rcaaaabb").unwrap();
        let size = bwt.serialize_into(&mut bytes).unwrap();
        let other = RunLengthBwt::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(bwt, other);
        assert_eq!(size, bytes.len());
        assert_eq!(size, bwt.size_in_bytes());
    }

    #[test]
    fn test_deserialize_unsorted_starts() {
        let mut bytes = vec![];
        vec![b'a', b'b'].serialize_into(&mut bytes).unwrap();
        CompactVector::from_slice(&[0, 5])
            .serialize_into(&mut bytes)
            .unwrap();
        4usize.serialize_into(&mut bytes).unwrap();
        let e = RunLengthBwt::deserialize_from(&bytes[..]);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some(
                "run starts must increase strictly from 0 below len=4, but run 1 starts at 5."
                    .to_string()
            )
        );
    }
}
