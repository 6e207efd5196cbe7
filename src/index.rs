//! The r-index: counting and locating patterns over a run-length BWT.
#![cfg(target_pointer_width = "64")]

use std::fmt;
use std::io::{Read, Write};
use std::ops::Range;

use anyhow::{anyhow, Context, Result};

use crate::lf::{CumulativeTable, LfEngine};
use crate::phi::{self, PhiSupport};
use crate::rlbwt::RunLengthBwt;
use crate::samples::SampleTable;
use crate::{utils, Serializable};

/// Version of the persisted layout written by [`RIndex::serialize_into()`].
pub const FORMAT_VERSION: u64 = 1;

/// Compressed full-text index in $`O(r)`$ words, where $`r`$ is the number of
/// runs in the BWT of the text.
///
/// An index is built once by [`RIndexBuilder`](crate::RIndexBuilder) or loaded
/// with [`Serializable::deserialize_from()`], and is read-only afterwards,
/// so it can be shared between threads without locking.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rindex::{RIndexBuilder, SaSample};
///
/// // BWT and run-boundary SA samples of "banana$".
/// let index = RIndexBuilder::new(b"annb$aa")?
///     .run_starts([(0, 6), (1, 5), (3, 1), (4, 0), (5, 4)].map(SaSample::from))?
///     .run_ends([(0, 6), (2, 3), (3, 1), (4, 0), (6, 2)].map(SaSample::from))?
///     .build()?;
///
/// assert_eq!(index.count(b"ana"), 2..4);
/// assert_eq!(index.num_occurrences(b"ana"), 2);
///
/// let mut occs = index.locate(b"ana");
/// occs.sort_unstable();
/// assert_eq!(occs, vec![1, 3]);
///
/// assert!(index.count(b"xyz").is_empty());
/// assert_eq!(index.count(b""), 0..7);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RIndex {
    lf: LfEngine,
    samples: SampleTable,
    phi: PhiSupport,
    sentinel: u8,
}

/// A matched BWT interval with the suffix-array value of its last row.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Toehold {
    range: Range<usize>,
    last_sa: usize,
}

impl RIndex {
    /// Assembles an index from its parts, checking that they agree.
    ///
    /// # Errors
    ///
    /// An error is returned if
    ///
    ///  - the sample table does not cover every run or refers to another text length,
    ///  - the smallest symbol (the sentinel) does not occur exactly once,
    ///  - a run of length one has different start and end samples,
    ///  - the row holding the sentinel is not sampled as text position 0, or
    ///  - $`\phi`$ does not form a single cycle over all text positions.
    ///
    /// # Complexity
    ///
    /// $`O(n \lg r)`$ time and $`n`$ bits of working space for the cycle check.
    pub(crate) fn from_parts(lf: LfEngine, samples: SampleTable, phi: PhiSupport) -> Result<Self> {
        let bwt = lf.bwt();
        let n = bwt.len();
        if samples.num_runs() != bwt.run_count() {
            return Err(anyhow!(
                "samples must cover {} runs, but got {}.",
                bwt.run_count(),
                samples.num_runs()
            ));
        }
        if samples.text_len() != n || phi.text_len() != n {
            return Err(anyhow!(
                "samples must refer to text length {n}, but got {} and {}.",
                samples.text_len(),
                phi.text_len()
            ));
        }
        let sentinel = lf
            .ctable()
            .smallest_symbol()
            .ok_or_else(|| anyhow!("bwt must not be empty."))?;
        if lf.ctable().count_of(sentinel) != 1 {
            return Err(anyhow!(
                "the smallest symbol {sentinel} must occur exactly once as the sentinel, but occurs {} times.",
                lf.ctable().count_of(sentinel)
            ));
        }
        for (r, run) in bwt.iter().enumerate() {
            let (first, last) = (
                samples.sample_at_run_start(r).unwrap_or(n),
                samples.sample_at_run_end(r).unwrap_or(n),
            );
            if run.len == 1 && first != last {
                return Err(anyhow!(
                    "run {r} has length 1, so its start and end samples must agree, but got {first} and {last}."
                ));
            }
            if run.symbol == sentinel && first != 0 {
                return Err(anyhow!(
                    "the sentinel row must be sampled as text position 0, but got {first}."
                ));
            }
        }
        // Distinct in-range samples can still disagree with the suffix array.
        if !phi::is_single_cycle(n, |x| phi.phi(x)) {
            return Err(anyhow!("phi must form a single cycle over {n} positions."));
        }
        Ok(Self {
            lf,
            samples,
            phi,
            sentinel,
        })
    }

    /// Returns the half-open BWT interval of rows prefixed by `pattern`.
    ///
    /// The number of occurrences is the length of the range; an empty range
    /// means no occurrence, and the empty pattern matches every row.
    /// Bytes that do not occur in the text yield an empty range.
    ///
    /// # Complexity
    ///
    /// $`O(m \lg r)`$ for a pattern of length $`m`$.
    pub fn count(&self, pattern: &[u8]) -> Range<usize> {
        let mut range = 0..self.len();
        for &c in pattern.iter().rev() {
            range = self.lf.backward_step(range, c);
            if range.is_empty() {
                return 0..0;
            }
        }
        range
    }

    /// Returns the number of occurrences of `pattern`.
    #[inline(always)]
    pub fn num_occurrences(&self, pattern: &[u8]) -> usize {
        self.count(pattern).len()
    }

    /// Returns the text positions of all occurrences of `pattern`,
    /// in an unspecified order.
    ///
    /// # Complexity
    ///
    /// $`O((m + occ) \lg r)`$
    pub fn locate(&self, pattern: &[u8]) -> Vec<usize> {
        self.locate_iter(pattern).collect()
    }

    /// Returns an iterator over the text positions of all occurrences of
    /// `pattern`, produced lazily with one $`\phi`$ step each.
    pub fn locate_iter(&self, pattern: &[u8]) -> Locations<'_> {
        match self.search(pattern) {
            Some(t) => Locations {
                phi: &self.phi,
                next: Some(t.last_sa),
                remaining: t.range.len(),
            },
            None => Locations {
                phi: &self.phi,
                next: None,
                remaining: 0,
            },
        }
    }

    // Backward search that also tracks SA at the last row of the interval.
    fn search(&self, pattern: &[u8]) -> Option<Toehold> {
        let n = self.len();
        let bwt = self.lf.bwt();
        let mut range = 0..n;
        let mut last_sa = self.samples.sample_at_run_end(bwt.run_count() - 1)?;

        for &c in pattern.iter().rev() {
            let next = self.lf.backward_step(range.clone(), c);
            if next.is_empty() {
                return None;
            }
            if bwt.symbol_at(range.end - 1)? == c {
                last_sa = utils::cyclic_prev(last_sa, n);
            } else {
                // The last c before the interval end closes a run, so its
                // SA value is an end sample.
                let (_, run) = self.lf.ranks().last_occurrence_before(c, range.end)?;
                last_sa = utils::cyclic_prev(self.samples.sample_at_run_end(run)?, n);
            }
            range = next;
        }
        Some(Toehold { range, last_sa })
    }

    /// Returns the text position one suffix-array row above `x`, cyclically.
    #[inline(always)]
    pub fn phi(&self, x: usize) -> Option<usize> {
        self.phi.phi(x)
    }

    /// Returns the text position one suffix-array row below `x`, cyclically.
    #[inline(always)]
    pub fn phi_inverse(&self, x: usize) -> Option<usize> {
        self.phi.phi_inverse(x)
    }

    /// Maps BWT row `i` to the row of the preceding text character.
    #[inline(always)]
    pub fn lf(&self, i: usize) -> Option<usize> {
        self.lf.lf(i)
    }

    /// Recovers the indexed text (without the sentinel) by walking LF from
    /// the sentinel suffix.
    ///
    /// # Complexity
    ///
    /// $`O(n \lg r)`$
    pub fn reconstruct_text(&self) -> Vec<u8> {
        let n = self.len();
        let mut text = Vec::with_capacity(n - 1);
        let mut i = 0;
        for _ in 1..n {
            let Some(c) = self.lf.bwt().symbol_at(i) else {
                break;
            };
            text.push(c);
            match self.lf.lf(i) {
                Some(j) => i = j,
                None => break,
            }
        }
        text.reverse();
        text
    }

    /// Expands the run-length BWT into plain bytes.
    pub fn bwt(&self) -> Vec<u8> {
        let mut bwt = Vec::with_capacity(self.len());
        for run in self.lf.bwt().iter() {
            bwt.extend(std::iter::repeat(run.symbol).take(run.len));
        }
        bwt
    }

    /// Checks the invariants that are too expensive for loading:
    /// LF is a permutation of the rows, $`\phi`$ and $`\phi^{-1}`$ each form
    /// a single cycle over all text positions, and they invert each other.
    ///
    /// # Errors
    ///
    /// An error describing the first violated invariant.
    ///
    /// # Complexity
    ///
    /// $`O(n \lg r)`$ time and $`O(n)`$ bits of working space.
    pub fn verify(&self) -> Result<()> {
        let n = self.len();
        let mut seen = vec![false; n];
        for i in 0..n {
            match self.lf.lf(i) {
                Some(j) if j < n && !seen[j] => seen[j] = true,
                _ => return Err(anyhow!("LF must be a permutation, but fails at row {i}.")),
            }
        }
        if !phi::is_single_cycle(n, |x| self.phi(x)) {
            return Err(anyhow!("phi must form a single cycle over {n} positions."));
        }
        if !phi::is_single_cycle(n, |x| self.phi_inverse(x)) {
            return Err(anyhow!(
                "phi-inverse must form a single cycle over {n} positions."
            ));
        }
        if let Some(x) = (0..n).find(|&x| self.phi(x).and_then(|y| self.phi_inverse(y)) != Some(x))
        {
            return Err(anyhow!(
                "phi-inverse must undo phi, but fails at text position {x}."
            ));
        }
        Ok(())
    }

    /// Reports the size parameters of the index.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            text_len: self.len(),
            num_runs: self.num_runs(),
            alphabet_size: self.lf.ctable().alphabet_size(),
            size_in_bytes: self.size_in_bytes(),
        }
    }

    /// Gets the BWT length $`n`$ (text plus sentinel).
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.lf.len()
    }

    /// Checks if the index is empty, which a valid index never is.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.lf.is_empty()
    }

    /// Gets the number of BWT runs $`r`$.
    #[inline(always)]
    pub fn num_runs(&self) -> usize {
        self.lf.bwt().run_count()
    }

    /// Gets the sentinel symbol.
    #[inline(always)]
    pub const fn sentinel(&self) -> u8 {
        self.sentinel
    }

    /// Gets the LF-mapping engine.
    #[inline(always)]
    pub const fn lf_engine(&self) -> &LfEngine {
        &self.lf
    }

    /// Gets the run-boundary samples.
    #[inline(always)]
    pub const fn samples(&self) -> &SampleTable {
        &self.samples
    }
}

/// Iterator over occurrence positions, created by [`RIndex::locate_iter()`].
pub struct Locations<'a> {
    phi: &'a PhiSupport,
    next: Option<usize>,
    remaining: usize,
}

impl Iterator for Locations<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let x = self.next?;
        self.remaining -= 1;
        self.next = if self.remaining == 0 {
            None
        } else {
            self.phi.phi(x)
        };
        Some(x)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = if self.next.is_some() { self.remaining } else { 0 };
        (rest, Some(rest))
    }
}

/// Size parameters of an index, returned by [`RIndex::stats()`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexStats {
    /// BWT length (text plus sentinel).
    pub text_len: usize,
    /// Number of BWT runs.
    pub num_runs: usize,
    /// Number of distinct symbols, sentinel included.
    pub alphabet_size: usize,
    /// Serialized size in bytes.
    pub size_in_bytes: usize,
}

impl IndexStats {
    /// Returns the average run length $`n/r`$.
    pub fn avg_run_len(&self) -> f64 {
        self.text_len as f64 / self.num_runs.max(1) as f64
    }
}

impl fmt::Display for IndexStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} r={} n/r={:.3} sigma={} size={} bytes ({:.3} bits/symbol)",
            self.text_len,
            self.num_runs,
            self.avg_run_len(),
            self.alphabet_size,
            self.size_in_bytes,
            (self.size_in_bytes * 8) as f64 / self.text_len.max(1) as f64
        )
    }
}

impl Serializable for RIndex {
    /// Writes, in order: the reserved flag (always `false`), the format
    /// version, the cumulative table, the run table, the sample table, and
    /// the phi structure.
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = false.serialize_into(&mut writer)?;
        mem += FORMAT_VERSION.serialize_into(&mut writer)?;
        mem += self.lf.ctable().serialize_into(&mut writer)?;
        mem += self.lf.bwt().serialize_into(&mut writer)?;
        mem += self.samples.serialize_into(&mut writer)?;
        mem += self.phi.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let reserved = bool::deserialize_from(&mut reader).context("failed to read header")?;
        if reserved {
            return Err(anyhow!(
                "the reserved flag must be unset, but the stream sets it."
            ));
        }
        let version = u64::deserialize_from(&mut reader).context("failed to read header")?;
        if version != FORMAT_VERSION {
            return Err(anyhow!(
                "format version must be {FORMAT_VERSION}, but got {version}."
            ));
        }
        let ctable =
            CumulativeTable::deserialize_from(&mut reader).context("failed to load C table")?;
        let bwt = RunLengthBwt::deserialize_from(&mut reader).context("failed to load runs")?;
        let samples =
            SampleTable::deserialize_from(&mut reader).context("failed to load samples")?;
        let phi = PhiSupport::deserialize_from(&mut reader).context("failed to load phi")?;

        if ctable.total() != bwt.len() {
            return Err(anyhow!(
                "cumulative table must total {}, but got {}.",
                bwt.len(),
                ctable.total()
            ));
        }
        let lf = LfEngine::with_table(bwt, ctable)?;
        if samples.num_runs() != lf.bwt().run_count() {
            return Err(anyhow!(
                "samples must cover {} runs, but got {}.",
                lf.bwt().run_count(),
                samples.num_runs()
            ));
        }
        let expected = PhiSupport::new(&samples)?;
        if expected != phi {
            return Err(anyhow!("phi structure must match the sample table."));
        }
        let index = Self::from_parts(lf, samples, phi)?;
        log::debug!("loaded index: {}", index.stats());
        Ok(index)
    }

    fn size_in_bytes(&self) -> usize {
        false.size_in_bytes()
            + FORMAT_VERSION.size_in_bytes()
            + self.lf.ctable().size_in_bytes()
            + self.lf.bwt().size_in_bytes()
            + self.samples.size_in_bytes()
            + self.phi.size_in_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::build_from_text;

    #[test]
    fn test_banana_count_locate() {
        let index = build_from_text(b"banana");
        assert_eq!(index.len(), 7);
        assert_eq!(index.num_runs(), 5);
        assert_eq!(index.sentinel(), b'$');

        assert_eq!(index.count(b"ana").len(), 2);
        let mut occs = index.locate(b"ana");
        occs.sort_unstable();
        assert_eq!(occs, vec![1, 3]);

        assert_eq!(index.count(b"xyz").len(), 0);
        assert!(index.locate(b"xyz").is_empty());
        assert_eq!(index.count(b""), 0..7);
    }

    #[test]
    fn test_empty_pattern_locates_everything() {
        let index = build_from_text(b"banana");
        let mut occs = index.locate(b"");
        occs.sort_unstable();
        assert_eq!(occs, (0..7).collect::<Vec<_>>());
    }

    #[test]
    fn test_locate_iter_len() {
        let index = build_from_text(b"abracadabra");
        assert_eq!(index.locate_iter(b"a").count(), 5);
        assert_eq!(index.locate_iter(b"abra").count(), 2);
        assert_eq!(index.locate_iter(b"q").count(), 0);
    }

    #[test]
    fn test_pattern_with_sentinel() {
        let index = build_from_text(b"banana");
        assert_eq!(index.locate(b"a$"), vec![5]);
        assert_eq!(index.locate(b"$"), vec![6]);
    }

    #[test]
    fn test_reconstruct_and_bwt() {
        let index = build_from_text(b"mississippi");
        assert_eq!(index.reconstruct_text(), b"mississippi".to_vec());
        assert_eq!(index.bwt(), b"ipssm$pissii".to_vec());
        index.verify().unwrap();
    }

    #[test]
    fn test_serialize() {
        let index = build_from_text(b"abracadabra");
        let mut bytes = vec![];
        let size = index.serialize_into(&mut bytes).unwrap();
        let other = RIndex::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(index, other);
        assert_eq!(size, bytes.len());
        assert_eq!(size, index.size_in_bytes());
        assert_eq!(bytes[0], 0);
    }

    #[test]
    fn test_deserialize_reserved_flag() {
        let index = build_from_text(b"abracadabra");
        let mut bytes = vec![];
        index.serialize_into(&mut bytes).unwrap();
        bytes[0] = 1;
        let e = RIndex::deserialize_from(&bytes[..]);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("the reserved flag must be unset, but the stream sets it.".to_string())
        );
    }

    #[test]
    fn test_deserialize_version() {
        let index = build_from_text(b"abracadabra");
        let mut bytes = vec![];
        index.serialize_into(&mut bytes).unwrap();
        bytes[1] = 9;
        let e = RIndex::deserialize_from(&bytes[..]);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("format version must be 1, but got 9.".to_string())
        );
    }

    #[test]
    fn test_deserialize_truncated() {
        let index = build_from_text(b"abracadabra");
        let mut bytes = vec![];
        index.serialize_into(&mut bytes).unwrap();
        for cut in [0, 1, 9, bytes.len() / 2, bytes.len() - 1] {
            assert!(RIndex::deserialize_from(&bytes[..cut]).is_err());
        }
    }

    // Writes the persisted layout of the banana BWT with the given samples and
    // a phi structure built from `phi_samples`.
    fn banana_stream(samples: &SampleTable, phi_samples: &SampleTable) -> Vec<u8> {
        let bwt = RunLengthBwt::from_bwt(b"annb$aa").unwrap();
        let mut bytes = vec![];
        false.serialize_into(&mut bytes).unwrap();
        FORMAT_VERSION.serialize_into(&mut bytes).unwrap();
        CumulativeTable::from_counts(&bwt.symbol_counts())
            .serialize_into(&mut bytes)
            .unwrap();
        bwt.serialize_into(&mut bytes).unwrap();
        samples.serialize_into(&mut bytes).unwrap();
        PhiSupport::new(phi_samples)
            .unwrap()
            .serialize_into(&mut bytes)
            .unwrap();
        bytes
    }

    fn banana_samples() -> SampleTable {
        SampleTable::new(&[6, 5, 1, 0, 4], &[6, 3, 1, 0, 2], 7).unwrap()
    }

    // Start samples of runs 1 and 4 exchanged: distinct and in range, but phi
    // splits into more than one cycle.
    fn swapped_samples() -> SampleTable {
        SampleTable::new(&[6, 4, 1, 0, 5], &[6, 3, 1, 0, 2], 7).unwrap()
    }

    #[test]
    fn test_deserialize_banana_stream() {
        let bytes = banana_stream(&banana_samples(), &banana_samples());
        let index = RIndex::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(index, build_from_text(b"banana"));
    }

    #[test]
    fn test_deserialize_broken_phi_cycle() {
        let bytes = banana_stream(&swapped_samples(), &swapped_samples());
        let e = RIndex::deserialize_from(&bytes[..]);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("phi must form a single cycle over 7 positions.".to_string())
        );
    }

    #[test]
    fn test_deserialize_phi_mismatch() {
        let bytes = banana_stream(&banana_samples(), &swapped_samples());
        let e = RIndex::deserialize_from(&bytes[..]);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("phi structure must match the sample table.".to_string())
        );
    }

    #[test]
    fn test_deserialize_missing_run_samples() {
        let short = SampleTable::new(&[6, 5, 1, 0], &[6, 3, 1, 0], 7).unwrap();
        let bytes = banana_stream(&short, &short);
        let e = RIndex::deserialize_from(&bytes[..]);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("samples must cover 5 runs, but got 4.".to_string())
        );
    }

    #[test]
    fn test_deserialize_sentinel_sample() {
        let shifted = SampleTable::new(&[5, 6, 1, 3, 4], &[5, 0, 1, 3, 2], 7).unwrap();
        let bytes = banana_stream(&shifted, &shifted);
        let e = RIndex::deserialize_from(&bytes[..]);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("the sentinel row must be sampled as text position 0, but got 3.".to_string())
        );
    }

    #[test]
    fn test_locate_iter_size_hint() {
        let index = build_from_text(b"abracadabra");
        let mut it = index.locate_iter(b"a");
        assert_eq!(it.size_hint(), (5, Some(5)));
        it.next();
        assert_eq!(it.size_hint(), (4, Some(4)));
        assert_eq!(index.locate_iter(b"q").size_hint(), (0, Some(0)));
    }

    #[test]
    fn test_stats_display() {
        let index = build_from_text(b"banana");
        let stats = index.stats();
        assert_eq!(stats.text_len, 7);
        assert_eq!(stats.num_runs, 5);
        assert_eq!(stats.alphabet_size, 4);
        assert!(stats.to_string().starts_with("n=7 r=5 n/r=1.400 sigma=4"));
    }
}
