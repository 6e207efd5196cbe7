//! The $`\phi`$ function and its inverse over run-boundary samples.
//!
//! For a text of length $`n`$ with suffix array $`\textrm{SA}`$,
//! $`\phi(\textrm{SA}[k]) = \textrm{SA}[k-1]`$ and
//! $`\phi^{-1}(\textrm{SA}[k]) = \textrm{SA}[k+1]`$, both taken cyclically over rows.
//!
//! If row $`k`$ is not the first of its BWT run, rows $`k-1`$ and $`k`$ hold the
//! same symbol, so LF maps them to adjacent rows and
//! $`\phi(\textrm{SA}[k] - 1) = \phi(\textrm{SA}[k]) - 1`$.
//! Hence for any text position $`x`$, with $`p`$ the largest run-start sample
//! no greater than $`x`$, $`\phi(x) = \phi(p) + (x - p)`$, and $`\phi(p)`$ is
//! the end sample of the previous run. The inverse is symmetric with run-end
//! samples as keys and start samples of the next run as values.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};

use anyhow::{anyhow, Result};

use crate::int_vectors::CompactVector;
use crate::predecessor::SparsePredecessor;
use crate::samples::SampleTable;
use crate::{utils, Serializable};

/// A piecewise-shift map: keys in a [`SparsePredecessor`] and, aligned with
/// them, the image of each key. Every other position maps to the image of its
/// predecessor key shifted by the same distance.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ShiftMap {
    keys: SparsePredecessor,
    values: CompactVector,
}

impl ShiftMap {
    fn from_pairs(mut pairs: Vec<(usize, usize)>, n: usize) -> Result<Self> {
        pairs.sort_unstable();
        let keys: Vec<usize> = pairs.iter().map(|&(k, _)| k).collect();
        let values: Vec<usize> = pairs.iter().map(|&(_, v)| v).collect();
        let width = utils::needed_bits(n.saturating_sub(1) as u64);
        Ok(Self {
            keys: SparsePredecessor::new(&keys, n)
                .map_err(|e| anyhow!("samples must be distinct text positions: {e}"))?,
            values: CompactVector::from_slice_with_width(&values, width)?,
        })
    }

    /// Evaluates the map at `x`, or returns [`None`] if `x` is out of range
    /// or has no predecessor key.
    #[inline(always)]
    pub fn apply(&self, x: usize) -> Option<usize> {
        let (i, key) = self.keys.predecessor(x)?;
        let y = self.values.get_int(i)? + (x - key);
        (y < self.keys.universe()).then_some(y)
    }

    /// Gets the number of keys.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.keys.len()
    }

    /// Checks if the map has no keys.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Serializable for ShiftMap {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = self.keys.serialize_into(&mut writer)?;
        mem += self.values.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let keys = SparsePredecessor::deserialize_from(&mut reader)?;
        let values = CompactVector::deserialize_from(&mut reader)?;
        if keys.len() != values.len() {
            return Err(anyhow!(
                "keys and values must have the same length, but got {} and {}.",
                keys.len(),
                values.len()
            ));
        }
        if let Some(v) = values.iter().find(|&v| keys.universe() <= v) {
            return Err(anyhow!(
                "values must be below {}, but got {v}.",
                keys.universe()
            ));
        }
        Ok(Self { keys, values })
    }

    fn size_in_bytes(&self) -> usize {
        self.keys.size_in_bytes() + self.values.size_in_bytes()
    }
}

/// $`\phi`$ and $`\phi^{-1}`$ evaluated in $`O(\lg r)`$ time from $`2r`$ samples.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rindex::phi::PhiSupport;
/// use rindex::samples::SampleTable;
///
/// // SA of "banana$" is [6, 5, 3, 1, 0, 4, 2].
/// let st = SampleTable::new(&[6, 5, 1, 0, 4], &[6, 3, 1, 0, 2], 7)?;
/// let phi = PhiSupport::new(&st)?;
///
/// assert_eq!(phi.phi(3), Some(5));
/// assert_eq!(phi.phi(6), Some(2)); // cyclic: SA[0] maps to SA[n-1]
/// assert_eq!(phi.phi_inverse(5), Some(3));
/// assert_eq!(phi.phi(7), None);
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct PhiSupport {
    phi: ShiftMap,
    phi_inv: ShiftMap,
    text_len: usize,
}

impl PhiSupport {
    /// Builds both maps from the run-boundary samples.
    ///
    /// # Errors
    ///
    /// An error is returned if two runs share a start sample or an end sample.
    pub fn new(samples: &SampleTable) -> Result<Self> {
        let n = samples.text_len();
        let r = samples.num_runs();
        let pairs: Vec<(usize, usize)> = samples.iter().collect();

        let mut phi_pairs = Vec::with_capacity(r);
        let mut inv_pairs = Vec::with_capacity(r);
        for j in 0..r {
            let (first, last) = pairs[j];
            let prev_last = pairs[(j + r - 1) % r].1;
            let next_first = pairs[(j + 1) % r].0;
            phi_pairs.push((first, prev_last));
            inv_pairs.push((last, next_first));
        }
        Ok(Self {
            phi: ShiftMap::from_pairs(phi_pairs, n)?,
            phi_inv: ShiftMap::from_pairs(inv_pairs, n)?,
            text_len: n,
        })
    }

    /// Returns the text position one suffix-array row above `x` (cyclically),
    /// or [`None`] if `self.text_len() <= x`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg r)`$
    #[inline(always)]
    pub fn phi(&self, x: usize) -> Option<usize> {
        self.phi.apply(x)
    }

    /// Returns the text position one suffix-array row below `x` (cyclically),
    /// or [`None`] if `self.text_len() <= x`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg r)`$
    #[inline(always)]
    pub fn phi_inverse(&self, x: usize) -> Option<usize> {
        self.phi_inv.apply(x)
    }

    /// Gets the text length.
    #[inline(always)]
    pub const fn text_len(&self) -> usize {
        self.text_len
    }

    /// Gets the number of samples per direction.
    #[inline(always)]
    pub const fn num_samples(&self) -> usize {
        self.phi.len()
    }
}

impl Serializable for PhiSupport {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = self.phi.serialize_into(&mut writer)?;
        mem += self.phi_inv.serialize_into(&mut writer)?;
        mem += self.text_len.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let phi = ShiftMap::deserialize_from(&mut reader)?;
        let phi_inv = ShiftMap::deserialize_from(&mut reader)?;
        let text_len = usize::deserialize_from(&mut reader)?;
        if phi.len() != phi_inv.len()
            || phi.keys.universe() != text_len
            || phi_inv.keys.universe() != text_len
        {
            return Err(anyhow!(
                "phi and phi-inverse must have equal sizes over text_len={text_len}."
            ));
        }
        Ok(Self {
            phi,
            phi_inv,
            text_len,
        })
    }

    fn size_in_bytes(&self) -> usize {
        self.phi.size_in_bytes() + self.phi_inv.size_in_bytes() + usize::size_of().unwrap_or(8)
    }
}

/// Checks that iterating `f` from position 0 visits each of `0..n` exactly
/// once and returns to 0 after exactly `n` steps.
///
/// A wrong offset in $`\phi`$ either revisits a position early or leaves some
/// unvisited; either way locate would duplicate or drop occurrences.
///
/// # Examples
///
/// ```
/// use rindex::phi::is_single_cycle;
///
/// assert!(is_single_cycle(5, |x| Some((x + 2) % 5)));
/// assert!(!is_single_cycle(4, |x| Some((x + 2) % 4)));
/// assert!(!is_single_cycle(3, |_| None));
/// ```
pub fn is_single_cycle<F>(n: usize, f: F) -> bool
where
    F: Fn(usize) -> Option<usize>,
{
    if n == 0 {
        return false;
    }
    let mut visited = vec![0u64; utils::ceiled_divide(n, 64)];
    let mut x = 0;
    for _ in 0..n {
        if n <= x || (visited[x / 64] >> (x % 64)) & 1 != 0 {
            return false;
        }
        visited[x / 64] |= 1 << (x % 64);
        x = match f(x) {
            Some(y) => y,
            None => return false,
        };
    }
    x == 0
}
