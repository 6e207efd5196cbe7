//! Predecessor and successor queries over a sparse set of integers.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};

use anyhow::{anyhow, Result};

use crate::int_vectors::CompactVector;
use crate::{utils, Serializable};

const LINEAR_SCAN_THRESHOLD: usize = 16;

/// Strictly increasing keys from a universe $`[0, u)`$ stored in a flat
/// fixed-width array, supporting predecessor and successor queries.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rindex::predecessor::SparsePredecessor;
///
/// let sp = SparsePredecessor::new(&[0, 3, 7], 10)?;
///
/// assert_eq!(sp.predecessor(4), Some((1, 3)));
/// assert_eq!(sp.predecessor(3), Some((1, 3)));
/// assert_eq!(sp.predecessor(9), Some((2, 7)));
/// assert_eq!(sp.successor(4), Some((2, 7)));
/// assert_eq!(sp.successor(8), None);
/// assert_eq!(sp.predecessor(10), None);
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SparsePredecessor {
    keys: CompactVector,
    universe: usize,
}

impl SparsePredecessor {
    /// Creates the set from strictly increasing `keys` below `universe`.
    ///
    /// # Errors
    ///
    /// An error is returned if `keys` is not strictly increasing or
    /// contains a value no less than `universe`.
    pub fn new(keys: &[usize], universe: usize) -> Result<Self> {
        let width = utils::needed_bits(universe.saturating_sub(1) as u64);
        let keys = CompactVector::from_slice_with_width(keys, width)
            .map_err(|_| anyhow!("keys must be below universe={universe}."))?;
        Self::validate(&keys, universe)?;
        Ok(Self { keys, universe })
    }

    fn validate(keys: &CompactVector, universe: usize) -> Result<()> {
        let mut prev = None;
        for (i, x) in keys.iter().enumerate() {
            if universe <= x {
                return Err(anyhow!(
                    "keys must be below universe={universe}, but key {i} is {x}."
                ));
            }
            if prev.map_or(false, |p| x <= p) {
                return Err(anyhow!(
                    "keys must be strictly increasing, but key {i} is {x}."
                ));
            }
            prev = Some(x);
        }
        Ok(())
    }

    /// Returns the index and value of the largest key `<= x`,
    /// or [`None`] if there is none or `self.universe() <= x`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg r)`$
    pub fn predecessor(&self, x: usize) -> Option<(usize, usize)> {
        if self.universe <= x {
            return None;
        }
        // Number of keys no greater than x.
        let k = self.count_le(x);
        if k == 0 {
            None
        } else {
            Some((k - 1, self.keys.get_int(k - 1)?))
        }
    }

    /// Returns the index and value of the smallest key `>= x`,
    /// or [`None`] if there is none or `self.universe() <= x`.
    ///
    /// # Complexity
    ///
    /// $`O(\lg r)`$
    pub fn successor(&self, x: usize) -> Option<(usize, usize)> {
        if self.universe <= x {
            return None;
        }
        let k = if x == 0 { 0 } else { self.count_le(x - 1) };
        self.keys.get_int(k).map(|key| (k, key))
    }

    // Binary search narrowing to a short window, then a linear scan.
    fn count_le(&self, x: usize) -> usize {
        let (mut lo, mut hi) = (0, self.keys.len());
        while hi - lo > LINEAR_SCAN_THRESHOLD {
            let mi = (lo + hi) / 2;
            match self.keys.get_int(mi) {
                Some(key) if key <= x => lo = mi + 1,
                _ => hi = mi,
            }
        }
        while lo < hi && self.keys.get_int(lo).map_or(false, |key| key <= x) {
            lo += 1;
        }
        lo
    }

    /// Returns the `k`-th smallest key, or [`None`] if out of bounds.
    #[inline(always)]
    pub fn select(&self, k: usize) -> Option<usize> {
        self.keys.get_int(k)
    }

    /// Gets the number of keys.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.keys.len()
    }

    /// Checks if the set is empty.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Gets the universe size.
    #[inline(always)]
    pub const fn universe(&self) -> usize {
        self.universe
    }
}

impl Serializable for SparsePredecessor {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = self.keys.serialize_into(&mut writer)?;
        mem += self.universe.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let keys = CompactVector::deserialize_from(&mut reader)?;
        let universe = usize::deserialize_from(&mut reader)?;
        Self::validate(&keys, universe)?;
        Ok(Self { keys, universe })
    }

    fn size_in_bytes(&self) -> usize {
        self.keys.size_in_bytes() + usize::size_of().unwrap_or(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaChaRng;

    fn gen_random_keys(universe: usize, p: f64, seed: u64) -> Vec<usize> {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        (0..universe).filter(|_| rng.gen_bool(p)).collect()
    }

    #[test]
    fn test_random_against_naive() {
        let universe = 5000;
        let keys = gen_random_keys(universe, 0.05, 114514);
        let sp = SparsePredecessor::new(&keys, universe).unwrap();
        for x in 0..universe {
            let pred = keys.iter().enumerate().rev().find(|&(_, &k)| k <= x);
            assert_eq!(sp.predecessor(x), pred.map(|(i, &k)| (i, k)));
            let succ = keys.iter().enumerate().find(|&(_, &k)| k >= x);
            assert_eq!(sp.successor(x), succ.map(|(i, &k)| (i, k)));
        }
    }

    #[test]
    fn test_not_increasing() {
        let e = SparsePredecessor::new(&[1, 4, 4], 10);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("keys must be strictly increasing, but key 2 is 4.".to_string())
        );
    }

    #[test]
    fn test_out_of_universe() {
        let e = SparsePredecessor::new(&[1, 9], 8);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("keys must be below universe=8.".to_string())
        );
    }

    #[test]
    fn test_serialize() {
        let sp = SparsePredecessor::new(&[0, 2, 9, 31], 40).unwrap();
        let mut bytes = vec![];
        let size = sp.serialize_into(&mut bytes).unwrap();
        let other = SparsePredecessor::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(sp, other);
        assert_eq!(size, bytes.len());
        assert_eq!(size, sp.size_in_bytes());
    }
}
