//! Compact vector in which each integer is represented in a fixed number of bits.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};

use anyhow::{anyhow, Result};

use crate::{utils, Serializable};

const WORD_LEN: usize = 64;

/// Compact vector in which each integer is represented in a fixed number of bits.
///
/// # Memory usage
///
/// $`n \lceil \lg u \rceil`$ bits for $`n`$ integers in which a value is in $`[0,u)`$.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rindex::int_vectors::CompactVector;
///
/// // Can store integers within 3 bits each.
/// let mut cv = CompactVector::new(3)?;
///
/// cv.push_int(7)?;
/// cv.push_int(2)?;
///
/// assert_eq!(cv.len(), 2);
/// assert_eq!(cv.get_int(0), Some(7));
/// assert_eq!(cv.get_int(2), None);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct CompactVector {
    words: Vec<u64>,
    len: usize,
    width: usize,
}

impl Default for CompactVector {
    fn default() -> Self {
        Self {
            words: vec![],
            len: 0,
            width: 1,
        }
    }
}

impl CompactVector {
    /// Creates a new empty vector storing integers within `width` bits each.
    ///
    /// # Errors
    ///
    /// An error is returned if `width` is not in `1..=64`.
    pub fn new(width: usize) -> Result<Self> {
        Self::with_capacity(0, width)
    }

    /// Creates a new empty vector storing integers within `width` bits each,
    /// where space for storing at least `capa` integers is reserved.
    ///
    /// # Errors
    ///
    /// An error is returned if `width` is not in `1..=64`.
    pub fn with_capacity(capa: usize, width: usize) -> Result<Self> {
        if !(1..=WORD_LEN).contains(&width) {
            return Err(anyhow!("width must be in 1..=64, but got {width}."));
        }
        Ok(Self {
            words: Vec::with_capacity(utils::ceiled_divide(capa * width, WORD_LEN)),
            len: 0,
            width,
        })
    }

    /// Creates a new vector from a slice of integers `vals`.
    ///
    /// The width of each element automatically fits to the maximum value in `vals`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rindex::int_vectors::CompactVector;
    ///
    /// let cv = CompactVector::from_slice(&[7, 2]);
    /// assert_eq!(cv.len(), 2);
    /// assert_eq!(cv.width(), 3);
    /// assert_eq!(cv.get_int(0), Some(7));
    /// ```
    pub fn from_slice(vals: &[usize]) -> Self {
        let max_int = vals.iter().copied().max().unwrap_or(0);
        Self::from_slice_with_width(vals, utils::needed_bits(max_int as u64))
            .unwrap_or_default()
    }

    /// Creates a new vector from a slice of integers `vals`, each stored in `width` bits.
    ///
    /// # Errors
    ///
    /// An error is returned if
    ///
    ///  - `width` is not in `1..=64`, or
    ///  - a value in `vals` cannot be represented in `width` bits.
    pub fn from_slice_with_width(vals: &[usize], width: usize) -> Result<Self> {
        let mut cv = Self::with_capacity(vals.len(), width)?;
        cv.extend(vals.iter().copied())?;
        Ok(cv)
    }

    /// Returns the `pos`-th integer, or [`None`] if out of bounds.
    ///
    /// # Complexity
    ///
    /// Constant
    #[inline(always)]
    pub fn get_int(&self, pos: usize) -> Option<usize> {
        if self.len <= pos {
            return None;
        }
        let bit = pos * self.width;
        let (block, shift) = (bit / WORD_LEN, bit % WORD_LEN);
        let mask = self.mask();
        let x = if shift + self.width <= WORD_LEN {
            (self.words[block] >> shift) & mask
        } else {
            ((self.words[block] >> shift) | (self.words[block + 1] << (WORD_LEN - shift))) & mask
        };
        Some(x as usize)
    }

    /// Pushes integer `val` at the end.
    ///
    /// # Errors
    ///
    /// An error is returned if `val` cannot be represented in `self.width()` bits.
    ///
    /// # Complexity
    ///
    /// Constant (Amortized)
    pub fn push_int(&mut self, val: usize) -> Result<()> {
        let val = val as u64;
        if self.width != WORD_LEN && val >> self.width != 0 {
            return Err(anyhow!(
                "val must fit in self.width()={} bits, but got {val}.",
                self.width
            ));
        }
        let bit = self.len * self.width;
        let shift = bit % WORD_LEN;
        if shift == 0 {
            self.words.push(val);
        } else {
            let last = self.words.len() - 1;
            self.words[last] |= val << shift;
            if shift + self.width > WORD_LEN {
                self.words.push(val >> (WORD_LEN - shift));
            }
        }
        self.len += 1;
        Ok(())
    }

    /// Appends integers at the end.
    ///
    /// # Errors
    ///
    /// An error is returned if values in `vals` cannot be represented in `self.width()` bits.
    pub fn extend<I>(&mut self, vals: I) -> Result<()>
    where
        I: IntoIterator<Item = usize>,
    {
        for x in vals {
            self.push_int(x)?;
        }
        Ok(())
    }

    /// Returns the number of leading elements for which `pred` holds,
    /// assuming `pred` is true for a prefix of the vector and false afterwards
    /// (the same contract as [`slice::partition_point`]).
    ///
    /// # Complexity
    ///
    /// $`O(\lg n)`$
    ///
    /// # Examples
    ///
    /// ```
    /// use rindex::int_vectors::CompactVector;
    ///
    /// let cv = CompactVector::from_slice(&[1, 3, 3, 7]);
    /// assert_eq!(cv.partition_point(|x| x < 3), 1);
    /// assert_eq!(cv.partition_point(|x| x <= 3), 3);
    /// assert_eq!(cv.partition_point(|x| x < 100), 4);
    /// ```
    pub fn partition_point<P>(&self, mut pred: P) -> usize
    where
        P: FnMut(usize) -> bool,
    {
        let (mut lo, mut hi) = (0, self.len);
        while lo < hi {
            let mi = lo + (hi - lo) / 2;
            if pred(self.get_int(mi).unwrap_or(0)) {
                lo = mi + 1;
            } else {
                hi = mi;
            }
        }
        lo
    }

    /// Creates an iterator for enumerating integers.
    pub const fn iter(&self) -> Iter<'_> {
        Iter::new(self)
    }

    /// Gets the number of integers.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Checks if the vector is empty.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Gets the number of bits to represent an integer.
    #[inline(always)]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[inline(always)]
    const fn mask(&self) -> u64 {
        if self.width < WORD_LEN {
            (1 << self.width) - 1
        } else {
            u64::MAX
        }
    }
}

/// Iterator for enumerating integers, created by [`CompactVector::iter()`].
pub struct Iter<'a> {
    cv: &'a CompactVector,
    pos: usize,
}

impl<'a> Iter<'a> {
    /// Creates a new iterator.
    pub const fn new(cv: &'a CompactVector) -> Self {
        Self { cv, pos: 0 }
    }
}

impl Iterator for Iter<'_> {
    type Item = usize;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        let x = self.cv.get_int(self.pos)?;
        self.pos += 1;
        Some(x)
    }

    #[inline(always)]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.cv.len() - self.pos;
        (rest, Some(rest))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl std::fmt::Debug for CompactVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompactVector")
            .field("ints", &self.iter().collect::<Vec<_>>())
            .field("len", &self.len)
            .field("width", &self.width)
            .finish()
    }
}

impl Serializable for CompactVector {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = self.words.serialize_into(&mut writer)?;
        mem += self.len.serialize_into(&mut writer)?;
        mem += self.width.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let words = Vec::<u64>::deserialize_from(&mut reader)?;
        let len = usize::deserialize_from(&mut reader)?;
        let width = usize::deserialize_from(&mut reader)?;
        if !(1..=WORD_LEN).contains(&width) {
            return Err(anyhow!("width must be in 1..=64, but got {width}."));
        }
        let expected = len
            .checked_mul(width)
            .map(|bits| utils::ceiled_divide(bits, WORD_LEN))
            .ok_or_else(|| anyhow!("len={len} with width={width} overflows."))?;
        if words.len() != expected {
            return Err(anyhow!(
                "words must have {expected} entries for len={len} and width={width}, but got {}.",
                words.len()
            ));
        }
        Ok(Self { words, len, width })
    }

    fn size_in_bytes(&self) -> usize {
        self.words.size_in_bytes() + usize::size_of().unwrap_or(8) * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_oob_0() {
        let e = CompactVector::new(0);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("width must be in 1..=64, but got 0.".to_string())
        );
    }

    #[test]
    fn test_new_oob_65() {
        let e = CompactVector::new(65);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("width must be in 1..=64, but got 65.".to_string())
        );
    }

    #[test]
    fn test_push_int_unfit() {
        let mut cv = CompactVector::new(2).unwrap();
        let e = cv.push_int(4);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("val must fit in self.width()=2 bits, but got 4.".to_string())
        );
    }

    #[test]
    fn test_crossing_words() {
        let vals: Vec<usize> = (0..100).map(|i| (i * 37) % 128).collect();
        let cv = CompactVector::from_slice_with_width(&vals, 7).unwrap();
        for (i, &x) in vals.iter().enumerate() {
            assert_eq!(cv.get_int(i), Some(x));
        }
        assert_eq!(cv.iter().collect::<Vec<_>>(), vals);
    }

    #[test]
    fn test_64b() {
        let mut cv = CompactVector::new(64).unwrap();
        cv.push_int(usize::MAX).unwrap();
        cv.push_int(42).unwrap();
        assert_eq!(cv.get_int(0), Some(usize::MAX));
        assert_eq!(cv.get_int(1), Some(42));
    }

    #[test]
    fn test_empty() {
        let cv = CompactVector::from_slice(&[]);
        assert!(cv.is_empty());
        assert_eq!(cv.width(), 1);
        assert_eq!(cv.get_int(0), None);
        assert_eq!(cv.partition_point(|_| true), 0);
    }

    #[test]
    fn test_serialize() {
        let mut bytes = vec![];
        let cv = CompactVector::from_slice(&[7, 334, 1, 2]);
        let size = cv.serialize_into(&mut bytes).unwrap();
        let other = CompactVector::deserialize_from(&bytes[..]).unwrap();
        assert_eq!(cv, other);
        assert_eq!(size, bytes.len());
        assert_eq!(size, cv.size_in_bytes());
    }

    #[test]
    fn test_deserialize_word_mismatch() {
        let mut bytes = vec![];
        vec![0u64, 0].serialize_into(&mut bytes).unwrap();
        3usize.serialize_into(&mut bytes).unwrap();
        4usize.serialize_into(&mut bytes).unwrap();
        let e = CompactVector::deserialize_from(&bytes[..]);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("words must have 1 entries for len=3 and width=4, but got 2.".to_string())
        );
    }
}
