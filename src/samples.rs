//! Suffix-array values sampled at run boundaries.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};

use anyhow::{anyhow, Result};

use crate::int_vectors::CompactVector;
use crate::{utils, Serializable};

/// Text positions at the first and last BWT row of every run.
///
/// These are the only suffix-array values the index stores. Each takes
/// $`\lceil \lg n \rceil`$ bits, so the table takes $`2r \lceil \lg n \rceil`$ bits.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rindex::samples::SampleTable;
///
/// // SA of "banana$" is [6, 5, 3, 1, 0, 4, 2] and its BWT runs are
/// // [0,0], [1,2], [3,3], [4,4], [5,6].
/// let st = SampleTable::new(&[6, 5, 1, 0, 4], &[6, 3, 1, 0, 2], 7)?;
///
/// assert_eq!(st.num_runs(), 5);
/// assert_eq!(st.sample_at_run_start(1), Some(5));
/// assert_eq!(st.sample_at_run_end(1), Some(3));
/// assert_eq!(st.sample_at_run_end(5), None);
/// # Ok(())
/// # }
/// ```
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct SampleTable {
    first: CompactVector,
    last: CompactVector,
    text_len: usize,
}

impl SampleTable {
    /// Creates the table from per-run samples at run starts and run ends.
    ///
    /// # Errors
    ///
    /// An error is returned if
    ///
    ///  - `first` and `last` differ in length or are empty, or
    ///  - a sample is not a text position below `text_len`.
    pub fn new(first: &[usize], last: &[usize], text_len: usize) -> Result<Self> {
        if first.is_empty() || first.len() != last.len() {
            return Err(anyhow!(
                "first and last samples must have the same positive length, but got {} and {}.",
                first.len(),
                last.len()
            ));
        }
        if let Some(&x) = first.iter().chain(last).find(|&&x| text_len <= x) {
            return Err(anyhow!(
                "samples must be text positions below {text_len}, but got {x}."
            ));
        }
        let width = utils::needed_bits(text_len.saturating_sub(1) as u64);
        Ok(Self {
            first: CompactVector::from_slice_with_width(first, width)?,
            last: CompactVector::from_slice_with_width(last, width)?,
            text_len,
        })
    }

    /// Returns the text position at the first row of run `run`,
    /// or [`None`] if out of bounds.
    #[inline(always)]
    pub fn sample_at_run_start(&self, run: usize) -> Option<usize> {
        self.first.get_int(run)
    }

    /// Returns the text position at the last row of run `run`,
    /// or [`None`] if out of bounds.
    #[inline(always)]
    pub fn sample_at_run_end(&self, run: usize) -> Option<usize> {
        self.last.get_int(run)
    }

    /// Gets the number of runs sampled.
    #[inline(always)]
    pub const fn num_runs(&self) -> usize {
        self.first.len()
    }

    /// Gets the text length the samples refer to.
    #[inline(always)]
    pub const fn text_len(&self) -> usize {
        self.text_len
    }

    /// Creates an iterator over `(first, last)` sample pairs in run order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.first.iter().zip(self.last.iter())
    }
}

impl Serializable for SampleTable {
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = self.first.serialize_into(&mut writer)?;
        mem += self.last.serialize_into(&mut writer)?;
        mem += self.text_len.serialize_into(&mut writer)?;
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let first = CompactVector::deserialize_from(&mut reader)?;
        let last = CompactVector::deserialize_from(&mut reader)?;
        let text_len = usize::deserialize_from(&mut reader)?;
        if first.is_empty() || first.len() != last.len() {
            return Err(anyhow!(
                "first and last samples must have the same positive length, but got {} and {}.",
                first.len(),
                last.len()
            ));
        }
        if let Some(x) = first.iter().chain(last.iter()).find(|&x| text_len <= x) {
            return Err(anyhow!(
                "samples must be text positions below {text_len}, but got {x}."
            ));
        }
        Ok(Self {
            first,
            last,
            text_len,
        })
    }

    fn size_in_bytes(&self) -> usize {
        self.first.size_in_bytes() + self.last.size_in_bytes() + usize::size_of().unwrap_or(8)
    }
}
