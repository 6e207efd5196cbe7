//! Readers for the inputs produced by the external BWT construction tool.
#![cfg(target_pointer_width = "64")]

use std::io::{ErrorKind, Read};

use anyhow::{anyhow, Result};
use byteorder::{LittleEndian, ReadBytesExt};

/// Default number of bytes per integer in sample files.
pub const DEFAULT_INT_BYTES: usize = 5;

/// A suffix-array value recorded at a BWT row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaSample {
    /// BWT row (a run start or a run end).
    pub pos: usize,
    /// Text position of the suffix at that row.
    pub sa: usize,
}

impl From<(usize, usize)> for SaSample {
    fn from((pos, sa): (usize, usize)) -> Self {
        Self { pos, sa }
    }
}

/// Reads the whole BWT from `reader`.
///
/// # Errors
///
/// An error is returned if reading fails or the stream is empty.
pub fn read_bwt<R: Read>(mut reader: R) -> Result<Vec<u8>> {
    let mut bwt = vec![];
    reader.read_to_end(&mut bwt)?;
    if bwt.is_empty() {
        return Err(anyhow!("bwt must not be empty."));
    }
    Ok(bwt)
}

/// Iterator over [`SaSample`] records stored as pairs of little-endian
/// integers of a fixed byte width, `(pos, sa)`.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rindex::input::{SaSample, SampleReader};
///
/// let bytes = [3, 0, 0, 1, 0, 0];
/// let mut it = SampleReader::new(&bytes[..], 3)?;
/// assert_eq!(it.next().transpose()?, Some(SaSample { pos: 3, sa: 1 }));
/// assert_eq!(it.next().transpose()?, None);
/// # Ok(())
/// # }
/// ```
pub struct SampleReader<R> {
    reader: R,
    int_bytes: usize,
    count: usize,
    done: bool,
}

impl<R: Read> SampleReader<R> {
    /// Creates a reader of records whose integers take `int_bytes` bytes each.
    ///
    /// # Errors
    ///
    /// An error is returned if `int_bytes` is not in `1..=8`.
    pub fn new(reader: R, int_bytes: usize) -> Result<Self> {
        if !(1..=8).contains(&int_bytes) {
            return Err(anyhow!("int_bytes must be in 1..=8, but got {int_bytes}."));
        }
        Ok(Self {
            reader,
            int_bytes,
            count: 0,
            done: false,
        })
    }

    fn read_record(&mut self) -> Result<Option<SaSample>> {
        let mut first = [0u8; 1];
        loop {
            match self.reader.read(&mut first) {
                Ok(0) => return Ok(None),
                Ok(_) => break,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        let truncated = |e: std::io::Error, count: usize| {
            anyhow!("sample record {count} is truncated: {e}")
        };
        let rest = if self.int_bytes > 1 {
            self.reader
                .read_uint::<LittleEndian>(self.int_bytes - 1)
                .map_err(|e| truncated(e, self.count))?
        } else {
            0
        };
        let pos = u64::from(first[0]) | (rest << 8);
        let sa = self
            .reader
            .read_uint::<LittleEndian>(self.int_bytes)
            .map_err(|e| truncated(e, self.count))?;
        Ok(Some(SaSample {
            pos: pos as usize,
            sa: sa as usize,
        }))
    }
}

impl<R: Read> Iterator for SampleReader<R> {
    type Item = Result<SaSample>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_record() {
            Ok(Some(s)) => {
                self.count += 1;
                Some(Ok(s))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
