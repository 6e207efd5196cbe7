//! Utilities for serialization.
#![cfg(target_pointer_width = "64")]

pub mod primitive;

use std::io::{Read, Write};

use anyhow::{anyhow, Result};

/// Upper bound on the number of elements reserved up front when reading a
/// length-prefixed sequence, so that a corrupted length cannot trigger a huge
/// allocation before the stream runs dry.
const MAX_PREALLOC: usize = 1 << 20;

/// Trait to serialize/deserialize data structures.
///
/// Implementations validate what they read: a stream that is truncated or that
/// violates the invariants of the structure is rejected with an error.
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rindex::{int_vectors::CompactVector, Serializable};
///
/// let cv = CompactVector::from_slice(&[4, 0, 9]);
///
/// let mut bytes = vec![];
/// let size = cv.serialize_into(&mut bytes)?;
/// let other = CompactVector::deserialize_from(&bytes[..])?;
///
/// assert_eq!(cv, other);
/// assert_eq!(size, bytes.len());
/// assert_eq!(size, cv.size_in_bytes());
/// # Ok(())
/// # }
/// ```
pub trait Serializable: Sized {
    /// Serializes the data structure into the writer,
    /// returning the number of serialized bytes.
    ///
    /// # Arguments
    ///
    /// - `writer`: [`Write`] variable.
    fn serialize_into<W: Write>(&self, writer: W) -> Result<usize>;

    /// Deserializes the data structure from the reader.
    ///
    /// # Arguments
    ///
    /// - `reader`: [`Read`] variable.
    fn deserialize_from<R: Read>(reader: R) -> Result<Self>;

    /// Returns the number of bytes to serialize the data structure.
    fn size_in_bytes(&self) -> usize;

    /// Returns the size of a primitive type in bytes (if the type is so).
    fn size_of() -> Option<usize> {
        None
    }
}

impl<S> Serializable for Vec<S>
where
    S: Serializable,
{
    fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
        let mut mem = self.len().serialize_into(&mut writer)?;
        for x in self {
            mem += x.serialize_into(&mut writer)?;
        }
        Ok(mem)
    }

    fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
        let len = usize::deserialize_from(&mut reader)?;
        let mut vec = Self::with_capacity(len.min(MAX_PREALLOC));
        for i in 0..len {
            let x = S::deserialize_from(&mut reader).map_err(|e| {
                anyhow!("sequence of declared length {len} is truncated at element {i}: {e}")
            })?;
            vec.push(x);
        }
        Ok(vec)
    }

    fn size_in_bytes(&self) -> usize {
        let len_bytes = usize::size_of().unwrap_or(8);
        S::size_of().map_or_else(
            || len_bytes + self.iter().fold(0, |acc, x| acc + x.size_in_bytes()),
            |m| len_bytes + m * self.len(),
        )
    }
}
