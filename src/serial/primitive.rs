//! Serialization of primitive integers and flags in little-endian order.
#![cfg(target_pointer_width = "64")]

use std::io::{Read, Write};

use anyhow::{anyhow, Result};

use super::Serializable;

macro_rules! int_def {
    ($int:ident) => {
        impl Serializable for $int {
            fn serialize_into<W: Write>(&self, mut writer: W) -> Result<usize> {
                writer.write_all(&self.to_le_bytes())?;
                Ok(std::mem::size_of::<Self>())
            }

            fn deserialize_from<R: Read>(mut reader: R) -> Result<Self> {
                let mut buf = [0; std::mem::size_of::<Self>()];
                reader.read_exact(&mut buf).map_err(|e| {
                    anyhow!(
                        "unexpected end of stream while reading {}: {e}",
                        stringify!($int)
                    )
                })?;
                Ok(Self::from_le_bytes(buf))
            }

            fn size_in_bytes(&self) -> usize {
                std::mem::size_of::<Self>()
            }

            fn size_of() -> Option<usize> {
                Some(std::mem::size_of::<Self>())
            }
        }
    };
}

int_def!(u8);
int_def!(u32);
int_def!(u64);
int_def!(usize);

impl Serializable for bool {
    fn serialize_into<W: Write>(&self, writer: W) -> Result<usize> {
        u8::from(*self).serialize_into(writer)
    }

    /// Only `0` and `1` are accepted; any other byte marks a corrupted stream.
    fn deserialize_from<R: Read>(reader: R) -> Result<Self> {
        match u8::deserialize_from(reader)? {
            0 => Ok(false),
            1 => Ok(true),
            x => Err(anyhow!("bool must be encoded as 0 or 1, but got {x}.")),
        }
    }

    fn size_in_bytes(&self) -> usize {
        std::mem::size_of::<u8>()
    }

    fn size_of() -> Option<usize> {
        Some(std::mem::size_of::<u8>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_invalid() {
        let e = bool::deserialize_from(&[2u8][..]);
        assert_eq!(
            e.err().map(|x| x.to_string()),
            Some("bool must be encoded as 0 or 1, but got 2.".to_string())
        );
    }

    #[test]
    fn test_usize_truncated() {
        let e = usize::deserialize_from(&[1u8, 2, 3][..]);
        assert!(e
            .err()
            .map(|x| x.to_string())
            .unwrap()
            .starts_with("unexpected end of stream while reading usize"));
    }
}
