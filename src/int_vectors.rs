//! Top module for integer vectors.
//!
//! Every per-run table of the index (run starts, samples, predecessor keys and
//! values) is a flat array of fixed-width integers addressed by index.
//! [`CompactVector`] packs each integer in $`\lceil \lg u \rceil`$ bits,
//! where $`u`$ is the maximum value plus one, so a table of $`r`$ text
//! positions takes $`r \lceil \lg n \rceil`$ bits instead of $`64r`$.
pub mod compact_vector;

pub use compact_vector::CompactVector;
