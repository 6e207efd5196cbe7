//! # `rindex`: Run-length compressed full-text index in Rust
//!
//! `rindex` implements the [r-index](https://doi.org/10.1145/3375890) of Gagie, Navarro and Prezza,
//! a full-text index whose size is proportional to the number $`r`$ of runs in the
//! Burrows-Wheeler transform (BWT) of the text rather than to the text length $`n`$.
//! On highly repetitive collections $`r \ll n`$.
//!
//! ## Queries
//!
//! - [`RIndex::count()`] returns the BWT interval of rows prefixed by a pattern
//!   in $`O(m \lg r)`$ time.
//! - [`RIndex::locate()`] returns every text position where the pattern occurs
//!   in $`O((m + occ) \lg r)`$ time, using the toehold technique and the
//!   $`\phi`$ function over run-boundary samples.
//!
//! ## Data structures
//!
//! - [`RunLengthBwt`](rlbwt::RunLengthBwt)
//!   - BWT stored as one head symbol and one start row per run.
//! - [`RunRankSelect`](run_rank::RunRankSelect)
//!   - Rank and select over the run-length BWT.
//! - [`LfEngine`](lf::LfEngine)
//!   - LF mapping and backward-search steps over a cumulative symbol table.
//! - [`SampleTable`](samples::SampleTable)
//!   - Suffix-array values at the first and last row of every run.
//! - [`PhiSupport`](phi::PhiSupport)
//!   - $`\phi`$ and its inverse over a predecessor structure of samples.
//!
//! ## Construction
//!
//! The suffix array and BWT are not computed here. [`RIndexBuilder`] takes
//! a BWT whose smallest symbol is a unique sentinel, together with the
//! suffix-array samples at run boundaries, as produced by external tools.
//!
//! ## Limitation
//!
//! This library is designed to run on 64-bit machines.
#![deny(missing_docs)]

#[cfg(not(target_pointer_width = "64"))]
compile_error!("`target_pointer_width` must be 64");

pub mod builder;
pub mod index;
pub mod input;
pub mod int_vectors;
pub mod lf;
pub mod phi;
pub mod predecessor;
pub mod rlbwt;
pub mod run_rank;
pub mod samples;
pub mod serial;
pub mod utils;

#[cfg(test)]
mod test_util;

pub use builder::RIndexBuilder;
pub use index::{IndexStats, Locations, RIndex};
pub use input::SaSample;
pub use serial::Serializable;
