//! Builder of [`RIndex`] from a precomputed BWT and run-boundary SA samples.
#![cfg(target_pointer_width = "64")]

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};

use crate::index::RIndex;
use crate::input::{self, SaSample, SampleReader, DEFAULT_INT_BYTES};
use crate::lf::LfEngine;
use crate::phi::PhiSupport;
use crate::rlbwt::RunLengthBwt;
use crate::samples::SampleTable;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Boundary {
    Start,
    End,
}

impl Boundary {
    const fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

/// Builder of [`RIndex`].
///
/// The BWT must end the text with a unique sentinel that is its smallest
/// symbol. Samples give, for every run in BWT order, the suffix-array value at
/// its first row ([`Self::run_starts()`]) and at its last row ([`Self::run_ends()`]).
///
/// # Examples
///
/// ```
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use rindex::{RIndexBuilder, SaSample};
///
/// // "abracadabra$"
/// let bwt = b"ard$rcaaaabb";
/// let sa = [11, 10, 7, 0, 3, 5, 8, 1, 4, 6, 9, 2];
///
/// let mut starts = vec![];
/// let mut ends = vec![];
/// for i in 0..bwt.len() {
///     if i == 0 || bwt[i - 1] != bwt[i] {
///         starts.push(SaSample { pos: i, sa: sa[i] });
///     }
///     if i + 1 == bwt.len() || bwt[i + 1] != bwt[i] {
///         ends.push(SaSample { pos: i, sa: sa[i] });
///     }
/// }
///
/// let index = RIndexBuilder::new(bwt)?
///     .run_starts(starts)?
///     .run_ends(ends)?
///     .build()?;
///
/// assert_eq!(index.num_runs(), 8);
/// assert_eq!(index.num_occurrences(b"abra"), 2);
/// # Ok(())
/// # }
/// ```
pub struct RIndexBuilder {
    bwt: RunLengthBwt,
    first: Option<Vec<usize>>,
    last: Option<Vec<usize>>,
    int_bytes: usize,
}

impl RIndexBuilder {
    /// Creates a builder from a raw BWT.
    ///
    /// # Errors
    ///
    /// An error is returned if `bwt` is empty or its smallest symbol does not
    /// occur exactly once.
    pub fn new(bwt: &[u8]) -> Result<Self> {
        let bwt = RunLengthBwt::from_bwt(bwt)?;
        let counts = bwt.symbol_counts();
        if let Some(sentinel) = (0..256).find(|&c| counts[c] != 0) {
            if counts[sentinel] != 1 {
                return Err(anyhow!(
                    "the smallest symbol {sentinel} must occur exactly once as the sentinel, but occurs {} times.",
                    counts[sentinel]
                ));
            }
        }
        Ok(Self {
            bwt,
            first: None,
            last: None,
            int_bytes: DEFAULT_INT_BYTES,
        })
    }

    /// Creates a builder reading the raw BWT from `reader`.
    ///
    /// # Errors
    ///
    /// See [`Self::new()`].
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::new(&input::read_bwt(reader)?)
    }

    /// Creates a builder from the files `<prefix>.bwt`, `<prefix>.ssa`
    /// (samples at run starts) and `<prefix>.esa` (samples at run ends),
    /// with sample integers of `int_bytes` bytes.
    ///
    /// # Errors
    ///
    /// An error is returned if a file cannot be read or its content is invalid.
    pub fn from_prefix<P: AsRef<Path>>(prefix: P, int_bytes: usize) -> Result<Self> {
        let prefix = prefix.as_ref();
        let path = |ext: &str| -> PathBuf {
            let mut p = prefix.as_os_str().to_owned();
            p.push(ext);
            PathBuf::from(p)
        };
        let open = |p: &Path| -> Result<BufReader<File>> {
            Ok(BufReader::new(
                File::open(p).with_context(|| format!("failed to open {}", p.display()))?,
            ))
        };

        let (bwt_path, ssa_path, esa_path) = (path(".bwt"), path(".ssa"), path(".esa"));
        log::info!("reading BWT from {}", bwt_path.display());
        let builder = Self::from_reader(open(&bwt_path)?)
            .with_context(|| format!("invalid BWT in {}", bwt_path.display()))?
            .sample_int_bytes(int_bytes)?;

        log::info!("reading run samples from {} and {}", ssa_path.display(), esa_path.display());
        builder
            .read_run_starts(open(&ssa_path)?)
            .with_context(|| format!("invalid samples in {}", ssa_path.display()))?
            .read_run_ends(open(&esa_path)?)
            .with_context(|| format!("invalid samples in {}", esa_path.display()))
    }

    /// Sets the number of bytes per integer used by [`Self::read_run_starts()`]
    /// and [`Self::read_run_ends()`] (default: 5).
    ///
    /// # Errors
    ///
    /// An error is returned if `int_bytes` is not in `1..=8`.
    pub fn sample_int_bytes(mut self, int_bytes: usize) -> Result<Self> {
        if !(1..=8).contains(&int_bytes) {
            return Err(anyhow!("int_bytes must be in 1..=8, but got {int_bytes}."));
        }
        self.int_bytes = int_bytes;
        Ok(self)
    }

    /// Sets the samples at the first row of every run, in run order.
    ///
    /// # Errors
    ///
    /// An error is returned if
    ///
    ///  - the number of samples differs from the number of runs,
    ///  - a sample is not at the first row of its run, or
    ///  - a sample is not a text position.
    pub fn run_starts<I>(mut self, samples: I) -> Result<Self>
    where
        I: IntoIterator<Item = SaSample>,
    {
        self.first = Some(self.collect(samples.into_iter().map(Ok), Boundary::Start)?);
        Ok(self)
    }

    /// Sets the samples at the last row of every run, in run order.
    ///
    /// # Errors
    ///
    /// See [`Self::run_starts()`].
    pub fn run_ends<I>(mut self, samples: I) -> Result<Self>
    where
        I: IntoIterator<Item = SaSample>,
    {
        self.last = Some(self.collect(samples.into_iter().map(Ok), Boundary::End)?);
        Ok(self)
    }

    /// Reads the samples at run starts from a stream of fixed-width records.
    ///
    /// # Errors
    ///
    /// An error is returned if the stream is malformed, or see [`Self::run_starts()`].
    pub fn read_run_starts<R: Read>(mut self, reader: R) -> Result<Self> {
        let reader = SampleReader::new(reader, self.int_bytes)?;
        self.first = Some(self.collect(reader, Boundary::Start)?);
        Ok(self)
    }

    /// Reads the samples at run ends from a stream of fixed-width records.
    ///
    /// # Errors
    ///
    /// An error is returned if the stream is malformed, or see [`Self::run_ends()`].
    pub fn read_run_ends<R: Read>(mut self, reader: R) -> Result<Self> {
        let reader = SampleReader::new(reader, self.int_bytes)?;
        self.last = Some(self.collect(reader, Boundary::End)?);
        Ok(self)
    }

    fn collect<I>(&self, samples: I, boundary: Boundary) -> Result<Vec<usize>>
    where
        I: IntoIterator<Item = Result<SaSample>>,
    {
        let n = self.bwt.len();
        let r = self.bwt.run_count();
        let mut values = Vec::with_capacity(r);
        for (j, sample) in samples.into_iter().enumerate() {
            let sample = sample?;
            let run = self.bwt.run(j).ok_or_else(|| {
                anyhow!(
                    "run {} samples must number {r}, but got more.",
                    boundary.name()
                )
            })?;
            let expected = match boundary {
                Boundary::Start => run.start,
                Boundary::End => run.end(),
            };
            if sample.pos != expected {
                return Err(anyhow!(
                    "run {} sample {j} must be at row {expected}, but got {}.",
                    boundary.name(),
                    sample.pos
                ));
            }
            if n <= sample.sa {
                return Err(anyhow!(
                    "run {} sample {j} must be below {n}, but got {}.",
                    boundary.name(),
                    sample.sa
                ));
            }
            values.push(sample.sa);
        }
        if values.len() != r {
            return Err(anyhow!(
                "run {} samples must number {r}, but got {}.",
                boundary.name(),
                values.len()
            ));
        }
        Ok(values)
    }

    /// Builds the index.
    ///
    /// # Errors
    ///
    /// An error is returned if
    ///
    ///  - either sample list has not been set,
    ///  - a run of length one has different start and end samples,
    ///  - the sentinel row is not sampled as text position 0,
    ///  - two runs share a start sample or an end sample, or
    ///  - the samples do not make $`\phi`$ a single cycle over the text.
    pub fn build(self) -> Result<RIndex> {
        let first = self
            .first
            .ok_or_else(|| anyhow!("run start samples must be set before build."))?;
        let last = self
            .last
            .ok_or_else(|| anyhow!("run end samples must be set before build."))?;
        let n = self.bwt.len();

        let samples = SampleTable::new(&first, &last, n)?;
        let phi = PhiSupport::new(&samples)?;
        let lf = LfEngine::new(self.bwt)?;
        let index = RIndex::from_parts(lf, samples, phi)?;
        log::info!("built index: {}", index.stats());
        Ok(index)
    }
}
