//! Pattern files: a header line `# number=N length=L ...` followed by
//! `N` raw patterns of `L` bytes each, without separators.

use std::io::{BufRead, Read};

use anyhow::{anyhow, Context, Result};

// Caps allocations sized by header fields before the data backs them.
const MAX_PREALLOC: usize = 1 << 16;

fn header_field(header: &str, key: &str) -> Result<usize> {
    let value = header
        .split_whitespace()
        .find_map(|tok| tok.strip_prefix(key)?.strip_prefix('='))
        .ok_or_else(|| anyhow!("pattern header must contain {key}=<int>, but got {header:?}."))?;
    value
        .parse()
        .with_context(|| format!("invalid {key} in pattern header: {value:?}"))
}

/// Reads all patterns from `reader`.
pub fn read_patterns<R: BufRead>(mut reader: R) -> Result<Vec<Vec<u8>>> {
    let mut header = String::new();
    reader
        .read_line(&mut header)
        .context("failed to read pattern header")?;
    let number = header_field(&header, "number")?;
    let length = header_field(&header, "length")?;
    log::info!("searching for {number} patterns of length {length} each");

    let mut patterns = Vec::with_capacity(number.min(MAX_PREALLOC));
    for i in 0..number {
        let mut pattern = Vec::with_capacity(length.min(MAX_PREALLOC));
        reader
            .by_ref()
            .take(length as u64)
            .read_to_end(&mut pattern)
            .with_context(|| format!("failed to read pattern {i} of {number}"))?;
        if pattern.len() != length {
            return Err(anyhow!("pattern {i} of {number} is truncated"));
        }
        patterns.push(pattern);
    }
    Ok(patterns)
}
