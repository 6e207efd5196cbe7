//! Input generation shared by the benchmarks.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;
use suffix::SuffixTable;

use rindex::{RIndex, RIndexBuilder, SaSample};

pub const SENTINEL: u8 = 0;

/// A random base string over `alphabet` followed by `copies` copies of it,
/// each with `mutations` random substitutions.
pub fn gen_repetitive_text(
    base_len: usize,
    copies: usize,
    mutations: usize,
    alphabet: &[u8],
    seed: u64,
) -> Vec<u8> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    let base: Vec<u8> = (0..base_len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect();
    let mut text = base.clone();
    for _ in 0..copies {
        let mut copy = base.clone();
        for _ in 0..mutations {
            let i = rng.gen_range(0..copy.len());
            copy[i] = alphabet[rng.gen_range(0..alphabet.len())];
        }
        text.extend_from_slice(&copy);
    }
    text
}

/// Substrings of `text` of length `len` at random positions.
pub fn gen_patterns(text: &[u8], num: usize, len: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    (0..num)
        .map(|_| {
            let start = rng.gen_range(0..=text.len() - len);
            text[start..start + len].to_vec()
        })
        .collect()
}

/// Builds an index of `text`, which must be ASCII without [`SENTINEL`].
pub fn build_index(text: &[u8]) -> RIndex {
    let mut text = text.to_vec();
    text.push(SENTINEL);
    let n = text.len();
    let table = SuffixTable::new(std::str::from_utf8(&text).unwrap());
    let sa: Vec<usize> = table.table().iter().map(|&s| s as usize).collect();
    let bwt: Vec<u8> = sa.iter().map(|&s| text[(s + n - 1) % n]).collect();

    let mut starts = vec![];
    let mut ends = vec![];
    for i in 0..n {
        if i == 0 || bwt[i - 1] != bwt[i] {
            starts.push(SaSample { pos: i, sa: sa[i] });
        }
        if i + 1 == n || bwt[i + 1] != bwt[i] {
            ends.push(SaSample { pos: i, sa: sa[i] });
        }
    }
    RIndexBuilder::new(&bwt)
        .and_then(|b| b.run_starts(starts))
        .and_then(|b| b.run_ends(ends))
        .and_then(|b| b.build())
        .unwrap()
}
