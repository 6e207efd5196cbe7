use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use rindex::{RIndex, RIndexBuilder, SaSample};

pub const SENTINEL: u8 = b'$';

pub fn naive_sa(text: &[u8]) -> Vec<usize> {
    let mut sa: Vec<usize> = (0..text.len()).collect();
    sa.sort_by(|&a, &b| text[a..].cmp(&text[b..]));
    sa
}

/// `text` with the sentinel appended, its suffix array and its BWT.
pub fn terminated(text: &[u8]) -> (Vec<u8>, Vec<usize>, Vec<u8>) {
    let mut text = text.to_vec();
    text.push(SENTINEL);
    let n = text.len();
    let sa = naive_sa(&text);
    let bwt = sa.iter().map(|&s| text[(s + n - 1) % n]).collect();
    (text, sa, bwt)
}

pub fn run_samples(bwt: &[u8], sa: &[usize]) -> (Vec<SaSample>, Vec<SaSample>) {
    let n = bwt.len();
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
    (starts, ends)
}

pub fn build(text: &[u8]) -> RIndex {
    let (_, sa, bwt) = terminated(text);
    let (starts, ends) = run_samples(&bwt, &sa);
    RIndexBuilder::new(&bwt)
        .unwrap()
        .run_starts(starts)
        .unwrap()
        .run_ends(ends)
        .unwrap()
        .build()
        .unwrap()
}

/// A random base string followed by copies of it with a few point mutations.
pub fn gen_repetitive_text(base_len: usize, copies: usize, alphabet: &[u8], seed: u64) -> Vec<u8> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    let base: Vec<u8> = (0..base_len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect();
    let mut text = base.clone();
    for _ in 0..copies {
        let mut copy = base.clone();
        for _ in 0..3 {
            let i = rng.gen_range(0..copy.len());
            copy[i] = alphabet[rng.gen_range(0..alphabet.len())];
        }
        text.extend_from_slice(&copy);
    }
    text
}

pub fn gen_patterns(text: &[u8], num: usize, max_len: usize, seed: u64) -> Vec<Vec<u8>> {
    let mut rng = ChaChaRng::seed_from_u64(seed);
    (0..num)
        .map(|_| {
            let len = rng.gen_range(1..=max_len);
            let start = rng.gen_range(0..=text.len() - len);
            text[start..start + len].to_vec()
        })
        .collect()
}

pub fn naive_occurrences(text: &[u8], pattern: &[u8]) -> Vec<usize> {
    if pattern.len() > text.len() {
        return vec![];
    }
    (0..=text.len() - pattern.len())
        .filter(|&i| &text[i..i + pattern.len()] == pattern)
        .collect()
}
