use crate::index::RIndex;
use crate::input::SaSample;
use crate::RIndexBuilder;

/// Suffix array of `text` by plain sorting.
pub fn naive_sa(text: &[u8]) -> Vec<usize> {
    let mut sa: Vec<usize> = (0..text.len()).collect();
    sa.sort_by(|&a, &b| text[a..].cmp(&text[b..]));
    sa
}

/// BWT of `text` with the samples at the first and last row of every run.
pub fn bwt_and_samples(text: &[u8], sa: &[usize]) -> (Vec<u8>, Vec<SaSample>, Vec<SaSample>) {
    let n = text.len();
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
    (bwt, starts, ends)
}

/// Builds an index of `text` followed by a `$` sentinel.
pub fn build_from_text(text: &[u8]) -> RIndex {
    let mut text = text.to_vec();
    text.push(b'$');
    let sa = naive_sa(&text);
    let (bwt, starts, ends) = bwt_and_samples(&text, &sa);
    RIndexBuilder::new(&bwt)
        .unwrap()
        .run_starts(starts)
        .unwrap()
        .run_ends(ends)
        .unwrap()
        .build()
        .unwrap()
}
