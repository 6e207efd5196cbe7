use rindex::Serializable;
use rindex_bench::{build_index, gen_repetitive_text};

const SEED_TEXT: u64 = 113;
const BASE_LEN: usize = 1 << 12;
const NUM_COPIES: usize = 63;

fn main() {
    show_memories(b"ACGT");
    show_memories(b"abcdefghijklmnopqrstuvwxyz");
}

fn show_memories(alphabet: &[u8]) {
    println!("[sigma = {}]", alphabet.len());
    for mutations in [1, 10, 100] {
        let text = gen_repetitive_text(BASE_LEN, NUM_COPIES, mutations, alphabet, SEED_TEXT);
        let index = build_index(&text);
        print_memory(&format!("mutations={mutations}"), &index);
    }
}

fn print_memory(name: &str, index: &rindex::RIndex) {
    let stats = index.stats();
    println!(
        "{}: r={} n/r={:.3} {:.3} bits per symbol",
        name,
        stats.num_runs,
        stats.avg_run_len(),
        (index.size_in_bytes() * 8) as f64 / stats.text_len as f64
    );
}
