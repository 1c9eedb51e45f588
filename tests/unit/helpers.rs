//! Shared test utilities: scoring-model builders, deterministic sequence
//! generation and a thread budget that always refuses.

use seqalign::{ScoringModel, ThreadBudget};

/// Hook up the `log` facade for the test binary; `RUST_LOG=debug` then
/// shows scheduler admission and partition decisions. Safe to call from
/// every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Scoring model with explicit weights and a freshly built IUPAC table.
pub fn model(match_w: i32, mismatch_w: i32, gap_open: i32, gap_extend: i32) -> ScoringModel {
    let mut m = ScoringModel::new();
    m.set_match_weight(match_w);
    m.set_mismatch_weight(mismatch_w);
    m.set_gap_open(gap_open);
    m.set_gap_extend(gap_extend);
    m.rebuild_table();
    m
}

/// Deterministic pseudo-random nucleotide sequence (xorshift).
pub fn random_seq(mut seed: u64, len: usize) -> Vec<u8> {
    const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];
    (0..len)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            BASES[(seed % 4) as usize]
        })
        .collect()
}

/// Copy of `seq` with a few point mutations and one short deletion.
pub fn mutate(seq: &[u8], mut seed: u64) -> Vec<u8> {
    const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];
    let mut out = seq.to_vec();
    for _ in 0..seq.len() / 20 {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        let pos = (seed % out.len() as u64) as usize;
        out[pos] = BASES[((seed >> 8) % 4) as usize];
    }
    if out.len() > 10 {
        let cut = out.len() / 2;
        out.drain(cut..cut + 2);
    }
    out
}

/// Thread budget that refuses every slot, forcing synchronous execution.
pub struct DenyBudget;

impl ThreadBudget for DenyBudget {
    fn request_slot(&self, _max_threads: usize) -> bool {
        false
    }
    fn release_slot(&self) {
        unreachable!("no slot was ever granted");
    }
}
