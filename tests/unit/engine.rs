//! DP engine properties and concrete scenarios, exercised through the
//! public `PairwiseAligner` API.

use seqalign::{EndFree, PairwiseAligner};

use crate::helpers::{model, mutate, random_seq};

fn aligner(match_w: i32, mismatch_w: i32, gap_open: i32, gap_extend: i32) -> PairwiseAligner {
    PairwiseAligner::new(model(match_w, mismatch_w, gap_open, gap_extend))
}

#[test]
fn identical_sequences_score_and_transcript() {
    let mut al = aligner(1, -1, -2, -1);
    al.set_sequences(b"ACGT", b"ACGT").unwrap();
    assert_eq!(al.run().unwrap(), 4);
    assert_eq!(al.transcript_string().unwrap(), "MMMM");
}

#[test]
fn single_deletion_scenario() {
    let mut al = aligner(1, -1, -2, -1);
    al.set_sequences(b"ACGT", b"AGT").unwrap();
    // 3 matches (+3), one gap opened and extended once (-3).
    assert_eq!(al.run().unwrap(), 0);
    let rendered = al.transcript_string().unwrap();
    assert_eq!(rendered.matches('D').count(), 1);
    assert_eq!(rendered.matches('M').count(), 3);
}

#[test]
fn recomputed_score_always_matches_run() -> anyhow::Result<()> {
    for seed in 1..=8u64 {
        let a = random_seq(seed, 120);
        let b = mutate(&a, seed.wrapping_mul(0x9e3779b9));
        let mut al = aligner(2, -3, -5, -2);
        al.set_sequences(&a, &b)?;
        let score = al.run()?;
        let transcript = al.transcript().unwrap().clone();
        assert_eq!(al.score_from_transcript(&transcript)?, score, "seed {}", seed);
    }
    Ok(())
}

#[test]
fn swapped_inputs_score_symmetry() {
    for seed in 1..=4u64 {
        let a = random_seq(seed, 90);
        let b = mutate(&a, seed + 100);

        let mut fwd = aligner(1, -2, -4, -1);
        fwd.model_mut()
            .set_end_free(EndFree {
                a_leading: true,
                b_trailing: true,
                ..EndFree::NONE
            })
            .unwrap();
        fwd.model_mut().rebuild_table();
        fwd.set_sequences(&a, &b).unwrap();

        // Swap the sequences and mirror the flags across the axes.
        let mut rev = aligner(1, -2, -4, -1);
        rev.model_mut()
            .set_end_free(EndFree {
                b_leading: true,
                a_trailing: true,
                ..EndFree::NONE
            })
            .unwrap();
        rev.model_mut().rebuild_table();
        rev.set_sequences(&b, &a).unwrap();

        assert_eq!(fwd.run().unwrap(), rev.run().unwrap(), "seed {}", seed);
    }
}

#[test]
fn repeated_runs_are_idempotent() {
    let a = random_seq(7, 80);
    let b = mutate(&a, 17);
    let mut al = aligner(1, -1, -3, -1);
    al.set_sequences(&a, &b).unwrap();
    let s1 = al.run().unwrap();
    let t1 = al.transcript().unwrap().clone();
    let s2 = al.run().unwrap();
    assert_eq!(s1, s2);
    assert_eq!(&t1, al.transcript().unwrap());
}

#[test]
fn end_free_appending_never_decreases_score() {
    // Trailing gaps in B are free, so A may overhang on the right at no
    // cost: growing A's tail can only keep or improve the score.
    let core = random_seq(3, 60);
    let mut base = aligner(1, -2, -3, -1);
    base.model_mut()
        .set_end_free(EndFree {
            b_trailing: true,
            ..EndFree::NONE
        })
        .unwrap();
    base.model_mut().rebuild_table();
    base.set_sequences(&core, &core).unwrap();
    let before = base.run().unwrap();

    let mut extended_a = core.clone();
    extended_a.extend_from_slice(&random_seq(99, 25));
    let mut ext = aligner(1, -2, -3, -1);
    ext.model_mut()
        .set_end_free(EndFree {
            b_trailing: true,
            ..EndFree::NONE
        })
        .unwrap();
    ext.model_mut().rebuild_table();
    ext.set_sequences(&extended_a, &core).unwrap();
    let after = ext.run().unwrap();

    assert!(
        after >= before,
        "free-end overhang decreased the score: {} -> {}",
        before,
        after
    );
    assert_eq!(after, before);
}

#[test]
fn semi_global_contained_read() {
    // B is a substring of A; with both end gaps in B free the alignment
    // is a perfect match of the core.
    let mut al = aligner(1, -1, -2, -1);
    al.model_mut()
        .set_end_free(EndFree {
            b_leading: true,
            b_trailing: true,
            ..EndFree::NONE
        })
        .unwrap();
    al.model_mut().rebuild_table();
    al.set_sequences(b"GGGGACGTACGTCCCC", b"ACGTACGT").unwrap();
    assert_eq!(al.run().unwrap(), 8);
    assert_eq!(al.transcript_string().unwrap(), "DDDDMMMMMMMMDDDD");
}

#[test]
fn local_mode_flanking_junk_excluded() {
    let mut al = aligner(1, -10, -5, -2);
    al.model_mut().set_local(true);
    al.set_sequences(b"WWACGTWW", b"ACGT").unwrap();
    assert_eq!(al.run().unwrap(), 4);
    assert_eq!(al.a_range().unwrap(), 2..6);
    assert_eq!(al.b_range().unwrap(), 0..4);
    assert_eq!(al.transcript_string().unwrap(), "MMMM");
}

#[test]
fn local_mode_score_non_negative() {
    for seed in 1..=6u64 {
        let a = random_seq(seed, 70);
        let b = random_seq(seed + 1000, 70);
        let mut al = aligner(1, -4, -6, -3);
        al.model_mut().set_local(true);
        al.set_sequences(&a, &b).unwrap();
        let score = al.run().unwrap();
        assert!(score >= 0, "seed {}: local score {}", seed, score);
        // The local transcript carries no end gaps, so its recomputed
        // cost is already the trimmed cost.
        let transcript = al.transcript().unwrap().clone();
        assert_eq!(al.score_from_transcript(&transcript).unwrap(), score);
        if let Some(first) = transcript.ops().first() {
            assert_eq!(*first, seqalign::EditOp::Match);
            assert_eq!(*transcript.ops().last().unwrap(), seqalign::EditOp::Match);
        }
    }
}

#[test]
fn transcript_stats_and_identity() {
    let mut al = aligner(1, -1, -2, -1);
    al.set_sequences(b"ACGTACGT", b"ACCTACG").unwrap();
    al.run().unwrap();
    let stats = al.transcript().unwrap().stats();
    assert_eq!(
        stats.matches + stats.mismatches + stats.gap_letters,
        stats.alignment_len
    );
    assert!(stats.identity() > 0.0 && stats.identity() <= 100.0);
}
