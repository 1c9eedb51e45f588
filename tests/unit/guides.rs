//! Guide validation and anchor finding through the public API.

use seqalign::{find_guides, AlignError, Guide, GuideFinderConfig, PairwiseAligner};

use crate::helpers::{model, random_seq};

#[test]
fn overlapping_guides_rejected() {
    let mut al = PairwiseAligner::new(model(1, -1, -2, -1));
    let seq = random_seq(5, 64);
    al.set_sequences(&seq, &seq).unwrap();
    let guides = vec![Guide::new(0, 16, 0, 16), Guide::new(12, 28, 20, 36)];
    match al.set_guides(guides) {
        Err(AlignError::BadParameter(_)) => {}
        other => panic!("expected BadParameter, got {:?}", other),
    }
}

#[test]
fn unequal_guide_lengths_rejected() {
    let mut al = PairwiseAligner::new(model(1, -1, -2, -1));
    let seq = random_seq(6, 64);
    al.set_sequences(&seq, &seq).unwrap();
    match al.set_guides(vec![Guide::new(0, 16, 0, 12)]) {
        Err(AlignError::BadParameter(_)) => {}
        other => panic!("expected BadParameter, got {:?}", other),
    }
}

#[test]
fn found_guides_are_exact_matches() {
    // Two sequences sharing a long exact core at different offsets.
    let core = random_seq(42, 300);
    let mut a = random_seq(1, 40);
    a.extend_from_slice(&core);
    a.extend_from_slice(&random_seq(2, 30));
    let mut b = random_seq(3, 25);
    b.extend_from_slice(&core);
    b.extend_from_slice(&random_seq(4, 50));

    let guides = find_guides(&a, &b, &GuideFinderConfig::default()).unwrap();
    assert!(!guides.is_empty(), "expected anchors in a 300 bp shared core");
    for g in &guides {
        assert_eq!(g.a_end - g.a_start, g.b_end - g.b_start);
        assert_eq!(
            &a[g.a_start..g.a_end],
            &b[g.b_start..g.b_end],
            "guide region must match exactly"
        );
    }
}

#[test]
fn guided_and_unguided_runs_agree_on_score() -> anyhow::Result<()> {
    let core = random_seq(77, 256);
    let mut a = random_seq(11, 20);
    a.extend_from_slice(&core);
    a.extend_from_slice(&random_seq(12, 20));
    let mut b = random_seq(13, 15);
    b.extend_from_slice(&core);
    b.extend_from_slice(&random_seq(14, 25));

    let mut plain = PairwiseAligner::new(model(1, -1, -2, -1));
    plain.set_sequences(&a, &b)?;
    let unguided = plain.run()?;

    let guides = find_guides(&a, &b, &GuideFinderConfig::default())?;
    assert!(!guides.is_empty());
    let mut anchored = PairwiseAligner::new(model(1, -1, -2, -1));
    anchored.set_sequences(&a, &b)?;
    anchored.set_guides(guides)?;
    let guided = anchored.run()?;

    assert_eq!(guided, unguided);
    // Both transcripts must consume the sequences fully.
    assert_eq!(anchored.transcript().unwrap().a_len(), a.len());
    assert_eq!(anchored.transcript().unwrap().b_len(), b.len());
    Ok(())
}

#[test]
fn finder_reports_only_exact_anchors() {
    let a = random_seq(100, 400);
    let b = random_seq(200, 400);
    let guides = find_guides(&a, &b, &GuideFinderConfig::default()).unwrap();
    for g in &guides {
        // Any anchor that survives must still be an exact match.
        assert_eq!(&a[g.a_start..g.a_end], &b[g.b_start..g.b_end]);
    }
}
