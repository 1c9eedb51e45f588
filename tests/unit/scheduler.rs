//! Scheduler behaviour through the public API: admission, memory
//! preflight, cancellation and parallel/synchronous equivalence.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use seqalign::{AlignError, Guide, PairwiseAligner, ScheduleConfig, SlotBudget};

use crate::helpers::{init_logging, model, mutate, random_seq, DenyBudget};

#[test]
fn memory_preflight_surfaces_through_run() {
    init_logging();
    let mut al = PairwiseAligner::new(model(1, -1, -2, -1));
    let a = random_seq(1, 2000);
    let b = random_seq(2, 2000);
    al.set_sequences(&a, &b).unwrap();
    al.set_schedule_config(ScheduleConfig {
        max_backtrace_bytes: 4096,
        ..ScheduleConfig::default()
    });
    match al.run() {
        Err(AlignError::MemoryLimit { required, limit }) => {
            assert_eq!(limit, 4096);
            assert!(required > limit);
        }
        other => panic!("expected MemoryLimit, got {:?}", other),
    }

    // Raising the ceiling past the requirement unblocks the same run.
    al.set_schedule_config(ScheduleConfig::default());
    al.run().unwrap();
}

#[test]
fn refused_admission_still_produces_correct_result() {
    init_logging();
    let a = random_seq(9, 500);
    let b = mutate(&a, 31);
    let guides = vec![
        Guide::new(100, 140, 100, 140),
        Guide::new(300, 340, 298, 338),
    ];

    let mut baseline = PairwiseAligner::new(model(1, -2, -4, -1));
    baseline.set_sequences(&a, &b).unwrap();
    baseline.set_guides(guides.clone()).unwrap();
    let expected = baseline.run().unwrap();

    let mut denied = PairwiseAligner::new(model(1, -2, -4, -1));
    denied.set_sequences(&a, &b).unwrap();
    denied.set_guides(guides).unwrap();
    denied.set_thread_budget(Arc::new(DenyBudget));
    denied.set_schedule_config(ScheduleConfig {
        max_threads: 8,
        parallel_cells: 0,
        ..ScheduleConfig::default()
    });
    assert_eq!(denied.run().unwrap(), expected);
    assert_eq!(denied.transcript(), baseline.transcript());
}

#[test]
fn parallel_run_matches_synchronous() {
    init_logging();
    let a = random_seq(21, 600);
    let mut b = a.clone();
    b[17] = match b[17] {
        b'A' => b'C',
        _ => b'A',
    };
    let guides = vec![
        Guide::new(150, 200, 150, 200),
        Guide::new(400, 450, 400, 450),
    ];

    let mut sync = PairwiseAligner::new(model(1, -1, -3, -1));
    sync.set_sequences(&a, &b).unwrap();
    sync.set_guides(guides.clone()).unwrap();
    let sync_score = sync.run().unwrap();

    let mut par = PairwiseAligner::new(model(1, -1, -3, -1));
    par.set_sequences(&a, &b).unwrap();
    par.set_guides(guides).unwrap();
    par.set_thread_budget(Arc::new(SlotBudget::new()));
    par.set_schedule_config(ScheduleConfig {
        max_threads: 4,
        parallel_cells: 0,
        ..ScheduleConfig::default()
    });
    assert_eq!(par.run().unwrap(), sync_score);
    assert_eq!(par.transcript(), sync.transcript());
}

#[test]
fn progress_callback_cancels_run() {
    let mut al = PairwiseAligner::new(model(1, -1, -2, -1));
    let a = random_seq(3, 200);
    let b = random_seq(4, 200);
    al.set_sequences(&a, &b).unwrap();
    al.set_progress(Arc::new(|_done: u64, _total: u64| true));
    match al.run() {
        Err(AlignError::Cancelled) => {}
        other => panic!("expected Cancelled, got {:?}", other),
    }
    assert!(al.transcript().is_none());

    // Removing the callback lets the identical configuration finish.
    al.clear_progress();
    al.run().unwrap();
    assert!(al.transcript().is_some());
}

#[test]
fn progress_reports_are_monotonic_and_bounded() {
    let last_done = Arc::new(AtomicU64::new(0));
    let violated = Arc::new(AtomicBool::new(false));
    let calls = Arc::new(AtomicU64::new(0));

    let mut al = PairwiseAligner::new(model(1, -1, -2, -1));
    let a = random_seq(5, 150);
    let b = random_seq(6, 140);
    al.set_sequences(&a, &b).unwrap();
    {
        let last_done = Arc::clone(&last_done);
        let violated = Arc::clone(&violated);
        let calls = Arc::clone(&calls);
        al.set_progress(Arc::new(move |done: u64, total: u64| {
            calls.fetch_add(1, Ordering::Relaxed);
            if done > total || done < last_done.load(Ordering::Relaxed) {
                violated.store(true, Ordering::Relaxed);
            }
            last_done.store(done, Ordering::Relaxed);
            false
        }));
    }
    al.run().unwrap();
    assert!(!violated.load(Ordering::Relaxed), "progress went backwards or past the total");
    // One report per completed row, row 0 included.
    assert_eq!(calls.load(Ordering::Relaxed), a.len() as u64 + 1);
}
