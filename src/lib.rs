//! Pairwise nucleotide sequence alignment engine.
//!
//! Computes optimal global, semi-global (end-gap-free) or local
//! (Smith-Waterman) alignments of two in-memory byte sequences under a
//! substitution-score model with affine gap costs, producing both the
//! numeric score and a symbolic edit transcript. Large problems can be
//! partitioned at exact-match anchors and solved segment by segment,
//! optionally across worker threads.
//!
//! Entry point: [`PairwiseAligner`].
//!
//! ```
//! use seqalign::PairwiseAligner;
//!
//! let mut aligner = PairwiseAligner::default();
//! aligner.set_sequences(b"ACGT", b"AGT")?;
//! let score = aligner.run()?;
//! assert_eq!(score, 0);
//! assert_eq!(aligner.transcript_string().unwrap(), "MDMM");
//! # Ok::<(), seqalign::AlignError>(())
//! ```

pub mod align;
pub mod error;
pub mod schedule;
pub mod scoring;
pub mod seed;

pub use align::{
    align_segment, score_from_transcript, EditOp, PairwiseAligner, SegmentAlignment, SubProblem,
    Transcript, TranscriptStats,
};
pub use error::{AlignError, Result};
pub use schedule::{ScheduleConfig, SlotBudget, ThreadBudget};
pub use scoring::{EndFree, ScoringModel, TieBreak};
pub use seed::{find_guides, validate_guides, Guide, GuideFinderConfig};
