//! Alignment core: backtrace store, DP engine, transcript and the
//! high-level aligner facade.

pub mod aligner;
pub mod backtrace;
pub mod dp;
pub mod transcript;

pub use aligner::PairwiseAligner;
pub use backtrace::PackedBacktrace;
pub use dp::{align_segment, ProgressFn, SegmentAlignment, SubProblem};
pub use transcript::{score_from_transcript, EditOp, Transcript, TranscriptStats};
