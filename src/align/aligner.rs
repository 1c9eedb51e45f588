//! High-level aligner facade
//!
//! Owns one configuration: the two sequences, the scoring model, the
//! optional guide list, the scheduler settings and the progress callback.
//! `run()` drives the whole pipeline and caches the resulting transcript;
//! replacing the sequences (or re-running) invalidates the previous one.

use std::sync::Arc;

use super::dp::ProgressFn;
use super::transcript::{score_from_transcript, Transcript};
use super::SegmentAlignment;
use crate::error::{AlignError, Result};
use crate::schedule::{run_schedule, ScheduleConfig, SlotBudget, ThreadBudget};
use crate::scoring::{EndFree, ScoringModel};
use crate::seed::{validate_guides, Guide};

/// Pairwise alignment engine over two in-memory byte buffers.
pub struct PairwiseAligner {
    model: ScoringModel,
    seq_a: Vec<u8>,
    seq_b: Vec<u8>,
    sequences_set: bool,
    guides: Vec<Guide>,
    schedule: ScheduleConfig,
    budget: Arc<dyn ThreadBudget>,
    progress: Option<Arc<ProgressFn>>,
    result: Option<SegmentAlignment>,
}

impl Default for PairwiseAligner {
    fn default() -> Self {
        Self::new(ScoringModel::default())
    }
}

impl PairwiseAligner {
    pub fn new(model: ScoringModel) -> Self {
        Self {
            model,
            seq_a: Vec::new(),
            seq_b: Vec::new(),
            sequences_set: false,
            guides: Vec::new(),
            schedule: ScheduleConfig::default(),
            budget: Arc::new(SlotBudget::new()),
            progress: None,
            result: None,
        }
    }

    /// One-call configuration: sequences, model, optional guides.
    pub fn configure(
        &mut self,
        a: &[u8],
        b: &[u8],
        model: ScoringModel,
        guides: Option<Vec<Guide>>,
    ) -> Result<()> {
        self.model = model;
        self.set_sequences(a, b)?;
        if let Some(guides) = guides {
            self.set_guides(guides)?;
        }
        Ok(())
    }

    pub fn model(&self) -> &ScoringModel {
        &self.model
    }

    /// Mutable access to the scoring model. Any previously computed
    /// transcript is dropped, since its score may no longer be valid.
    pub fn model_mut(&mut self) -> &mut ScoringModel {
        self.result = None;
        &mut self.model
    }

    /// Install the two sequences, validating every residue against the
    /// alphabet. Replaces any previous configuration: guides and the
    /// cached transcript are dropped.
    pub fn set_sequences(&mut self, a: &[u8], b: &[u8]) -> Result<()> {
        if a.is_empty() || b.is_empty() {
            return Err(AlignError::BadParameter("empty sequence".into()));
        }
        self.model.validate(a)?;
        self.model.validate(b)?;
        self.seq_a = a.to_vec();
        self.seq_b = b.to_vec();
        self.sequences_set = true;
        self.guides.clear();
        self.result = None;
        Ok(())
    }

    /// Install a guide list for the current sequences.
    ///
    /// Guide regions are trusted as exact matches and never re-verified;
    /// guides derived from noisy sources will corrupt the transcript's
    /// claimed identity. Fails with `BadParameter` on any invariant
    /// violation, and in local mode (which is incompatible with guides).
    pub fn set_guides(&mut self, guides: Vec<Guide>) -> Result<()> {
        if !self.sequences_set {
            return Err(AlignError::NoSequenceData);
        }
        if self.model.is_local() && !guides.is_empty() {
            return Err(AlignError::BadParameter(
                "guides cannot be combined with local mode".into(),
            ));
        }
        validate_guides(&guides, self.seq_a.len(), self.seq_b.len())?;
        self.guides = guides;
        self.result = None;
        Ok(())
    }

    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    pub fn set_schedule_config(&mut self, config: ScheduleConfig) {
        self.schedule = config;
    }

    /// Inject a thread-budget admission point (shared across aligners).
    pub fn set_thread_budget(&mut self, budget: Arc<dyn ThreadBudget>) {
        self.budget = budget;
    }

    /// Install a progress callback, invoked at most once per completed DP
    /// row with `(cells done, cells total)` for the row's sub-problem.
    /// Returning `true` cancels the run at the next row boundary.
    pub fn set_progress(&mut self, callback: Arc<ProgressFn>) {
        self.progress = Some(callback);
    }

    pub fn clear_progress(&mut self) {
        self.progress = None;
    }

    /// Align the configured sequences and return the optimal score.
    ///
    /// The transcript is cached and available through `transcript()`
    /// until the configuration changes. Running twice with an unchanged
    /// configuration returns the same score and transcript.
    pub fn run(&mut self) -> Result<i32> {
        if !self.sequences_set {
            return Err(AlignError::NoSequenceData);
        }
        if !self.model.table_valid() {
            return Err(AlignError::InvalidMatrix);
        }
        if self.model.is_local() {
            if !self.guides.is_empty() {
                return Err(AlignError::BadParameter(
                    "guides cannot be combined with local mode".into(),
                ));
            }
            if self.model.end_free() != EndFree::ALL {
                return Err(AlignError::BadParameter(
                    "local mode requires all end gaps free".into(),
                ));
            }
        }

        let outcome = run_schedule(
            &self.model,
            &self.seq_a,
            &self.seq_b,
            &self.guides,
            &self.schedule,
            self.budget.as_ref(),
            self.progress.as_deref(),
        )?;
        let score = outcome.score;
        self.result = Some(outcome);
        Ok(score)
    }

    /// Score of the last successful run.
    pub fn score(&self) -> Option<i32> {
        self.result.as_ref().map(|r| r.score)
    }

    /// Transcript of the last successful run.
    pub fn transcript(&self) -> Option<&Transcript> {
        self.result.as_ref().map(|r| &r.transcript)
    }

    /// One-character-per-operation rendering of the last transcript,
    /// with diagonal operations re-resolved against the live sequences.
    pub fn transcript_string(&self) -> Option<String> {
        self.result.as_ref().map(|r| {
            r.transcript
                .render_resolved(&self.seq_a, &self.seq_b, r.a_range.start, r.b_range.start)
        })
    }

    /// Half-open range of A covered by the last alignment (in local mode,
    /// the best local region).
    pub fn a_range(&self) -> Option<std::ops::Range<usize>> {
        self.result.as_ref().map(|r| r.a_range.clone())
    }

    /// Half-open range of B covered by the last alignment.
    pub fn b_range(&self) -> Option<std::ops::Range<usize>> {
        self.result.as_ref().map(|r| r.b_range.clone())
    }

    /// Recompute a transcript's score against the live sequences and the
    /// current model, independent of any DP grid. The transcript is
    /// assumed to start where the last run's alignment started — a local
    /// transcript covers only the best region, not the whole sequences.
    /// With no cached run it is assumed to start at the beginning of both
    /// sequences.
    pub fn score_from_transcript(&self, transcript: &Transcript) -> Result<i32> {
        if !self.sequences_set {
            return Err(AlignError::NoSequenceData);
        }
        let (a_offset, b_offset) = match &self.result {
            Some(r) => (r.a_range.start, r.b_range.start),
            None => (0, 0),
        };
        let end_free = if self.model.is_local() {
            EndFree::NONE
        } else {
            self.model.end_free()
        };
        score_from_transcript(
            &self.model,
            &self.seq_a,
            &self.seq_b,
            a_offset,
            b_offset,
            end_free,
            transcript,
        )
    }
}
