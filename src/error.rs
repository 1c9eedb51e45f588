use thiserror::Error;

/// Result type alias for alignment operations
pub type Result<T> = std::result::Result<T, AlignError>;

/// Errors surfaced by the alignment engine.
///
/// All variants are detected locally and returned synchronously from
/// `PairwiseAligner::run()`; nothing is retried inside the engine. Worker
/// failures during multi-segment runs are captured, every worker is still
/// joined, and the first captured failure is returned.
#[derive(Debug, Error)]
pub enum AlignError {
    /// Malformed caller input: bad guides, empty sequences, or an
    /// incompatible mode combination (e.g. local mode with guides).
    #[error("bad parameter: {0}")]
    BadParameter(String),

    /// A residue outside the configured alphabet.
    #[error("invalid character {byte:#04x} at position {index}")]
    InvalidCharacter { index: usize, byte: u8 },

    /// Run attempted after a scoring-constant change without rebuilding
    /// the substitution table.
    #[error("substitution table is stale; rebuild it before running")]
    InvalidMatrix,

    /// Run attempted before sequences were configured.
    #[error("no sequence data")]
    NoSequenceData,

    /// Pre-flight backtrace estimate exceeds the configured ceiling.
    #[error("memory limit: backtrace would need {required} bytes (limit {limit})")]
    MemoryLimit { required: usize, limit: usize },

    /// Cooperative cancellation requested through the progress callback.
    /// The run is incomplete: no score, no transcript.
    #[error("alignment cancelled")]
    Cancelled,

    /// Internal consistency violation: the decoded transcript disagrees
    /// with the DP score, or a local-mode backtrace failed to terminate
    /// at exactly zero.
    #[error("internal error: {0}")]
    InternalError(String),
}
