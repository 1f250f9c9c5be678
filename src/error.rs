use thiserror::Error;

/// Errors surfaced by the analysis pipeline.
///
/// Every failure is mapped to one of these four kinds before it leaves the
/// orchestrator, so callers can tell bad input apart from an internal bug.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// File missing, unreadable, or not decodable as audio.
    #[error("decode failure: {0}")]
    DecodeFailure(String),

    /// Signal shorter than one analysis frame.
    #[error("insufficient samples: got {got}, need at least {needed}")]
    InsufficientSamples { got: usize, needed: usize },

    /// Caller-supplied parameter outside its valid range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Unexpected numeric failure (NaN, degenerate correlation).
    #[error("internal computation error: {0}")]
    InternalComputationError(String),
}

impl AnalysisError {
    /// Stable taxonomy tag, serialized as `error_type` in failure reports.
    pub fn error_type(&self) -> &'static str {
        match self {
            AnalysisError::DecodeFailure(_) => "DecodeFailure",
            AnalysisError::InsufficientSamples { .. } => "InsufficientSamples",
            AnalysisError::InvalidParameter(_) => "InvalidParameter",
            AnalysisError::InternalComputationError(_) => "InternalComputationError",
        }
    }
}
