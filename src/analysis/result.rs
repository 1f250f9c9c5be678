use serde::Serialize;

use crate::error::AnalysisError;

/// One contiguous span of vocal activity, in seconds.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct VocalSegment {
    pub start: f32,
    pub end: f32,
    pub duration: f32,
}

impl VocalSegment {
    pub fn new(start: f32, end: f32) -> Self {
        Self {
            start,
            end,
            duration: end - start,
        }
    }
}

/// The complete analysis of one recording. Built once per invocation,
/// never mutated afterwards.
#[derive(Clone, Debug, Serialize)]
pub struct AnalysisResult {
    pub duration_seconds: f32,
    pub bpm: f32,
    pub key: String,
    /// Human-readable tempo description ("Slow", "Fast", ...).
    pub tempo: String,
    pub genre: String,
    pub beat_times: Vec<f32>,
    pub beat_count: usize,
    pub vocal_segments: Vec<VocalSegment>,
    pub vocal_segment_count: usize,
    pub spectral_centroid: f32,
    pub zero_crossing_rate: f32,
    pub sample_rate: u32,
    pub success: bool,
}

/// Failure record with the same `success` flag collaborators key off.
#[derive(Clone, Debug, Serialize)]
pub struct FailureReport {
    pub success: bool,
    pub error: String,
    pub error_type: &'static str,
}

/// What one invocation serializes: either a full result or a structured
/// failure. Untagged so both flatten to the record shape downstream
/// collaborators expect.
#[derive(Clone, Debug, Serialize)]
#[serde(untagged)]
pub enum AnalysisReport {
    Success(AnalysisResult),
    Failure(FailureReport),
}

impl AnalysisReport {
    pub fn failure(err: &AnalysisError) -> Self {
        AnalysisReport::Failure(FailureReport {
            success: false,
            error: err.to_string(),
            error_type: err.error_type(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AnalysisReport::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_report_serializes_flat() {
        let report = AnalysisReport::failure(&AnalysisError::DecodeFailure("no such file".into()));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error_type"], "DecodeFailure");
        assert!(json["error"].as_str().unwrap().contains("no such file"));
    }

    #[test]
    fn vocal_segment_duration_is_derived() {
        let seg = VocalSegment::new(1.0, 2.5);
        assert!((seg.duration - 1.5).abs() < 1e-6);
    }
}
