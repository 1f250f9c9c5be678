use super::result::VocalSegment;
use super::spectral::{frame_rms, FrameGrid};

/// Segmenter tuning. The threshold is adaptive (a fraction of the whole
/// signal's mean RMS), recomputed per call.
#[derive(Clone, Copy, Debug)]
pub struct VocalParams {
    pub threshold_ratio: f32,
    pub min_segment_seconds: f32,
}

impl Default for VocalParams {
    fn default() -> Self {
        Self {
            threshold_ratio: 0.5,
            min_segment_seconds: 0.5,
        }
    }
}

/// Detect spans of vocal activity via frame-wise RMS thresholding.
///
/// A segment opens on the first frame whose RMS exceeds the threshold and
/// closes on the first frame at or below it. Excursions shorter than the
/// minimum duration are discarded as noise. A segment still open at the end
/// of the signal closes at the final frame's time.
pub fn detect_vocal_segments(
    samples: &[f32],
    grid: &FrameGrid,
    params: VocalParams,
) -> Vec<VocalSegment> {
    let rms = frame_rms(samples, grid);
    if rms.is_empty() {
        return Vec::new();
    }

    let threshold = params.threshold_ratio * rms.iter().sum::<f32>() / rms.len() as f32;

    let mut segments = Vec::new();
    let mut open_start: Option<f32> = None;

    for (i, &energy) in rms.iter().enumerate() {
        let time = grid.time(i);
        match open_start {
            None if energy > threshold => open_start = Some(time),
            Some(start) if energy <= threshold => {
                if time - start > params.min_segment_seconds {
                    segments.push(VocalSegment::new(start, time));
                }
                open_start = None;
            }
            _ => {}
        }
    }

    if let Some(start) = open_start {
        let end = grid.time(rms.len() - 1);
        if end - start > params.min_segment_seconds {
            segments.push(VocalSegment::new(start, end));
        }
    }

    segments
}
