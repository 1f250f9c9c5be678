pub mod chroma;
pub mod genre;
pub mod key;
pub mod result;
pub mod spectral;
pub mod tempo;
pub mod vocal;

use std::path::Path;

use crate::audio::decode::{decode_audio, AudioData};
use crate::error::AnalysisError;

use chroma::ChromaMatrix;
use genre::{classify_genre, tempo_description, GenreFeatures};
use result::{AnalysisReport, AnalysisResult};
use spectral::{zero_crossing_rate, Spectrogram};
use tempo::{track_beats, TempoRange};
use vocal::{detect_vocal_segments, VocalParams};

/// Per-process analysis configuration. Built once at startup and shared
/// read-only across invocations.
#[derive(Clone, Copy, Debug)]
pub struct AnalysisParams {
    pub frame_length: usize,
    pub hop_length: usize,
    pub tempo: TempoRange,
    pub vocal: VocalParams,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            frame_length: 2048,
            hop_length: 512,
            tempo: TempoRange::default(),
            vocal: VocalParams::default(),
        }
    }
}

impl AnalysisParams {
    fn validate(&self) -> Result<(), AnalysisError> {
        // A one-sample frame has no window shape and no spectrum to speak of.
        if self.frame_length < 2 || self.hop_length == 0 {
            return Err(AnalysisError::InvalidParameter(
                "frame_length must be at least 2 and hop_length positive".into(),
            ));
        }
        if self.tempo.min_bpm <= 0.0 || self.tempo.max_bpm <= self.tempo.min_bpm {
            return Err(AnalysisError::InvalidParameter(format!(
                "invalid tempo range {}..{}",
                self.tempo.min_bpm, self.tempo.max_bpm
            )));
        }
        if self.vocal.threshold_ratio <= 0.0 || self.vocal.min_segment_seconds < 0.0 {
            return Err(AnalysisError::InvalidParameter(
                "invalid vocal segmentation parameters".into(),
            ));
        }
        Ok(())
    }
}

/// Run the full pipeline over one decoded signal.
///
/// Stages run in dependency order: the spectrogram is computed once and
/// shared by the tempo tracker, the chroma fold, and the scalar features;
/// the vocal segmenter reads the raw signal with the same frame timing.
/// Any failure surfaces as a typed error; no partial result escapes.
pub fn analyze(audio: &AudioData, params: &AnalysisParams) -> Result<AnalysisResult, AnalysisError> {
    params.validate()?;
    validate_signal(audio, params)?;

    let spec = Spectrogram::compute(
        &audio.samples,
        audio.sample_rate,
        params.frame_length,
        params.hop_length,
    )?;

    let beat_grid = track_beats(&spec, params.tempo);
    let key = key::estimate_key(&ChromaMatrix::from_spectrogram(&spec));
    let vocal_segments = detect_vocal_segments(&audio.samples, &spec.grid, params.vocal);

    let features = GenreFeatures {
        bpm: beat_grid.bpm,
        spectral_centroid: spec.spectral_centroid(),
        zero_crossing_rate: zero_crossing_rate(&audio.samples, &spec.grid),
        spectral_rolloff: spec.spectral_rolloff(),
        spectral_bandwidth: spec.spectral_bandwidth(),
    };
    check_finite(&features)?;

    let genre = classify_genre(&features).to_string();
    let tempo = tempo_description(beat_grid.bpm).to_string();

    log::info!(
        "Analysis: {:.1} BPM, key {}, {} beats, {} vocal segments, genre {}",
        beat_grid.bpm,
        key,
        beat_grid.beat_times.len(),
        vocal_segments.len(),
        genre
    );

    Ok(AnalysisResult {
        duration_seconds: audio.duration_seconds(),
        bpm: beat_grid.bpm,
        key,
        tempo,
        genre,
        beat_count: beat_grid.beat_times.len(),
        beat_times: beat_grid.beat_times,
        vocal_segment_count: vocal_segments.len(),
        vocal_segments,
        spectral_centroid: features.spectral_centroid,
        zero_crossing_rate: features.zero_crossing_rate,
        sample_rate: audio.sample_rate,
        success: true,
    })
}

/// Decode one file and analyze it, folding every failure into a structured
/// report. This is the process-boundary entry point: it never panics and
/// never returns a partial result.
pub fn analyze_file(path: &Path, params: &AnalysisParams) -> AnalysisReport {
    let report = decode_audio(path).and_then(|audio| analyze(&audio, params));
    match report {
        Ok(result) => AnalysisReport::Success(result),
        Err(err) => {
            log::warn!("Analysis of {} failed: {}", path.display(), err);
            AnalysisReport::failure(&err)
        }
    }
}

fn validate_signal(audio: &AudioData, params: &AnalysisParams) -> Result<(), AnalysisError> {
    if audio.sample_rate == 0 {
        return Err(AnalysisError::InvalidParameter(
            "sample rate must be positive".into(),
        ));
    }
    if audio.samples.len() < params.frame_length {
        return Err(AnalysisError::InsufficientSamples {
            got: audio.samples.len(),
            needed: params.frame_length,
        });
    }
    if audio.samples.iter().any(|s| !s.is_finite()) {
        return Err(AnalysisError::InvalidParameter(
            "signal contains non-finite samples".into(),
        ));
    }
    Ok(())
}

fn check_finite(features: &GenreFeatures) -> Result<(), AnalysisError> {
    let all = [
        features.bpm,
        features.spectral_centroid,
        features.zero_crossing_rate,
        features.spectral_rolloff,
        features.spectral_bandwidth,
    ];
    if all.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::InternalComputationError(format!(
            "non-finite feature value in {:?}",
            features
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 22050;

    fn audio_from(samples: Vec<f32>) -> AudioData {
        AudioData {
            samples,
            sample_rate: SR,
        }
    }

    fn sine(freq: f32, seconds: f32) -> Vec<f32> {
        let n = (SR as f32 * seconds) as usize;
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / SR as f32).sin())
            .collect()
    }

    #[test]
    fn silent_input_succeeds_with_zeroes() {
        let audio = audio_from(vec![0.0; SR as usize * 3]);
        let result = analyze(&audio, &AnalysisParams::default()).unwrap();
        assert!(result.success);
        assert_eq!(result.bpm, 0.0);
        assert_eq!(result.beat_count, 0);
        assert_eq!(result.vocal_segment_count, 0);
        assert_eq!(result.sample_rate, SR);
        assert!((result.duration_seconds - 3.0).abs() < 0.01);
    }

    #[test]
    fn held_tone_recovers_its_pitch_class() {
        // C5 held for three seconds: the key's root must be C, whatever
        // the mode comes out as.
        let audio = audio_from(sine(523.25, 3.0));
        let result = analyze(&audio, &AnalysisParams::default()).unwrap();
        assert!(
            result.key.starts_with("C "),
            "expected C root, got {}",
            result.key
        );
    }

    #[test]
    fn too_short_signal_reports_insufficient_samples() {
        let audio = audio_from(vec![0.1; 100]);
        let err = analyze(&audio, &AnalysisParams::default()).unwrap_err();
        assert_eq!(err.error_type(), "InsufficientSamples");
    }

    #[test]
    fn one_sample_frame_is_invalid() {
        // frame_length 1 would put a zero-width Hann window under the FFT
        // and surface as NaN much later; it must be rejected up front.
        let params = AnalysisParams {
            frame_length: 1,
            ..AnalysisParams::default()
        };
        let audio = audio_from(vec![0.0; SR as usize]);
        let err = analyze(&audio, &params).unwrap_err();
        assert_eq!(err.error_type(), "InvalidParameter");
    }

    #[test]
    fn zero_sample_rate_is_invalid() {
        let audio = AudioData {
            samples: vec![0.0; 44100],
            sample_rate: 0,
        };
        let err = analyze(&audio, &AnalysisParams::default()).unwrap_err();
        assert_eq!(err.error_type(), "InvalidParameter");
    }

    #[test]
    fn non_finite_samples_are_rejected() {
        let mut samples = vec![0.0f32; SR as usize];
        samples[1000] = f32::NAN;
        let err = analyze(&audio_from(samples), &AnalysisParams::default()).unwrap_err();
        assert_eq!(err.error_type(), "InvalidParameter");
    }

    #[test]
    fn analysis_is_idempotent() {
        let audio = audio_from(sine(440.0, 2.0));
        let params = AnalysisParams::default();
        let a = analyze(&audio, &params).unwrap();
        let b = analyze(&audio, &params).unwrap();
        assert_eq!(a.bpm.to_bits(), b.bpm.to_bits());
        assert_eq!(a.key, b.key);
        assert_eq!(a.genre, b.genre);
        assert_eq!(a.beat_times.len(), b.beat_times.len());
        assert_eq!(
            a.spectral_centroid.to_bits(),
            b.spectral_centroid.to_bits()
        );
    }

    #[test]
    fn result_serializes_with_flat_contract_fields() {
        let audio = audio_from(vec![0.0; SR as usize * 2]);
        let result = analyze(&audio, &AnalysisParams::default()).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        for field in [
            "duration_seconds",
            "bpm",
            "key",
            "tempo",
            "genre",
            "beat_times",
            "beat_count",
            "vocal_segments",
            "vocal_segment_count",
            "spectral_centroid",
            "zero_crossing_rate",
            "sample_rate",
            "success",
        ] {
            assert!(json.get(field).is_some(), "missing field {}", field);
        }
        assert_eq!(json["success"], true);
    }

    #[test]
    fn missing_file_yields_failure_report() {
        let report = analyze_file(
            Path::new("/no/such/track.mp3"),
            &AnalysisParams::default(),
        );
        assert!(!report.is_success());
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error_type"], "DecodeFailure");
    }
}
