use super::spectral::Spectrogram;

/// Global tempo plus the beat timestamps it implies.
#[derive(Clone, Debug)]
pub struct BeatGrid {
    pub bpm: f32,
    pub beat_times: Vec<f32>,
}

impl BeatGrid {
    fn silent() -> Self {
        Self {
            bpm: 0.0,
            beat_times: Vec::new(),
        }
    }
}

/// Musically plausible tempo range and the octave-ambiguity anchor.
#[derive(Clone, Copy, Debug)]
pub struct TempoRange {
    pub min_bpm: f32,
    pub max_bpm: f32,
    pub anchor_bpm: f32,
}

impl Default for TempoRange {
    fn default() -> Self {
        Self {
            min_bpm: 40.0,
            max_bpm: 240.0,
            anchor_bpm: 120.0,
        }
    }
}

/// Estimate global tempo and place beats.
///
/// The onset-strength curve is the frame-to-frame spectral flux. Tempo is
/// the autocorrelation lag with the highest anchor-weighted strength inside
/// the plausible range; the anchor weighting resolves the half/double-tempo
/// ambiguity toward `anchor_bpm`. Beats snap to onset peaks nearest the
/// multiples of the beat period, starting from the first strong onset.
///
/// Undetectable periodicity (silence, noise) yields `bpm = 0` and an empty
/// grid rather than an error.
pub fn track_beats(spec: &Spectrogram, range: TempoRange) -> BeatGrid {
    let flux = onset_strength(spec);
    if flux.iter().all(|&f| f <= 1e-9) {
        return BeatGrid::silent();
    }

    let sr = spec.grid.sample_rate as f32;
    let hop = spec.grid.hop_length as f32;
    let frames_per_second = sr / hop;

    let lag_of = |bpm: f32| 60.0 * frames_per_second / bpm;
    let bpm_of = |lag: f32| 60.0 * frames_per_second / lag;

    let lag_min = (lag_of(range.max_bpm).ceil() as usize).max(1);
    let lag_max = (lag_of(range.min_bpm).floor() as usize).min(flux.len().saturating_sub(1));
    if lag_min > lag_max {
        log::debug!(
            "signal too short for tempo search ({} onset frames)",
            flux.len()
        );
        return BeatGrid::silent();
    }

    let autocorr = |lag: usize| -> f32 {
        flux[..flux.len() - lag]
            .iter()
            .zip(flux[lag..].iter())
            .map(|(a, b)| a * b)
            .sum()
    };

    // Weight each candidate by its distance (in octaves) from the anchor.
    let mut best_lag = lag_min;
    let mut best_score = f32::NEG_INFINITY;
    for lag in lag_min..=lag_max {
        let weight = (-0.5 * (bpm_of(lag as f32) / range.anchor_bpm).log2().powi(2)).exp();
        let score = autocorr(lag) * weight;
        if score > best_score {
            best_score = score;
            best_lag = lag;
        }
    }
    if best_score <= 0.0 {
        return BeatGrid::silent();
    }

    let period = refine_lag(best_lag, lag_min, lag_max, &autocorr);
    let bpm = bpm_of(period);

    let peaks = onset_peaks(&flux);
    let beat_times = place_beats(&peaks, period, spec, &flux);

    log::debug!(
        "tempo: {:.1} BPM (lag {:.2} frames), {} beats",
        bpm,
        period,
        beat_times.len()
    );

    BeatGrid { bpm, beat_times }
}

/// Positive part of frame-to-frame spectral magnitude differences, summed
/// across bins. First frame has no predecessor and reads 0.
pub fn onset_strength(spec: &Spectrogram) -> Vec<f32> {
    let mut flux = vec![0.0f32; spec.magnitudes.len()];
    for i in 1..spec.magnitudes.len() {
        flux[i] = spec.magnitudes[i]
            .iter()
            .zip(spec.magnitudes[i - 1].iter())
            .map(|(cur, prev)| (cur - prev).max(0.0))
            .sum();
    }
    flux
}

/// Parabolic interpolation around the winning lag. The true period rarely
/// falls on an integer frame count; without this the click-track case lands
/// a few BPM off.
fn refine_lag(lag: usize, lag_min: usize, lag_max: usize, autocorr: &impl Fn(usize) -> f32) -> f32 {
    if lag <= lag_min || lag >= lag_max {
        return lag as f32;
    }
    let left = autocorr(lag - 1);
    let mid = autocorr(lag);
    let right = autocorr(lag + 1);
    let denom = left - 2.0 * mid + right;
    if denom.abs() <= 1e-12 {
        return lag as f32;
    }
    let delta = 0.5 * (left - right) / denom;
    lag as f32 + delta.clamp(-1.0, 1.0)
}

/// Local maxima of the onset curve above its global mean.
fn onset_peaks(flux: &[f32]) -> Vec<usize> {
    let mean = flux.iter().sum::<f32>() / flux.len() as f32;
    (1..flux.len().saturating_sub(1))
        .filter(|&i| flux[i] > mean && flux[i] >= flux[i - 1] && flux[i] >= flux[i + 1])
        .collect()
}

fn place_beats(peaks: &[usize], period: f32, spec: &Spectrogram, flux: &[f32]) -> Vec<f32> {
    if peaks.is_empty() || period <= 0.0 {
        return Vec::new();
    }

    let to_time = |frame: f32| frame * spec.grid.hop_length as f32 / spec.grid.sample_rate as f32;
    let tolerance = period / 4.0;
    let frame_count = flux.len() as f32;

    let mut beat_times = Vec::new();
    let mut expected = peaks[0] as f32;
    while expected < frame_count {
        // Snap to the nearest onset peak within a quarter period.
        let nearest = peaks
            .iter()
            .map(|&p| (p as f32, (p as f32 - expected).abs()))
            .filter(|&(_, d)| d <= tolerance)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
        let frame = match nearest {
            Some((p, _)) => p,
            None => expected,
        };
        beat_times.push(to_time(frame));
        expected += period;
    }
    beat_times
}
