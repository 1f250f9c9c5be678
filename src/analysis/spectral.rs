use rustfft::{num_complex::Complex, FftPlanner};

use crate::error::AnalysisError;

/// Frame timing shared by every analysis stage. All consumers use the same
/// frame/hop pair so beat and vocal timings stay directly comparable.
#[derive(Clone, Copy, Debug)]
pub struct FrameGrid {
    pub frame_length: usize,
    pub hop_length: usize,
    pub sample_rate: u32,
    pub frame_count: usize,
}

impl FrameGrid {
    pub fn new(
        num_samples: usize,
        sample_rate: u32,
        frame_length: usize,
        hop_length: usize,
    ) -> Result<Self, AnalysisError> {
        if hop_length == 0 || frame_length == 0 {
            return Err(AnalysisError::InvalidParameter(
                "frame_length and hop_length must be positive".into(),
            ));
        }
        if num_samples < frame_length {
            return Err(AnalysisError::InsufficientSamples {
                got: num_samples,
                needed: frame_length,
            });
        }
        let frame_count = (num_samples - frame_length) / hop_length + 1;
        Ok(Self {
            frame_length,
            hop_length,
            sample_rate,
            frame_count,
        })
    }

    /// Start time of frame `index` in seconds.
    pub fn time(&self, index: usize) -> f32 {
        (index * self.hop_length) as f32 / self.sample_rate as f32
    }

    /// Sample offset of frame `index`.
    pub fn offset(&self, index: usize) -> usize {
        index * self.hop_length
    }
}

/// Magnitude spectrogram, computed once per call and shared by the tempo,
/// chroma, and scalar-feature stages.
pub struct Spectrogram {
    pub grid: FrameGrid,
    /// One magnitude vector (frame_length/2 bins) per frame.
    pub magnitudes: Vec<Vec<f32>>,
    /// Width of one FFT bin in Hz.
    pub bin_hz: f32,
}

impl Spectrogram {
    pub fn compute(
        samples: &[f32],
        sample_rate: u32,
        frame_length: usize,
        hop_length: usize,
    ) -> Result<Self, AnalysisError> {
        let grid = FrameGrid::new(samples.len(), sample_rate, frame_length, hop_length)?;

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(frame_length);
        let hann = hann_window(frame_length);
        let half = frame_length / 2;

        let mut magnitudes = Vec::with_capacity(grid.frame_count);
        let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); frame_length];

        for frame_idx in 0..grid.frame_count {
            let start = grid.offset(frame_idx);
            for (i, &s) in samples[start..start + frame_length].iter().enumerate() {
                buffer[i] = Complex::new(s * hann[i], 0.0);
            }
            fft.process(&mut buffer);
            magnitudes.push(buffer[..half].iter().map(|c| c.norm()).collect());
        }

        Ok(Self {
            grid,
            magnitudes,
            bin_hz: sample_rate as f32 / frame_length as f32,
        })
    }

    /// Energy-weighted mean frequency per frame, averaged over the signal.
    pub fn spectral_centroid(&self) -> f32 {
        self.frame_average(|mags| {
            let total: f32 = mags.iter().sum();
            if total <= 1e-10 {
                return 0.0;
            }
            mags.iter()
                .enumerate()
                .map(|(i, &m)| i as f32 * self.bin_hz * m)
                .sum::<f32>()
                / total
        })
    }

    /// Frequency below which 85% of spectral energy sits, averaged over frames.
    pub fn spectral_rolloff(&self) -> f32 {
        const ROLLOFF_PERCENT: f32 = 0.85;
        self.frame_average(|mags| {
            let total: f32 = mags.iter().sum();
            if total <= 1e-10 {
                return 0.0;
            }
            let target = total * ROLLOFF_PERCENT;
            let mut acc = 0.0f32;
            for (i, &m) in mags.iter().enumerate() {
                acc += m;
                if acc >= target {
                    return i as f32 * self.bin_hz;
                }
            }
            (mags.len() - 1) as f32 * self.bin_hz
        })
    }

    /// Magnitude-weighted standard deviation around the centroid, averaged
    /// over frames.
    pub fn spectral_bandwidth(&self) -> f32 {
        self.frame_average(|mags| {
            let total: f32 = mags.iter().sum();
            if total <= 1e-10 {
                return 0.0;
            }
            let centroid = mags
                .iter()
                .enumerate()
                .map(|(i, &m)| i as f32 * self.bin_hz * m)
                .sum::<f32>()
                / total;
            let var = mags
                .iter()
                .enumerate()
                .map(|(i, &m)| {
                    let d = i as f32 * self.bin_hz - centroid;
                    m * d * d
                })
                .sum::<f32>()
                / total;
            var.sqrt()
        })
    }

    fn frame_average(&self, per_frame: impl Fn(&[f32]) -> f32) -> f32 {
        if self.magnitudes.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.magnitudes.iter().map(|m| per_frame(m)).sum();
        sum / self.magnitudes.len() as f32
    }
}

/// Per-frame RMS energy over the raw signal.
pub fn frame_rms(samples: &[f32], grid: &FrameGrid) -> Vec<f32> {
    (0..grid.frame_count)
        .map(|idx| {
            let start = grid.offset(idx);
            let frame = &samples[start..start + grid.frame_length];
            (frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32).sqrt()
        })
        .collect()
}

/// Fraction of consecutive sample pairs changing sign, per frame, averaged
/// over the signal.
pub fn zero_crossing_rate(samples: &[f32], grid: &FrameGrid) -> f32 {
    if grid.frame_count == 0 || grid.frame_length < 2 {
        return 0.0;
    }
    let sum: f32 = (0..grid.frame_count)
        .map(|idx| {
            let start = grid.offset(idx);
            let frame = &samples[start..start + grid.frame_length];
            let crossings = frame
                .windows(2)
                .filter(|w| (w[0] >= 0.0) != (w[1] >= 0.0))
                .count();
            crossings as f32 / (grid.frame_length - 1) as f32
        })
        .sum();
    sum / grid.frame_count as f32
}

pub fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos()))
        .collect()
}
