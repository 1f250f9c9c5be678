use super::spectral::Spectrogram;

/// Fold bins below this frequency into nothing: they sit between pitch
/// classes and mostly carry rumble.
const MIN_PITCH_HZ: f32 = 27.5; // A0
/// Above ~5 kHz, partials stop being harmonically informative.
const MAX_PITCH_HZ: f32 = 5000.0;

/// Per-frame 12-bin pitch-class energy (index 0 = C, ..., 11 = B).
pub struct ChromaMatrix {
    pub frames: Vec<[f32; 12]>,
}

impl ChromaMatrix {
    /// Fold spectral energy into pitch classes on a log-frequency scale:
    /// each bin is assigned to its nearest semitone, then wrapped mod 12.
    pub fn from_spectrogram(spec: &Spectrogram) -> Self {
        let half = spec
            .magnitudes
            .first()
            .map(|m| m.len())
            .unwrap_or_default();

        // Precompute bin -> pitch class; None for out-of-range bins.
        let bin_class: Vec<Option<usize>> = (0..half)
            .map(|bin| {
                let freq = bin as f32 * spec.bin_hz;
                if !(MIN_PITCH_HZ..=MAX_PITCH_HZ).contains(&freq) {
                    return None;
                }
                // MIDI note number; A4 = 440 Hz = 69.
                let midi = 69.0 + 12.0 * (freq / 440.0).log2();
                let class = (midi.round() as i32).rem_euclid(12);
                Some(class as usize)
            })
            .collect();

        let frames = spec
            .magnitudes
            .iter()
            .map(|mags| {
                let mut chroma = [0.0f32; 12];
                for (bin, &mag) in mags.iter().enumerate() {
                    if let Some(class) = bin_class[bin] {
                        chroma[class] += mag * mag;
                    }
                }
                chroma
            })
            .collect();

        Self { frames }
    }

    /// Time-averaged pitch-class profile.
    pub fn mean_profile(&self) -> [f32; 12] {
        let mut profile = [0.0f32; 12];
        if self.frames.is_empty() {
            return profile;
        }
        for frame in &self.frames {
            for (acc, &v) in profile.iter_mut().zip(frame.iter()) {
                *acc += v;
            }
        }
        for v in profile.iter_mut() {
            *v /= self.frames.len() as f32;
        }
        profile
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin())
            .collect()
    }

    fn dominant_class(profile: &[f32; 12]) -> usize {
        profile
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .unwrap()
            .0
    }

    #[test]
    fn matrix_width_matches_frame_grid() {
        let samples = sine(440.0, 22050, 1.0);
        let spec = Spectrogram::compute(&samples, 22050, 2048, 512).unwrap();
        let chroma = ChromaMatrix::from_spectrogram(&spec);
        assert_eq!(chroma.frames.len(), spec.grid.frame_count);
    }

    #[test]
    fn a440_lands_in_class_a() {
        let samples = sine(440.0, 22050, 2.0);
        let spec = Spectrogram::compute(&samples, 22050, 2048, 512).unwrap();
        let chroma = ChromaMatrix::from_spectrogram(&spec);
        assert_eq!(dominant_class(&chroma.mean_profile()), 9); // A
    }

    #[test]
    fn middle_c_lands_in_class_c() {
        let samples = sine(261.63, 22050, 2.0);
        let spec = Spectrogram::compute(&samples, 22050, 2048, 512).unwrap();
        let chroma = ChromaMatrix::from_spectrogram(&spec);
        assert_eq!(dominant_class(&chroma.mean_profile()), 0); // C
    }

    #[test]
    fn chroma_is_non_negative() {
        let samples = sine(330.0, 22050, 1.0);
        let spec = Spectrogram::compute(&samples, 22050, 2048, 512).unwrap();
        let chroma = ChromaMatrix::from_spectrogram(&spec);
        for frame in &chroma.frames {
            assert!(frame.iter().all(|&v| v >= 0.0));
        }
    }
}
