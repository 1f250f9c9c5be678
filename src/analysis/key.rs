use super::chroma::ChromaMatrix;

/// Krumhansl-Schmuckler tonal-stability profiles.
const MAJOR_PROFILE: [f32; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const MINOR_PROFILE: [f32; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Estimate the musical key from a chroma matrix.
///
/// The time-averaged profile is correlated against 12 rotations of each
/// mode template; the best of the 24 candidates names the key. Equal
/// major/minor scores resolve to major.
pub fn estimate_key(chroma: &ChromaMatrix) -> String {
    let profile = chroma.mean_profile();

    let (major_idx, major_r) = best_rotation(&profile, &MAJOR_PROFILE);
    let (minor_idx, minor_r) = best_rotation(&profile, &MINOR_PROFILE);

    if major_r >= minor_r {
        format!("{} Major", PITCH_NAMES[major_idx])
    } else {
        format!("{} Minor", PITCH_NAMES[minor_idx])
    }
}

fn best_rotation(profile: &[f32; 12], template: &[f32; 12]) -> (usize, f32) {
    let mut best = (0usize, f32::NEG_INFINITY);
    for shift in 0..12 {
        let mut rotated = [0.0f32; 12];
        for (i, &v) in template.iter().enumerate() {
            rotated[(i + shift) % 12] = v;
        }
        let r = pearson(profile, &rotated);
        if r > best.1 {
            best = (shift, r);
        }
    }
    best
}

/// Pearson correlation coefficient. A zero-variance input (silence, flat
/// chroma) yields 0.0 rather than NaN, so every candidate ties and the
/// major-first precedence produces a deterministic label.
fn pearson(a: &[f32; 12], b: &[f32; 12]) -> f32 {
    let n = a.len() as f32;
    let mean_a: f32 = a.iter().sum::<f32>() / n;
    let mean_b: f32 = b.iter().sum::<f32>() / n;

    let mut cov = 0.0f32;
    let mut var_a = 0.0f32;
    let mut var_b = 0.0f32;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    let denom = (var_a * var_b).sqrt();
    if denom <= 1e-12 {
        return 0.0;
    }
    cov / denom
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::chroma::ChromaMatrix;

    fn matrix_from_profile(profile: [f32; 12]) -> ChromaMatrix {
        ChromaMatrix {
            frames: vec![profile; 4],
        }
    }

    #[test]
    fn single_pitch_class_names_matching_root() {
        for class in 0..12 {
            let mut profile = [0.0f32; 12];
            profile[class] = 1.0;
            let key = estimate_key(&matrix_from_profile(profile));
            assert!(
                key.starts_with(PITCH_NAMES[class]),
                "class {} gave {}",
                class,
                key
            );
        }
    }

    #[test]
    fn major_template_recovers_its_own_key() {
        // A chroma profile shaped like C major must come back as C Major.
        let key = estimate_key(&matrix_from_profile(MAJOR_PROFILE));
        assert_eq!(key, "C Major");
    }

    #[test]
    fn minor_template_recovers_its_own_key() {
        let key = estimate_key(&matrix_from_profile(MINOR_PROFILE));
        assert_eq!(key, "C Minor");
    }

    #[test]
    fn rotated_major_template_follows_rotation() {
        let mut rotated = [0.0f32; 12];
        for (i, &v) in MAJOR_PROFILE.iter().enumerate() {
            rotated[(i + 7) % 12] = v; // G major
        }
        assert_eq!(estimate_key(&matrix_from_profile(rotated)), "G Major");
    }

    #[test]
    fn flat_profile_ties_break_to_major() {
        // Zero variance makes every correlation 0.0; major is compared
        // first, so the tie resolves to C Major.
        let key = estimate_key(&matrix_from_profile([1.0; 12]));
        assert_eq!(key, "C Major");
    }

    #[test]
    fn silent_chroma_is_deterministic() {
        let key = estimate_key(&ChromaMatrix { frames: vec![] });
        assert_eq!(key, "C Major");
    }

    #[test]
    fn pearson_of_identical_vectors_is_one() {
        let r = pearson(&MAJOR_PROFILE, &MAJOR_PROFILE);
        assert!((r - 1.0).abs() < 1e-5);
    }
}
