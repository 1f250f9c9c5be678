/// Summary scalars the genre rules read.
#[derive(Clone, Copy, Debug)]
pub struct GenreFeatures {
    pub bpm: f32,
    pub spectral_centroid: f32,
    pub zero_crossing_rate: f32,
    pub spectral_rolloff: f32,
    pub spectral_bandwidth: f32,
}

type GenreRule = fn(&GenreFeatures) -> Option<&'static str>;

/// The cascade is an ordered rule table: rules are tried top to bottom and
/// the first match wins, so later, broader rules act as fallbacks. Order
/// and thresholds are part of the output contract, not tunables.
const GENRE_RULES: [GenreRule; 12] = [
    // Fast, bright, wide spectrum.
    |f| {
        (f.bpm > 120.0 && f.spectral_centroid > 2500.0 && f.spectral_bandwidth > 1800.0)
            .then(|| if f.bpm > 140.0 { "Electronic" } else { "Dance" })
    },
    // Noisy with high rolloff.
    |f| {
        (f.zero_crossing_rate > 0.1 && f.spectral_rolloff > 4000.0).then(|| {
            if f.bpm > 140.0 && f.spectral_centroid > 3000.0 {
                "Metal"
            } else {
                "Rock"
            }
        })
    },
    |f| ((80.0..=110.0).contains(&f.bpm) && f.spectral_centroid < 2000.0).then_some("Hip-Hop"),
    |f| {
        ((70.0..=100.0).contains(&f.bpm)
            && f.spectral_centroid < 2500.0
            && f.zero_crossing_rate < 0.08)
            .then_some("R&B")
    },
    |f| (f.spectral_bandwidth > 2000.0 && (100.0..=140.0).contains(&f.bpm)).then_some("Jazz"),
    |f| (f.spectral_bandwidth > 2200.0 && f.bpm < 140.0).then_some("Classical"),
    |f| {
        ((90.0..=130.0).contains(&f.bpm)
            && (1500.0..=2500.0).contains(&f.spectral_centroid))
            .then_some("Country")
    },
    |f| (f.bpm < 100.0 && f.spectral_centroid < 1800.0).then_some("Blues"),
    |f| (100.0..=130.0).contains(&f.bpm).then_some("Pop"),
    |f| (90.0..=140.0).contains(&f.bpm).then_some("Indie"),
    |f| ((80.0..=110.0).contains(&f.bpm) && f.zero_crossing_rate < 0.09).then_some("Reggae"),
    // Tempo-only fallback.
    |f| {
        Some(if f.bpm < 80.0 {
            "Ballad"
        } else if f.bpm > 150.0 {
            "Punk"
        } else {
            "Alternative"
        })
    },
];

pub fn classify_genre(features: &GenreFeatures) -> &'static str {
    for rule in &GENRE_RULES {
        if let Some(label) = rule(features) {
            return label;
        }
    }
    // The last rule always matches.
    unreachable!("genre fallback rule did not fire")
}

/// Human-readable tempo label.
pub fn tempo_description(bpm: f32) -> &'static str {
    if bpm < 60.0 {
        "Very Slow"
    } else if bpm < 80.0 {
        "Slow"
    } else if bpm < 100.0 {
        "Moderate"
    } else if bpm < 120.0 {
        "Medium Fast"
    } else if bpm < 140.0 {
        "Fast"
    } else if bpm < 160.0 {
        "Very Fast"
    } else {
        "Extremely Fast"
    }
}
