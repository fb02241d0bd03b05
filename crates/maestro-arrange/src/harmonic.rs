use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

use crate::theory::{chord_templates, pitch_class_name, NOTE_NAMES};

const MAJOR_PROFILE: [f64; 12] = [
    6.35, 2.23, 3.48, 2.33, 4.38, 4.09, 2.52, 5.19, 2.39, 3.66, 2.29, 2.88,
];
const MINOR_PROFILE: [f64; 12] = [
    6.33, 2.68, 3.52, 5.38, 2.60, 3.53, 2.54, 4.75, 3.98, 2.69, 3.34, 3.17,
];

const CACHE_CAPACITY: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Tonic = 0,
    Subdominant = 1,
    Dominant = 2,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicDescription {
    pub key: String,
    pub chords: Vec<String>,
    pub functions: Vec<Function>,
    pub durations: Vec<f64>,
}

type MelodyKey = Vec<(u64, u64)>;

fn cache_key(melody: &[(f64, f64)]) -> MelodyKey {
    melody
        .iter()
        .map(|(freq, dur)| (freq.to_bits(), dur.to_bits()))
        .collect()
}

fn freq_to_pitch_class(freq: f64) -> i32 {
    let midi = (69.0 + 12.0 * (freq / 440.0).log2()).round() as i32;
    midi.rem_euclid(12)
}

fn pearson(a: &[f64; 12], b: &[f64; 12]) -> f64 {
    let mean_a = a.iter().sum::<f64>() / 12.0;
    let mean_b = b.iter().sum::<f64>() / 12.0;
    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for i in 0..12 {
        let da = a[i] - mean_a;
        let db = b[i] - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return 0.0;
    }
    cov / (var_a.sqrt() * var_b.sqrt())
}

fn rotate(profile: &[f64; 12], tonic_pc: usize) -> [f64; 12] {
    let mut rotated = [0.0; 12];
    for i in 0..12 {
        rotated[(i + tonic_pc) % 12] = profile[i];
    }
    rotated
}

/// Krumhansl-style key estimation: builds a duration-weighted pitch-class
/// histogram and correlates it against all 24 rotated major/minor profiles,
/// taking the best match.
fn estimate_key(histogram: &[f64; 12]) -> (i32, &'static str) {
    let mut best = (-2.0, 0, "major");
    for tonic_pc in 0..12 {
        let major = pearson(histogram, &rotate(&MAJOR_PROFILE, tonic_pc));
        if major > best.0 {
            best = (major, tonic_pc, "major");
        }
        let minor = pearson(histogram, &rotate(&MINOR_PROFILE, tonic_pc));
        if minor > best.0 {
            best = (minor, tonic_pc, "minor");
        }
    }
    (best.1 as i32, best.2)
}

/// Real-time key, chord, and tonal-function estimation, memoized so a
/// repeated melody window (the common case in a looping compositor) doesn't
/// re-run the correlation and per-beat scan every call.
pub struct HarmonicAnalyser {
    cache: Mutex<LruCache<MelodyKey, HarmonicDescription>>,
}

impl HarmonicAnalyser {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(CACHE_CAPACITY).expect("CACHE_CAPACITY is nonzero"),
            )),
        }
    }

    pub fn describe(&self, melody: &[(f64, f64)]) -> HarmonicDescription {
        let key = cache_key(melody);
        let mut cache = self.cache.lock();
        if let Some(hit) = cache.get(&key) {
            return hit.clone();
        }
        let description = describe_uncached(melody);
        cache.put(key, description.clone());
        description
    }
}

impl Default for HarmonicAnalyser {
    fn default() -> Self {
        Self::new()
    }
}

fn describe_uncached(melody: &[(f64, f64)]) -> HarmonicDescription {
    if melody.is_empty() {
        return HarmonicDescription {
            key: "C major".to_string(),
            chords: vec!["C".to_string()],
            functions: vec![Function::Tonic],
            durations: vec![1.0],
        };
    }

    let mut histogram = [0.0; 12];
    let mut events = Vec::with_capacity(melody.len());
    let mut time = 0.0;
    for &(freq, dur) in melody {
        let pc = freq_to_pitch_class(freq);
        histogram[pc as usize] += dur;
        events.push((time, pc));
        time += dur;
    }
    let total_beats = time.ceil() as i32;
    let (tonic_pc, mode) = estimate_key(&histogram);
    let key = format!("{} {}", pitch_class_name(tonic_pc), mode);

    let templates = chord_templates();
    let mut chords = Vec::with_capacity(total_beats.max(1) as usize);
    let mut durations = Vec::with_capacity(chords.capacity());

    for b in 0..total_beats.max(1) {
        let window: Vec<i32> = events
            .iter()
            .filter(|(t, _)| *t >= b as f64 && *t < (b + 1) as f64)
            .map(|(_, pc)| *pc)
            .collect();

        let symbol = if window.is_empty() {
            let suffix = if mode == "major" { "" } else { "m" };
            format!("{}{}", pitch_class_name(tonic_pc), suffix)
        } else {
            let mut hist = [0i32; 12];
            for pc in &window {
                hist[*pc as usize] += 1;
            }
            let mut best_score = -1;
            let mut best_symbol = pitch_class_name(tonic_pc).to_string();
            for (symbol, template) in &templates {
                let score: i32 = template.iter().map(|pc| hist[*pc as usize]).sum();
                if score > best_score {
                    best_score = score;
                    best_symbol = symbol.clone();
                }
            }
            best_symbol
        };
        chords.push(symbol);
        durations.push(1.0);
    }

    let functions = chords
        .iter()
        .map(|symbol| {
            let root_name = symbol.trim_end_matches('m');
            let root_pc = NOTE_NAMES
                .iter()
                .position(|n| *n == root_name)
                .map(|p| p as i32)
                .unwrap_or(tonic_pc);
            let interval = (root_pc - tonic_pc).rem_euclid(12);
            match interval {
                7 | 11 => Function::Dominant,
                2 | 5 => Function::Subdominant,
                _ => Function::Tonic,
            }
        })
        .collect();

    HarmonicDescription {
        key,
        chords,
        functions,
        durations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn c_major_scale_is_identified_as_c_major() {
        let analyser = HarmonicAnalyser::new();
        let c_major_freqs = [261.63, 293.66, 329.63, 349.23, 392.00, 440.00, 493.88];
        let melody: Vec<(f64, f64)> = c_major_freqs.iter().map(|f| (*f, 1.0)).collect();
        let description = analyser.describe(&melody);
        assert_eq!(description.key, "C major");
    }

    #[test]
    fn describe_is_memoized() {
        let analyser = HarmonicAnalyser::new();
        let melody = vec![(440.0, 1.0), (550.0, 1.0)];
        let first = analyser.describe(&melody);
        let second = analyser.describe(&melody);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_window_falls_back_to_tonic_triad() {
        let analyser = HarmonicAnalyser::new();
        // A single long note leaves later beat-windows empty.
        let melody = vec![(440.0, 3.0)];
        let description = analyser.describe(&melody);
        assert_eq!(description.chords.len(), 3);
    }

    #[test]
    fn empty_melody_falls_back_to_c_major() {
        let analyser = HarmonicAnalyser::new();
        let description = analyser.describe(&[]);
        assert_eq!(description.key, "C major");
        assert_eq!(description.chords, vec!["C".to_string()]);
    }

    #[test]
    fn pearson_of_identical_profiles_is_one() {
        use approx::assert_relative_eq;
        assert_relative_eq!(pearson(&MAJOR_PROFILE, &MAJOR_PROFILE), 1.0, epsilon = 1e-9);
    }

    #[test]
    fn pearson_of_constant_profile_is_zero() {
        let flat = [1.0; 12];
        assert_eq!(pearson(&MAJOR_PROFILE, &flat), 0.0);
    }
}
