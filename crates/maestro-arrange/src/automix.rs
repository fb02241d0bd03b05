use std::collections::HashMap;

use parking_lot::Mutex;

const DEFAULT_TARGET_LUFS: f64 = -14.0;
const DEFAULT_SAMPLE_RATE: u32 = 48_000;

/// A flat (constant) gain applied to every part regardless of measured
/// loudness. Kept as a literal constant rather than derived from
/// `target - measured`, mirroring the historical behavior exactly; the
/// measured loudness is still exposed on [`PartConfig::loudness_lufs`] for
/// callers that want the subtractive behavior instead.
const FLAT_GAIN_DB: f64 = 3.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartConfig {
    pub notes: Vec<f64>,
    pub durations: Vec<f64>,
    pub intensity: Vec<f64>,
    pub gain_db: f64,
    pub loudness_lufs: f64,
    pub enable_reverb: bool,
    pub enable_chorus: bool,
}

impl PartConfig {
    pub fn new(notes: Vec<f64>, durations: Vec<f64>, intensity: Vec<f64>) -> Self {
        Self {
            notes,
            durations,
            intensity,
            ..Default::default()
        }
    }
}

/// Batch loudness + FX-heuristic pass over a whole block's worth of parts.
/// Frequency-bin arrays (the rfft-equivalent grid) are cached by sample
/// count since the same note durations recur constantly across blocks.
pub struct AutoMixer {
    target_lufs: f64,
    sample_rate: u32,
    freq_cache: Mutex<HashMap<usize, Vec<f64>>>,
}

impl AutoMixer {
    pub fn new(target_lufs: f64, sample_rate: u32) -> Self {
        Self {
            target_lufs,
            sample_rate,
            freq_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn autoset(&self, parts: &mut HashMap<String, PartConfig>) {
        for cfg in parts.values_mut() {
            let samples = sine_stub(&cfg.notes, &cfg.durations, self.sample_rate);

            let n = samples.len();
            {
                let mut cache = self.freq_cache.lock();
                cache
                    .entry(n)
                    .or_insert_with(|| rfftfreq(n, self.sample_rate));
            }

            cfg.loudness_lufs = integrated_loudness(&samples);
            cfg.gain_db = FLAT_GAIN_DB;

            let mean_note = mean(&cfg.notes);
            cfg.enable_reverb = mean_note > 60.0;
            cfg.enable_chorus = cfg.notes.len() > 6;
        }
        let _ = self.target_lufs; // retained for the subtractive mode callers can opt into
    }
}

impl Default for AutoMixer {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_LUFS, DEFAULT_SAMPLE_RATE)
    }
}

fn sine_stub(notes: &[f64], durations: &[f64], sample_rate: u32) -> Vec<f32> {
    let sr = sample_rate as f64;
    let mut samples = Vec::new();
    for (freq, dur) in notes.iter().zip(durations.iter()) {
        let n = (sr * dur).max(1.0) as usize;
        for i in 0..n {
            let t = i as f64 / sr;
            samples.push((2.0 * std::f64::consts::PI * freq * t).sin() as f32);
        }
    }
    samples
}

fn rfftfreq(n: usize, sample_rate: u32) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let sr = sample_rate as f64;
    (0..=n / 2).map(|k| k as f64 * sr / n as f64).collect()
}

/// A rough, non-K-weighted stand-in for BS.1770 integrated loudness: RMS
/// converted to an LUFS-shaped dB scale. Good enough to rank parts against
/// each other; not a certified loudness meter.
fn integrated_loudness(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return f64::NEG_INFINITY;
    }
    let mean_sq = samples.iter().map(|s| (*s as f64).powi(2)).sum::<f64>() / samples.len() as f64;
    if mean_sq <= 0.0 {
        return f64::NEG_INFINITY;
    }
    10.0 * mean_sq.log10() - 0.691
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_db_is_the_flat_constant() {
        let mixer = AutoMixer::default();
        let mut parts = HashMap::new();
        parts.insert(
            "piano".to_string(),
            PartConfig::new(vec![72.0, 74.0], vec![0.5, 0.5], vec![0.7, 0.7]),
        );
        mixer.autoset(&mut parts);
        assert_eq!(parts["piano"].gain_db, 3.0);
        assert!(parts["piano"].loudness_lufs.is_finite());
    }

    #[test]
    fn reverb_heuristic_keys_on_mean_note() {
        let mixer = AutoMixer::default();
        let mut parts = HashMap::new();
        parts.insert(
            "bass".to_string(),
            PartConfig::new(vec![36.0, 40.0], vec![1.0, 1.0], vec![0.9, 0.9]),
        );
        parts.insert(
            "lead".to_string(),
            PartConfig::new(vec![72.0, 76.0], vec![1.0, 1.0], vec![0.7, 0.7]),
        );
        mixer.autoset(&mut parts);
        assert!(!parts["bass"].enable_reverb);
        assert!(parts["lead"].enable_reverb);
    }

    #[test]
    fn chorus_heuristic_keys_on_note_count() {
        let mixer = AutoMixer::default();
        let mut parts = HashMap::new();
        parts.insert(
            "piano".to_string(),
            PartConfig::new(vec![60.0; 7], vec![0.1; 7], vec![0.7; 7]),
        );
        mixer.autoset(&mut parts);
        assert!(parts["piano"].enable_chorus);
    }

    #[test]
    fn freq_cache_reused_for_repeated_sample_counts() {
        let mixer = AutoMixer::default();
        let mut parts = HashMap::new();
        parts.insert(
            "a".to_string(),
            PartConfig::new(vec![440.0], vec![0.1], vec![0.5]),
        );
        parts.insert(
            "b".to_string(),
            PartConfig::new(vec![440.0], vec![0.1], vec![0.5]),
        );
        mixer.autoset(&mut parts);
        assert_eq!(mixer.freq_cache.lock().len(), 1);
    }
}
