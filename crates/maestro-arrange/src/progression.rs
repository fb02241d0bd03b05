use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use tracing::warn;

use crate::harmonic::HarmonicDescription;
use crate::theory::{note_name_to_pc, Mode, Quality};

const CACHE_CAPACITY: usize = 128;

fn genre_template(genre: &str) -> Option<&'static [&'static str]> {
    match genre {
        "pop" => Some(&["I", "V", "vi", "IV"]),
        "rock" => Some(&["I", "IV", "V"]),
        "blues" => Some(&["I", "IV", "I", "V"]),
        "jazz" => Some(&["ii", "V", "I"]),
        "classical" => Some(&["I", "vi", "ii", "V"]),
        "funk" => Some(&["I", "bVII", "IV", "I"]),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Function {
    Tonic,
    Subdominant,
    Dominant,
}

fn markov_choices(from: Function) -> &'static [Function] {
    use Function::*;
    match from {
        Tonic => &[
            Subdominant, Subdominant, Subdominant, Dominant, Dominant, Tonic,
        ],
        Subdominant => &[Dominant, Dominant, Dominant, Dominant, Tonic],
        Dominant => &[Tonic, Tonic, Tonic, Tonic, Tonic, Subdominant],
    }
}

fn rn_function(rn: &str) -> Function {
    use Function::*;
    match rn {
        "I" | "i" | "vi" | "VI" | "III" | "iii" => Tonic,
        "ii" | "II" | "IV" | "iv" => Subdominant,
        "V" | "v" | "vii°" | "VII" => Dominant,
        _ => Tonic,
    }
}

fn rns_for_function(function: Function) -> &'static [&'static str] {
    use Function::*;
    match function {
        Tonic => &["I", "i", "vi", "VI", "III", "iii"],
        Subdominant => &["ii", "II", "IV", "iv"],
        Dominant => &["V", "v", "vii°", "VII"],
    }
}

/// Resolves a roman numeral against a key's tonic and mode to a
/// (pitch-class, quality) pair. The numeral's case fixes the chord's
/// quality directly (matching how these templates were written); the scale
/// degree's semitone offset still depends on the key's mode.
fn resolve_roman(rn: &str, tonic_pc: i32, mode: Mode) -> (i32, Quality) {
    let (flat, base) = match rn.strip_prefix('b') {
        Some(rest) => (true, rest),
        None => (false, rn),
    };
    let (degree, quality) = match base {
        "I" => (0, Quality::Major),
        "i" => (0, Quality::Minor),
        "II" => (1, Quality::Major),
        "ii" => (1, Quality::Minor),
        "III" => (2, Quality::Major),
        "iii" => (2, Quality::Minor),
        "IV" => (3, Quality::Major),
        "iv" => (3, Quality::Minor),
        "V" => (4, Quality::Major),
        "v" => (4, Quality::Minor),
        "VI" => (5, Quality::Major),
        "vi" => (5, Quality::Minor),
        "VII" => (6, Quality::Major),
        "vii°" => (6, Quality::Diminished),
        _ => {
            warn!(roman_numeral = %rn, "unresolvable roman numeral, falling back to I");
            (0, Quality::Major)
        }
    };
    let mut semitone = mode.scale()[degree];
    if flat {
        semitone -= 1;
    }
    let root_pc = (tonic_pc + semitone).rem_euclid(12);
    (root_pc, quality)
}

fn normalize_key(raw: &str) -> String {
    let translated: String = raw
        .chars()
        .map(|c| match c {
            '♭' => 'b',
            '♯' => '#',
            other => other,
        })
        .collect();
    let cleaned: String = translated
        .chars()
        .map(|c| {
            if c.is_ascii_alphabetic() || c == '#' || c == ' ' {
                c
            } else {
                ' '
            }
        })
        .collect();
    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    if parts.len() >= 2 {
        let mut tonic = parts[0].to_string();
        if let Some(first) = tonic.get_mut(0..1) {
            first.make_ascii_uppercase();
        }
        let mode = parts[1].to_lowercase();
        let mode = if mode == "major" || mode == "minor" {
            mode
        } else {
            "major".to_string()
        };
        format!("{tonic} {mode}")
    } else {
        "C major".to_string()
    }
}

fn parse_key(key_str: &str) -> Option<(i32, Mode)> {
    let (tonic, mode) = key_str.split_once(' ')?;
    let tonic_pc = note_name_to_pc(tonic)?;
    let mode = if mode == "minor" { Mode::Minor } else { Mode::Major };
    Some((tonic_pc, mode))
}

type CacheKey = (String, u64, Option<(u32, u32)>);

/// Rule-based chord progression generator: either cycles a genre template or
/// walks the tonic/subdominant/dominant function Markov chain, then resolves
/// each roman numeral against the analysed key.
pub struct ProgressionSynth {
    genre: Option<String>,
    cache: Mutex<LruCache<CacheKey, Vec<String>>>,
}

impl ProgressionSynth {
    pub fn new(genre: impl Into<String>) -> Self {
        let genre = genre.into();
        let genre = if genre_template(&genre).is_some() {
            Some(genre)
        } else {
            None
        };
        Self {
            genre,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(CACHE_CAPACITY).expect("CACHE_CAPACITY is nonzero"),
            )),
        }
    }

    /// `genre = None` drives the function-Markov random-walk path instead of
    /// a fixed genre template.
    pub fn random_walk() -> Self {
        Self {
            genre: None,
            cache: Mutex::new(LruCache::new(
                NonZeroUsize::new(CACHE_CAPACITY).expect("CACHE_CAPACITY is nonzero"),
            )),
        }
    }

    pub fn next(
        &self,
        analysis: &HarmonicDescription,
        beats: f64,
        time_signature: Option<(u32, u32)>,
    ) -> Vec<String> {
        let key_str = normalize_key(&analysis.key);
        match self.next_cached(&key_str, beats, time_signature) {
            Some(chords) => chords,
            None => {
                warn!(key = %key_str, "progression failed, falling back to C major");
                self.next_cached("C major", beats, time_signature)
                    .unwrap_or_else(|| vec!["C".to_string()])
            }
        }
    }

    fn next_cached(
        &self,
        key_str: &str,
        beats: f64,
        time_signature: Option<(u32, u32)>,
    ) -> Option<Vec<String>> {
        let cache_key = (key_str.to_string(), beats.to_bits(), time_signature);
        {
            let mut cache = self.cache.lock();
            if let Some(hit) = cache.get(&cache_key) {
                return Some(hit.clone());
            }
        }
        let chords = self.next_uncached(key_str, beats, time_signature)?;
        self.cache.lock().put(cache_key, chords.clone());
        Some(chords)
    }

    fn next_uncached(
        &self,
        key_str: &str,
        beats: f64,
        time_signature: Option<(u32, u32)>,
    ) -> Option<Vec<String>> {
        let (tonic_pc, mode) = parse_key(key_str)?;

        let bar_beats = time_signature
            .map(|(num, den)| num as f64 * (4.0 / den as f64))
            .unwrap_or(4.0);
        let n_bars = ((beats / bar_beats).round() as i64).max(1) as usize;

        let rns: Vec<String> = if let Some(genre) = &self.genre {
            let template = genre_template(genre)?;
            (0..n_bars)
                .map(|i| template[i % template.len()].to_string())
                .collect()
        } else {
            let mut rng = rand::thread_rng();
            let mut prev = Function::Tonic;
            let mut rns = Vec::with_capacity(n_bars);
            for _ in 0..n_bars {
                let function = *markov_choices(prev).choose(&mut rng)?;
                let candidates = rns_for_function(function);
                rns.push((*candidates.choose(&mut rng)?).to_string());
                prev = function;
            }
            rns
        };

        let chords = rns
            .iter()
            .map(|rn| {
                let (root_pc, quality) = resolve_roman(rn, tonic_pc, mode);
                format!(
                    "{}{}",
                    crate::theory::pitch_class_name(root_pc),
                    quality.symbol_suffix()
                )
            })
            .collect();

        Some(chords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(key: &str) -> HarmonicDescription {
        HarmonicDescription {
            key: key.to_string(),
            chords: vec![],
            functions: vec![],
            durations: vec![],
        }
    }

    #[test]
    fn pop_template_cycles_in_c_major() {
        let synth = ProgressionSynth::new("pop");
        let chords = synth.next(&analysis("C major"), 16.0, None);
        assert_eq!(chords, vec!["C", "G", "Am", "F"]);
    }

    #[test]
    fn funk_template_resolves_flat_seven() {
        let synth = ProgressionSynth::new("funk");
        let chords = synth.next(&analysis("C major"), 16.0, None);
        assert_eq!(chords, vec!["C", "A#", "F", "C"]);
    }

    #[test]
    fn unparseable_key_falls_back_to_c_major() {
        let synth = ProgressionSynth::new("pop");
        let chords = synth.next(&analysis("!!!garbage!!!"), 16.0, None);
        assert_eq!(chords, vec!["C", "G", "Am", "F"]);
    }

    #[test]
    fn next_is_memoized_for_identical_inputs() {
        let synth = ProgressionSynth::new("jazz");
        let a = synth.next(&analysis("D minor"), 12.0, None);
        let b = synth.next(&analysis("D minor"), 12.0, None);
        assert_eq!(a, b);
    }

    #[test]
    fn three_four_time_signature_produces_fewer_bars_than_four_four() {
        let synth = ProgressionSynth::new("pop");
        let four_four = synth.next(&analysis("C major"), 12.0, Some((4, 4)));
        let three_four = synth.next(&analysis("C major"), 12.0, Some((3, 4)));
        assert_eq!(four_four.len(), 3);
        assert_eq!(three_four.len(), 4);
    }

    #[test]
    fn random_walk_stays_within_declared_numerals() {
        let synth = ProgressionSynth::random_walk();
        let chords = synth.next(&analysis("C major"), 16.0, None);
        assert_eq!(chords.len(), 4);
    }
}
