use std::collections::HashMap;

use crate::theory::{chord_templates, note_name_to_pc};

/// MIDI register bounds each orchestrated part is clamped into. `pad` and
/// `lead` are reserved for parts no current voicing routes to yet.
pub const REGISTER: &[(&str, (i32, i32))] = &[
    ("bass", (28, 48)),
    ("piano", (50, 96)),
    ("pad", (40, 84)),
    ("lead", (60, 108)),
];

fn register_bounds(role: &str) -> (i32, i32) {
    REGISTER
        .iter()
        .find(|(name, _)| *name == role)
        .map(|(_, bounds)| *bounds)
        .unwrap_or((0, 127))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartVoicing {
    pub notes: Vec<i32>,
    pub durations: Vec<f64>,
    pub intensity: Vec<f64>,
}

/// Maps chord symbols to bass + piano voicings, octave-shifting every note
/// until it lands inside its role's register.
pub struct Orchestrator {
    occurrences: HashMap<&'static str, u32>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self {
            occurrences: REGISTER.iter().map(|(name, _)| (*name, 0)).collect(),
        }
    }

    pub fn voice(&mut self, chords: &[String], rhythm: &[f64]) -> HashMap<String, PartVoicing> {
        let templates: HashMap<String, [i32; 3]> = chord_templates().into_iter().collect();

        let mut parts: HashMap<String, PartVoicing> = HashMap::new();

        for (symbol, &dur) in chords.iter().zip(rhythm.iter()) {
            let Some(pcs) = templates.get(symbol.as_str()) else {
                continue;
            };

            let bass_voicing = parts.entry("bass".to_string()).or_default();
            let bass_note = self.fit(pcs[0] + 36, "bass");
            bass_voicing.notes.push(bass_note);
            bass_voicing.durations.push(dur);
            bass_voicing.intensity.push(0.9);

            let piano_notes: Vec<i32> = pcs.iter().map(|pc| self.fit(pc + 60, "piano")).collect();
            let per_note_dur = dur / piano_notes.len() as f64;
            let piano_voicing = parts.entry("piano".to_string()).or_default();
            piano_voicing.durations.extend(vec![per_note_dur; piano_notes.len()]);
            piano_voicing.intensity.extend(vec![0.7; piano_notes.len()]);
            piano_voicing.notes.extend(piano_notes);
        }

        parts
    }

    fn fit(&mut self, midi: i32, role: &str) -> i32 {
        let (low, high) = register_bounds(role);
        let mut midi = midi;
        while midi < low {
            midi += 12;
        }
        while midi > high {
            midi -= 12;
        }
        *self.occurrences.entry(leak_role(role)).or_insert(0) += 1;
        midi
    }
}

fn leak_role(role: &str) -> &'static str {
    REGISTER
        .iter()
        .find(|(name, _)| *name == role)
        .map(|(name, _)| *name)
        .unwrap_or("piano")
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn chord_root_pc(symbol: &str) -> Option<i32> {
    note_name_to_pc(symbol.trim_end_matches('m'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bass_notes_stay_within_register() {
        let mut orchestrator = Orchestrator::new();
        let chords = vec!["C".to_string(), "G".to_string(), "Am".to_string()];
        let rhythm = vec![1.0, 1.0, 1.0];
        let parts = orchestrator.voice(&chords, &rhythm);

        let bass = &parts["bass"];
        let (low, high) = register_bounds("bass");
        for note in &bass.notes {
            assert!(*note >= low && *note <= high, "bass note {note} out of register");
        }
    }

    #[test]
    fn piano_notes_stay_within_register_and_split_duration() {
        let mut orchestrator = Orchestrator::new();
        let chords = vec!["F".to_string()];
        let rhythm = vec![3.0];
        let parts = orchestrator.voice(&chords, &rhythm);

        let piano = &parts["piano"];
        assert_eq!(piano.notes.len(), 3);
        let (low, high) = register_bounds("piano");
        for note in &piano.notes {
            assert!(*note >= low && *note <= high);
        }
        for dur in &piano.durations {
            assert!((*dur - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn intensities_match_the_original_constants() {
        let mut orchestrator = Orchestrator::new();
        let parts = orchestrator.voice(&["C".to_string()], &[1.0]);
        assert!(parts["bass"].intensity.iter().all(|i| *i == 0.9));
        assert!(parts["piano"].intensity.iter().all(|i| *i == 0.7));
    }
}
