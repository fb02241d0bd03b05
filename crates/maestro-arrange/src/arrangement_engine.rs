use std::collections::HashMap;

use maestro_core::Compositor;

use crate::automix::{AutoMixer, PartConfig};
use crate::harmonic::HarmonicAnalyser;
use crate::orchestrator::Orchestrator;
use crate::progression::ProgressionSynth;

/// Pulls a block of melody events from the compositor, analyses it into a
/// key and chord progression, orchestrates bass/piano voicings from that
/// progression, folds the raw melody back in as its own part, and
/// auto-mixes the whole block.
pub struct ArrangementEngine {
    analyser: HarmonicAnalyser,
    progression: ProgressionSynth,
    orchestrator: Orchestrator,
    mixer: AutoMixer,
}

impl ArrangementEngine {
    pub fn new(genre: impl Into<String>) -> Self {
        Self {
            analyser: HarmonicAnalyser::new(),
            progression: ProgressionSynth::new(genre),
            orchestrator: Orchestrator::new(),
            mixer: AutoMixer::default(),
        }
    }

    /// Returns `None` when muted, the way a muted maestro skips arrangement
    /// entirely rather than producing a silent block.
    pub fn prepare_block(
        &mut self,
        compositor: &mut Compositor,
        muted: bool,
        beats: f64,
    ) -> Option<HashMap<String, PartConfig>> {
        if muted {
            return None;
        }

        let raw = compositor.next_block_events(beats);

        let melody: Vec<(f64, f64)> = raw
            .iter()
            .flat_map(|ev| ev.notes.iter().zip(ev.durations.iter()).map(|(f, d)| (*f, *d)))
            .collect();
        let analysis = self.analyser.describe(&melody);

        let chords = self.progression.next(&analysis, beats, Some(compositor.get_meter()));
        let chord_dur = beats / (chords.len().max(1) as f64);
        let rhythm = vec![chord_dur; chords.len()];

        let voiced = self.orchestrator.voice(&chords, &rhythm);
        let mut parts: HashMap<String, PartConfig> = voiced
            .into_iter()
            .map(|(name, voicing)| {
                let notes = voicing.notes.iter().map(|n| *n as f64).collect();
                (name, PartConfig::new(notes, voicing.durations, voicing.intensity))
            })
            .collect();

        let melody_notes = raw.iter().flat_map(|ev| ev.notes.clone()).collect();
        let melody_durations = raw.iter().flat_map(|ev| ev.durations.clone()).collect();
        let melody_intensity = raw.iter().flat_map(|ev| ev.intensity.clone()).collect();
        parts.insert(
            "melody".to_string(),
            PartConfig::new(melody_notes, melody_durations, melody_intensity),
        );

        self.mixer.autoset(&mut parts);
        Some(parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;

    fn compositor_with_one_melody() -> Compositor {
        let dir = tempfile::tempdir().unwrap();
        let mut file = fs::File::create(dir.path().join("mel.json")).unwrap();
        file.write_all(
            br#"{"hands": [[
                {"frequency": 440.0, "duration_beats": 1.0},
                {"frequency": 550.0, "duration_beats": 1.0},
                {"frequency": 660.0, "duration_beats": 1.0}
            ]]}"#,
        )
        .unwrap();
        let mut compositor = Compositor::load_repo(dir.path(), 0.8).unwrap();
        compositor.start("mel").unwrap();
        compositor
    }

    #[test]
    fn mute_short_circuits_before_touching_the_compositor() {
        let mut engine = ArrangementEngine::new("pop");
        let mut compositor = compositor_with_one_melody();
        assert!(engine.prepare_block(&mut compositor, true, 4.0).is_none());
    }

    #[test]
    fn unmuted_block_includes_melody_bass_and_piano_parts() {
        let mut engine = ArrangementEngine::new("pop");
        let mut compositor = compositor_with_one_melody();
        let parts = engine.prepare_block(&mut compositor, false, 4.0).unwrap();
        assert!(parts.contains_key("melody"));
        assert!(parts.contains_key("bass"));
        assert!(parts.contains_key("piano"));
    }
}
