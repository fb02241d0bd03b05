use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::warn;

use crate::error::{Error, Result};
use crate::note::{parse_time_signature, strip_comments, MelodyFile, NoteEvent};

/// One accumulated beat-window's worth of events, ready to hand to a preset.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockEvent {
    pub time: f64,
    pub notes: Vec<f64>,
    pub durations: Vec<f64>,
    pub intensity: Vec<f64>,
}

/// Loads a directory of (possibly comment-annotated) melody files and plays
/// one of them back hand-by-hand, wrapping around each hand independently.
#[derive(Debug)]
pub struct Compositor {
    melodies: HashMap<String, Vec<Vec<NoteEvent>>>,
    tempos: HashMap<String, f64>,
    meters: HashMap<String, (u32, u32)>,
    default_intensity: f64,
    current_melody: Option<String>,
    current_hands: Vec<Vec<NoteEvent>>,
    idxs: Vec<usize>,
}

impl Compositor {
    pub fn new(default_intensity: f64) -> Self {
        Self {
            melodies: HashMap::new(),
            tempos: HashMap::new(),
            meters: HashMap::new(),
            default_intensity,
            current_melody: None,
            current_hands: Vec::new(),
            idxs: Vec::new(),
        }
    }

    pub fn load_repo(repo_path: &Path, default_intensity: f64) -> Result<Self> {
        let mut compositor = Self::new(default_intensity);

        let mut paths: Vec<_> = fs::read_dir(repo_path)
            .map_err(|source| Error::Io {
                path: repo_path.to_path_buf(),
                source,
            })?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        paths.sort();

        for path in paths {
            let raw = fs::read_to_string(&path).map_err(|source| Error::Io {
                path: path.clone(),
                source,
            })?;
            let stripped = strip_comments(&raw);
            let parsed: MelodyFile =
                serde_json::from_str(&stripped).map_err(|source| Error::Malformed {
                    path: path.clone(),
                    source,
                })?;

            let name = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("melody")
                .to_string();

            let hands_raw = parsed
                .hands
                .clone()
                .or_else(|| parsed.notes.clone().map(|notes| vec![notes]));

            let Some(hands_raw) = hands_raw else {
                warn!(melody = %name, "melody file has neither hands nor notes, skipping");
                continue;
            };

            let hands: Vec<Vec<NoteEvent>> = hands_raw
                .into_iter()
                .map(|hand| {
                    hand.into_iter()
                        .map(|ev| ev.into_note_event(default_intensity))
                        .collect::<Vec<NoteEvent>>()
                })
                .filter(|hand: &Vec<NoteEvent>| !hand.is_empty())
                .collect();

            if hands.is_empty() {
                warn!(melody = %name, "melody file produced no valid events, skipping");
                continue;
            }

            if let Some(tempo) = parsed.tempo {
                compositor.tempos.insert(name.clone(), tempo);
            }
            compositor
                .meters
                .insert(name.clone(), parse_time_signature(parsed.time_signature.as_deref()));
            compositor.melodies.insert(name, hands);
        }

        if compositor.melodies.is_empty() {
            return Err(Error::EmptyRepository(repo_path.to_path_buf()));
        }

        Ok(compositor)
    }

    pub fn melody_names(&self) -> impl Iterator<Item = &str> {
        self.melodies.keys().map(|s| s.as_str())
    }

    pub fn start(&mut self, name: &str) -> Result<()> {
        let hands = self
            .melodies
            .get(name)
            .ok_or_else(|| Error::UnknownMelody(name.to_string()))?;
        self.current_hands = hands.clone();
        self.idxs = vec![0; self.current_hands.len()];
        self.current_melody = Some(name.to_string());
        Ok(())
    }

    pub fn current_melody(&self) -> Option<&str> {
        self.current_melody.as_deref()
    }

    pub fn full_sequence(&self) -> Vec<NoteEvent> {
        self.current_hands.first().cloned().unwrap_or_default()
    }

    /// Advances every hand by one event, wrapping each hand's index
    /// independently.
    pub fn next_event(&mut self) -> Vec<NoteEvent> {
        if self.current_hands.is_empty() {
            return vec![(0.0, 1.0, 0.0)];
        }
        let mut events = Vec::with_capacity(self.current_hands.len());
        for (hi, hand) in self.current_hands.iter().enumerate() {
            let idx = self.idxs[hi];
            events.push(hand[idx]);
            self.idxs[hi] = (idx + 1) % hand.len();
        }
        events
    }

    /// Accumulates events until `beats` worth of time has been covered,
    /// advancing by the mean duration across hands each step.
    pub fn next_block_events(&mut self, beats: f64) -> Vec<BlockEvent> {
        let mut out = Vec::new();
        let mut time_acc = 0.0;
        while time_acc < beats {
            let events = self.next_event();
            let notes: Vec<f64> = events.iter().map(|e| e.0).collect();
            let durations: Vec<f64> = events.iter().map(|e| e.1).collect();
            let intensity: Vec<f64> = events.iter().map(|e| e.2).collect();

            let mean_duration = durations.iter().sum::<f64>() / durations.len() as f64;

            out.push(BlockEvent {
                time: time_acc,
                notes,
                durations,
                intensity,
            });

            time_acc += mean_duration;
        }
        out
    }

    pub fn get_tempo(&self, default: f64) -> f64 {
        self.current_melody
            .as_deref()
            .and_then(|name| self.tempos.get(name))
            .copied()
            .unwrap_or(default)
    }

    pub fn get_meter(&self) -> (u32, u32) {
        self.current_melody
            .as_deref()
            .and_then(|name| self.meters.get(name))
            .copied()
            .unwrap_or((4, 4))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_melody(dir: &Path, name: &str, contents: &str) {
        let mut file = fs::File::create(dir.join(name)).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    #[test]
    fn loads_hands_and_notes_variants() {
        let dir = tempfile::tempdir().unwrap();
        write_melody(
            dir.path(),
            "a_hands.json",
            r#"{
                // a two-handed melody
                "tempo": 100,
                "time_signature": "3/4",
                "hands": [
                    [{"frequency": 440.0, "duration_beats": 0.5},
                     {"frequency": 220.0, "duration": 0.5, "intensity": 0.9}],
                    [{"frequency": 110.0, "duration_beats": 1.0}]
                ]
            }"#,
        );
        write_melody(
            dir.path(),
            "b_notes.json",
            r#"{ "notes": [{"frequency": 330.0, "duration_beats": 0.25}] }"#,
        );

        let compositor = Compositor::load_repo(dir.path(), 0.8).unwrap();
        assert_eq!(compositor.melodies.len(), 2);
        assert_eq!(compositor.tempos.get("a_hands"), Some(&100.0));
        assert_eq!(compositor.meters.get("a_hands"), Some(&(3, 4)));
        assert_eq!(compositor.meters.get("b_notes"), Some(&(4, 4)));
    }

    #[test]
    fn empty_repo_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = Compositor::load_repo(dir.path(), 0.8).unwrap_err();
        assert!(matches!(err, Error::EmptyRepository(_)));
    }

    #[test]
    fn next_event_wraps_independently_per_hand() {
        let dir = tempfile::tempdir().unwrap();
        write_melody(
            dir.path(),
            "mel.json",
            r#"{"hands": [
                [{"frequency": 440.0, "duration_beats": 0.5}, {"frequency": 220.0, "duration_beats": 0.5}],
                [{"frequency": 110.0, "duration_beats": 1.0}]
            ]}"#,
        );
        let mut compositor = Compositor::load_repo(dir.path(), 0.8).unwrap();
        compositor.start("mel").unwrap();

        let e1 = compositor.next_event();
        let e2 = compositor.next_event();
        let e3 = compositor.next_event();

        assert_eq!(e1[0].0, 440.0);
        assert_eq!(e2[0].0, 220.0);
        assert_eq!(e3[0].0, 440.0); // hand 0 wrapped
        assert_eq!(e1[1].0, 110.0);
        assert_eq!(e2[1].0, 110.0); // hand 1 (len 1) repeats every step
    }

    #[test]
    fn next_block_events_accumulates_past_beats() {
        let dir = tempfile::tempdir().unwrap();
        write_melody(
            dir.path(),
            "mel.json",
            r#"{"hands": [[
                {"frequency": 440.0, "duration_beats": 1.0},
                {"frequency": 440.0, "duration_beats": 1.0},
                {"frequency": 440.0, "duration_beats": 1.0}
            ]]}"#,
        );
        let mut compositor = Compositor::load_repo(dir.path(), 0.8).unwrap();
        compositor.start("mel").unwrap();

        let block = compositor.next_block_events(2.5);
        assert!(block.len() >= 3);
        assert_eq!(block[0].time, 0.0);
        assert_eq!(block[1].time, 1.0);
    }
}
