use serde::{Deserialize, Serialize};

/// `(frequency_hz, duration_beats, intensity)`.
pub type NoteEvent = (f64, f64, f64);

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MelodyFile {
    pub title: Option<String>,
    pub tempo: Option<f64>,
    #[serde(rename = "time_signature")]
    pub time_signature: Option<String>,
    pub hands: Option<Vec<Vec<RawEvent>>>,
    pub notes: Option<Vec<RawEvent>>,
    #[serde(flatten)]
    pub metadata: std::collections::HashMap<String, serde_json::Value>,
}

/// One entry as it appears on disk: `{"frequency", "duration_beats"|"duration", "intensity"?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEvent {
    pub frequency: f64,
    #[serde(default, alias = "duration_beats")]
    pub duration: Option<f64>,
    pub intensity: Option<f64>,
}

impl RawEvent {
    pub fn into_note_event(self, default_intensity: f64) -> NoteEvent {
        (
            self.frequency,
            self.duration.unwrap_or(1.0),
            self.intensity.unwrap_or(default_intensity),
        )
    }
}

/// Strips `//` line comments and `/* */` block comments from a melody file's
/// raw bytes before handing them to `serde_json`. Matches the loose,
/// non-string-aware stripping the original preset repository format used:
/// a `//` or `/*` occurring inside a quoted JSON string is still treated as
/// a comment opener. Melody files in practice never quote such sequences.
pub fn strip_comments(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        if chars[i] == '/' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                i += 1;
            }
            i = (i + 2).min(chars.len());
            continue;
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

pub fn parse_time_signature(raw: Option<&str>) -> (u32, u32) {
    raw.and_then(|s| {
        let (num, den) = s.split_once('/')?;
        Some((num.trim().parse().ok()?, den.trim().parse().ok()?))
    })
    .unwrap_or((4, 4))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_and_block_comments() {
        let src = "{ // header\n\"a\": 1, /* inline\n note */ \"b\": 2 }";
        let stripped = strip_comments(src);
        assert!(!stripped.contains("//"));
        assert!(!stripped.contains("/*"));
        let value: serde_json::Value = serde_json::from_str(&stripped).unwrap();
        assert_eq!(value["a"], 1);
        assert_eq!(value["b"], 2);
    }

    #[test]
    fn parses_time_signature() {
        assert_eq!(parse_time_signature(Some("3/4")), (3, 4));
        assert_eq!(parse_time_signature(None), (4, 4));
        assert_eq!(parse_time_signature(Some("garbage")), (4, 4));
    }

    #[test]
    fn raw_event_default_intensity() {
        let event = RawEvent {
            frequency: 440.0,
            duration: Some(0.5),
            intensity: None,
        };
        assert_eq!(event.into_note_event(0.8), (440.0, 0.5, 0.8));
    }

    #[test]
    fn raw_event_default_duration_is_one_beat() {
        let event = RawEvent {
            frequency: 440.0,
            duration: None,
            intensity: Some(0.6),
        };
        assert_eq!(event.into_note_event(0.8), (440.0, 1.0, 0.6));
    }

    #[test]
    fn raw_event_accepts_duration_beats_alias() {
        let parsed: RawEvent =
            serde_json::from_str(r#"{"frequency": 440.0, "duration_beats": 2.0}"#).unwrap();
        assert_eq!(parsed.into_note_event(0.8), (440.0, 2.0, 0.8));
    }
}
