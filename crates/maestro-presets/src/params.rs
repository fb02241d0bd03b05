use std::collections::HashMap;

/// A preset-specific parameter value, for the knobs that don't get a
/// promoted field on [`PresetParams`] (e.g. `complexity`, `num_voices`).
#[derive(Debug, Clone)]
pub enum ParamValue {
    Float(f64),
    Int(i64),
    Bool(bool),
    String(String),
}

impl ParamValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            ParamValue::Float(v) => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::String(v)
    }
}

pub fn get_param<'a>(extra: &'a HashMap<String, ParamValue>, key: &str) -> Option<&'a ParamValue> {
    extra.get(key)
}

pub fn get_param_or<'a>(
    extra: &'a HashMap<String, ParamValue>,
    key: &str,
    default: &'a ParamValue,
) -> &'a ParamValue {
    extra.get(key).unwrap_or(default)
}

/// The common knob set every `BasePreset`-style recipe accepted, plus an
/// `extra` bucket for the handful of preset-specific parameters
/// (`complexity`, `num_voices`, ...).
#[derive(Debug, Clone)]
pub struct PresetParams {
    pub intensity: f64,
    pub duration: f64,
    pub freq1: f64,
    pub freq2: Option<f64>,
    pub notes: Option<Vec<f64>>,
    pub durations: Option<Vec<f64>>,
    pub intensities: Option<Vec<f64>>,
    pub pan_pos: f64,
    pub stereo_w: f64,
    pub enable_reverb: bool,
    pub enable_chorus: bool,
    pub enable_filter: bool,
    pub filt_freq: f64,
    pub extra: HashMap<String, ParamValue>,
}

impl Default for PresetParams {
    fn default() -> Self {
        Self {
            intensity: 0.8,
            duration: 1.0,
            freq1: 440.0,
            freq2: None,
            notes: None,
            durations: None,
            intensities: None,
            pan_pos: 0.0,
            stereo_w: 0.0,
            enable_reverb: false,
            enable_chorus: false,
            enable_filter: false,
            filt_freq: 1000.0,
            extra: HashMap::new(),
        }
    }
}

impl PresetParams {
    /// Per-note intensities to drive a melody sequence: explicit
    /// `intensities` wins, otherwise the scalar `intensity` is broadcast.
    pub fn per_note_intensities(&self, len: usize) -> Vec<f64> {
        match &self.intensities {
            Some(ints) if !ints.is_empty() => {
                let mut out = ints.clone();
                out.resize(len, *ints.last().unwrap());
                out
            }
            _ => vec![self.intensity; len],
        }
    }
}
