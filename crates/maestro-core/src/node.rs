use std::time::Instant;

/// A handle onto whatever a concrete audio backend produced for a voice.
///
/// Nothing in this crate renders a sample; the scheduler and reaper only
/// need to know "is this thing still sounding" and "how loud is it", the way
/// the engine's dispatch loop checks `isPlaying`/`isDone` on a backend object
/// without caring what the backend actually is.
pub trait AudioNode: Send {
    fn set_gain(&mut self, gain: f64);
    fn gain(&self) -> f64;
    fn is_alive(&self) -> bool;
}

/// A node with a fixed lifetime, computed from elapsed wall-clock time
/// against a stored duration. Stands in for whatever a real backend's
/// envelope-follower would report.
pub struct TimedNode {
    kind: &'static str,
    gain: f64,
    started: Instant,
    duration_secs: f64,
}

impl TimedNode {
    pub fn new(kind: &'static str, duration_secs: f64, gain: f64) -> Self {
        Self {
            kind,
            gain,
            started: Instant::now(),
            duration_secs,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl AudioNode for TimedNode {
    fn set_gain(&mut self, gain: f64) {
        self.gain = gain;
    }

    fn gain(&self) -> f64 {
        self.gain
    }

    fn is_alive(&self) -> bool {
        self.started.elapsed().as_secs_f64() < self.duration_secs
    }
}

/// A node that never finishes on its own (drones, pads) until explicitly
/// silenced by the caller.
pub struct SustainedNode {
    kind: &'static str,
    gain: f64,
    alive: bool,
}

impl SustainedNode {
    pub fn new(kind: &'static str, gain: f64) -> Self {
        Self {
            kind,
            gain,
            alive: true,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn silence(&mut self) {
        self.alive = false;
    }
}

impl AudioNode for SustainedNode {
    fn set_gain(&mut self, gain: f64) {
        self.gain = gain;
    }

    fn gain(&self) -> f64 {
        self.gain
    }

    fn is_alive(&self) -> bool {
        self.alive
    }
}

pub fn sine(duration_secs: f64, gain: f64) -> Box<dyn AudioNode> {
    Box::new(TimedNode::new("sine", duration_secs, gain))
}

pub fn noise(duration_secs: f64, gain: f64) -> Box<dyn AudioNode> {
    Box::new(TimedNode::new("noise", duration_secs, gain))
}

pub fn drone(gain: f64) -> Box<dyn AudioNode> {
    Box::new(SustainedNode::new("drone", gain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn timed_node_reports_alive_until_duration_elapses() {
        let node = sine(0.02, 1.0);
        assert!(node.is_alive());
        sleep(Duration::from_millis(40));
        assert!(!node.is_alive());
    }

    #[test]
    fn sustained_node_requires_explicit_silence() {
        let mut node = SustainedNode::new("drone", 1.0);
        assert!(node.is_alive());
        node.silence();
        assert!(!node.is_alive());
    }
}
