use maestro_core::AudioNode;

/// Wraps a built node with the FX stages that were applied to it, in the
/// order they were applied, so the scheduler's post-hooks (gain, reverb,
/// chorus) and tests can see what ran without modelling real DSP.
pub struct EffectedNode {
    inner: Box<dyn AudioNode>,
    stages: Vec<&'static str>,
}

impl EffectedNode {
    pub fn new(inner: Box<dyn AudioNode>) -> Self {
        Self {
            inner,
            stages: Vec::new(),
        }
    }

    pub fn apply(mut self, stage: &'static str) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[&'static str] {
        &self.stages
    }
}

impl AudioNode for EffectedNode {
    fn set_gain(&mut self, gain: f64) {
        self.inner.set_gain(gain);
    }

    fn gain(&self) -> f64 {
        self.inner.gain()
    }

    fn is_alive(&self) -> bool {
        self.inner.is_alive()
    }
}

/// What `PresetRegistry::create` hands back: either one sustained/timed node
/// (a single-shot preset) or a sequence of per-note nodes (a melody preset).
pub enum PresetHandle {
    Single(Box<dyn AudioNode>),
    Sequence(Vec<Box<dyn AudioNode>>),
}

impl PresetHandle {
    pub fn is_done(&self) -> bool {
        match self {
            PresetHandle::Single(node) => !node.is_alive(),
            PresetHandle::Sequence(nodes) => nodes.iter().all(|n| !n.is_alive()),
        }
    }

    pub fn set_gain(&mut self, gain: f64) {
        match self {
            PresetHandle::Single(node) => node.set_gain(gain),
            PresetHandle::Sequence(nodes) => {
                for node in nodes {
                    node.set_gain(gain);
                }
            }
        }
    }

    /// A human-readable rendering for introspection, standing in for the
    /// original's `str(instance)` on the underlying voice object.
    pub fn describe(&self) -> String {
        match self {
            PresetHandle::Single(node) => format!("Single(gain={:.3}, alive={})", node.gain(), node.is_alive()),
            PresetHandle::Sequence(nodes) => {
                let alive = nodes.iter().filter(|n| n.is_alive()).count();
                format!("Sequence({} notes, {} alive)", nodes.len(), alive)
            }
        }
    }

    pub fn apply_gain_db(&mut self, gain_db: f64) {
        let factor = 10f64.powf(gain_db / 20.0);
        match self {
            PresetHandle::Single(node) => node.set_gain(node.gain() * factor),
            PresetHandle::Sequence(nodes) => {
                for node in nodes {
                    node.set_gain(node.gain() * factor);
                }
            }
        }
    }
}
