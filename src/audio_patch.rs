use crate::fx::{beat::BeatNode, distortion::DistortionNode, overtone::OvertoneNode};
use crate::state::{ControlState, EffectKind};

/// per-sample phase and envelope of the fundamental for one tick, so effects can lock to it
#[derive(Debug, Clone)]
pub struct Tick {
    pub frequency: f64,
    pub sample_rate: u32,
    pub phases: Vec<f64>,
    pub amps: Vec<f32>,
}

impl Tick {
    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }
}

/// an effect/processor that transforms the tick's signal in place (overtone, beat, clip)
pub trait Node: Send {
    fn kind(&self) -> EffectKind;

    fn process(&mut self, tick: &Tick, intensity: f32, out: &mut [f32]);

    /// called instead of `process` while the effect is switched off
    fn advance(&mut self, _tick: &Tick, _intensity: f32) {}

    fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// the fixed chain: overtone → beat → distortion
pub struct EffectChain {
    nodes: Vec<Box<dyn Node>>,
}

impl EffectChain {
    pub fn new() -> Self {
        Self {
            nodes: vec![
                Box::new(OvertoneNode),
                Box::new(BeatNode::default()),
                Box::new(DistortionNode),
            ],
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.nodes.iter().map(|n| n.name()).collect()
    }

    pub fn apply(&mut self, tick: &Tick, control: &ControlState, out: &mut [f32]) {
        for node in &mut self.nodes {
            let params = control.effect(node.kind());
            if params.enabled {
                node.process(tick, params.intensity, out);
            } else {
                node.advance(tick, params.intensity);
            }
        }
    }
}

impl Default for EffectChain {
    fn default() -> Self {
        Self::new()
    }
}
