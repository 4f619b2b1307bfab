use crate::audio_patch::{Node, Tick};
use crate::state::EffectKind;

/// symmetric hard clip at `±intensity`
#[derive(Debug, Clone, Copy, Default)]
pub struct DistortionNode;

impl Node for DistortionNode {
    fn kind(&self) -> EffectKind {
        EffectKind::Distortion
    }

    fn process(&mut self, _tick: &Tick, intensity: f32, out: &mut [f32]) {
        let limit = intensity.abs();
        for sample in out.iter_mut() {
            *sample = sample.clamp(-limit, limit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_tick() -> Tick {
        Tick { frequency: 0.0, sample_rate: 44_100, phases: vec![], amps: vec![] }
    }

    #[test]
    fn clips_both_polarities() {
        let mut out = vec![-1.0, -0.2, 0.0, 0.2, 1.0];
        DistortionNode.process(&empty_tick(), 0.5, &mut out);
        assert_eq!(out, vec![-0.5, -0.2, 0.0, 0.2, 0.5]);
    }

    #[test]
    fn zero_intensity_flattens() {
        let mut out = vec![0.9, -0.9];
        DistortionNode.process(&empty_tick(), 0.0, &mut out);
        assert!(out.iter().all(|s| *s == 0.0));
    }
}
