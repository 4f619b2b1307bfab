use crate::audio_patch::{Node, Tick};
use crate::state::EffectKind;

/// second harmonic, phase-locked to the fundamental
#[derive(Debug, Clone, Copy, Default)]
pub struct OvertoneNode;

impl Node for OvertoneNode {
    fn kind(&self) -> EffectKind {
        EffectKind::Overtone
    }

    fn process(&mut self, tick: &Tick, intensity: f32, out: &mut [f32]) {
        for ((sample, &phase), &a) in out.iter_mut().zip(&tick.phases).zip(&tick.amps) {
            *sample += intensity * a * (2.0 * phase).sin() as f32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_scaled_second_harmonic() {
        let tick = Tick {
            frequency: 100.0,
            sample_rate: 1_000,
            phases: vec![std::f64::consts::FRAC_PI_4, 0.0],
            amps: vec![0.5, 0.5],
        };
        let mut out = vec![0.0, 0.0];
        OvertoneNode.process(&tick, 0.5, &mut out);
        assert!((out[0] - 0.25).abs() < 1e-6);
        assert!(out[1].abs() < 1e-6);
    }

    #[test]
    fn zero_intensity_is_silent() {
        let tick = Tick {
            frequency: 100.0,
            sample_rate: 1_000,
            phases: vec![0.3, 0.9],
            amps: vec![1.0, 1.0],
        };
        let mut out = vec![0.1, -0.1];
        OvertoneNode.process(&tick, 0.0, &mut out);
        assert_eq!(out, vec![0.1, -0.1]);
    }
}
