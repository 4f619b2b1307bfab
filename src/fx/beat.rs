use std::f64::consts::TAU;

use crate::audio_patch::{Node, Tick};
use crate::config::BEAT_DETUNE;
use crate::state::EffectKind;

/// slightly detuned second voice; interference with the fundamental gives the beating.
/// keeps its own carry phase so it stays continuous across ticks and toggles.
#[derive(Debug, Clone, Copy, Default)]
pub struct BeatNode {
    carry_phase: f64,
}

impl BeatNode {
    pub fn ratio(intensity: f32) -> f64 {
        1.0 + BEAT_DETUNE * intensity as f64
    }

    pub fn carry_phase(&self) -> f64 {
        self.carry_phase
    }

    fn step(tick: &Tick, intensity: f32) -> f64 {
        TAU * tick.frequency * Self::ratio(intensity) / tick.sample_rate as f64
    }
}

impl Node for BeatNode {
    fn kind(&self) -> EffectKind {
        EffectKind::Beat
    }

    fn process(&mut self, tick: &Tick, intensity: f32, out: &mut [f32]) {
        let step = Self::step(tick, intensity);
        for (k, (sample, &a)) in out.iter_mut().zip(&tick.amps).enumerate() {
            let phase = step * k as f64 + self.carry_phase;
            *sample += intensity * a * phase.sin() as f32;
        }
        self.advance(tick, intensity);
    }

    fn advance(&mut self, tick: &Tick, intensity: f32) {
        let step = Self::step(tick, intensity);
        self.carry_phase = (self.carry_phase + step * tick.len() as f64).rem_euclid(TAU);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oscillator::Oscillator;

    #[test]
    fn ratio_scales_with_intensity() {
        assert_eq!(BeatNode::ratio(0.0), 1.0);
        assert!((BeatNode::ratio(1.0) - 1.1).abs() < 1e-9);
    }

    #[test]
    fn split_ticks_match_one_long_tick() {
        let mut osc = Oscillator::new(44_100);
        let mut node = BeatNode::default();
        let mut joined = Vec::new();
        for _ in 0..4 {
            let mut out = vec![0.0; 1000];
            let tick = Tick { amps: vec![1.0; 1000], ..osc.render(300.0, 1.0, &mut out) };
            let mut extra = vec![0.0; 1000];
            node.process(&tick, 0.5, &mut extra);
            joined.extend(extra);
        }

        let mut long_node = BeatNode::default();
        let tick = Tick {
            frequency: 300.0,
            sample_rate: 44_100,
            phases: vec![0.0; 4000],
            amps: vec![1.0; 4000],
        };
        let mut long = vec![0.0; 4000];
        long_node.process(&tick, 0.5, &mut long);

        for (a, b) in joined.iter().zip(&long) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
    }

    #[test]
    fn advance_moves_phase_while_disabled() {
        let mut node = BeatNode::default();
        let tick = Tick { frequency: 100.0, sample_rate: 1_000, phases: vec![0.0; 3], amps: vec![0.0; 3] };
        node.advance(&tick, 0.0);
        assert!((node.carry_phase() - (TAU * 0.3)).abs() < 1e-9);
    }
}
