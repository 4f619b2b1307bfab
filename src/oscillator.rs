use std::f64::consts::TAU;

use crate::audio_patch::Tick;
use crate::config::{F_LOW, f_high};

/// pitch in [0, 1] → `F_LOW..=f_high()`, linear
pub fn pitch_to_frequency(pitch: f32) -> f64 {
    let pitch = crate::state::clamp_unit(pitch) as f64;
    F_LOW + (f_high() - F_LOW) * pitch
}

/// carried from one tick to the next so buffers join without a seam
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OscillatorState {
    /// phase of the next sample, in radians, wrapped to `[0, TAU)`
    pub carry_phase: f64,
    /// envelope level reached at the end of the previous tick
    pub last_amplitude: f32,
}

#[derive(Debug, Clone)]
pub struct Oscillator {
    sample_rate: u32,
    state: OscillatorState,
}

impl Oscillator {
    pub fn new(sample_rate: u32) -> Self {
        Self::with_state(sample_rate, OscillatorState::default())
    }

    pub fn with_state(sample_rate: u32, state: OscillatorState) -> Self {
        Self { sample_rate, state }
    }

    pub fn state(&self) -> OscillatorState {
        self.state
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// one tick of `A_k * sin(phase_k)`, amplitude ramped from the last tick's level.
    /// the returned tick carries per-sample phase and envelope for the effects
    pub fn render(&mut self, frequency: f64, amplitude: f32, out: &mut [f32]) -> Tick {
        let len = out.len();
        let sr = self.sample_rate as f64;
        let step = TAU * frequency / sr;
        let start = self.state.last_amplitude;
        let target = crate::state::clamp_unit(amplitude);

        let mut phases = Vec::with_capacity(len);
        let mut amps = Vec::with_capacity(len);
        for (k, sample) in out.iter_mut().enumerate() {
            let phase = step * k as f64 + self.state.carry_phase;
            let a = start + (target - start) * (k + 1) as f32 / len as f32;
            *sample = a * phase.sin() as f32;
            phases.push(phase);
            amps.push(a);
        }

        if len > 0 {
            self.state.carry_phase = (self.state.carry_phase + step * len as f64).rem_euclid(TAU);
            self.state.last_amplitude = target;
        }

        Tick {
            frequency,
            sample_rate: self.sample_rate,
            phases,
            amps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_edges_hit_range_bounds() {
        assert_eq!(pitch_to_frequency(0.0), F_LOW);
        assert!((pitch_to_frequency(1.0) - f_high()).abs() < 1e-9);
        assert!((pitch_to_frequency(0.5) - (F_LOW + f_high()) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn first_sample_starts_at_carry_phase() {
        let mut osc = Oscillator::with_state(
            44_100,
            OscillatorState { carry_phase: 0.0, last_amplitude: 1.0 },
        );
        let mut out = vec![0.0; 64];
        osc.render(440.0, 1.0, &mut out);
        assert!(out[0].abs() < 1e-6);
        assert!(out[1] > 0.0 && out[1] < 0.1);
    }

    #[test]
    fn amplitude_ramps_to_target() {
        let mut osc = Oscillator::new(1_000);
        let mut out = vec![0.0; 10];
        let tick = osc.render(100.0, 0.8, &mut out);
        assert!(tick.amps[0] > 0.0 && tick.amps[0] < 0.1);
        assert!((tick.amps[9] - 0.8).abs() < 1e-6);
        assert!(tick.amps.windows(2).all(|w| w[1] >= w[0]));
        assert_eq!(osc.state().last_amplitude, 0.8);
    }

    #[test]
    fn carry_phase_stays_wrapped() {
        let mut osc = Oscillator::new(44_100);
        let mut out = vec![0.0; 4410];
        for _ in 0..50 {
            osc.render(873.3, 0.5, &mut out);
            let phase = osc.state().carry_phase;
            assert!((0.0..TAU).contains(&phase));
        }
    }
}
