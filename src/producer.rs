use std::ops::Deref;
use std::sync::Arc;

use crate::audio_patch::EffectChain;
use crate::config::{NORMALIZE_EPSILON, tick_samples};
use crate::oscillator::{Oscillator, OscillatorState, pitch_to_frequency};
use crate::state::ControlState;

/// one tick of mono samples; immutable once produced, cheap to hand to several consumers
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Arc<[f32]>,
}

impl AudioBuffer {
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }
}

impl From<Vec<f32>> for AudioBuffer {
    fn from(samples: Vec<f32>) -> Self {
        Self { samples: samples.into() }
    }
}

impl Deref for AudioBuffer {
    type Target = [f32];

    fn deref(&self) -> &[f32] {
        &self.samples
    }
}

/// scale `buf` so its peak equals `target`; near-silent buffers are left as is.
/// returns whether scaling ran
pub fn normalize_peak(buf: &mut [f32], target: f32) -> bool {
    let peak = buf.iter().fold(0.0f32, |m, s| m.max(s.abs()));
    if peak < NORMALIZE_EPSILON {
        return false;
    }
    let gain = target / peak;
    for s in buf.iter_mut() {
        *s *= gain;
    }
    true
}

/// peak to normalize to: the volume, but never past the distortion clip level
fn normalize_target(control: &ControlState) -> f32 {
    if control.distortion.enabled {
        control.amp.min(control.distortion.intensity)
    } else {
        control.amp
    }
}

/// runs one synthesis tick: oscillator → effect chain → (normalize) → mute
pub struct BufferProducer {
    oscillator: Oscillator,
    chain: EffectChain,
    normalize: bool,
    frequency: f64,
}

impl BufferProducer {
    pub fn new(sample_rate: u32, normalize: bool) -> Self {
        Self::with_state(sample_rate, normalize, OscillatorState::default())
    }

    pub fn with_state(sample_rate: u32, normalize: bool, state: OscillatorState) -> Self {
        Self {
            oscillator: Oscillator::with_state(sample_rate, state),
            chain: EffectChain::new(),
            normalize,
            frequency: pitch_to_frequency(0.0),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.oscillator.sample_rate()
    }

    pub fn oscillator_state(&self) -> OscillatorState {
        self.oscillator.state()
    }

    /// frequency used by the most recent tick
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn tick_len(&self, control: &ControlState) -> usize {
        tick_samples(self.sample_rate(), control.tick_seconds)
    }

    pub fn produce(&mut self, control: &ControlState) -> AudioBuffer {
        let mut out = vec![0.0; self.tick_len(control)];
        self.frequency = pitch_to_frequency(control.pitch);

        let tick = self.oscillator.render(self.frequency, control.amp, &mut out);
        self.chain.apply(&tick, control, &mut out);

        if self.normalize {
            normalize_peak(&mut out, normalize_target(control));
        }
        // last, and after the oscillator has advanced, so unmuting resumes in phase
        if control.mute {
            out.fill(0.0);
        }
        AudioBuffer::from(out)
    }
}
