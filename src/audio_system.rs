use tokio::sync::watch;

use crate::oscillator::pitch_to_frequency;
use crate::state::{ControlState, EffectKind, SharedControl};

/// what the UI shows: frequency, volume and tick, plus whether the stream is still alive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioSnapshot {
    pub frequency: f64,
    pub volume: f32,
    pub tick_seconds: f64,
    pub alive: bool,
}

impl AudioSnapshot {
    pub fn from_control(control: &ControlState, alive: bool) -> Self {
        Self {
            frequency: pitch_to_frequency(control.pitch),
            volume: control.amp,
            tick_seconds: control.tick_seconds,
            alive,
        }
    }

    /// `Freq = 440.00 [Hz] , Volume = 50 [%], dt = 0.10 [sec]`
    pub fn status_string(&self) -> String {
        format!(
            "Freq = {:.2} [Hz] , Volume = {} [%], dt = {:.2} [sec]",
            self.frequency,
            (self.volume * 100.0) as i32,
            self.tick_seconds
        )
    }
}

/// handle used by input collaborators: mutate controls + subscribe to live snapshots
#[derive(Clone)]
pub struct AudioHandle {
    control: SharedControl,
    snapshot_rx: watch::Receiver<AudioSnapshot>,
}

impl AudioHandle {
    pub(crate) fn new(control: SharedControl, snapshot_rx: watch::Receiver<AudioSnapshot>) -> Self {
        Self { control, snapshot_rx }
    }

    pub fn set_control(&self, pitch: f32, amp: f32) {
        self.control.set_control(pitch, amp);
    }

    pub fn set_effect(&self, kind: EffectKind, enabled: bool, intensity: f32) {
        self.control.set_effect(kind, enabled, intensity);
    }

    pub fn toggle_effect(&self, kind: EffectKind) {
        self.control.toggle_effect(kind);
    }

    pub fn adjust_effect(&self, kind: EffectKind, delta: f32) {
        self.control.adjust_effect(kind, delta);
    }

    pub fn set_mute(&self, mute: bool) {
        self.control.set_mute(mute);
    }

    pub fn toggle_mute(&self) {
        self.control.toggle_mute();
    }

    pub fn set_tick_duration(&self, seconds: f64) {
        self.control.set_tick_duration(seconds);
    }

    pub fn adjust_tick_duration(&self, delta: f64) {
        self.control.adjust_tick_duration(delta);
    }

    pub fn control(&self) -> ControlState {
        self.control.snapshot()
    }

    /// status of the current controls, not of the last tick played
    pub fn status_string(&self) -> String {
        AudioSnapshot::from_control(&self.control.snapshot(), true).status_string()
    }

    pub fn mode_string(&self) -> String {
        self.control.snapshot().mode_string()
    }

    /// snapshots published by the streaming thread after every tick
    pub fn subscribe(&self) -> watch::Receiver<AudioSnapshot> {
        self.snapshot_rx.clone()
    }
}
