use std::fmt::Write as _;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::{INTENSITY_DEFAULT, TICK_DEFAULT, TICK_MAX, TICK_MIN};

/// the three optional transforms, in the order the chain applies them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    Overtone,
    Beat,
    Distortion,
}

impl EffectKind {
    pub const ALL: [EffectKind; 3] = [EffectKind::Overtone, EffectKind::Beat, EffectKind::Distortion];

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::Overtone => "Overtone",
            EffectKind::Beat => "Beat",
            EffectKind::Distortion => "Distortion",
        }
    }

    /// label shown in the mode line
    pub fn label(self) -> &'static str {
        match self {
            EffectKind::Overtone => "guitar",
            EffectKind::Beat => "accordion",
            EffectKind::Distortion => "distortion",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParams {
    pub enabled: bool,
    pub intensity: f32,
}

impl EffectParams {
    pub fn new(enabled: bool, intensity: f32) -> Self {
        Self { enabled, intensity: clamp_unit(intensity) }
    }
}

impl Default for EffectParams {
    fn default() -> Self {
        Self::new(false, INTENSITY_DEFAULT)
    }
}

/// everything the synthesis side reads once per tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlState {
    pub pitch: f32,
    pub amp: f32,
    pub mute: bool,
    pub overtone: EffectParams,
    pub beat: EffectParams,
    pub distortion: EffectParams,
    pub tick_seconds: f64,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            amp: 0.0,
            mute: false,
            overtone: EffectParams::default(),
            beat: EffectParams::default(),
            distortion: EffectParams::default(),
            tick_seconds: TICK_DEFAULT,
        }
    }
}

/// clamp to [0, 1], NaN → 0
pub(crate) fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

fn clamp_tick(seconds: f64) -> f64 {
    if seconds.is_nan() { TICK_MIN } else { seconds.clamp(TICK_MIN, TICK_MAX) }
}

impl ControlState {
    pub fn set_control(&mut self, pitch: f32, amp: f32) {
        self.pitch = clamp_unit(pitch);
        self.amp = clamp_unit(amp);
    }

    pub fn effect(&self, kind: EffectKind) -> EffectParams {
        match kind {
            EffectKind::Overtone => self.overtone,
            EffectKind::Beat => self.beat,
            EffectKind::Distortion => self.distortion,
        }
    }

    fn effect_mut(&mut self, kind: EffectKind) -> &mut EffectParams {
        match kind {
            EffectKind::Overtone => &mut self.overtone,
            EffectKind::Beat => &mut self.beat,
            EffectKind::Distortion => &mut self.distortion,
        }
    }

    pub fn set_effect(&mut self, kind: EffectKind, enabled: bool, intensity: f32) {
        *self.effect_mut(kind) = EffectParams::new(enabled, intensity);
    }

    pub fn toggle_effect(&mut self, kind: EffectKind) {
        let fx = self.effect_mut(kind);
        fx.enabled = !fx.enabled;
    }

    pub fn adjust_effect(&mut self, kind: EffectKind, delta: f32) {
        let fx = self.effect_mut(kind);
        fx.intensity = clamp_unit(fx.intensity + delta);
    }

    pub fn set_mute(&mut self, mute: bool) {
        self.mute = mute;
    }

    pub fn toggle_mute(&mut self) {
        self.mute = !self.mute;
    }

    pub fn set_tick_duration(&mut self, seconds: f64) {
        self.tick_seconds = clamp_tick(seconds);
    }

    pub fn adjust_tick_duration(&mut self, delta: f64) {
        self.tick_seconds = clamp_tick(self.tick_seconds + delta);
    }

    /// e.g. `mode : [ silent guitar:50 distortion:20 ]`
    pub fn mode_string(&self) -> String {
        let mut s = String::from("mode : [");
        if self.mute {
            s.push_str(" silent");
        }
        for kind in EffectKind::ALL {
            let fx = self.effect(kind);
            if fx.enabled {
                let _ = write!(s, " {}:{}", kind.label(), (fx.intensity * 100.0) as i32);
            }
        }
        s.push_str(" ]");
        s
    }
}

/// control state shared between input callers and the streaming thread.
/// every accessor takes the lock for a single copy or mutation, so readers see whole values.
#[derive(Debug, Clone, Default)]
pub struct SharedControl {
    inner: Arc<RwLock<ControlState>>,
}

impl SharedControl {
    pub fn new(initial: ControlState) -> Self {
        Self { inner: Arc::new(RwLock::new(initial)) }
    }

    pub fn snapshot(&self) -> ControlState {
        *self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// run a mutation under the write lock
    pub fn update<R>(&self, f: impl FnOnce(&mut ControlState) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn set_control(&self, pitch: f32, amp: f32) {
        self.update(|s| s.set_control(pitch, amp));
    }

    pub fn set_effect(&self, kind: EffectKind, enabled: bool, intensity: f32) {
        self.update(|s| s.set_effect(kind, enabled, intensity));
    }

    pub fn toggle_effect(&self, kind: EffectKind) {
        self.update(|s| s.toggle_effect(kind));
    }

    pub fn adjust_effect(&self, kind: EffectKind, delta: f32) {
        self.update(|s| s.adjust_effect(kind, delta));
    }

    pub fn set_mute(&self, mute: bool) {
        self.update(|s| s.set_mute(mute));
    }

    pub fn toggle_mute(&self) {
        self.update(|s| s.toggle_mute());
    }

    pub fn set_tick_duration(&self, seconds: f64) {
        self.update(|s| s.set_tick_duration(seconds));
    }

    pub fn adjust_tick_duration(&self, delta: f64) {
        self.update(|s| s.adjust_tick_duration(delta));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_control_clamps_both_axes() {
        let mut s = ControlState::default();
        s.set_control(-3.0, 7.5);
        assert_eq!((s.pitch, s.amp), (0.0, 1.0));
        s.set_control(f32::NAN, 0.25);
        assert_eq!((s.pitch, s.amp), (0.0, 0.25));
    }

    #[test]
    fn adjust_effect_saturates() {
        let mut s = ControlState::default();
        for _ in 0..100 {
            s.adjust_effect(EffectKind::Beat, 0.01);
        }
        assert_eq!(s.beat.intensity, 1.0);
        s.adjust_effect(EffectKind::Beat, -5.0);
        assert_eq!(s.beat.intensity, 0.0);
        assert!(!s.beat.enabled);
    }

    #[test]
    fn tick_duration_is_bounded() {
        let mut s = ControlState::default();
        s.set_tick_duration(10.0);
        assert_eq!(s.tick_seconds, TICK_MAX);
        s.adjust_tick_duration(-100.0);
        assert_eq!(s.tick_seconds, TICK_MIN);
        s.set_tick_duration(f64::NAN);
        assert_eq!(s.tick_seconds, TICK_MIN);
    }

    #[test]
    fn mode_string_lists_active_effects() {
        let mut s = ControlState::default();
        assert_eq!(s.mode_string(), "mode : [ ]");
        s.toggle_mute();
        s.set_effect(EffectKind::Overtone, true, 0.5);
        s.set_effect(EffectKind::Distortion, true, 0.2);
        assert_eq!(s.mode_string(), "mode : [ silent guitar:50 distortion:20 ]");
    }

    #[test]
    fn shared_control_is_visible_across_clones() {
        let shared = SharedControl::default();
        let other = shared.clone();
        other.set_control(0.5, 0.75);
        other.toggle_effect(EffectKind::Distortion);
        let snap = shared.snapshot();
        assert_eq!((snap.pitch, snap.amp), (0.5, 0.75));
        assert!(snap.distortion.enabled);
    }
}
