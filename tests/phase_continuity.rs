use std::f64::consts::TAU;

use vtheremin::oscillator::{Oscillator, OscillatorState, pitch_to_frequency};
use vtheremin::{BufferProducer, ControlState, EffectKind};

const SR: u32 = 44_100;

fn steady(amp: f32) -> OscillatorState {
    OscillatorState { carry_phase: 0.0, last_amplitude: amp }
}

fn reference(freq: f64, amp: f32, len: usize) -> Vec<f32> {
    let mut osc = Oscillator::with_state(SR, steady(amp));
    let mut out = vec![0.0; len];
    osc.render(freq, amp, &mut out);
    out
}

fn assert_close(a: &[f32], b: &[f32]) {
    assert_eq!(a.len(), b.len());
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        assert!((x - y).abs() < 1e-4, "sample {i}: {x} vs {y}");
    }
}

#[test]
fn consecutive_ticks_have_no_seams() {
    let freq = 317.25;
    let n = 4410;
    let mut osc = Oscillator::with_state(SR, steady(0.8));
    let mut joined = Vec::new();
    for _ in 0..7 {
        let mut out = vec![0.0; n];
        osc.render(freq, 0.8, &mut out);
        joined.extend(out);
    }
    assert_close(&joined, &reference(freq, 0.8, 7 * n));
}

#[test]
fn producer_ticks_match_one_long_render() {
    let mut control = ControlState::default();
    control.set_control(0.42, 0.6);
    control.set_tick_duration(0.05);

    let mut producer = BufferProducer::with_state(SR, false, steady(0.6));
    let mut joined = Vec::new();
    for _ in 0..10 {
        joined.extend_from_slice(&producer.produce(&control));
    }
    let freq = pitch_to_frequency(0.42);
    assert_close(&joined, &reference(freq, 0.6, joined.len()));
}

#[test]
fn mute_zeroes_output_but_keeps_phase_running() {
    let mut control = ControlState::default();
    control.set_control(0.3, 0.5);
    control.set_effect(EffectKind::Overtone, true, 0.8);
    control.set_effect(EffectKind::Distortion, true, 0.9);

    let mut plain = control;
    plain.set_effect(EffectKind::Overtone, false, 0.8);
    plain.set_effect(EffectKind::Distortion, false, 0.9);

    let n = 4410;
    let freq = pitch_to_frequency(0.3);
    let mut producer = BufferProducer::with_state(SR, false, steady(0.5));

    let first = producer.produce(&plain);

    let mut muted = control;
    muted.set_mute(true);
    for _ in 0..3 {
        let buf = producer.produce(&muted);
        assert!(buf.iter().all(|&s| s == 0.0));
    }

    // carry phase advanced through the muted ticks as if they had played
    let expected = (TAU * freq * (4 * n) as f64 / SR as f64).rem_euclid(TAU);
    let got = producer.oscillator_state().carry_phase;
    assert!((got.sin() - expected.sin()).abs() < 1e-9);
    assert!((got.cos() - expected.cos()).abs() < 1e-9);
    assert_eq!(producer.oscillator_state().last_amplitude, 0.5);

    let after = producer.produce(&plain);
    let reference = reference(freq, 0.5, 5 * n);
    assert_close(&first, &reference[..n]);
    assert_close(&after, &reference[4 * n..]);
}

#[test]
fn frequency_change_does_not_jump() {
    // the last sample of one tick and the first of the next stay one phase step apart
    let mut producer = BufferProducer::with_state(SR, false, steady(1.0));
    let mut control = ControlState::default();
    control.set_control(0.1, 1.0);
    let a = producer.produce(&control);
    control.set_control(0.9, 1.0);
    let b = producer.produce(&control);

    let max_step = (TAU * pitch_to_frequency(0.9) / SR as f64) as f32;
    assert!((b[0] - a[a.len() - 1]).abs() <= max_step + 1e-4);
}
