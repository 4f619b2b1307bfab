use std::path::PathBuf;

//oscillator.rs
pub const SAMPLE_RATE: u32 = 44_100;
pub const F_LOW: f64 = 110.0;
pub const NOTES_COUNT: i32 = 36;

/// top of the playable range: `NOTES_COUNT` semitones above `F_LOW`
pub fn f_high() -> f64 {
    F_LOW * 2f64.powf(NOTES_COUNT as f64 / 12.0)
}

//state.rs
pub const TICK_DEFAULT: f64 = 0.1;
pub const TICK_MIN: f64 = 0.05;
pub const TICK_MAX: f64 = 1.0;
pub const TICK_STEP: f64 = 0.05;
pub const PARAM_STEP: f32 = 0.01;
pub const INTENSITY_DEFAULT: f32 = 0.5;

//fx/beat.rs
pub const BEAT_DETUNE: f64 = 0.1;

//producer.rs
pub const NORMALIZE_EPSILON: f32 = 1e-6;

//key.rs
pub const BASE_FREQ: f64 = 440.0;
pub const A4_SEMITONES: i32 = 57;
pub const SEMITONES_PER_OCTAVE: i32 = 12;

/// runtime knobs chosen at startup; nothing here is persisted
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub sample_rate: u32,
    pub tick_seconds: f64,
    pub normalize: bool,
    pub output_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: SAMPLE_RATE,
            tick_seconds: TICK_DEFAULT,
            normalize: false,
            output_dir: PathBuf::from("."),
        }
    }
}

/// samples in one tick: `round(sample_rate * tick_seconds)`, never zero
pub fn tick_samples(sample_rate: u32, tick_seconds: f64) -> usize {
    ((sample_rate as f64 * tick_seconds).round() as usize).max(1)
}
