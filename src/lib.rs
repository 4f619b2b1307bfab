pub mod audio_patch;
pub mod audio_system;
pub mod config;
pub mod engine;
pub mod error;
pub mod fx;
pub mod key;
pub mod oscillator;
pub mod play;
pub mod producer;
pub mod recorder;
pub mod sink;
pub mod state;

pub use audio_system::{AudioHandle, AudioSnapshot};
pub use config::EngineConfig;
pub use engine::Engine;
pub use error::EngineError;
pub use play::EngineLifecycle;
pub use producer::{AudioBuffer, BufferProducer};
pub use recorder::Recorder;
pub use sink::{AudioSink, RodioSink};
pub use state::{ControlState, EffectKind, SharedControl};
