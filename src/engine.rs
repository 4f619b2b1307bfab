use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;

use tokio::sync::watch;

use crate::audio_system::{AudioHandle, AudioSnapshot};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::play::{EngineLifecycle, Lifecycle, StreamingLoop};
use crate::producer::BufferProducer;
use crate::recorder::Recorder;
use crate::sink::AudioSink;
use crate::state::{ControlState, EffectKind, SharedControl};

/// owns the streaming thread and the session recording
pub struct Engine {
    config: EngineConfig,
    control: SharedControl,
    recorder: Arc<Mutex<Recorder>>,
    lifecycle: Arc<Lifecycle>,
    worker: Option<JoinHandle<Result<(), EngineError>>>,
    snapshot_rx: watch::Receiver<AudioSnapshot>,
}

impl Engine {
    /// start streaming with default controls; `open_sink` runs on the streaming thread
    pub fn start<S, F>(config: EngineConfig, open_sink: F) -> Result<Self, EngineError>
    where
        S: AudioSink + 'static,
        F: FnOnce() -> Result<S, EngineError> + Send + 'static,
    {
        let mut initial = ControlState::default();
        initial.set_tick_duration(config.tick_seconds);
        Self::start_with(config, initial, open_sink)
    }

    pub fn start_with<S, F>(config: EngineConfig, initial: ControlState, open_sink: F) -> Result<Self, EngineError>
    where
        S: AudioSink + 'static,
        F: FnOnce() -> Result<S, EngineError> + Send + 'static,
    {
        let control = SharedControl::new(initial);
        let recorder = Arc::new(Mutex::new(Recorder::new(config.sample_rate)));
        let lifecycle = Arc::new(Lifecycle::new());
        let (snapshot_tx, snapshot_rx) = watch::channel(AudioSnapshot::from_control(&initial, true));

        let worker = StreamingLoop {
            producer: BufferProducer::new(config.sample_rate, config.normalize),
            control: control.clone(),
            recorder: recorder.clone(),
            lifecycle: lifecycle.clone(),
            snapshot_tx,
        }
        .spawn(open_sink)?;

        tracing::info!(
            sample_rate = config.sample_rate,
            tick_seconds = initial.tick_seconds,
            normalize = config.normalize,
            "engine started"
        );

        Ok(Self {
            config,
            control,
            recorder,
            lifecycle,
            worker: Some(worker),
            snapshot_rx,
        })
    }

    pub fn handle(&self) -> AudioHandle {
        AudioHandle::new(self.control.clone(), self.snapshot_rx.clone())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> EngineLifecycle {
        self.lifecycle.get()
    }

    pub fn control(&self) -> ControlState {
        self.control.snapshot()
    }

    pub fn set_control(&self, pitch: f32, amp: f32) {
        self.control.set_control(pitch, amp);
    }

    pub fn set_effect(&self, kind: EffectKind, enabled: bool, intensity: f32) {
        self.control.set_effect(kind, enabled, intensity);
    }

    pub fn set_mute(&self, mute: bool) {
        self.control.set_mute(mute);
    }

    pub fn set_tick_duration(&self, seconds: f64) {
        self.control.set_tick_duration(seconds);
    }

    pub fn status_string(&self) -> String {
        self.handle().status_string()
    }

    /// block until the streaming thread has exited and released the device.
    /// returns the loop's device error if it died of one; a second call is a no-op
    pub fn stop(&mut self) -> Result<(), EngineError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };
        if self.lifecycle.request_stop() {
            tracing::info!("stop requested");
        }

        let joined = worker.join();
        self.lifecycle.mark_stopped();
        joined.map_err(|_| EngineError::WorkerPanicked)?
    }

    fn recorder(&self) -> MutexGuard<'_, Recorder> {
        self.recorder.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_stopped(&self) -> Result<(), EngineError> {
        if self.worker.is_some() || self.lifecycle.get() != EngineLifecycle::Stopped {
            return Err(EngineError::RecordingInProgress);
        }
        Ok(())
    }

    /// only valid after [`Engine::stop`]
    pub fn export_session(&self) -> Result<PathBuf, EngineError> {
        self.ensure_stopped()?;
        self.recorder().export(&self.config.output_dir)
    }

    pub fn export_session_to(&self, path: &Path) -> Result<(), EngineError> {
        self.ensure_stopped()?;
        self.recorder().export_to(path)
    }

    /// drop everything recorded so far
    pub fn reset_session(&self) {
        self.recorder().new_session();
    }

    pub fn recorded_buffers(&self) -> usize {
        self.recorder().buffers().len()
    }

    pub fn recorded_samples(&self) -> Vec<f32> {
        self.recorder().samples()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.worker.is_some() {
            if let Err(e) = self.stop() {
                tracing::warn!(error = %e, "engine dropped with a failed stream");
            }
        }
    }
}
