use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicU8, Ordering},
};
use std::thread::JoinHandle;

use tokio::sync::watch;

use crate::audio_system::AudioSnapshot;
use crate::error::EngineError;
use crate::producer::BufferProducer;
use crate::recorder::Recorder;
use crate::sink::AudioSink;
use crate::state::SharedControl;

/// Running → StopRequested → Stopped; a device failure goes straight to Stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EngineLifecycle {
    Running = 0,
    StopRequested = 1,
    Stopped = 2,
}

/// lifecycle flag shared between the owner and the streaming thread
#[derive(Debug)]
pub struct Lifecycle(AtomicU8);

impl Lifecycle {
    pub fn new() -> Self {
        Self(AtomicU8::new(EngineLifecycle::Running as u8))
    }

    pub fn get(&self) -> EngineLifecycle {
        match self.0.load(Ordering::Acquire) {
            0 => EngineLifecycle::Running,
            1 => EngineLifecycle::StopRequested,
            _ => EngineLifecycle::Stopped,
        }
    }

    /// Running → StopRequested; false if the loop was no longer running
    pub fn request_stop(&self) -> bool {
        self.0
            .compare_exchange(
                EngineLifecycle::Running as u8,
                EngineLifecycle::StopRequested as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    pub fn mark_stopped(&self) {
        self.0.store(EngineLifecycle::Stopped as u8, Ordering::Release);
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// everything the streaming thread owns or shares for one session
pub struct StreamingLoop {
    pub producer: BufferProducer,
    pub control: SharedControl,
    pub recorder: Arc<Mutex<Recorder>>,
    pub lifecycle: Arc<Lifecycle>,
    pub snapshot_tx: watch::Sender<AudioSnapshot>,
}

impl StreamingLoop {
    /// start the streaming thread; the sink is opened on it, output streams can't move threads
    pub fn spawn<S, F>(self, open_sink: F) -> Result<JoinHandle<Result<(), EngineError>>, EngineError>
    where
        S: AudioSink + 'static,
        F: FnOnce() -> Result<S, EngineError> + Send + 'static,
    {
        let handle = std::thread::Builder::new()
            .name("theremin-audio".into())
            .spawn(move || self.run(open_sink))?;
        Ok(handle)
    }

    fn run<S, F>(mut self, open_sink: F) -> Result<(), EngineError>
    where
        S: AudioSink,
        F: FnOnce() -> Result<S, EngineError>,
    {
        let result = open_sink().and_then(|mut sink| {
            let pumped = self.pump(&mut sink);
            let closed = sink.close();
            pumped.and(closed)
        });

        self.lifecycle.mark_stopped();
        self.snapshot_tx.send_modify(|s| s.alive = false);
        match &result {
            Ok(()) => tracing::info!("streaming loop stopped"),
            Err(e) => tracing::error!(error = %e, "streaming loop failed"),
        }
        result
    }

    /// produce → write → record, until a stop is requested
    fn pump<S: AudioSink>(&mut self, sink: &mut S) -> Result<(), EngineError> {
        while self.lifecycle.get() == EngineLifecycle::Running {
            let control = self.control.snapshot();
            let buffer = self.producer.produce(&control);

            sink.write(&buffer)?;
            self.recorder
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .append(buffer);

            let _ = self.snapshot_tx.send(AudioSnapshot {
                frequency: self.producer.frequency(),
                volume: control.amp,
                tick_seconds: control.tick_seconds,
                alive: true,
            });
        }
        Ok(())
    }
}
