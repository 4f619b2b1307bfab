use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("recording in progress: stop the engine before exporting")]
    RecordingInProgress,
    #[error("export to {path:?} failed: {source}")]
    ExportFailed {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
    #[error("could not spawn streaming thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("streaming thread panicked")]
    WorkerPanicked,
}

impl EngineError {
    pub fn device(err: impl std::fmt::Display) -> Self {
        EngineError::DeviceUnavailable(err.to_string())
    }
}
