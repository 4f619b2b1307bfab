use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use hound::{SampleFormat, WavSpec, WavWriter};

use crate::error::EngineError;
use crate::producer::AudioBuffer;

/// `play_<YYYY_MM_DD_HH_MM_SS>.wav` for the given moment
pub fn session_file_name(at: DateTime<Local>) -> String {
    format!("play_{}.wav", at.format("%Y_%m_%d_%H_%M_%S"))
}

/// append-only log of every buffer streamed in a session
#[derive(Debug, Clone)]
pub struct Recorder {
    sample_rate: u32,
    log: Vec<AudioBuffer>,
}

impl Recorder {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate, log: Vec::new() }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn append(&mut self, buffer: AudioBuffer) {
        self.log.push(buffer);
    }

    /// drop the old log, start empty
    pub fn new_session(&mut self) {
        self.log = Vec::new();
    }

    pub fn buffers(&self) -> &[AudioBuffer] {
        &self.log
    }

    pub fn total_samples(&self) -> usize {
        self.log.iter().map(|b| b.len()).sum()
    }

    /// whole session, concatenated
    pub fn samples(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.total_samples());
        for buf in &self.log {
            out.extend_from_slice(buf);
        }
        out
    }

    /// write into `dir` under a timestamped name
    pub fn export(&self, dir: &Path) -> Result<PathBuf, EngineError> {
        let path = dir.join(session_file_name(Local::now()));
        self.export_to(&path)?;
        Ok(path)
    }

    /// mono 32-bit float wav. the log is kept, so a failed export can be retried
    pub fn export_to(&self, path: &Path) -> Result<(), EngineError> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let failed = |source| EngineError::ExportFailed { path: path.to_path_buf(), source };

        let mut writer = WavWriter::create(path, spec).map_err(failed)?;
        for buf in &self.log {
            for &sample in buf.iter() {
                writer.write_sample(sample).map_err(failed)?;
            }
        }
        writer.finalize().map_err(failed)?;

        tracing::info!(
            path = %path.display(),
            buffers = self.log.len(),
            samples = self.total_samples(),
            "session exported"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_uses_local_timestamp() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(session_file_name(at), "play_2024_03_09_07_05_01.wav");
    }

    #[test]
    fn samples_concatenate_in_order() {
        let mut rec = Recorder::new(44_100);
        rec.append(AudioBuffer::from(vec![1.0, 2.0]));
        rec.append(AudioBuffer::from(vec![3.0]));
        assert_eq!(rec.samples(), vec![1.0, 2.0, 3.0]);
        assert_eq!(rec.total_samples(), 3);
    }

    #[test]
    fn new_session_clears_log() {
        let mut rec = Recorder::new(44_100);
        rec.append(AudioBuffer::from(vec![0.5; 10]));
        rec.new_session();
        assert!(rec.buffers().is_empty());
    }
}
