use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender, TryRecvError};
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

use rodio::cpal::{
    self,
    traits::{DeviceTrait, HostTrait},
};
use rodio::stream::{OutputStream, OutputStreamBuilder};
use rodio::Source;

use crate::config::TICK_MAX;
use crate::error::EngineError;
use crate::producer::AudioBuffer;

/// plays buffers in order; opened, written and closed on the streaming thread.
/// `write` blocks while the device is full, which paces the loop to real time
pub trait AudioSink {
    /// hand one buffer to the device, blocking while the device is full
    fn write(&mut self, buffer: &AudioBuffer) -> Result<(), EngineError>;

    /// release the device
    fn close(self) -> Result<(), EngineError>
    where
        Self: Sized;
}

/// names of the output devices on the default host
pub fn output_device_names() -> Result<Vec<String>, EngineError> {
    let host = cpal::default_host();
    let devices = host.output_devices().map_err(EngineError::device)?;
    Ok(devices.filter_map(|d| d.name().ok()).collect())
}

fn open_stream(device: Option<&str>) -> Result<OutputStream, EngineError> {
    let Some(name) = device else {
        return OutputStreamBuilder::open_default_stream().map_err(EngineError::device);
    };

    let host = cpal::default_host();
    let dev = host
        .output_devices()
        .map_err(EngineError::device)?
        .find(|d| d.name().map(|n| n == name).unwrap_or(false))
        .ok_or_else(|| EngineError::DeviceUnavailable(format!("no output device named {name:?}")))?;

    OutputStreamBuilder::from_device(dev)
        .map_err(EngineError::device)?
        .open_stream()
        .map_err(EngineError::device)
}

/// rodio output stream fed from the streaming thread through a one-slot channel
pub struct RodioSink {
    stream: OutputStream,
    tx: SyncSender<AudioBuffer>,
    drained_rx: Receiver<()>,
    underruns: Arc<AtomicU64>,
}

impl RodioSink {
    pub fn open(device: Option<&str>, sample_rate: u32) -> Result<Self, EngineError> {
        let mut stream = open_stream(device)?;
        stream.log_on_drop(false);

        let (tx, rx) = mpsc::sync_channel(1);
        let (drained_tx, drained_rx) = mpsc::channel();
        let underruns = Arc::new(AtomicU64::new(0));

        stream.mixer().add(ChannelSource {
            rx,
            current: None,
            pos: 0,
            starved: true,
            sample_rate,
            underruns: underruns.clone(),
            drained: Some(drained_tx),
        });

        tracing::info!(device = device.unwrap_or("default"), sample_rate, "output stream opened");
        Ok(Self { stream, tx, drained_rx, underruns })
    }
}

impl AudioSink for RodioSink {
    fn write(&mut self, buffer: &AudioBuffer) -> Result<(), EngineError> {
        self.tx
            .send(buffer.clone())
            .map_err(|_| EngineError::DeviceUnavailable("output stream closed".into()))
    }

    fn close(self) -> Result<(), EngineError> {
        let Self { stream, tx, drained_rx, underruns } = self;
        drop(tx);

        // let the queued tail play out; a dead device just times out here
        match drained_rx.recv_timeout(Duration::from_secs_f64(TICK_MAX * 2.0)) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {}
            Err(RecvTimeoutError::Timeout) => tracing::warn!("output stream did not drain before close"),
        }

        let underruns = underruns.load(Ordering::Relaxed);
        if underruns > 0 {
            tracing::warn!(underruns, "buffer underruns during session");
        }
        drop(stream);
        tracing::info!("output stream closed");
        Ok(())
    }
}

/// rodio source pulling buffers off the channel; plays silence when nothing is queued
struct ChannelSource {
    rx: Receiver<AudioBuffer>,
    current: Option<AudioBuffer>,
    pos: usize,
    starved: bool,
    sample_rate: u32,
    underruns: Arc<AtomicU64>,
    drained: Option<mpsc::Sender<()>>,
}

impl Iterator for ChannelSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        loop {
            if let Some(buf) = &self.current {
                if let Some(&s) = buf.get(self.pos) {
                    self.pos += 1;
                    return Some(s);
                }
            }

            match self.rx.try_recv() {
                Ok(buf) => {
                    self.current = Some(buf);
                    self.pos = 0;
                    self.starved = false;
                }
                Err(TryRecvError::Empty) => {
                    if !self.starved {
                        self.starved = true;
                        self.underruns.fetch_add(1, Ordering::Relaxed);
                    }
                    return Some(0.0);
                }
                Err(TryRecvError::Disconnected) => {
                    if let Some(tx) = self.drained.take() {
                        let _ = tx.send(());
                    }
                    return None;
                }
            }
        }
    }
}

impl Source for ChannelSource {
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
