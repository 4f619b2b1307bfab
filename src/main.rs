mod ui;

use std::path::PathBuf;

use clap::Parser;
use tokio::sync::watch;

use vtheremin::config::{EngineConfig, SAMPLE_RATE, TICK_DEFAULT};
use vtheremin::sink::{RodioSink, output_device_names};
use vtheremin::{Engine, EngineError};

#[derive(Parser, Debug)]
#[command(name = "vtheremin", about = "Mouse-played theremin that records every session to WAV")]
struct Args {
    /// Seconds of audio synthesized per tick (0.05..=1.0)
    #[arg(long, default_value_t = TICK_DEFAULT)]
    tick: f64,

    /// Directory the session recording is written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Output device name (see --list-devices)
    #[arg(long)]
    device: Option<String>,

    /// Print available output devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Scale every tick so its peak matches the volume
    #[arg(long)]
    normalize: bool,

    /// Do not write the session recording on exit
    #[arg(long)]
    no_export: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.list_devices {
        for name in output_device_names()? {
            println!("{name}");
        }
        return Ok(());
    }

    let config = EngineConfig {
        sample_rate: SAMPLE_RATE,
        tick_seconds: args.tick,
        normalize: args.normalize,
        output_dir: args.output_dir,
    };
    let device = args.device;
    let sample_rate = config.sample_rate;
    let engine = Engine::start(config, move || RodioSink::open(device.as_deref(), sample_rate))?;
    let handle = engine.handle();

    let (shutdown_tx, _shutdown_rx) = watch::channel(false);
    let ui_result = tokio::select! {
        r = ui::run_ui(handle, shutdown_tx.clone()) => r,
        _ = tokio::signal::ctrl_c() => {
            let _ = shutdown_tx.send(true);
            Ok(())
        }
    };
    if let Err(e) = &ui_result {
        tracing::error!(error = %e, "ui failed, saving the session anyway");
    }

    // stop joins the streaming thread, keep it off the async workers
    let export = !args.no_export;
    let (stopped, exported) = tokio::task::spawn_blocking(move || finish_session(engine, export)).await?;

    if let Some(path) = exported? {
        println!("session saved to {}", path.display());
    }
    stopped?;
    ui_result
}

/// stop the engine, then export unless told not to.
/// a dead device still leaves a recording, so export runs whatever stop returned
fn finish_session(
    mut engine: Engine,
    export: bool,
) -> (Result<(), EngineError>, Result<Option<PathBuf>, EngineError>) {
    let stopped = engine.stop();
    let exported = if export { engine.export_session().map(Some) } else { Ok(None) };
    (stopped, exported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    use vtheremin::{AudioBuffer, AudioSink};

    struct NullSink;

    impl AudioSink for NullSink {
        fn write(&mut self, _buffer: &AudioBuffer) -> Result<(), EngineError> {
            thread::sleep(Duration::from_millis(1));
            Ok(())
        }

        fn close(self) -> Result<(), EngineError> {
            Ok(())
        }
    }

    fn running_engine(dir: &std::path::Path) -> Engine {
        let config = EngineConfig {
            tick_seconds: 0.05,
            output_dir: dir.to_path_buf(),
            ..EngineConfig::default()
        };
        let engine = Engine::start(config, || Ok(NullSink)).unwrap();
        thread::sleep(Duration::from_millis(10));
        engine
    }

    #[test]
    fn finishing_a_running_engine_saves_the_session() {
        let dir = tempfile::tempdir().unwrap();
        let (stopped, exported) = finish_session(running_engine(dir.path()), true);
        stopped.unwrap();
        let path = exported.unwrap().unwrap();
        assert!(path.exists());
        assert_eq!(path.parent(), Some(dir.path()));
    }

    #[test]
    fn finishing_after_device_loss_still_saves() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig { output_dir: dir.path().to_path_buf(), ..EngineConfig::default() };
        let engine = Engine::start(config, || Err::<NullSink, _>(EngineError::device("gone"))).unwrap();
        let (stopped, exported) = finish_session(engine, true);
        assert!(matches!(stopped, Err(EngineError::DeviceUnavailable(_))));
        assert!(exported.unwrap().unwrap().exists());
    }

    #[test]
    fn no_export_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (stopped, exported) = finish_session(running_engine(dir.path()), false);
        stopped.unwrap();
        assert!(exported.unwrap().is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
