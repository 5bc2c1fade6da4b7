//! # wiiboard
//!
//! Interactive whiteboard driven by a Wii Remote's IR camera.
//!
//! Usage: `wiiboard [CONFIG]`
//!
//! Without an argument the configuration is read from
//! `$XDG_CONFIG_HOME/wiiboard.toml` (or `~/.config/wiiboard.toml`).
//!
//! ## Signals
//!
//! | Signal | Action |
//! |--------|--------|
//! | SIGUSR1 | Start a calibration |
//! | SIGUSR2 | Toggle pointer tracking |
//! | SIGINT (Ctrl+C) | Shut down |

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc::unbounded_channel;
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use wiiboard::config::{Config, ConfigFile, CONFIG_FILE_NAME};
use wiiboard::controller::state_machine::CALIBRATION_POINTS;
use wiiboard::controller::worker;
use wiiboard::controller::{Controller, ControllerCommand, ControllerEvent, EventSink};
use wiiboard::desktop::uinput::UinputInjector;
use wiiboard::geometry::Quad;
use wiiboard::transport::{self, hid::HidTransport};

/// Prefix of the daily rolling log files
const LOG_FILE_PREFIX: &str = "wiiboard.log";

/// Main entry point
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration and set up logging
///    - Open the Wii Remote and write the IR camera setup sequence
///    - Create the uinput virtual pointer
///    - Start the worker thread with the saved calibration, if any
///
/// 2. **Main Loop**
///    - Forward pointer, key and volume events to the virtual device
///    - Translate signals into controller commands
///
/// 3. **Shutdown**
///    - On Ctrl+C, stop the worker and wait for it
///    - On device loss, the worker has already stopped
///
/// # Errors
///
/// Returns error if:
/// - No Wii Remote is connected
/// - The device rejects the setup sequence
/// - `/dev/uinput` cannot be opened
#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(Config::default_path)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    let loaded = Config::load_lenient(&config_path);
    let _log_guard = init_logging(loaded.config.logging.log_dir.as_deref());

    info!("wiiboard v{} starting...", env!("CARGO_PKG_VERSION"));
    let config = loaded.into_config(&config_path);

    let mut device = HidTransport::open().context("Failed to open Wii Remote")?;
    transport::initialize(&mut device, config.device.ir_sensitivity)
        .context("Failed to initialize Wii Remote")?;

    let mut injector = UinputInjector::new(config.screen.width, config.screen.height)
        .context("Failed to create virtual pointer")?;

    let (event_tx, mut events) = unbounded_channel();
    let (command_tx, commands) = unbounded_channel();

    let settings = config.controller_settings();
    let targets = Quad::inset_rectangle(
        f64::from(settings.screen_width),
        f64::from(settings.screen_height),
        settings.margin,
    );
    let store = ConfigFile::new(&config_path, config.clone());
    let controller = Controller::new(settings, Box::new(store), EventSink::new(event_tx));
    info!("Starting in {:?} mode", controller.mode());

    let worker = worker::spawn(controller, Box::new(device), commands, config.read_timeout_ms())
        .context("Failed to start worker thread")?;

    let mut sigusr1 = signal(SignalKind::user_defined1()).context("Failed to install SIGUSR1 handler")?;
    let mut sigusr2 = signal(SignalKind::user_defined2()).context("Failed to install SIGUSR2 handler")?;

    info!("Press home to calibrate, Ctrl+C to exit");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(ControllerEvent::Disconnected) | None => {
                    warn!("Wii Remote disconnected");
                    break;
                }
                Some(event) => handle_event(&mut injector, &targets, &event),
            },

            _ = sigusr1.recv() => {
                info!("Received SIGUSR1, starting calibration");
                send(&command_tx, ControllerCommand::Calibrate);
            }

            _ = sigusr2.recv() => {
                info!("Received SIGUSR2, toggling tracking");
                send(&command_tx, ControllerCommand::ToggleTracking);
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down...");
                send(&command_tx, ControllerCommand::Shutdown);
                break;
            }
        }
    }

    match tokio::task::spawn_blocking(move || worker.join()).await {
        Ok(Ok(exit)) => info!("Worker stopped: {:?}", exit),
        Ok(Err(_)) => warn!("Worker thread panicked"),
        Err(e) => warn!("Failed to wait for worker: {}", e),
    }

    Ok(())
}

/// Console logging, plus a daily rolling file when `log_dir` is set.
///
/// The returned guard flushes the file writer on drop and must live until exit.
fn init_logging(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = || EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into());

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::registry()
                .with(filter())
                .with(tracing_subscriber::fmt::layer())
                .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
                .init();

            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter()).init();
            None
        }
    }
}

fn send(commands: &tokio::sync::mpsc::UnboundedSender<ControllerCommand>, command: ControllerCommand) {
    if commands.send(command).is_err() {
        debug!("Worker already stopped, dropping {:?}", command);
    }
}

/// Forward desktop events to the injector and log the rest.
fn handle_event(injector: &mut UinputInjector, targets: &Quad, event: &ControllerEvent) {
    match *event {
        ControllerEvent::StatusReport { battery_percent, critical } => {
            if critical {
                warn!("Battery: {}% (critical)", battery_percent);
            } else {
                info!("Battery: {}%", battery_percent);
            }
        }
        ControllerEvent::CalibrationProgress { points } => match next_target(targets, points) {
            Some((x, y)) => info!(
                "Calibration {}/{}: point the pen at ({:.0}, {:.0})",
                points, CALIBRATION_POINTS, x, y
            ),
            None => info!("Calibration {}/{}: all corners captured", points, CALIBRATION_POINTS),
        },
        ControllerEvent::LaserPointer { visible, x, y } => {
            debug!("Laser pointer visible={} offset=({}, {})", visible, x, y);
        }
        _ => {
            if let Err(e) = injector.apply(event) {
                warn!("{}", e);
            }
        }
    }
}

/// Screen position of the next calibration target, after `captured` corners.
fn next_target(targets: &Quad, captured: usize) -> Option<(f64, f64)> {
    targets.0.get(captured).map(|p| (p.x, p.y))
}
