//! # Controller Worker
//!
//! The read-decode-process loop, run on a dedicated thread.
//!
//! Each iteration:
//! 1. Drain pending [`ControllerCommand`]s
//! 2. Read one report (bounded wait; a timeout just loops)
//! 3. Decode and hand it to the [`Controller`]
//! 4. Write the resulting output reports before the next read
//!
//! A read error is device loss: `Disconnected` is emitted and the loop ends.

use std::thread::JoinHandle;

use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, info, warn};

use super::events::ControllerCommand;
use super::state_machine::Controller;
use crate::error::{Result, WiiboardError};
use crate::transport::Transport;
use crate::wiimote::decoder::decode_report;
use crate::wiimote::protocol::MAX_REPORT_SIZE;

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerExit {
    /// A `Shutdown` command was received
    Shutdown,
    /// The device stopped answering
    Disconnected,
}

/// Runs the loop on the current thread until shutdown or device loss.
pub fn run(
    controller: &mut Controller,
    transport: &mut dyn Transport,
    commands: &mut UnboundedReceiver<ControllerCommand>,
    read_timeout_ms: i32,
) -> WorkerExit {
    let mut buf = [0u8; MAX_REPORT_SIZE];
    info!("Worker started");

    loop {
        loop {
            match commands.try_recv() {
                Ok(ControllerCommand::Shutdown) => {
                    info!("Worker stopping (shutdown requested)");
                    return WorkerExit::Shutdown;
                }
                Ok(command) => controller.handle_command(command),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }

        let len = match transport.read(&mut buf, read_timeout_ms) {
            Ok(0) => continue,
            Ok(n) => n,
            Err(e) => {
                error!("Device read failed: {}", e);
                controller.disconnect();
                return WorkerExit::Disconnected;
            }
        };

        let report = decode_report(&buf[..len]);
        for output in controller.handle_report(report) {
            if let Err(e) = transport.write(&output) {
                warn!("Failed to write report {:02x?}: {}", output, e);
            }
        }
    }
}

/// Moves the controller and transport onto a named worker thread.
///
/// # Errors
///
/// Returns `Io` if the thread cannot be spawned.
pub fn spawn(
    mut controller: Controller,
    mut transport: Box<dyn Transport>,
    mut commands: UnboundedReceiver<ControllerCommand>,
    read_timeout_ms: i32,
) -> Result<JoinHandle<WorkerExit>> {
    std::thread::Builder::new()
        .name("wiimote-worker".into())
        .spawn(move || run(&mut controller, &mut *transport, &mut commands, read_timeout_ms))
        .map_err(WiiboardError::Io)
}
