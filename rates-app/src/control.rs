//! Host control surface: stdin commands and process signals.
//!
//! `r`/`refresh` requests a fetch, `q`/`quit` stops the tracker. Ctrl+C and
//! SIGTERM quit as well.

use std::future::Future;
use std::io::{self, BufRead, Write};

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use rates_hex::{ControlHandle, ControlSignal, RunningService, SchedulerReport};

const HELP: &str = "Commands: r (refresh now), q (quit)";

/// Prints the command list. A closed stdout is logged, not fatal.
pub fn print_help() {
    let mut out = io::stdout().lock();
    if let Err(e) = writeln!(out, "{HELP}").and_then(|()| out.flush()) {
        warn!("Failed to write to stdout: {}", e);
    }
}

/// Maps one input line to a control signal.
pub fn parse_command(line: &str) -> Option<ControlSignal> {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "refresh" => Some(ControlSignal::RefreshRequested),
        "q" | "quit" | "exit" => Some(ControlSignal::QuitRequested),
        _ => None,
    }
}

/// Reads stdin on a plain thread, so a pending read never holds up runtime shutdown.
fn spawn_stdin_reader() -> mpsc::Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel(8);
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Forwards host events to the scheduler until it stops.
pub async fn run(control: ControlHandle) {
    let mut lines = spawn_stdin_reader();
    let mut stdin_open = true;

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                control.quit();
                break;
            }
            _ = control.stopped() => break,
            line = lines.recv(), if stdin_open => match line {
                Some(Ok(line)) => match parse_command(&line) {
                    Some(signal) => {
                        info!(?signal, "Control signal");
                        if control.send(signal).is_err() {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => print_help(),
                },
                None => {
                    // Detached from a terminal; signals still work.
                    stdin_open = false;
                }
                Some(Err(e)) => {
                    warn!("Failed to read stdin: {}", e);
                    stdin_open = false;
                }
            },
        }
    }
}

/// Runs `surface` next to the scheduler until the scheduler stops.
///
/// A panicking surface stops the scheduler (in-flight fetches still drain)
/// and is reported as an error, as is a scheduler failure.
pub async fn supervise<F>(running: RunningService, surface: F) -> anyhow::Result<SchedulerReport>
where
    F: Future<Output = ()> + Send + 'static,
{
    let RunningService { control, task } = running;
    let mut surface = tokio::spawn(surface);

    let surface_failure = tokio::select! {
        joined = &mut surface => match joined {
            Err(e) if e.is_panic() => {
                error!("Control surface panicked: {}", e);
                control.quit();
                Some(anyhow::anyhow!("Control surface panicked: {}", e))
            }
            _ => None,
        },
        _ = control.stopped() => None,
    };

    let result = task.await;
    surface.abort();

    if let Some(e) = surface_failure {
        return Err(e);
    }
    match result {
        Ok(Ok(report)) => Ok(report),
        Ok(Err(e)) => Err(e.into()),
        Err(e) => Err(anyhow::anyhow!("Scheduler task failed: {}", e)),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping tracker...");
}
