use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use chrono::Local;

use super::{MonitorError, TrackingSession};
use crate::catalog::PriceCatalog;
use crate::game_log::LogTail;

const SLEEP_SLICE: Duration = Duration::from_millis(100);

/// Requests applied by the monitor thread between polls.
pub enum MonitorCommand {
    /// Wait for the next in-game bag sort and take it as the baseline.
    StartInitialization,
    /// Drop the ledger and all statistics.
    Reset,
    /// Replace the catalog, e.g. after it was edited on disk.
    ReloadCatalog(PriceCatalog),
}

#[derive(Debug, Clone, Copy)]
pub struct MonitorSettings {
    pub poll_interval: Duration,
    /// Cadence of existence checks and reopen attempts for the log file.
    pub reopen_interval: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            reopen_interval: Duration::from_secs(30),
        }
    }
}

/// Background poll loop over the tailed game log.
///
/// Every poll reads what was appended since the last one, runs it through
/// the session pipeline and emits a tick. A failed read closes the file; it
/// is re-opened on the slower recovery cadence so rotation never spins the
/// loop. Shutdown is cooperative and observed between 100ms sleep slices.
pub struct LogMonitor {
    tail: LogTail,
    session: TrackingSession,
    settings: MonitorSettings,
    running: Arc<AtomicBool>,
    commands: Receiver<MonitorCommand>,
    last_recovery_check: Option<Instant>,
}

/// Owner-side handle of a spawned [`LogMonitor`].
pub struct MonitorHandle {
    running: Arc<AtomicBool>,
    commands: Sender<MonitorCommand>,
    thread: Option<JoinHandle<()>>,
}

impl LogMonitor {
    /// Start the monitor on its own thread.
    pub fn spawn(
        tail: LogTail,
        session: TrackingSession,
        settings: MonitorSettings,
    ) -> Result<MonitorHandle, MonitorError> {
        let running = Arc::new(AtomicBool::new(true));
        let (tx, rx) = mpsc::channel();

        let monitor = LogMonitor {
            tail,
            session,
            settings,
            running: Arc::clone(&running),
            commands: rx,
            last_recovery_check: None,
        };

        let thread = thread::Builder::new()
            .name("log-monitor".to_string())
            .spawn(move || monitor.run())
            .map_err(MonitorError::Spawn)?;

        Ok(MonitorHandle {
            running,
            commands: tx,
            thread: Some(thread),
        })
    }

    fn run(mut self) {
        if let Err(e) = self.tail.open_at_end() {
            tracing::warn!(error = %e, "Log file not available yet");
        }
        self.last_recovery_check = Some(Instant::now());
        tracing::info!(path = %self.tail.path().display(), "Log monitor started");

        while self.running.load(Ordering::SeqCst) {
            self.sleep_interruptible(self.settings.poll_interval);
            if !self.running.load(Ordering::SeqCst) {
                break;
            }

            self.drain_commands();
            self.poll_once();
            self.session.tick();
        }

        self.tail.close();
        tracing::info!("Log monitor stopped");
    }

    fn sleep_interruptible(&self, total: Duration) {
        let mut remaining = total;
        while !remaining.is_zero() && self.running.load(Ordering::SeqCst) {
            let slice = remaining.min(SLEEP_SLICE);
            thread::sleep(slice);
            remaining -= slice;
        }
    }

    fn drain_commands(&mut self) {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                MonitorCommand::StartInitialization => {
                    self.session.start_initialization();
                }
                MonitorCommand::Reset => self.session.reset(Local::now()),
                MonitorCommand::ReloadCatalog(catalog) => {
                    let resolved = self.session.replace_catalog(catalog, Local::now());
                    tracing::info!(resolved, "Catalog reloaded");
                }
            }
        }
    }

    fn poll_once(&mut self) {
        if self.tail.is_open() {
            match self.tail.read_appended() {
                Ok(Some(text)) => {
                    let report = self.session.process_text(&text, Local::now());
                    tracing::trace!(?report, bytes = text.len(), "Processed log chunk");
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read log, will reopen");
                    self.tail.close();
                    self.last_recovery_check = Some(Instant::now());
                }
            }
        }

        if self.recovery_due() {
            self.last_recovery_check = Some(Instant::now());
            if self.tail.needs_recovery() {
                match self.tail.recover() {
                    Ok(()) => tracing::info!("Log file reopened"),
                    Err(e) => tracing::warn!(error = %e, "Log file still unavailable"),
                }
            }
        }
    }

    fn recovery_due(&self) -> bool {
        self.last_recovery_check
            .is_none_or(|last| last.elapsed() >= self.settings.reopen_interval)
    }
}

impl MonitorHandle {
    /// Queue a command; returns `false` if the monitor has exited.
    pub fn send(&self, command: MonitorCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
            && self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Ask the loop to stop and wait for it.
    pub fn stop(mut self) -> Result<(), MonitorError> {
        self.running.store(false, Ordering::SeqCst);
        match self.thread.take() {
            Some(thread) => thread.join().map_err(|_| MonitorError::Panicked),
            None => Ok(()),
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}
