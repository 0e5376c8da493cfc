//! OS termination events

use std::fmt;

use tracing::info;

use crate::error::{SimulationError, SimulatorResult};

/// Why the simulation is shutting down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    Interrupt,
    Terminate,
    Hangup,
    Quit,
    /// Shutdown requested programmatically
    Requested,
    /// Every worker exited on its own
    WorkersExited,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
            Self::Hangup => write!(f, "SIGHUP"),
            Self::Quit => write!(f, "SIGQUIT"),
            Self::Requested => write!(f, "requested"),
            Self::WorkersExited => write!(f, "workers exited"),
        }
    }
}

/// Installed handlers for SIGINT, SIGTERM, SIGHUP and SIGQUIT
///
/// Handlers are installed eagerly so a failure surfaces before any worker
/// starts.
#[cfg(unix)]
pub struct TerminationSignals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    hangup: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl TerminationSignals {
    pub fn install() -> SimulatorResult<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        let install = |kind: SignalKind, name: &str| {
            signal(kind).map_err(|e| {
                SimulationError::Signal(format!("failed to install {} handler: {}", name, e))
            })
        };

        Ok(Self {
            interrupt: install(SignalKind::interrupt(), "SIGINT")?,
            terminate: install(SignalKind::terminate(), "SIGTERM")?,
            hangup: install(SignalKind::hangup(), "SIGHUP")?,
            quit: install(SignalKind::quit(), "SIGQUIT")?,
        })
    }

    /// Resolve on the first termination signal
    pub async fn recv(&mut self) -> ShutdownReason {
        let reason = tokio::select! {
            _ = self.interrupt.recv() => ShutdownReason::Interrupt,
            _ = self.terminate.recv() => ShutdownReason::Terminate,
            _ = self.hangup.recv() => ShutdownReason::Hangup,
            _ = self.quit.recv() => ShutdownReason::Quit,
        };

        info!(signal = %reason, "Signal received, shutting down");
        reason
    }
}

/// Ctrl+C handler on platforms without unix signals
#[cfg(not(unix))]
pub struct TerminationSignals;

#[cfg(not(unix))]
impl TerminationSignals {
    pub fn install() -> SimulatorResult<Self> {
        Ok(Self)
    }

    pub async fn recv(&mut self) -> ShutdownReason {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            return std::future::pending().await;
        }

        info!(signal = %ShutdownReason::Interrupt, "Signal received, shutting down");
        ShutdownReason::Interrupt
    }
}
