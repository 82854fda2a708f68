//! # Error taxonomy
//!
//! Only three conditions ever leave a scan run as an error:
//!
//! * [`InvalidRangeError`]: the target expression could not be expanded.
//! * [`ScanConfigurationError`]: the [`crate::config::ScanConfiguration`] is unusable.
//! * [`ScanAbortedError`]: the local machine could not keep probing (permissions,
//!   network stack, descriptor exhaustion).
//!
//! Everything else a single probe runs into is a [`ProbeError::Transient`] and gets
//! folded into "no response" / "closed" by the orchestrator.

use std::io;

use thiserror::Error;

use crate::network::host::HostScanResult;
use crate::scan::ScanPhase;

/// `ENFILE`: system-wide open file table is full.
const ENFILE: i32 = 23;
/// `EMFILE`: this process ran out of file descriptors.
const EMFILE: i32 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid range '{input}': {reason}")]
pub struct InvalidRangeError {
    pub input: String,
    pub reason: String,
}

impl InvalidRangeError {
    pub fn new(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanConfigurationError {
    #[error("port list is empty")]
    EmptyPortList,
    #[error("port {0} is outside 1-65535")]
    InvalidPort(u32),
    #[error("{0} timeout must be greater than zero")]
    ZeroTimeout(ScanPhase),
    #[error("{0} concurrency must be greater than zero")]
    ZeroConcurrency(ScanPhase),
}

/// Failure of a single probe.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("permission denied while sending probe")]
    PermissionDenied(#[source] io::Error),
    #[error("local network stack unavailable")]
    NetworkUnavailable(#[source] io::Error),
    #[error("local resources exhausted")]
    ResourceExhausted(#[source] io::Error),
    #[error("transient probe failure")]
    Transient(#[source] io::Error),
}

impl ProbeError {
    /// Fatal errors stop the whole run, transient ones only affect one probe.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ProbeError::Transient(_))
    }

    /// Classifies an error raised while opening a probe socket (ICMP).
    ///
    /// Here a permission error means the process is not allowed to send probes at
    /// all, so it is fatal.
    pub fn from_send(err: io::Error) -> Self {
        if is_exhaustion(&err) {
            return ProbeError::ResourceExhausted(err);
        }
        match err.kind() {
            io::ErrorKind::PermissionDenied => ProbeError::PermissionDenied(err),
            io::ErrorKind::NetworkDown | io::ErrorKind::Unsupported => {
                ProbeError::NetworkUnavailable(err)
            }
            _ => ProbeError::Transient(err),
        }
    }

    /// Classifies an error raised by one echo request on an already open socket.
    ///
    /// The socket proved the process may send, so `EACCES` here comes from the
    /// destination (a broadcast address) and only affects that target.
    pub fn from_echo(err: io::Error) -> Self {
        match Self::from_send(err) {
            ProbeError::PermissionDenied(err) => ProbeError::Transient(err),
            other => other,
        }
    }

    /// Classifies an error raised by a TCP connect attempt.
    ///
    /// Connecting to a broadcast address yields `EACCES`, so permission errors are
    /// per-target here and only descriptor exhaustion is fatal.
    pub fn from_connect(err: io::Error) -> Self {
        if is_exhaustion(&err) {
            ProbeError::ResourceExhausted(err)
        } else {
            ProbeError::Transient(err)
        }
    }
}

fn is_exhaustion(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(ENFILE | EMFILE)) || err.kind() == io::ErrorKind::OutOfMemory
}

/// The run stopped early. Results collected before the failure are kept in `partial`.
#[derive(Debug, Error)]
#[error("scan aborted during {phase}: {source}")]
pub struct ScanAbortedError {
    pub phase: ScanPhase,
    #[source]
    pub source: ProbeError,
    pub partial: Vec<HostScanResult>,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),
    #[error(transparent)]
    Configuration(#[from] ScanConfigurationError),
    #[error(transparent)]
    Aborted(#[from] ScanAbortedError),
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
