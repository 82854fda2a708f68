//! Lifecycle types of a scan run.

use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

use serde::Serialize;

use crate::network::host::HostScanResult;

/// The two probing phases. Each one has its own timeout and concurrency cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Discovery,
    PortScan,
}

impl fmt::Display for ScanPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanPhase::Discovery => write!(f, "discovery"),
            ScanPhase::PortScan => write!(f, "port scan"),
        }
    }
}

/// `Idle → Expanding → Discovering → PortScanning → Completed`.
///
/// `Cancelled` is reachable from both probing states, `Failed` from any
/// non-terminal state. The last three are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanState {
    Idle,
    Expanding,
    Discovering,
    PortScanning,
    Completed,
    Cancelled,
    Failed,
}

impl ScanState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScanState::Completed | ScanState::Cancelled | ScanState::Failed
        )
    }

    /// Whether the orchestrator may move from `self` to `next`.
    pub fn can_transition_to(self, next: ScanState) -> bool {
        use ScanState::*;
        match (self, next) {
            (Idle, Expanding) => true,
            (Expanding, Discovering) => true,
            (Discovering, PortScanning) => true,
            (PortScanning, Completed) => true,
            (Discovering | PortScanning, Cancelled) => true,
            (current, Failed) => !current.is_terminal(),
            // a finished scanner can be reused for another run
            (Completed | Cancelled | Failed, Expanding) => true,
            _ => false,
        }
    }
}

/// Snapshot emitted after every finished probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanProgress {
    pub phase: ScanPhase,
    pub completed: usize,
    pub total: usize,
}

/// Outcome of a run that was not aborted.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    /// Either [`ScanState::Completed`] or [`ScanState::Cancelled`].
    pub state: ScanState,
    /// One entry per host that answered discovery, sorted by address.
    ///
    /// A run cancelled before port scanning still lists every discovered host,
    /// each with an empty port list.
    pub hosts: Vec<HostScanResult>,
    /// Number of addresses the range expanded to.
    pub targets: usize,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

impl ScanReport {
    pub fn is_cancelled(&self) -> bool {
        self.state == ScanState::Cancelled
    }

    /// Addresses that answered the reachability probe.
    pub fn discovered(&self) -> Vec<Ipv4Addr> {
        self.hosts.iter().map(|host| host.ip_addr).collect()
    }
}

/// Serializes durations as whole milliseconds.
pub mod duration_ms {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub mod option {
        use std::time::Duration;

        use serde::Serializer;

        pub fn serialize<S: Serializer>(
            value: &Option<Duration>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(duration) => serializer.serialize_some(&(duration.as_millis() as u64)),
                None => serializer.serialize_none(),
            }
        }
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
