use std::net::Ipv4Addr;
use std::time::Duration;

use serde::Serialize;

/// Outcome of one TCP connect attempt.
///
/// `open == false` covers both an explicit refusal and a timeout; the two are
/// not told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortProbeResult {
    pub port: u16,
    pub open: bool,
}

impl PortProbeResult {
    pub fn new(port: u16, open: bool) -> Self {
        Self { port, open }
    }
}

/// A host that answered the reachability probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostScanResult {
    pub ip_addr: Ipv4Addr,
    #[serde(rename = "rtt_ms", with = "crate::scan::duration_ms::option")]
    pub round_trip_time: Option<Duration>,
    /// Attempted ports, ascending.
    pub ports: Vec<PortProbeResult>,
}

impl HostScanResult {
    pub fn new(ip_addr: Ipv4Addr) -> Self {
        Self {
            ip_addr,
            round_trip_time: None,
            ports: Vec::new(),
        }
    }

    pub fn with_rtt(mut self, rtt: Duration) -> Self {
        self.round_trip_time = Some(rtt);
        self
    }

    /// Records a probe result, keeping `ports` sorted and unique by port number.
    pub fn record(&mut self, result: PortProbeResult) {
        match self.ports.binary_search_by_key(&result.port, |p| p.port) {
            Ok(idx) => self.ports[idx] = result,
            Err(idx) => self.ports.insert(idx, result),
        }
    }

    pub fn open_ports(&self) -> Vec<u16> {
        self.ports
            .iter()
            .filter(|probe| probe.open)
            .map(|probe| probe.port)
            .collect()
    }

    pub fn has_open_ports(&self) -> bool {
        self.ports.iter().any(|probe| probe.open)
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
