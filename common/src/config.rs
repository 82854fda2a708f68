use std::time::Duration;

use crate::error::ScanConfigurationError;
use crate::network::ports;
use crate::scan::ScanPhase;

pub const DEFAULT_DISCOVERY_CONCURRENCY: usize = 50;
pub const DEFAULT_PORT_CONCURRENCY: usize = 20;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2_000);
pub const DEFAULT_PORT_TIMEOUT: Duration = Duration::from_millis(3_000);

/// Output and interaction settings of the command line front end.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub no_banner: bool,
    /// `0` prints everything, `1` drops decorations, `2` prints only results.
    pub quiet: u8,
    /// Prints the report as JSON instead of the tree view.
    pub json: bool,
    /// Disables the `q` key listener.
    pub disable_input: bool,
}

/// Input of one scan run. A run only ever reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanConfiguration {
    /// Target expression, see [`crate::network::target`].
    pub range: String,
    pub ports: Vec<u16>,
    /// Per-probe timeout of the discovery phase.
    pub timeout: Duration,
    /// Per-probe timeout of the port-scan phase.
    pub port_timeout: Duration,
    pub discovery_concurrency: usize,
    /// Global cap across every host and port, not per host.
    pub port_concurrency: usize,
    /// Shuffles dispatch order. Results are sorted either way.
    pub randomize_order: bool,
}

impl ScanConfiguration {
    /// A configuration with the catalog ports and the default limits.
    pub fn new(range: impl Into<String>) -> Self {
        Self {
            range: range.into(),
            ports: ports::default_ports(),
            timeout: DEFAULT_TIMEOUT,
            port_timeout: DEFAULT_PORT_TIMEOUT,
            discovery_concurrency: DEFAULT_DISCOVERY_CONCURRENCY,
            port_concurrency: DEFAULT_PORT_CONCURRENCY,
            randomize_order: false,
        }
    }

    pub fn with_ports(mut self, ports: impl IntoIterator<Item = u16>) -> Self {
        self.ports = ports.into_iter().collect();
        self
    }

    /// Sets the same timeout for both phases.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self.port_timeout = timeout;
        self
    }

    pub fn with_port_timeout(mut self, timeout: Duration) -> Self {
        self.port_timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, discovery: usize, port_scan: usize) -> Self {
        self.discovery_concurrency = discovery;
        self.port_concurrency = port_scan;
        self
    }

    pub fn with_randomized_order(mut self, randomize: bool) -> Self {
        self.randomize_order = randomize;
        self
    }

    pub fn validate(&self) -> Result<(), ScanConfigurationError> {
        if self.ports.is_empty() {
            return Err(ScanConfigurationError::EmptyPortList);
        }
        if self.ports.contains(&0) {
            return Err(ScanConfigurationError::InvalidPort(0));
        }
        const PHASES: [ScanPhase; 2] = [ScanPhase::Discovery, ScanPhase::PortScan];
        if let Some(phase) = PHASES.into_iter().find(|p| self.timeout_for(*p).is_zero()) {
            return Err(ScanConfigurationError::ZeroTimeout(phase));
        }
        if let Some(phase) = PHASES.into_iter().find(|p| self.concurrency_for(*p) == 0) {
            return Err(ScanConfigurationError::ZeroConcurrency(phase));
        }
        Ok(())
    }

    /// Unique ports in ascending order.
    pub fn normalized_ports(&self) -> Vec<u16> {
        let mut ports = self.ports.clone();
        ports.sort_unstable();
        ports.dedup();
        ports
    }

    pub fn timeout_for(&self, phase: ScanPhase) -> Duration {
        match phase {
            ScanPhase::Discovery => self.timeout,
            ScanPhase::PortScan => self.port_timeout,
        }
    }

    pub fn concurrency_for(&self, phase: ScanPhase) -> usize {
        match phase {
            ScanPhase::Discovery => self.discovery_concurrency,
            ScanPhase::PortScan => self.port_concurrency,
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
