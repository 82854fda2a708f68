//! Transport contracts.
//!
//! The orchestrator only ever talks to these traits, so tests can swap in fakes
//! and the CLI can pick a transport based on the privileges it runs with.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use is_root::is_root;
use rigscan_common::error::ProbeError;
use rigscan_common::info;

use crate::network::icmp::IcmpProber;
use crate::network::tcp::HandshakeProber;

/// Answer to a single reachability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reachability {
    /// The host answered. `rtt` never exceeds the probe timeout.
    Alive { rtt: Duration },
    NoResponse,
}

impl Reachability {
    pub fn is_alive(&self) -> bool {
        matches!(self, Reachability::Alive { .. })
    }
}

/// Decides whether a host is up.
#[async_trait]
pub trait ReachabilityProber: Send + Sync {
    async fn probe(&self, addr: Ipv4Addr, timeout: Duration) -> Result<Reachability, ProbeError>;

    /// Short name used in logs.
    fn name(&self) -> &'static str;
}

/// Decides whether a TCP port accepts connections.
#[async_trait]
pub trait PortProber: Send + Sync {
    /// `Ok(false)` covers both a refusal and a timeout.
    async fn probe(&self, addr: Ipv4Addr, port: u16, timeout: Duration) -> Result<bool, ProbeError>;
}

/// ICMP echo when running as root, TCP handshake discovery otherwise.
pub fn default_prober() -> Arc<dyn ReachabilityProber> {
    let prober: Arc<dyn ReachabilityProber> = if is_root() {
        Arc::new(IcmpProber::new())
    } else {
        Arc::new(HandshakeProber::default())
    };
    info!("Using {} discovery", prober.name());
    prober
}
