//! Scripted transports.

use std::collections::{HashMap, HashSet};
use std::io;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use rigscan_common::error::ProbeError;
use rigscan_core::probe::{PortProber, Reachability, ReachabilityProber};

/// Tracks how many probes are in flight at once.
#[derive(Debug, Default)]
pub struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl Gauge {
    fn enter(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortBehavior {
    Accept,
    Refuse,
    /// Never answers; the orchestrator's timeout has to cut it off.
    Silent,
    /// `EHOSTUNREACH`-like failure of a single probe.
    Transient,
    /// `EMFILE`.
    Exhausted,
}

/// A network made of scripted hosts.
///
/// Addresses not marked alive never answer discovery. Ports without a behavior
/// refuse connections.
#[derive(Debug, Default)]
pub struct FakeNetwork {
    alive: HashSet<Ipv4Addr>,
    denied: HashSet<Ipv4Addr>,
    broadcast: HashSet<Ipv4Addr>,
    ports: HashMap<u16, PortBehavior>,
    latency: Duration,
    pub discovery: Gauge,
    pub port_scan: Gauge,
}

impl FakeNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alive(mut self, addrs: impl IntoIterator<Item = Ipv4Addr>) -> Self {
        self.alive.extend(addrs);
        self
    }

    /// Discovery of `addr` fails as if ICMP sockets were not permitted.
    pub fn deny(mut self, addr: Ipv4Addr) -> Self {
        self.denied.insert(addr);
        self
    }

    /// Echo requests to `addr` are rejected with `EACCES`, like a subnet broadcast.
    pub fn broadcast(mut self, addr: Ipv4Addr) -> Self {
        self.broadcast.insert(addr);
        self
    }

    pub fn port(mut self, port: u16, behavior: PortBehavior) -> Self {
        self.ports.insert(port, behavior);
        self
    }

    /// Time every answering probe takes.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    async fn wait(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

#[async_trait]
impl ReachabilityProber for FakeNetwork {
    async fn probe(&self, addr: Ipv4Addr, _: Duration) -> Result<Reachability, ProbeError> {
        self.discovery.enter();
        self.wait().await;
        let result = if self.denied.contains(&addr) {
            Err(ProbeError::PermissionDenied(io::Error::from(
                io::ErrorKind::PermissionDenied,
            )))
        } else if self.broadcast.contains(&addr) {
            Err(ProbeError::from_echo(io::Error::from_raw_os_error(13)))
        } else if self.alive.contains(&addr) {
            Ok(Reachability::Alive {
                rtt: self.latency,
            })
        } else {
            self.discovery.exit();
            return std::future::pending().await;
        };
        self.discovery.exit();
        result
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

#[async_trait]
impl PortProber for FakeNetwork {
    async fn probe(&self, _: Ipv4Addr, port: u16, _: Duration) -> Result<bool, ProbeError> {
        self.port_scan.enter();
        self.wait().await;
        let behavior = self.ports.get(&port).copied().unwrap_or(PortBehavior::Refuse);
        self.port_scan.exit();
        match behavior {
            PortBehavior::Accept => Ok(true),
            PortBehavior::Refuse => Ok(false),
            PortBehavior::Silent => std::future::pending().await,
            PortBehavior::Transient => Err(ProbeError::Transient(io::Error::from(
                io::ErrorKind::HostUnreachable,
            ))),
            PortBehavior::Exhausted => Err(ProbeError::ResourceExhausted(
                io::Error::from_raw_os_error(24),
            )),
        }
    }
}

pub fn addr(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(10, 0, 0, last)
}
