use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rigscan_common::error::ProbeError;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::probe::{PortProber, Reachability, ReachabilityProber};

/// Port the handshake prober knocks on when nothing else is configured.
pub const HANDSHAKE_PORT: u16 = 443;

/// Plain `connect()` port prober.
///
/// A refused connection and one that never completes are both reported as
/// closed. Telling them apart would need the raw socket path.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnectProber;

#[async_trait]
impl PortProber for TcpConnectProber {
    async fn probe(
        &self,
        addr: Ipv4Addr,
        port: u16,
        probe_timeout: Duration,
    ) -> Result<bool, ProbeError> {
        let socket_addr = SocketAddr::from((addr, port));

        // the stream is dropped right away, closing the connection
        match timeout(probe_timeout, TcpStream::connect(socket_addr)).await {
            Ok(Ok(_stream)) => Ok(true),
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => Ok(false),
            Ok(Err(e)) => Err(ProbeError::from_connect(e)),
            Err(_elapsed) => Ok(false),
        }
    }
}

/// Unprivileged discovery.
///
/// Any answer from the target's TCP stack proves the host is up: a completed
/// handshake or an explicit refusal. Only silence means no response.
#[derive(Debug, Clone, Copy)]
pub struct HandshakeProber {
    port: u16,
}

impl HandshakeProber {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

impl Default for HandshakeProber {
    fn default() -> Self {
        Self::new(HANDSHAKE_PORT)
    }
}

#[async_trait]
impl ReachabilityProber for HandshakeProber {
    async fn probe(
        &self,
        addr: Ipv4Addr,
        probe_timeout: Duration,
    ) -> Result<Reachability, ProbeError> {
        let socket_addr = SocketAddr::from((addr, self.port));
        let started = Instant::now();

        match timeout(probe_timeout, TcpStream::connect(socket_addr)).await {
            Ok(Ok(_)) => Ok(alive(started, probe_timeout)),
            Ok(Err(e)) if answered(&e) => Ok(alive(started, probe_timeout)),
            Ok(Err(e)) => Err(ProbeError::from_connect(e)),
            Err(_elapsed) => Ok(Reachability::NoResponse),
        }
    }

    fn name(&self) -> &'static str {
        "TCP handshake"
    }
}

fn answered(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::ConnectionRefused | io::ErrorKind::ConnectionReset
    )
}

fn alive(started: Instant, probe_timeout: Duration) -> Reachability {
    Reachability::Alive {
        rtt: started.elapsed().min(probe_timeout),
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
