use std::io;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use async_trait::async_trait;
use rigscan_common::error::ProbeError;
use surge_ping::{Client, Config, PingIdentifier, PingSequence, SurgeError};
use tokio::sync::OnceCell;

use crate::probe::{Reachability, ReachabilityProber};

const PAYLOAD: [u8; 56] = [0; 56];

/// ICMP echo discovery.
///
/// The socket is opened on the first probe and shared by every probe after it.
/// Failing to open it is fatal: without the socket no host can be discovered.
/// Errors of a single echo request only affect that target.
#[derive(Default)]
pub struct IcmpProber {
    client: OnceCell<Client>,
}

impl IcmpProber {
    pub fn new() -> Self {
        Self::default()
    }

    async fn client(&self) -> Result<&Client, ProbeError> {
        self.client
            .get_or_try_init(|| async {
                Client::new(&Config::default()).map_err(ProbeError::from_send)
            })
            .await
    }
}

#[async_trait]
impl ReachabilityProber for IcmpProber {
    async fn probe(
        &self,
        addr: Ipv4Addr,
        probe_timeout: Duration,
    ) -> Result<Reachability, ProbeError> {
        let client = self.client().await?;
        let mut pinger = client
            .pinger(IpAddr::V4(addr), PingIdentifier(rand::random()))
            .await;
        pinger.timeout(probe_timeout);

        match pinger.ping(PingSequence(0), &PAYLOAD).await {
            Ok((_packet, rtt)) => Ok(Reachability::Alive {
                rtt: rtt.min(probe_timeout),
            }),
            Err(SurgeError::Timeout { .. }) => Ok(Reachability::NoResponse),
            Err(SurgeError::IOError(e)) => Err(ProbeError::from_echo(e)),
            Err(other) => Err(ProbeError::Transient(io::Error::other(other.to_string()))),
        }
    }

    fn name(&self) -> &'static str {
        "ICMP echo"
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
