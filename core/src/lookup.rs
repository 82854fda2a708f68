use std::io;
use std::net::{IpAddr, Ipv4Addr};

use rigscan_common::lookup::{HostLookup, HostMetadata};
use tracing::debug;

/// Knows nothing about any host.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLookup;

#[async_trait::async_trait]
impl HostLookup for NullLookup {
    async fn lookup(&self, _ip_addr: Ipv4Addr) -> anyhow::Result<Option<HostMetadata>> {
        Ok(None)
    }
}

type Resolver = fn(&IpAddr) -> io::Result<String>;

/// Labels hosts with their PTR name.
///
/// Rigs often keep the vendor's default host name (`antminer-s19`), which
/// [`rigscan_common::lookup::is_miner_hostname`] recognizes.
#[derive(Debug, Clone, Copy)]
pub struct ReverseDnsLookup {
    resolve: Resolver,
}

impl ReverseDnsLookup {
    pub fn new() -> Self {
        Self {
            resolve: dns_lookup::lookup_addr,
        }
    }

    fn with_resolver(resolve: Resolver) -> Self {
        Self { resolve }
    }
}

impl Default for ReverseDnsLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HostLookup for ReverseDnsLookup {
    async fn lookup(&self, ip_addr: Ipv4Addr) -> anyhow::Result<Option<HostMetadata>> {
        let resolve = self.resolve;
        let addr = IpAddr::V4(ip_addr);
        let name = match tokio::task::spawn_blocking(move || resolve(&addr)).await? {
            Ok(name) => name,
            Err(e) => {
                debug!(%ip_addr, error = %e, "No reverse DNS name");
                return Ok(None);
            }
        };

        // resolvers echo the address back when there is no PTR record
        if name.is_empty() || name.parse::<IpAddr>().is_ok() {
            return Ok(None);
        }

        Ok(Some(HostMetadata::new(name.trim_end_matches('.'))))
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
