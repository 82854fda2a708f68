//! # Port catalog
//!
//! Ports commonly exposed by mining rigs, their management software and the
//! infrastructure around them. Used as the default port list and to label open
//! ports in reports. Matching a port here is a hint, not a verdict.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortCategory {
    MinerApi,
    Stratum,
    WebInterface,
    NodeRpc,
    Proxy,
    Vpn,
}

impl fmt::Display for PortCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PortCategory::MinerApi => "miner API",
            PortCategory::Stratum => "stratum",
            PortCategory::WebInterface => "web UI",
            PortCategory::NodeRpc => "node RPC",
            PortCategory::Proxy => "proxy",
            PortCategory::Vpn => "VPN",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub port: u16,
    pub service: &'static str,
    pub category: PortCategory,
}

const fn entry(port: u16, service: &'static str, category: PortCategory) -> CatalogEntry {
    CatalogEntry {
        port,
        service,
        category,
    }
}

/// Sorted by port number.
pub const MINER_PORTS: &[CatalogEntry] = &[
    entry(1080, "SOCKS Proxy", PortCategory::Proxy),
    entry(1194, "OpenVPN", PortCategory::Vpn),
    entry(1723, "PPTP VPN", PortCategory::Vpn),
    entry(3000, "Miner Dashboard", PortCategory::WebInterface),
    entry(3001, "Mining Pool UI", PortCategory::WebInterface),
    entry(3128, "HTTP Proxy", PortCategory::Proxy),
    entry(3333, "Stratum Pool", PortCategory::Stratum),
    entry(4028, "CGMiner API", PortCategory::MinerApi),
    entry(4029, "SGMiner API", PortCategory::MinerApi),
    entry(4030, "BFGMiner API", PortCategory::MinerApi),
    entry(4031, "CPUMiner API", PortCategory::MinerApi),
    entry(4032, "XMRig API", PortCategory::MinerApi),
    entry(4033, "T-Rex API", PortCategory::MinerApi),
    entry(4034, "PhoenixMiner API", PortCategory::MinerApi),
    entry(4035, "Claymore API", PortCategory::MinerApi),
    entry(4036, "Gminer API", PortCategory::MinerApi),
    entry(4444, "Stratum Pool Alt", PortCategory::Stratum),
    entry(5555, "Stratum Pool", PortCategory::Stratum),
    entry(7777, "Stratum Pool", PortCategory::Stratum),
    entry(8000, "HTTP Server", PortCategory::WebInterface),
    entry(8080, "Web Interface", PortCategory::WebInterface),
    entry(8081, "Miner Web UI", PortCategory::WebInterface),
    entry(8118, "Privoxy", PortCategory::Proxy),
    entry(8332, "Bitcoin RPC", PortCategory::NodeRpc),
    entry(8333, "Bitcoin P2P", PortCategory::NodeRpc),
    entry(8888, "Web Interface Alt", PortCategory::WebInterface),
    entry(9050, "Tor SOCKS", PortCategory::Proxy),
    entry(9332, "Litecoin RPC", PortCategory::NodeRpc),
    entry(9999, "Stratum SSL", PortCategory::Stratum),
    entry(14444, "Stratum SSL Alt", PortCategory::Stratum),
];

pub fn lookup(port: u16) -> Option<&'static CatalogEntry> {
    MINER_PORTS
        .binary_search_by_key(&port, |entry| entry.port)
        .ok()
        .map(|idx| &MINER_PORTS[idx])
}

pub fn service_name(port: u16) -> Option<&'static str> {
    lookup(port).map(|entry| entry.service)
}

/// Miner APIs and stratum endpoints. Web UIs, proxies and VPNs are too generic.
pub fn is_mining_port(port: u16) -> bool {
    matches!(
        lookup(port).map(|entry| entry.category),
        Some(PortCategory::MinerApi | PortCategory::Stratum)
    )
}

pub fn default_ports() -> Vec<u16> {
    MINER_PORTS.iter().map(|entry| entry.port).collect()
}

/// Parses a port list such as `22,80,8000-8010`. Output is unique and ascending.
pub fn parse_port_list(s: &str) -> Result<Vec<u16>, String> {
    let mut ports: BTreeSet<u16> = BTreeSet::new();

    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err("port list contains an empty element".to_string());
        }

        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_port(start)?;
                let end = parse_port(end)?;
                if start > end {
                    return Err(format!("port range {start}-{end} is inverted"));
                }
                ports.extend(start..=end);
            }
            None => {
                ports.insert(parse_port(part)?);
            }
        }
    }

    Ok(ports.into_iter().collect())
}

fn parse_port(s: &str) -> Result<u16, String> {
    let s = s.trim();
    match s.parse::<u16>() {
        Ok(0) | Err(_) => Err(format!("'{s}' is not a port in 1-65535")),
        Ok(port) => Ok(port),
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
