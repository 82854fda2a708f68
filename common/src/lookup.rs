use std::net::Ipv4Addr;

use serde::Serialize;

/// Extra information about a host, attached after the scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostMetadata {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl HostMetadata {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }
}

/// Name fragments mining hardware and firmware ship with by default.
pub const MINER_HOSTNAME_HINTS: &[&str] = &[
    "antminer",
    "whatsminer",
    "avalon",
    "innosilicon",
    "bitmain",
    "asic",
    "miner",
    "mining",
];

/// Whether a host name looks like a rig, e.g. `antminer-s19.lan`.
pub fn is_miner_hostname(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    MINER_HOSTNAME_HINTS.iter().any(|hint| name.contains(hint))
}

/// Defines the contract for resolving metadata of a discovered host.
#[async_trait::async_trait]
pub trait HostLookup: Send + Sync {
    /// Looks up `ip_addr`.
    ///
    /// # Returns
    /// * `Ok(Some(_))` - Metadata was found.
    /// * `Ok(None)` - The host is unknown to this source.
    /// * `Err(_)` - The source failed. Callers treat this like `None`.
    async fn lookup(&self, ip_addr: Ipv4Addr) -> anyhow::Result<Option<HostMetadata>>;
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rig_hostnames_are_recognized() {
        assert!(is_miner_hostname("Antminer-S19.lan"));
        assert!(is_miner_hostname("whatsminer-m30"));
        assert!(is_miner_hostname("asic-07.farm.local"));
        assert!(!is_miner_hostname("printer.office.lan"));
    }
}
