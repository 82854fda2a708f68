//! # IPv4 ranges
//!
//! Inclusive address ranges and the collection a target expression expands into.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use pnet::ipnetwork::Ipv4Network;

/// Represents a continuous range of IPv4 addresses, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Ipv4Addr> + Clone {
        let start: u32 = u32::from(self.start_addr);
        let end: u32 = u32::from(self.end_addr);
        (start..=end).map(Ipv4Addr::from)
    }

    /// Number of addresses covered. Zero when `start > end`.
    pub fn len(&self) -> u64 {
        let start = u64::from(u32::from(self.start_addr));
        let end = u64::from(u32::from(self.end_addr));
        if start > end { 0 } else { end - start + 1 }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Creates a range from an IP and a CIDR prefix (e.g., 192.168.1.0/24).
///
/// The range covers the whole block, network and broadcast addresses included.
pub fn cidr_range(ip: Ipv4Addr, prefix: u8) -> anyhow::Result<Ipv4Range> {
    let network = Ipv4Network::new(ip, prefix)?;
    Ok(Ipv4Range::new(network.network(), network.broadcast()))
}

/// Addresses gathered from one or more target expressions.
#[derive(Debug, Clone, Default)]
pub struct IpCollection {
    pub singles: BTreeSet<Ipv4Addr>,
    pub ranges: Vec<Ipv4Range>,
}

impl IpCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_single(&mut self, addr: Ipv4Addr) {
        self.singles.insert(addr);
    }

    pub fn add_range(&mut self, range: Ipv4Range) {
        self.ranges.push(range);
    }

    /// Upper bound on the number of addresses; overlaps are counted twice.
    pub fn len_upper_bound(&self) -> u64 {
        self.singles.len() as u64 + self.ranges.iter().map(Ipv4Range::len).sum::<u64>()
    }

    /// Flattens the collection into unique addresses in ascending numeric order.
    pub fn into_sorted_vec(self) -> Vec<Ipv4Addr> {
        let mut addrs: Vec<Ipv4Addr> = self.singles.into_iter().collect();
        for range in self.ranges {
            addrs.extend(range.iter());
        }
        addrs.sort_unstable();
        addrs.dedup();
        addrs
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
