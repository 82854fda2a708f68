//! Local IPv4 networks, scanned when no target is given.

use pnet::datalink::{self, NetworkInterface};
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

/// Networks wider than this are narrowed to the block around the interface address.
pub const WIDEST_LOCAL_PREFIX: u8 = 24;

/// CIDR blocks of every up, non-loopback interface with an IPv4 address.
pub fn local_networks() -> Vec<Ipv4Network> {
    networks_of(&datalink::interfaces())
}

/// [`local_networks`] as a target expression, e.g. `192.168.1.0/24, 10.8.0.0/24`.
///
/// `None` when the machine has no usable IPv4 network.
pub fn local_target() -> Option<String> {
    let networks = local_networks();
    if networks.is_empty() {
        return None;
    }
    let blocks: Vec<String> = networks
        .iter()
        .map(|net| format!("{}/{}", net.network(), net.prefix()))
        .collect();
    Some(blocks.join(", "))
}

fn is_scannable(interface: &NetworkInterface) -> bool {
    interface.is_up() && !interface.is_loopback()
}

fn networks_of(interfaces: &[NetworkInterface]) -> Vec<Ipv4Network> {
    let mut networks: Vec<Ipv4Network> = interfaces
        .iter()
        .filter(|interface| is_scannable(interface))
        .flat_map(|interface| interface.ips.iter())
        .filter_map(|net| match net {
            IpNetwork::V4(v4) if !v4.ip().is_loopback() && !v4.ip().is_link_local() => {
                narrow(*v4)
            }
            _ => None,
        })
        .collect();

    networks.sort_unstable_by_key(|net| (net.network(), net.prefix()));
    networks.dedup();
    networks
}

/// Same block, keyed by its network address, at most a /24.
fn narrow(net: Ipv4Network) -> Option<Ipv4Network> {
    let prefix = net.prefix().max(WIDEST_LOCAL_PREFIX);
    let block = Ipv4Network::new(net.ip(), prefix).ok()?;
    Ipv4Network::new(block.network(), prefix).ok()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
