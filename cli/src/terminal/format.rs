use std::time::Duration;

use colored::*;
use rigscan_common::lookup::is_miner_hostname;
use rigscan_common::network::host::HostScanResult;
use rigscan_common::network::ports;
use rigscan_core::service::EnrichedHost;

use crate::terminal::colors;

pub type Detail = (String, ColoredString);

pub fn rtt_to_detail(rtt: Option<Duration>) -> Option<Detail> {
    let rtt = rtt?;
    let value = format!("{:.1} ms", rtt.as_secs_f64() * 1000.0);
    Some(("RTT".to_string(), value.color(colors::TEXT_DEFAULT)))
}

/// `4028 (CGMiner API)`, mining ports highlighted.
pub fn port_label(port: u16) -> ColoredString {
    let label = match ports::service_name(port) {
        Some(service) => format!("{port} ({service})"),
        None => port.to_string(),
    };
    if ports::is_mining_port(port) {
        label.color(colors::MINING).bold()
    } else {
        label.color(colors::PORT_OPEN)
    }
}

pub fn ports_to_detail(host: &HostScanResult) -> Detail {
    let open = host.open_ports();
    let value: ColoredString = if open.is_empty() {
        format!("none of {} probed", host.ports.len()).bright_black()
    } else {
        let labels: Vec<String> = open.iter().map(|p| port_label(*p).to_string()).collect();
        labels.join(", ").normal()
    };
    ("Open".to_string(), value)
}

pub fn verdict_to_detail(host: &EnrichedHost) -> Option<Detail> {
    let mining: usize = host
        .host
        .open_ports()
        .into_iter()
        .filter(|port| ports::is_mining_port(*port))
        .count();
    let value: String = match (mining, has_miner_hostname(host)) {
        (0, false) => return None,
        (0, true) => "host name of mining hardware".to_string(),
        (n, false) => format!("{n} mining port(s) exposed"),
        (n, true) => format!("{n} mining port(s) exposed, rig host name"),
    };
    Some(("Verdict".to_string(), value.color(colors::MINING).bold()))
}

fn has_miner_hostname(host: &EnrichedHost) -> bool {
    host.metadata
        .as_ref()
        .is_some_and(|meta| is_miner_hostname(&meta.label))
}

pub fn host_to_details(host: &EnrichedHost) -> Vec<Detail> {
    let mut details: Vec<Detail> = Vec::new();

    if let Some(meta) = &host.metadata {
        let color = if is_miner_hostname(&meta.label) {
            colors::MINING
        } else {
            colors::ACCENT
        };
        details.push(("Name".to_string(), meta.label.color(color)));
        if let Some(location) = &meta.location {
            details.push(("Where".to_string(), location.normal()));
        }
        if let Some(owner) = &meta.owner {
            details.push(("Owner".to_string(), owner.normal()));
        }
    }
    details.extend(rtt_to_detail(host.host.round_trip_time));
    details.push(ports_to_detail(&host.host));
    details.extend(verdict_to_detail(host));
    details
}

pub fn is_suspect(host: &EnrichedHost) -> bool {
    host.host.open_ports().into_iter().any(ports::is_mining_port) || has_miner_hostname(host)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
