//! # Scan Target Model
//!
//! Parses target expressions and expands them into the addresses to probe.
//!
//! Supported forms:
//! * A single IPv4 address (`192.168.1.5`).
//! * A last-octet range (`192.168.1.1-254`) or a range with a longer tail
//!   (`10.0.0.1-1.5`, `10.0.0.1-10.0.3.255`).
//! * A CIDR block (`192.168.1.0/24`). Network and broadcast addresses are kept.
//! * A comma-separated list of any of the above.
//!
//! Expansion is pure: no I/O, same input gives the same output.

use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::InvalidRangeError;
use crate::network::range::{self, IpCollection, Ipv4Range};

/// Largest number of addresses a single expression may expand to (a /8).
pub const MAX_EXPANSION: u64 = 1 << 24;

/// Represents a distinct target to be scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Scan a single specific host.
    Host { target_addr: Ipv4Addr },
    /// Scan a range of IPv4 addresses.
    Range { ipv4_range: Ipv4Range },
    /// Holds a list of different targets
    Multi { targets: Vec<Target> },
}

impl FromStr for Target {
    type Err = InvalidRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(InvalidRangeError::new(s, "target is empty"));
        }

        let parsed = if s.contains(',') {
            parse_commas(s)
        } else if let Some((ip_str, prefix_str)) = s.split_once('/') {
            parse_cidr_range(ip_str, prefix_str)
        } else if let Some((start_str, end_str)) = s.split_once('-') {
            parse_ip_range(start_str, end_str)
        } else {
            parse_ipv4(s).map(|target_addr| Target::Host { target_addr })
        };

        parsed.map_err(|reason| InvalidRangeError::new(s, reason))
    }
}

impl Target {
    /// Converts the target into an IP collection.
    pub fn to_collection(&self) -> IpCollection {
        let mut collection = IpCollection::new();
        self.resolve(&mut collection);
        collection
    }

    fn resolve(&self, collection: &mut IpCollection) {
        match self {
            Target::Host { target_addr } => collection.add_single(*target_addr),
            Target::Range { ipv4_range } => collection.add_range(*ipv4_range),
            Target::Multi { targets } => {
                for target in targets {
                    target.resolve(collection);
                }
            }
        }
    }
}

/// Expands a target expression into unique addresses in ascending order.
///
/// ```
/// use rigscan_common::network::target::expand_range;
///
/// let addrs = expand_range("10.0.0.1-3").unwrap();
/// assert_eq!(addrs.len(), 3);
/// ```
pub fn expand_range(spec: &str) -> Result<Vec<Ipv4Addr>, InvalidRangeError> {
    let target: Target = spec.parse()?;
    let collection: IpCollection = target.to_collection();

    let upper_bound: u64 = collection.len_upper_bound();
    if upper_bound > MAX_EXPANSION {
        return Err(InvalidRangeError::new(
            spec.trim(),
            format!("expands to {upper_bound} addresses, the limit is {MAX_EXPANSION}"),
        ));
    }

    Ok(collection.into_sorted_vec())
}

/// Parses a comma-separated list of targets (e.g., "192.168.1.5, 10.0.0.1-50").
fn parse_commas(s: &str) -> Result<Target, String> {
    let mut targets = Vec::new();

    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err("list contains an empty element".to_string());
        }

        let target = Target::from_str(part).map_err(|e| e.to_string())?;
        targets.push(target);
    }

    Ok(Target::Multi { targets })
}

/// Parses a range like "1.1.1.1-2.2.2.2" or "1.1.1.1-50".
fn parse_ip_range(start_str: &str, end_str: &str) -> Result<Target, String> {
    let start_addr = parse_ipv4(start_str.trim()).map_err(|e| format!("range start: {e}"))?;
    let end_addr = parse_range_end_addr(end_str.trim(), &start_addr)?;

    if u32::from(start_addr) > u32::from(end_addr) {
        return Err(format!(
            "start {start_addr} is greater than end {end_addr}"
        ));
    }

    let ipv4_range = Ipv4Range::new(start_addr, end_addr);
    Ok(Target::Range { ipv4_range })
}

/// Parses the end address of a range.
///
/// Handles abbreviated forms like "192.168.1.1-50" (implies 192.168.1.50)
/// and full forms like "192.168.1.1-192.168.1.255".
fn parse_range_end_addr(end_str: &str, start_addr: &Ipv4Addr) -> Result<Ipv4Addr, String> {
    if end_str.is_empty() {
        return Err("range end is empty".to_string());
    }

    let partial_octets: Vec<u8> = end_str
        .split('.')
        .map(parse_octet)
        .collect::<Result<Vec<u8>, String>>()
        .map_err(|e| format!("range end: {e}"))?;

    if partial_octets.len() > 4 {
        return Err(format!(
            "range end has {} octets, at most 4 are allowed",
            partial_octets.len()
        ));
    }

    let mut end_octets = start_addr.octets();
    let start_index = 4 - partial_octets.len();
    end_octets[start_index..].copy_from_slice(&partial_octets);

    Ok(Ipv4Addr::from(end_octets))
}

/// Parses CIDR notation like "192.168.1.0/24".
fn parse_cidr_range(ip_str: &str, prefix_str: &str) -> Result<Target, String> {
    let ipv4_addr = parse_ipv4(ip_str.trim())?;

    let prefix_str = prefix_str.trim();
    let prefix: u32 = prefix_str
        .parse()
        .map_err(|_| format!("prefix '{prefix_str}' is not a number"))?;
    if prefix > 32 {
        return Err(format!("prefix {prefix} is outside 0-32"));
    }

    let ipv4_range = range::cidr_range(ipv4_addr, prefix as u8).map_err(|e| e.to_string())?;
    Ok(Target::Range { ipv4_range })
}

/// Strict dotted-quad parser with a readable reason on failure.
fn parse_ipv4(s: &str) -> Result<Ipv4Addr, String> {
    let octets: Vec<&str> = s.split('.').collect();
    if octets.len() != 4 {
        return Err(format!(
            "'{s}' has {} octets, expected 4",
            octets.len()
        ));
    }

    let mut parsed = [0u8; 4];
    for (slot, octet) in parsed.iter_mut().zip(octets) {
        *slot = parse_octet(octet)?;
    }
    Ok(Ipv4Addr::from(parsed))
}

fn parse_octet(s: &str) -> Result<u8, String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("octet '{s}' is not a number"));
    }
    let value: u32 = s
        .parse()
        .map_err(|_| format!("octet {s} is outside 0-255"))?;
    u8::try_from(value).map_err(|_| format!("octet {value} is outside 0-255"))
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

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    #[test]
    fn dashed_range_expands_in_order() {
        let addrs = expand_range("10.0.0.1-3").unwrap();
        assert_eq!(addrs, vec![ip("10.0.0.1"), ip("10.0.0.2"), ip("10.0.0.3")]);
    }

    #[test]
    fn dashed_range_count_matches_bounds() {
        for (start, end) in [(1u8, 1u8), (1, 254), (0, 255), (17, 42)] {
            let addrs = expand_range(&format!("192.168.7.{start}-{end}")).unwrap();
            assert_eq!(addrs.len(), usize::from(end - start) + 1);
            assert!(addrs.windows(2).all(|w| w[0] < w[1]));
            assert_eq!(addrs.first(), Some(&Ipv4Addr::new(192, 168, 7, start)));
            assert_eq!(addrs.last(), Some(&Ipv4Addr::new(192, 168, 7, end)));
        }
    }

    #[test]
    fn single_element_range() {
        assert_eq!(expand_range("10.0.0.1-1").unwrap(), vec![ip("10.0.0.1")]);
    }

    #[test]
    fn octet_out_of_range_is_rejected() {
        let err = expand_range("10.0.0.300-310").unwrap_err();
        assert!(err.reason.contains("300"), "{err}");
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err = expand_range("10.0.0.50-10").unwrap_err();
        assert!(err.reason.contains("greater than"), "{err}");
    }

    #[test]
    fn cidr_includes_network_and_broadcast() {
        let addrs = expand_range("192.168.1.0/30").unwrap();
        assert_eq!(
            addrs,
            vec![
                ip("192.168.1.0"),
                ip("192.168.1.1"),
                ip("192.168.1.2"),
                ip("192.168.1.3"),
            ]
        );
    }

    #[test]
    fn cidr_count_is_power_of_two() {
        for prefix in [32u32, 31, 28, 24, 20] {
            let addrs = expand_range(&format!("10.20.30.40/{prefix}")).unwrap();
            assert_eq!(addrs.len(), 1usize << (32 - prefix));
        }
    }

    #[test]
    fn cidr_prefix_out_of_range_is_rejected() {
        assert!(expand_range("10.0.0.0/33").is_err());
        assert!(expand_range("10.0.0.0/-1").is_err());
        assert!(expand_range("10.0.0.0/").is_err());
    }

    #[test]
    fn oversized_expansion_is_rejected() {
        let err = expand_range("10.0.0.0/7").unwrap_err();
        assert!(err.reason.contains("limit"), "{err}");
    }

    #[test]
    fn wrong_octet_count_is_rejected() {
        assert!(expand_range("10.0.0").is_err());
        assert!(expand_range("10.0.0.1.5").is_err());
        assert!(expand_range("10.0.1-5").is_err());
        assert!(expand_range("10.0.0.1-1.2.3.4.5").is_err());
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(expand_range("").is_err());
        assert!(expand_range("   ").is_err());
        assert!(expand_range("not-an-ip").is_err());
        assert!(expand_range("10.0.0.1-").is_err());
        assert!(expand_range("10.0.0.+1").is_err());
        assert!(expand_range("10.0.0.1,,10.0.0.2").is_err());
    }

    #[test]
    fn expansion_is_idempotent() {
        let first = expand_range("172.16.0.0/28, 172.16.0.3-20").unwrap();
        let second = expand_range("172.16.0.0/28, 172.16.0.3-20").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn lists_are_merged_without_duplicates() {
        let addrs = expand_range("10.0.0.5, 10.0.0.1-3, 10.0.0.2").unwrap();
        assert_eq!(
            addrs,
            vec![ip("10.0.0.1"), ip("10.0.0.2"), ip("10.0.0.3"), ip("10.0.0.5")]
        );
    }

    #[test]
    fn test_parse_range_end_addr_helper() {
        let start = Ipv4Addr::new(192, 168, 1, 10);

        assert_eq!(
            parse_range_end_addr("192.168.1.50", &start),
            Ok(Ipv4Addr::new(192, 168, 1, 50))
        );
        assert_eq!(
            parse_range_end_addr("50", &start),
            Ok(Ipv4Addr::new(192, 168, 1, 50))
        );
        assert_eq!(
            parse_range_end_addr("2.66", &start),
            Ok(Ipv4Addr::new(192, 168, 2, 66))
        );
        assert_eq!(
            parse_range_end_addr("10.2.1", &start),
            Ok(Ipv4Addr::new(192, 10, 2, 1))
        );

        assert!(parse_range_end_addr("2.256", &start).is_err());
        assert!(parse_range_end_addr("1.2.3.4.5", &start).is_err());
        assert!(parse_range_end_addr("", &start).is_err());
    }

    #[test]
    fn test_from_str_full_parsing() {
        assert!(matches!(
            Target::from_str("1.1.1.1"),
            Ok(Target::Host { .. })
        ));
        assert!(matches!(
            Target::from_str("10.0.0.1-10.0.0.255"),
            Ok(Target::Range { .. })
        ));
        assert!(matches!(
            Target::from_str("192.168.1.1-2.255"),
            Ok(Target::Range { .. })
        ));
        assert!(matches!(
            Target::from_str("10.0.0.0/24"),
            Ok(Target::Range { .. })
        ));
        assert!(matches!(
            Target::from_str("10.0.0.1, 10.0.0.0/30"),
            Ok(Target::Multi { .. })
        ));

        assert!(Target::from_str("::1").is_err());
        assert!(Target::from_str("10.0.0.256-1.1.1.1").is_err());
    }
}
