//! Real probers against the loopback interface.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use rigscan_common::config::ScanConfiguration;
use rigscan_common::scan::ScanState;
use rigscan_core::network::icmp::IcmpProber;
use rigscan_core::network::tcp::{HandshakeProber, TcpConnectProber};
use rigscan_core::scanner::Scanner;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

async fn unused_port() -> u16 {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Scans localhost with one listening and one closed port.
#[tokio::test]
async fn scan_single_loopback() {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await.unwrap();
    let open_port = listener.local_addr().unwrap().port();
    let closed_port = unused_port().await;

    let scanner = Scanner::new(
        Arc::new(HandshakeProber::new(closed_port)),
        Arc::new(TcpConnectProber),
    );
    let config = ScanConfiguration::new("127.0.0.1")
        .with_ports([open_port, closed_port])
        .with_timeout(Duration::from_secs(2));

    let report = scanner.scan(&config, &CancellationToken::new()).await.unwrap();

    assert_eq!(report.state, ScanState::Completed);
    assert_eq!(report.discovered(), vec![Ipv4Addr::LOCALHOST]);
    assert_eq!(report.hosts[0].open_ports(), vec![open_port]);
    drop(listener);
}

#[tokio::test]
#[cfg(target_os = "linux")]
async fn scan_loopback_range() {
    // all of 127.0.0.0/8 answers on linux
    let scanner = Scanner::new(
        Arc::new(HandshakeProber::new(unused_port().await)),
        Arc::new(TcpConnectProber),
    );
    let config = ScanConfiguration::new("127.0.0.1-3")
        .with_ports([unused_port().await])
        .with_timeout(Duration::from_secs(2));

    let report = scanner.scan(&config, &CancellationToken::new()).await.unwrap();

    assert_eq!(report.hosts.len(), 3, "found {:?}", report.discovered());
    assert!(report.hosts.iter().all(|h| h.open_ports().is_empty()));
}

// needs permission to open an ICMP socket
#[tokio::test]
#[ignore]
async fn icmp_scan_survives_broadcast_target() {
    let scanner = Scanner::new(Arc::new(IcmpProber::new()), Arc::new(TcpConnectProber));
    let config = ScanConfiguration::new("127.0.0.1, 255.255.255.255")
        .with_ports([unused_port().await])
        .with_concurrency(1, 1)
        .with_timeout(Duration::from_millis(500));

    let report = scanner.scan(&config, &CancellationToken::new()).await.unwrap();

    assert_eq!(report.state, ScanState::Completed);
    assert_eq!(report.discovered(), vec![Ipv4Addr::LOCALHOST]);
}
