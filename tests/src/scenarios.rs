use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use rigscan_common::config::ScanConfiguration;
use rigscan_common::error::{ProbeError, ScanError};
use rigscan_common::lookup::{HostLookup, HostMetadata};
use rigscan_common::repository::ResultRepository;
use rigscan_common::scan::{ScanPhase, ScanState};
use rigscan_core::repository::MemoryRepository;
use rigscan_core::scanner::Scanner;
use rigscan_core::service::ScanService;
use tokio_util::sync::CancellationToken;

use crate::fakes::{FakeNetwork, PortBehavior, addr};

fn scanner(network: &Arc<FakeNetwork>) -> Scanner {
    Scanner::new(network.clone(), network.clone())
}

#[tokio::test(start_paused = true)]
async fn refused_port_is_closed_and_accepted_port_is_open() {
    let network = Arc::new(
        FakeNetwork::new()
            .alive([addr(5)])
            .port(22, PortBehavior::Refuse)
            .port(80, PortBehavior::Accept),
    );
    let config = ScanConfiguration::new("10.0.0.5").with_ports([22, 80]);

    let report = scanner(&network)
        .scan(&config, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.state, ScanState::Completed);
    assert_eq!(report.hosts.len(), 1);
    assert_eq!(report.hosts[0].ip_addr, addr(5));
    assert_eq!(report.hosts[0].open_ports(), vec![80]);
}

#[tokio::test(start_paused = true)]
async fn discovery_never_exceeds_its_cap() {
    let network = Arc::new(
        FakeNetwork::new()
            .alive((1..=100).map(addr))
            .latency(Duration::from_millis(50)),
    );
    let config = ScanConfiguration::new("10.0.0.1-100")
        .with_ports([80])
        .with_concurrency(10, 20);

    let report = scanner(&network)
        .scan(&config, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.hosts.len(), 100);
    assert_eq!(network.discovery.calls(), 100);
    assert!(network.discovery.peak() <= 10, "peak {}", network.discovery.peak());
}

#[tokio::test(start_paused = true)]
async fn port_scan_cap_is_global_across_hosts() {
    let network = Arc::new(
        FakeNetwork::new()
            .alive((1..=5).map(addr))
            .port(4028, PortBehavior::Accept)
            .latency(Duration::from_millis(20)),
    );
    let ports = [22, 80, 443, 3333, 4028, 4444, 8080, 8332];
    let config = ScanConfiguration::new("10.0.0.1-5")
        .with_ports(ports)
        .with_concurrency(50, 3);

    let report = scanner(&network)
        .scan(&config, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(network.port_scan.calls(), 5 * ports.len());
    assert!(network.port_scan.peak() <= 3, "peak {}", network.port_scan.peak());
    assert!(report.hosts.iter().all(|h| h.open_ports() == vec![4028]));
}

#[tokio::test(start_paused = true)]
async fn cancellation_between_phases_keeps_discovered_hosts() {
    let network = Arc::new(FakeNetwork::new().alive([addr(2), addr(3)]));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let scanner = Scanner::new(network.clone(), network.clone()).with_progress(move |progress| {
        if progress.phase == ScanPhase::Discovery && progress.completed == progress.total {
            trigger.cancel();
        }
    });
    let config = ScanConfiguration::new("10.0.0.1-4")
        .with_ports([80])
        .with_timeout(Duration::from_millis(200));

    let report = scanner.scan(&config, &cancel).await.unwrap();

    assert!(report.is_cancelled());
    assert_eq!(report.discovered(), vec![addr(2), addr(3)]);
    assert!(report.hosts.iter().all(|h| h.ports.is_empty()));
    assert_eq!(network.port_scan.calls(), 0);
    assert_eq!(scanner.state(), ScanState::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn silent_range_yields_empty_result() {
    let network = Arc::new(FakeNetwork::new());
    let config = ScanConfiguration::new("10.0.0.0/28")
        .with_ports([80])
        .with_timeout(Duration::from_millis(250));

    let report = scanner(&network)
        .scan(&config, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.state, ScanState::Completed);
    assert_eq!(report.targets, 16);
    assert!(report.hosts.is_empty());
}

#[tokio::test(start_paused = true)]
async fn run_time_is_bounded_by_batches_of_timeouts() {
    let network = Arc::new(FakeNetwork::new());
    let config = ScanConfiguration::new("10.0.0.1-20")
        .with_ports([80])
        .with_timeout(Duration::from_secs(1))
        .with_concurrency(5, 5);

    let report = scanner(&network)
        .scan(&config, &CancellationToken::new())
        .await
        .unwrap();

    // 20 probes, 5 at a time, 1s each
    assert!(report.elapsed <= Duration::from_millis(4_100), "{:?}", report.elapsed);
}

#[tokio::test(start_paused = true)]
async fn transient_and_silent_ports_are_closed() {
    let network = Arc::new(
        FakeNetwork::new()
            .alive([addr(9)])
            .port(80, PortBehavior::Accept)
            .port(443, PortBehavior::Transient)
            .port(8080, PortBehavior::Silent),
    );
    let config = ScanConfiguration::new("10.0.0.9")
        .with_ports([80, 443, 8080])
        .with_port_timeout(Duration::from_millis(300));

    let report = scanner(&network)
        .scan(&config, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.state, ScanState::Completed);
    let host = &report.hosts[0];
    assert_eq!(host.ports.len(), 3);
    assert_eq!(host.open_ports(), vec![80]);
}

#[tokio::test(start_paused = true)]
async fn fatal_discovery_error_aborts_with_partial_results() {
    let network = Arc::new(
        FakeNetwork::new()
            .alive((1..=10).map(addr))
            .deny(addr(6))
            .latency(Duration::from_millis(5)),
    );
    let config = ScanConfiguration::new("10.0.0.1-10")
        .with_ports([80])
        .with_concurrency(1, 1);

    let err = scanner(&network)
        .scan(&config, &CancellationToken::new())
        .await
        .unwrap_err();

    let aborted = match err {
        ScanError::Aborted(aborted) => aborted,
        other => panic!("expected an aborted scan, got {other}"),
    };
    assert_eq!(aborted.phase, ScanPhase::Discovery);
    assert!(matches!(aborted.source, ProbeError::PermissionDenied(_)));
    let partial: Vec<Ipv4Addr> = aborted.partial.iter().map(|h| h.ip_addr).collect();
    assert_eq!(partial, (1..=5).map(addr).collect::<Vec<_>>());
    assert!(network.discovery.calls() < 10);
    assert_eq!(network.port_scan.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn rejected_echo_to_broadcast_does_not_abort() {
    let network = Arc::new(
        FakeNetwork::new()
            .alive([addr(1), addr(2)])
            .broadcast(addr(3))
            .port(4028, PortBehavior::Accept),
    );
    let config = ScanConfiguration::new("10.0.0.0/30")
        .with_ports([4028])
        .with_concurrency(1, 1)
        .with_timeout(Duration::from_millis(100));

    let report = scanner(&network)
        .scan(&config, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.state, ScanState::Completed);
    assert_eq!(report.discovered(), vec![addr(1), addr(2)]);
    assert_eq!(network.discovery.calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn resource_exhaustion_aborts_port_scan() {
    let network = Arc::new(
        FakeNetwork::new()
            .alive([addr(1), addr(2)])
            .port(4028, PortBehavior::Exhausted),
    );
    let config = ScanConfiguration::new("10.0.0.1-2").with_ports([4028]);

    let err = scanner(&network)
        .scan(&config, &CancellationToken::new())
        .await
        .unwrap_err();

    let aborted = match err {
        ScanError::Aborted(aborted) => aborted,
        other => panic!("expected an aborted scan, got {other}"),
    };
    assert_eq!(aborted.phase, ScanPhase::PortScan);
    assert_eq!(aborted.partial.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn randomized_order_still_sorts_results() {
    let network = Arc::new(
        FakeNetwork::new()
            .alive((1..=30).map(addr))
            .port(3333, PortBehavior::Accept),
    );
    let config = ScanConfiguration::new("10.0.0.1-30")
        .with_ports([3333, 22])
        .with_randomized_order(true);

    let report = scanner(&network)
        .scan(&config, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.discovered(), (1..=30).map(addr).collect::<Vec<_>>());
    for host in &report.hosts {
        let attempted: Vec<u16> = host.ports.iter().map(|p| p.port).collect();
        assert_eq!(attempted, vec![22, 3333]);
    }
}

/// Knows one rig and takes forever on everything else.
struct SlowRegistry;

#[async_trait::async_trait]
impl HostLookup for SlowRegistry {
    async fn lookup(&self, ip_addr: Ipv4Addr) -> anyhow::Result<Option<HostMetadata>> {
        if ip_addr == addr(1) {
            let mut meta = HostMetadata::new("antminer-s19");
            meta.location = Some("rack 4".to_string());
            return Ok(Some(meta));
        }
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(None)
    }
}

#[tokio::test(start_paused = true)]
async fn service_enriches_and_stores_results() {
    let network = Arc::new(
        FakeNetwork::new()
            .alive([addr(1), addr(2)])
            .port(4028, PortBehavior::Accept),
    );
    let service = ScanService::new(
        scanner(&network),
        Box::new(SlowRegistry),
        Box::new(MemoryRepository::new()),
    )
    .with_lookup_timeout(Duration::from_millis(500));
    let config = ScanConfiguration::new("10.0.0.1-2").with_ports([4028]);

    let report = service.run(&config, &CancellationToken::new()).await.unwrap();

    assert_eq!(report.hosts.len(), 2);
    let rig = report.hosts[0].metadata.as_ref().unwrap();
    assert_eq!(rig.label, "antminer-s19");
    assert_eq!(rig.location.as_deref(), Some("rack 4"));
    assert!(report.hosts[1].metadata.is_none());
    assert_eq!(service.repository().load().await.unwrap().len(), 2);
}
