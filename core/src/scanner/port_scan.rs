use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use rigscan_common::network::host::PortProbeResult;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::pool::{self, PhaseOutcome};
use crate::probe::PortProber;

/// Probes every (host, port) pair under one global cap.
pub(super) async fn scan_ports(
    prober: Arc<dyn PortProber>,
    jobs: Vec<(Ipv4Addr, u16)>,
    probe_timeout: Duration,
    limit: usize,
    cancel: &CancellationToken,
    on_progress: impl FnMut(usize),
) -> PhaseOutcome<(Ipv4Addr, PortProbeResult)> {
    pool::run_bounded(jobs, limit, cancel, on_progress, move |(addr, port)| {
        let prober = Arc::clone(&prober);
        async move {
            let open = match timeout(probe_timeout, prober.probe(addr, port, probe_timeout)).await {
                Ok(Ok(open)) => open,
                Ok(Err(e)) if e.is_fatal() => return Err(e),
                Ok(Err(e)) => {
                    debug!(%addr, port, error = %e, "Port probe failed");
                    false
                }
                Err(_elapsed) => false,
            };
            Ok((addr, PortProbeResult::new(port, open)))
        }
    })
    .await
}
